//! HTTP request handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::error::PapertradeError;
use crate::domain::records::User;
use crate::domain::{ledger, portfolio};

use super::templates::*;
use super::{ApiError, AppState, AuthSession, Credentials, WebError};

fn current_user(auth: &AuthSession) -> Result<User, WebError> {
    auth.user
        .clone()
        .ok_or_else(|| WebError::new(StatusCode::UNAUTHORIZED, "not logged in"))
}

fn clean_symbol(raw: &str) -> Result<String, PapertradeError> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(PapertradeError::Validation {
            reason: "must provide a symbol".into(),
        });
    }
    Ok(symbol)
}

fn parse_shares(raw: &str) -> Result<i64, PapertradeError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(PapertradeError::Validation {
            reason: "must provide shares".into(),
        });
    }
    raw.parse().map_err(|_| PapertradeError::Validation {
        reason: "shares must be a whole number".into(),
    })
}

fn place_buy(
    state: &AppState,
    user: &User,
    symbol: &str,
    shares: &str,
) -> Result<(), PapertradeError> {
    let symbol = clean_symbol(symbol)?;
    let quantity = parse_shares(shares)?;
    let quote = state
        .quotes
        .lookup(&symbol)?
        .ok_or(PapertradeError::SymbolNotFound { symbol })?;

    let cash = state.store.get_cash(user.id)?;
    let held = state
        .store
        .get_position(user.id, &quote.symbol)?
        .map(|p| p.quantity);

    let outcome = ledger::execute_buy(
        user.id,
        cash,
        held,
        &quote,
        quantity,
        Utc::now().naive_utc(),
    )?;
    state.store.apply_trade(&outcome)?;

    tracing::info!(
        user = %user.username,
        symbol = %quote.symbol,
        quantity,
        price = quote.price,
        "buy executed"
    );
    Ok(())
}

fn place_sell(
    state: &AppState,
    user: &User,
    symbol: &str,
    shares: &str,
) -> Result<(), PapertradeError> {
    let symbol = clean_symbol(symbol)?;
    let quantity = parse_shares(shares)?;
    let quote = state
        .quotes
        .lookup(&symbol)?
        .ok_or(PapertradeError::SymbolNotFound { symbol })?;

    let cash = state.store.get_cash(user.id)?;
    let held = state
        .store
        .get_position(user.id, &quote.symbol)?
        .map(|p| p.quantity);

    let outcome = ledger::execute_sell(
        user.id,
        cash,
        held,
        &quote,
        quantity,
        Utc::now().naive_utc(),
    )?;
    state.store.apply_trade(&outcome)?;

    tracing::info!(
        user = %user.username,
        symbol = %quote.symbol,
        quantity,
        price = quote.price,
        "sell executed"
    );
    Ok(())
}

pub async fn portfolio_view(
    auth: AuthSession,
    State(state): State<Arc<AppState>>,
) -> Result<Response, WebError> {
    let user = current_user(&auth)?;
    let view = portfolio::value_portfolio(state.store.as_ref(), state.quotes.as_ref(), user.id)?;

    Ok(Page(PortfolioTemplate {
        holdings: &view.holdings,
        cash: view.cash,
        grand_total: view.grand_total,
    })
    .into_response())
}

#[derive(Debug, Deserialize)]
pub struct TradeForm {
    pub symbol: String,
    pub shares: String,
}

pub async fn buy_form() -> Response {
    Page(BuyTemplate).into_response()
}

pub async fn buy(
    auth: AuthSession,
    State(state): State<Arc<AppState>>,
    Form(form): Form<TradeForm>,
) -> Result<Response, WebError> {
    let user = current_user(&auth)?;
    place_buy(&state, &user, &form.symbol, &form.shares)?;
    Ok(Redirect::to("/").into_response())
}

pub async fn sell_form(
    auth: AuthSession,
    State(state): State<Arc<AppState>>,
) -> Result<Response, WebError> {
    let user = current_user(&auth)?;
    let symbols: Vec<String> = state
        .store
        .list_positions(user.id)
        .map_err(WebError::from)?
        .into_iter()
        .map(|p| p.symbol)
        .collect();

    Ok(Page(SellTemplate { symbols: &symbols }).into_response())
}

pub async fn sell(
    auth: AuthSession,
    State(state): State<Arc<AppState>>,
    Form(form): Form<TradeForm>,
) -> Result<Response, WebError> {
    let user = current_user(&auth)?;
    place_sell(&state, &user, &form.symbol, &form.shares)?;
    Ok(Redirect::to("/").into_response())
}

#[derive(Debug, Deserialize)]
pub struct QuoteForm {
    pub symbol: String,
}

pub async fn quote_form() -> Response {
    Page(QuoteTemplate).into_response()
}

pub async fn quote(
    State(state): State<Arc<AppState>>,
    Form(form): Form<QuoteForm>,
) -> Result<Response, WebError> {
    let symbol = clean_symbol(&form.symbol)?;
    let quote = state
        .quotes
        .lookup(&symbol)?
        .ok_or(PapertradeError::SymbolNotFound { symbol })?;

    Ok(Page(QuotedTemplate {
        name: &quote.name,
        symbol: &quote.symbol,
        price: quote.price,
    })
    .into_response())
}

pub async fn history(
    auth: AuthSession,
    State(state): State<Arc<AppState>>,
) -> Result<Response, WebError> {
    let user = current_user(&auth)?;
    let transactions = state.store.list_transactions(user.id)?;

    Ok(Page(HistoryTemplate {
        transactions: &transactions,
    })
    .into_response())
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub async fn login_form() -> Response {
    Page(LoginTemplate { error: "" }).into_response()
}

pub async fn login(
    mut auth: AuthSession,
    Form(form): Form<LoginForm>,
) -> Result<Response, WebError> {
    if form.username.trim().is_empty() || form.password.is_empty() {
        return Ok(Page(LoginTemplate {
            error: "must provide username and password",
        })
        .into_response());
    }

    let creds = Credentials {
        username: form.username.trim().to_string(),
        password: form.password,
    };
    let user = match auth.authenticate(creds).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Ok(Page(LoginTemplate {
                error: "Invalid username or password",
            })
            .into_response());
        }
        Err(e) => return Err(WebError::internal(e.to_string())),
    };

    auth.login(&user)
        .await
        .map_err(|e| WebError::internal(e.to_string()))?;
    tracing::info!(user = %user.username, "logged in");
    Ok(Redirect::to("/").into_response())
}

pub async fn logout(mut auth: AuthSession) -> Result<Response, WebError> {
    auth.logout()
        .await
        .map_err(|e| WebError::internal(e.to_string()))?;
    Ok(Redirect::to("/login").into_response())
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub confirmation: String,
}

pub async fn register_form() -> Response {
    Page(RegisterTemplate).into_response()
}

pub async fn register(
    mut auth: AuthSession,
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, WebError> {
    let username = form.username.trim().to_string();
    if username.is_empty() {
        return Err(WebError::bad_request("must provide username"));
    }
    if form.password.is_empty() {
        return Err(WebError::bad_request("must provide password"));
    }
    if form.confirmation.is_empty() {
        return Err(WebError::bad_request("must provide password confirmation"));
    }
    if form.password != form.confirmation {
        return Err(WebError::bad_request("passwords must match"));
    }

    let hash = hash_password(&form.password)?;
    let starting_cash = state.config.get_double("trading", "starting_cash", 10_000.0);
    let user = state.store.create_user(&username, &hash, starting_cash)?;
    tracing::info!(user = %user.username, starting_cash, "registered");

    auth.login(&user)
        .await
        .map_err(|e| WebError::internal(e.to_string()))?;
    Ok(Redirect::to("/").into_response())
}

fn hash_password(password: &str) -> Result<String, WebError> {
    use argon2::password_hash::SaltString;
    use argon2::{Algorithm, Argon2, Params, PasswordHasher, Version};
    use rand::rngs::OsRng;

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default());
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| WebError::internal(format!("failed to hash password: {e}")))
}

#[derive(Debug, Serialize)]
struct CurrentUser {
    id: i64,
    username: String,
}

#[derive(Debug, Serialize)]
struct CurrentUserBody {
    user: CurrentUser,
}

pub async fn api_user(auth: AuthSession) -> Response {
    match auth.user {
        Some(user) => Json(CurrentUserBody {
            user: CurrentUser {
                id: user.id,
                username: user.username,
            },
        })
        .into_response(),
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

pub async fn api_buy(
    auth: AuthSession,
    State(state): State<Arc<AppState>>,
    Form(form): Form<TradeForm>,
) -> Result<StatusCode, ApiError> {
    let user = auth
        .user
        .clone()
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "not logged in"))?;
    place_buy(&state, &user, &form.symbol, &form.shares)?;
    Ok(StatusCode::OK)
}

pub async fn not_found() -> WebError {
    WebError::not_found("page not found")
}
