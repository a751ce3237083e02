//! Web adapter: axum router, session-backed authentication and the
//! HTML/JSON surface of the simulator.

mod auth;
mod error;
mod handlers;
mod templates;

pub use auth::{AuthSession, Backend, Credentials};
pub use error::{ApiError, WebError};
pub use handlers::*;
pub use templates::*;

use axum::{
    routing::{get, post},
    Router,
};
use axum_login::{login_required, AuthManagerLayerBuilder};
use std::sync::Arc;
use time::Duration;
use tower_http::services::ServeDir;
use tower_sessions::{cookie::Key, Expiry, MemoryStore, SessionManagerLayer};

use crate::domain::error::PapertradeError;
use crate::ports::config_port::ConfigPort;
use crate::ports::quote_port::QuotePort;
use crate::ports::store_port::StorePort;

pub struct AppState {
    pub store: Arc<dyn StorePort + Send + Sync>,
    pub quotes: Arc<dyn QuotePort + Send + Sync>,
    pub config: Arc<dyn ConfigPort + Send + Sync>,
}

/// Build the application router. Fails if the session secret is missing
/// or malformed; required configuration is fatal at startup.
pub fn build_router(state: AppState) -> Result<Router, PapertradeError> {
    let secret_hex = state
        .config
        .get_string("auth", "session_secret")
        .ok_or_else(|| PapertradeError::ConfigMissing {
            section: "auth".into(),
            key: "session_secret".into(),
        })?;
    let secret = hex::decode(secret_hex.trim()).map_err(|_| PapertradeError::ConfigInvalid {
        section: "auth".into(),
        key: "session_secret".into(),
        reason: "not valid hex".into(),
    })?;
    let key = Key::try_from(&secret[..]).map_err(|_| PapertradeError::ConfigInvalid {
        section: "auth".into(),
        key: "session_secret".into(),
        reason: "need at least 64 bytes of key material".into(),
    })?;

    let lifetime = state.config.get_int("auth", "session_lifetime", 86_400);
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_signed(key)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(lifetime)));

    let backend = Backend::new(state.store.clone());
    let auth_layer = AuthManagerLayerBuilder::new(backend, session_layer).build();

    Ok(Router::new()
        .route("/", get(handlers::portfolio_view))
        .route("/buy", get(handlers::buy_form).post(handlers::buy))
        .route("/sell", get(handlers::sell_form).post(handlers::sell))
        .route("/quote", get(handlers::quote_form).post(handlers::quote))
        .route("/history", get(handlers::history))
        .route("/api/user", get(handlers::api_user))
        .route("/api/buy", post(handlers::api_buy))
        .route_layer(login_required!(Backend, login_url = "/login"))
        .route("/login", get(handlers::login_form).post(handlers::login))
        .route("/logout", get(handlers::logout))
        .route(
            "/register",
            get(handlers::register_form).post(handlers::register),
        )
        .nest_service("/static", ServeDir::new("static"))
        .fallback(handlers::not_found)
        .layer(auth_layer)
        .with_state(Arc::new(state)))
}
