#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use papertrade::adapters::csv_quotes::CsvQuoteAdapter;
use papertrade::adapters::file_config_adapter::FileConfigAdapter;
use papertrade::adapters::sqlite_store::SqliteStore;
use papertrade::adapters::web::{build_router, AppState};
use papertrade::domain::records::Quote;

pub const TEST_SESSION_SECRET: &str = "\
0000000000000000000000000000000000000000000000000000000000000001\
0000000000000000000000000000000000000000000000000000000000000001";

pub fn test_config() -> FileConfigAdapter {
    let content = format!(
        "[auth]\nsession_secret = {TEST_SESSION_SECRET}\nsession_lifetime = 86400\n\
         [trading]\nstarting_cash = 10000.0\n"
    );
    FileConfigAdapter::from_string(&content).unwrap()
}

pub fn test_quotes() -> CsvQuoteAdapter {
    CsvQuoteAdapter::from_quotes([
        Quote {
            symbol: "AAA".to_string(),
            name: "Alpha Airlines".to_string(),
            price: 50.0,
        },
        Quote {
            symbol: "BBB".to_string(),
            name: "Bravo Brands".to_string(),
            price: 200.0,
        },
    ])
}

pub fn test_app() -> Router {
    let store = SqliteStore::in_memory().unwrap();
    store.initialize_schema().unwrap();

    let state = AppState {
        store: Arc::new(store),
        quotes: Arc::new(test_quotes()),
        config: Arc::new(test_config()),
    };
    build_router(state).unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn form_request(uri: &str, body: String, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

pub fn extract_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .collect()
}

pub fn build_cookie_header(set_cookies: &[String]) -> String {
    set_cookies
        .iter()
        .map(|sc| sc.split(';').next().unwrap_or("").to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Register a fresh account and return the session cookie header.
pub async fn register(app: &Router, username: &str, password: &str) -> String {
    let body = format!("username={username}&password={password}&confirmation={password}");
    let response = app
        .clone()
        .oneshot(form_request("/register", body, None))
        .await
        .unwrap();

    let cookies = extract_cookies(&response);
    assert!(!cookies.is_empty(), "register should set a session cookie");
    build_cookie_header(&cookies)
}

pub async fn login(app: &Router, username: &str, password: &str) -> String {
    let body = format!("username={username}&password={password}");
    let response = app
        .clone()
        .oneshot(form_request("/login", body, None))
        .await
        .unwrap();

    let cookies = extract_cookies(&response);
    assert!(!cookies.is_empty(), "login should set a session cookie");
    build_cookie_header(&cookies)
}
