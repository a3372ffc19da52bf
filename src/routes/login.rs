// routes/login.rs
// POST /login    { "username": "...", "password": "..." } -> { "ok": true|false } + session cookie
// POST /register { "username": "...", "password": "..." } -> 201 { "ok": true }

use axum::{
    extract::{Json, State},
    http::{HeaderValue, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::LedgerError;
use crate::session::SESSION_COOKIE_NAME;
use crate::state::{AppState, authenticate, create_session, register_user};

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

pub async fn register(
    State(st): State<Arc<AppState>>,
    Json(body): Json<CredentialsRequest>,
) -> Response {
    match register_user(&st, &body.username, &body.password).await {
        Ok(_) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "ok": true })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Same 401 body for unknown users and wrong passwords.
pub async fn login(
    State(st): State<Arc<AppState>>,
    Json(body): Json<CredentialsRequest>,
) -> Response {
    let username = body.username.trim();
    match authenticate(&st, username, &body.password).await {
        Ok(()) => match create_session(&st, username).await {
            Ok(token) => {
                let mut response =
                    (StatusCode::OK, Json(serde_json::json!({ "ok": true }))).into_response();
                if let Ok(header_value) =
                    HeaderValue::from_str(&session_cookie(&token, st.session_ttl_seconds))
                {
                    response.headers_mut().append(SET_COOKIE, header_value);
                }
                response
            }
            Err(e) => e.into_response(),
        },
        Err(LedgerError::AuthenticationFailed) => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "ok": false })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub(crate) fn session_cookie(token: &str, max_age: u64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE_NAME, token, max_age
    )
}

pub(crate) fn expired_session_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        SESSION_COOKIE_NAME
    )
}
