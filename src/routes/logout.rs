// routes/logout.rs
// POST /logout -> clears session cookie and removes the session entry.

use axum::{
    Json,
    extract::State,
    http::{HeaderValue, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::routes::login::expired_session_cookie;
use crate::session::SessionUser;
use crate::state::{AppState, delete_session};

pub async fn logout(State(st): State<Arc<AppState>>, session: SessionUser) -> Response {
    let mut response = match delete_session(&st, session.token()).await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "ok": true }))).into_response(),
        Err(e) => e.into_response(),
    };
    // The cookie is cleared even when the store could not be reached.
    if let Ok(header_value) = HeaderValue::from_str(&expired_session_cookie()) {
        response.headers_mut().append(SET_COOKIE, header_value);
    }
    response
}
