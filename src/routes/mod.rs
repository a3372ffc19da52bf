// routes/mod.rs
// Public re-exports of all route handlers and the router wiring.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{session, state::AppState};

pub mod entries;
pub mod helpers;
pub mod home;
pub mod login;
pub mod logout;
pub mod summary;

pub use entries::{entries_create, entries_delete, entries_export, entries_import, entries_index};
pub use home::home;
pub use login::{login, register};
pub use logout::logout;
pub use summary::{chart_balance, chart_monthly, installment_schedule, summary};

/// Builds the full application router. Everything under `/api` requires a
/// valid session cookie.
pub fn build_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/logout", post(logout))
        .route("/api/entries", get(entries_index).post(entries_create))
        .route("/api/entries/delete", post(entries_delete))
        .route("/api/entries/export", get(entries_export))
        .route("/api/entries/import", post(entries_import))
        .route("/api/summary", get(summary))
        .route("/api/schedule", get(installment_schedule))
        .route("/api/charts/monthly", get(chart_monthly))
        .route("/api/charts/balance", get(chart_balance))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_session,
        ));

    Router::new()
        .route("/", get(home))
        .route("/register", post(register))
        .route("/login", post(login))
        .merge(protected)
        .with_state(state)
}
