// main.rs
// Axum server wiring: reads configuration from the environment, connects to
// MongoDB, builds the router and serves it.
//
// Endpoints:
// - GET  /                       -> minimal HTML page with login/register forms
// - POST /register, /login       -> credential store + session cookie
// - POST /logout                 -> drops the session
// - GET  /api/schedule           -> installment breakdown preview
// - /api/entries[...]            -> ledger CRUD, CSV export/import
// - GET  /api/summary            -> balance, alerts, top expenses
// - GET  /api/charts/{monthly,balance}

use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use finfusion::{config::Config, routes, state};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let state = Arc::new(
        state::init_state(&config)
            .await
            .context("failed to initialize MongoDB state")?,
    );

    let app = routes::build_router(state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
