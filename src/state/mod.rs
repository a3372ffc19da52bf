// state module: AppState, initialization, and re-exports of submodules.

use anyhow::{Context, Result};
use mongodb::{Client, Collection};
use rust_decimal::Decimal;
use tracing::info;

use crate::{
    config::Config,
    models::{LedgerEntry, Session, User},
};

mod entries;
mod schema;
mod users;

pub use entries::*;
pub use users::*;

/// Explicit handles to every collection the service touches. Cloned into
/// handlers instead of living in a process-wide connection.
#[derive(Clone)]
pub struct AppState {
    pub users: Collection<User>,
    pub sessions: Collection<Session>,
    pub entries: Collection<LedgerEntry>,
    pub credit_limit: Decimal,
    pub session_ttl_seconds: u64,
}

pub async fn init_state(config: &Config) -> Result<AppState> {
    let client = Client::with_uri_str(&config.mongodb_uri)
        .await
        .context("invalid MongoDB connection string")?;
    let db = client.database(&config.mongodb_db);

    schema::ensure_collections(&db)
        .await
        .context("failed to prepare collections")?;
    schema::ensure_indexes(&db)
        .await
        .context("failed to create indexes")?;
    info!(db = %config.mongodb_db, "database ready");

    Ok(AppState {
        users: db.collection::<User>(schema::USERS),
        sessions: db.collection::<Session>(schema::SESSIONS),
        entries: db.collection::<LedgerEntry>(schema::ENTRIES),
        credit_limit: config.credit_limit,
        session_ttl_seconds: config.session_ttl_seconds,
    })
}
