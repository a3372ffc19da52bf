pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod money;
pub mod routes;
pub mod session;
pub mod state;
