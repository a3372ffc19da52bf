// routes/entries.rs
// Ledger entry endpoints for the signed-in user:
// - GET  /api/entries[?kind=]     -> list
// - POST /api/entries             -> expand installments and store
// - POST /api/entries/delete      -> remove by ids
// - GET  /api/entries/export      -> CSV download
// - POST /api/entries/import      -> CSV upload

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    error::{LedgerError, Result},
    ledger::{self, EntryDraft},
    models::EntryKind,
    session::SessionUser,
    state::{
        AppState, delete_entries, fetch_entries, fetch_entries_by_kind, insert_entries,
        record_purchase,
    },
};

use super::helpers::*;

pub const EXPORT_FILE_NAME: &str = "financial_data.csv";

#[derive(Deserialize, Default)]
pub struct EntriesQuery {
    #[serde(default)]
    kind: Option<String>,
}

#[derive(Deserialize)]
pub struct EntryRequest {
    date: String,
    #[serde(default)]
    description: String,
    amount: NumericInput,
    kind: String,
    #[serde(default)]
    payment_method: Option<String>,
    #[serde(default)]
    necessity: Option<String>,
    #[serde(default)]
    installments: Option<NumericInput>,
    #[serde(default)]
    monthly_rate: Option<NumericInput>,
}

impl EntryRequest {
    fn parse(self) -> Result<(EntryDraft, Decimal, u32)> {
        let draft = EntryDraft {
            date: parse_date_field(&self.date, "date")?,
            description: self.description.trim().to_string(),
            amount: parse_decimal_field(&self.amount, "amount")?,
            kind: self.kind.parse::<EntryKind>()?,
            payment_method: parse_optional(self.payment_method)?,
            necessity: parse_optional(self.necessity)?,
        };
        let monthly_rate = parse_optional_decimal_field(self.monthly_rate.as_ref(), "monthly_rate")?
            .unwrap_or(Decimal::ZERO);
        let installments = parse_count_field(self.installments.as_ref(), "installments", 1)?;
        Ok((draft, monthly_rate, installments))
    }
}

#[derive(Deserialize)]
pub struct DeleteRequest {
    ids: Vec<String>,
}

pub async fn entries_index(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<EntriesQuery>,
) -> Response {
    let entries = match parse_optional::<EntryKind>(query.kind) {
        Ok(Some(kind)) => fetch_entries_by_kind(&state, session_user.username(), kind).await,
        Ok(None) => fetch_entries(&state, session_user.username()).await,
        Err(e) => return e.into_response(),
    };

    match entries {
        Ok(entries) => Json(entry_views(&entries)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn entries_create(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(body): Json<EntryRequest>,
) -> Response {
    let (draft, monthly_rate, installments) = match body.parse() {
        Ok(parsed) => parsed,
        Err(e) => return e.into_response(),
    };

    match record_purchase(
        &state,
        session_user.username(),
        draft,
        monthly_rate,
        installments,
    )
    .await
    {
        Ok(ids) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "ok": true,
                "ids": ids.iter().map(|id| id.to_hex()).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn entries_delete(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(body): Json<DeleteRequest>,
) -> Response {
    let ids = match body
        .ids
        .iter()
        .map(|id| parse_object_id(id))
        .collect::<Result<Vec<_>>>()
    {
        Ok(ids) => ids,
        Err(e) => return e.into_response(),
    };

    match delete_entries(&state, session_user.username(), &ids).await {
        Ok(deleted) => Json(serde_json::json!({ "ok": true, "deleted": deleted })).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn entries_export(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Response {
    let entries = match fetch_entries(&state, session_user.username()).await {
        Ok(entries) => entries,
        Err(e) => return e.into_response(),
    };

    let mut buf = Vec::new();
    if let Err(e) = ledger::csv::write_entries(&entries, &mut buf) {
        return e.into_response();
    }
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        buf,
    )
        .into_response()
}

/// All rows are parsed and validated before anything is written.
pub async fn entries_import(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    body: String,
) -> Response {
    if body.trim().is_empty() {
        return LedgerError::invalid("empty CSV body").into_response();
    }
    let entries = match ledger::csv::read_entries(body.as_bytes(), session_user.username()) {
        Ok(entries) => entries,
        Err(e) => return e.into_response(),
    };

    match insert_entries(&state, &entries).await {
        Ok(ids) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "ok": true, "imported": ids.len() })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
