use std::str::FromStr;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::error;

pub(super) use crate::models::clean_opt;

use crate::{
    error::{LedgerError, Result},
    models::{EntryKind, LedgerEntry, Necessity, PaymentMethod},
    money::format_currency,
};

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let status = match &self {
            LedgerError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            LedgerError::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            LedgerError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            LedgerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// JSON numbers and numeric strings are both accepted for money fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(serde_json::Number),
    Text(String),
}

impl NumericInput {
    fn raw(&self) -> String {
        match self {
            NumericInput::Number(n) => n.to_string(),
            NumericInput::Text(s) => s.trim().to_string(),
        }
    }
}

pub(super) fn parse_decimal_field(value: &NumericInput, label: &str) -> Result<Decimal> {
    let raw = value.raw();
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| LedgerError::invalid(format!("{label} must be numeric")))
}

pub(super) fn parse_optional_decimal_field(
    value: Option<&NumericInput>,
    label: &str,
) -> Result<Option<Decimal>> {
    value.map(|v| parse_decimal_field(v, label)).transpose()
}

pub(super) fn parse_count_field(value: Option<&NumericInput>, label: &str, default: u32) -> Result<u32> {
    match value {
        None => Ok(default),
        Some(v) => v
            .raw()
            .parse::<u32>()
            .map_err(|_| LedgerError::invalid(format!("{label} must be a whole number"))),
    }
}

pub(super) fn parse_date_field(value: &str, label: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::invalid(format!(
            "{label} is required (use YYYY-MM-DD)"
        )));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| LedgerError::invalid(format!("{label} must be a date in YYYY-MM-DD form")))
}

pub(super) fn parse_object_id(value: &str) -> Result<ObjectId> {
    ObjectId::from_str(value.trim())
        .map_err(|_| LedgerError::invalid(format!("invalid entry id: {value:?}")))
}

pub(super) fn parse_optional<T>(value: Option<String>) -> Result<Option<T>>
where
    T: FromStr<Err = LedgerError>,
{
    clean_opt(value).map(|v| v.parse::<T>()).transpose()
}

/// Entry as returned by the API: hex id, no owner column.
#[derive(Debug, Clone, Serialize)]
pub struct EntryView {
    pub id: Option<String>,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub amount_display: String,
    pub kind: EntryKind,
    pub payment_method: Option<PaymentMethod>,
    pub installment_index: Option<u32>,
    pub installment_count: Option<u32>,
    pub necessity: Option<Necessity>,
}

impl From<&LedgerEntry> for EntryView {
    fn from(e: &LedgerEntry) -> Self {
        EntryView {
            id: e.id.map(|id| id.to_hex()),
            date: e.date,
            description: e.description.clone(),
            amount: e.amount,
            amount_display: format_currency(e.amount),
            kind: e.kind,
            payment_method: e.payment_method,
            installment_index: e.installment_index,
            installment_count: e.installment_count,
            necessity: e.necessity,
        }
    }
}

pub(super) fn entry_views<'a, I>(entries: I) -> Vec<EntryView>
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    entries.into_iter().map(EntryView::from).collect()
}
