// routes/summary.rs
// Read-only analysis endpoints:
// - GET /api/summary           -> balance, totals, top/non-essential expenses, alerts
// - GET /api/schedule          -> installment breakdown for a prospective purchase
// - GET /api/charts/monthly    -> income/expense per month
// - GET /api/charts/balance    -> running balance per day

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    error::Result,
    ledger::{self, ScheduleRow, amortization},
    money::format_currency,
    session::SessionUser,
    state::{AppState, fetch_entries},
};

use super::helpers::*;

pub const DEFAULT_TOP_EXPENSES: u32 = 5;

#[derive(Deserialize, Default)]
pub struct SummaryQuery {
    #[serde(default)]
    credit_limit: Option<String>,
    #[serde(default)]
    top: Option<String>,
    /// Reference day for the month-over-month delta; defaults to today.
    #[serde(default)]
    as_of: Option<String>,
}

#[derive(Deserialize)]
pub struct ScheduleQuery {
    amount: String,
    #[serde(default)]
    monthly_rate: Option<String>,
    #[serde(default)]
    installments: Option<String>,
}

impl SummaryQuery {
    fn parse(self, default_limit: Decimal) -> Result<(Decimal, usize, NaiveDate)> {
        let credit_limit = parse_optional_decimal_field(
            clean_opt(self.credit_limit).map(NumericInput::Text).as_ref(),
            "credit_limit",
        )?
        .unwrap_or(default_limit);
        let top = parse_count_field(
            clean_opt(self.top).map(NumericInput::Text).as_ref(),
            "top",
            DEFAULT_TOP_EXPENSES,
        )? as usize;
        let reference = match clean_opt(self.as_of) {
            Some(day) => parse_date_field(&day, "as_of")?,
            None => Local::now().date_naive(),
        };
        Ok((credit_limit, top, reference))
    }
}

impl ScheduleQuery {
    fn build(self) -> Result<(Vec<ScheduleRow>, Decimal)> {
        let amount = parse_decimal_field(&NumericInput::Text(self.amount), "amount")?;
        let rate = parse_optional_decimal_field(
            clean_opt(self.monthly_rate).map(NumericInput::Text).as_ref(),
            "monthly_rate",
        )?
        .unwrap_or_default();
        let count = parse_count_field(
            clean_opt(self.installments).map(NumericInput::Text).as_ref(),
            "installments",
            1,
        )?;
        let rows = amortization::schedule(amount, rate, count)?;
        let total = amortization::financed_total(amount, rate, count)?;
        Ok((rows, total))
    }
}

pub async fn summary(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SummaryQuery>,
) -> Response {
    let (credit_limit, top, reference) = match query.parse(state.credit_limit) {
        Ok(parsed) => parsed,
        Err(e) => return e.into_response(),
    };

    let entries = match fetch_entries(&state, session_user.username()).await {
        Ok(entries) => entries,
        Err(e) => return e.into_response(),
    };

    let s = match ledger::summarize(&entries, credit_limit, reference, top) {
        Ok(s) => s,
        Err(e) => return e.into_response(),
    };
    Json(serde_json::json!({
        "balance": s.balance,
        "balance_display": s.balance_display,
        "total_income": s.total_income,
        "total_expense": s.total_expense,
        "by_payment_method": s.by_payment_method,
        "top_expenses": entry_views(&s.top_expenses),
        "non_essential_expenses": entry_views(&s.non_essential_expenses),
        "month_over_month_delta": s.month_over_month_delta,
        "debt_commitment_ratio": s.debt_commitment_ratio,
        "credit_limit": credit_limit,
        "alerts": s.alerts,
        "alert_messages": s.alert_messages,
    }))
    .into_response()
}

pub async fn installment_schedule(Query(query): Query<ScheduleQuery>) -> Response {
    let parsed = query.build();

    match parsed {
        Ok((rows, total)) => Json(serde_json::json!({
            "financed_total": total,
            "financed_total_display": format_currency(total),
            "installments": rows,
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn chart_monthly(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Response {
    match fetch_entries(&state, session_user.username()).await {
        Ok(entries) => Json(ledger::monthly_summary(&entries)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn chart_balance(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Response {
    match fetch_entries(&state, session_user.username()).await {
        Ok(entries) => Json(ledger::running_balance(&entries)).into_response(),
        Err(e) => e.into_response(),
    }
}
