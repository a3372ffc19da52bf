//! Read-side figures derived from a snapshot of one user's entries.
//!
//! Everything here is a pure function of the slice it is given; nothing is
//! cached, so figures are simply recomputed after every insert or delete.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    error::{LedgerError, Result},
    models::{EntryKind, LedgerEntry, Necessity, PaymentMethod},
    money::{format_currency, round_cents},
};

/// Monthly interest charged on a negative balance (8%).
pub const OVERDRAFT_MONTHLY_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Alert {
    Overdraft {
        balance: Decimal,
        projected_interest: Decimal,
    },
    CreditLimit {
        spent: Decimal,
        limit: Decimal,
    },
}

impl Alert {
    pub fn message(&self) -> String {
        match self {
            Alert::Overdraft {
                balance,
                projected_interest,
            } => format!(
                "Overdraft: balance is {}; 8% monthly interest projects {} in charges.",
                format_currency(*balance),
                format_currency(*projected_interest)
            ),
            Alert::CreditLimit { spent, limit } => format!(
                "Credit card spending is high ({}). Suggested limit: {}.",
                format_currency(*spent),
                format_currency(*limit)
            ),
        }
    }
}

pub fn net_balance(entries: &[LedgerEntry]) -> Decimal {
    entries.iter().map(LedgerEntry::signed_amount).sum()
}

pub fn total_by_kind(entries: &[LedgerEntry], kind: EntryKind) -> Decimal {
    entries
        .iter()
        .filter(|e| e.kind == kind)
        .map(|e| e.amount)
        .sum()
}

/// Sum of expenses paid with `method`.
pub fn total_by_payment_method(entries: &[LedgerEntry], method: PaymentMethod) -> Decimal {
    entries
        .iter()
        .filter(|e| e.is_expense() && e.payment_method == Some(method))
        .map(|e| e.amount)
        .sum()
}

fn by_amount_desc_then_date<'a>(mut items: Vec<&'a LedgerEntry>) -> Vec<&'a LedgerEntry> {
    items.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.date.cmp(&b.date)));
    items
}

/// Largest expenses first; equal amounts keep the earliest date first.
pub fn top_expenses(entries: &[LedgerEntry], n: usize) -> Vec<&LedgerEntry> {
    let mut sorted = by_amount_desc_then_date(entries.iter().filter(|e| e.is_expense()).collect());
    sorted.truncate(n);
    sorted
}

pub fn non_essential_expenses(entries: &[LedgerEntry]) -> Vec<&LedgerEntry> {
    by_amount_desc_then_date(
        entries
            .iter()
            .filter(|e| e.is_expense() && e.necessity == Some(Necessity::NonEssential))
            .collect(),
    )
}

pub fn monthly_balance(entries: &[LedgerEntry], year: i32, month: u32) -> Decimal {
    entries
        .iter()
        .filter(|e| e.date.year() == year && e.date.month() == month)
        .map(LedgerEntry::signed_amount)
        .sum()
}

pub(crate) fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// Balance of the reference month minus the balance of the month before.
pub fn month_over_month_delta(entries: &[LedgerEntry], reference: NaiveDate) -> Decimal {
    let (year, month) = (reference.year(), reference.month());
    let (prev_year, prev_month) = previous_month(year, month);
    monthly_balance(entries, year, month) - monthly_balance(entries, prev_year, prev_month)
}

pub fn overdraft_alert(balance: Decimal) -> Option<Alert> {
    if balance >= Decimal::ZERO {
        return None;
    }
    Some(Alert::Overdraft {
        balance,
        projected_interest: round_cents(balance.abs() * OVERDRAFT_MONTHLY_RATE),
    })
}

pub fn credit_limit_alert(entries: &[LedgerEntry], limit: Decimal) -> Option<Alert> {
    let spent = total_by_payment_method(entries, PaymentMethod::CreditCard);
    (spent > limit).then_some(Alert::CreditLimit { spent, limit })
}

/// `(expenses + credit card expenses) / income * 100`, or zero without income.
///
/// Fails with `InvalidInput` when the ratio does not fit in a `Decimal`,
/// which only happens with a vanishingly small income.
pub fn debt_commitment_ratio(entries: &[LedgerEntry]) -> Result<Decimal> {
    let income = total_by_kind(entries, EntryKind::Income);
    if income.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let committed = total_by_kind(entries, EntryKind::Expense)
        + total_by_payment_method(entries, PaymentMethod::CreditCard);
    committed
        .checked_div(income)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(|| LedgerError::invalid("debt commitment ratio is out of range"))
}

#[derive(Debug, Clone, Serialize)]
pub struct MethodTotal {
    pub method: PaymentMethod,
    pub total: Decimal,
}

/// Everything the analysis page shows, computed in one pass over a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSummary {
    pub balance: Decimal,
    pub balance_display: String,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub by_payment_method: Vec<MethodTotal>,
    pub top_expenses: Vec<LedgerEntry>,
    pub non_essential_expenses: Vec<LedgerEntry>,
    pub month_over_month_delta: Decimal,
    pub debt_commitment_ratio: Decimal,
    pub alerts: Vec<Alert>,
    pub alert_messages: Vec<String>,
}

pub fn summarize(
    entries: &[LedgerEntry],
    credit_limit: Decimal,
    reference: NaiveDate,
    top: usize,
) -> Result<LedgerSummary> {
    let debt_commitment_ratio = round_cents(debt_commitment_ratio(entries)?);
    let balance = net_balance(entries);
    let alerts: Vec<Alert> = overdraft_alert(balance)
        .into_iter()
        .chain(credit_limit_alert(entries, credit_limit))
        .collect();

    Ok(LedgerSummary {
        balance,
        balance_display: format_currency(balance),
        total_income: total_by_kind(entries, EntryKind::Income),
        total_expense: total_by_kind(entries, EntryKind::Expense),
        by_payment_method: PaymentMethod::ALL
            .iter()
            .map(|&method| MethodTotal {
                method,
                total: total_by_payment_method(entries, method),
            })
            .collect(),
        top_expenses: top_expenses(entries, top).into_iter().cloned().collect(),
        non_essential_expenses: non_essential_expenses(entries)
            .into_iter()
            .cloned()
            .collect(),
        month_over_month_delta: month_over_month_delta(entries, reference),
        debt_commitment_ratio,
        alert_messages: alerts.iter().map(Alert::message).collect(),
        alerts,
    })
}
