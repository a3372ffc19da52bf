//! Series behind the income/expense bar chart and the balance line chart.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{EntryKind, LedgerEntry};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalancePoint {
    pub date: NaiveDate,
    pub balance: Decimal,
}

/// Income and expense per calendar month, oldest month first.
/// Months without entries are not emitted.
pub fn monthly_summary(entries: &[LedgerEntry]) -> Vec<MonthlySummary> {
    let mut months: BTreeMap<(i32, u32), (Decimal, Decimal)> = BTreeMap::new();
    for entry in entries {
        let slot = months
            .entry((entry.date.year(), entry.date.month()))
            .or_default();
        match entry.kind {
            EntryKind::Income => slot.0 += entry.amount,
            EntryKind::Expense => slot.1 += entry.amount,
        }
    }

    months
        .into_iter()
        .map(|((year, month), (income, expense))| MonthlySummary {
            year,
            month,
            income,
            expense,
            net: income - expense,
        })
        .collect()
}

/// Cumulative signed balance at the end of each day that has entries.
pub fn running_balance(entries: &[LedgerEntry]) -> Vec<BalancePoint> {
    let mut per_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for entry in entries {
        *per_day.entry(entry.date).or_default() += entry.signed_amount();
    }

    let mut balance = Decimal::ZERO;
    per_day
        .into_iter()
        .map(|(date, delta)| {
            balance += delta;
            BalancePoint { date, balance }
        })
        .collect()
}
