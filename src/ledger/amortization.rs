//! Installment expansion: turns one purchase into the dated ledger entries
//! that will be persisted, one per monthly installment.
//!
//! The payment is the level (Price table) payment
//! `P * r(1+r)^n / ((1+r)^n - 1)`, or `P / n` when the rate is zero. Every
//! generated entry carries that payment rounded down to the cent and the
//! last installment absorbs the remainder, so the amounts always add up
//! to the financed total: `P` itself at zero rate, `round(payment * n)`
//! otherwise.

use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use serde::Serialize;

use crate::{
    error::{LedgerError, Result},
    models::{EntryKind, LedgerEntry, MAX_AMOUNT, Necessity, PaymentMethod},
    money::round_cents,
};

/// Upper bound on plan length (50 years of monthly payments).
pub const MAX_INSTALLMENTS: u32 = 600;

/// A movement as typed by the user, before installment expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub kind: EntryKind,
    pub payment_method: Option<PaymentMethod>,
    pub necessity: Option<Necessity>,
}

impl EntryDraft {
    /// Single-shot entry owned by `owner`.
    pub fn into_entry(self, owner: &str) -> LedgerEntry {
        LedgerEntry {
            id: None,
            owner: owner.to_string(),
            date: self.date,
            description: self.description,
            amount: self.amount,
            kind: self.kind,
            payment_method: self.payment_method,
            installment_index: None,
            installment_count: None,
            necessity: self.necessity,
        }
    }
}

/// One row of the declining-balance breakdown returned by [`schedule`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleRow {
    pub index: u32,
    pub payment: Decimal,
    pub interest: Decimal,
    pub principal: Decimal,
    pub balance: Decimal,
}

fn validate_plan(purchase_amount: Decimal, monthly_rate: Decimal, installment_count: u32) -> Result<()> {
    if installment_count < 1 {
        return Err(LedgerError::invalid("installment count must be at least 1"));
    }
    if installment_count > MAX_INSTALLMENTS {
        return Err(LedgerError::invalid(format!(
            "installment count must not exceed {MAX_INSTALLMENTS}"
        )));
    }
    if purchase_amount < Decimal::ZERO {
        return Err(LedgerError::invalid("purchase amount must not be negative"));
    }
    if purchase_amount > MAX_AMOUNT {
        return Err(LedgerError::invalid(format!(
            "purchase amount must not exceed {MAX_AMOUNT}"
        )));
    }
    if monthly_rate < Decimal::ZERO {
        return Err(LedgerError::invalid("monthly rate must not be negative"));
    }
    Ok(())
}

/// Unrounded level payment for the plan.
pub fn installment_payment(
    purchase_amount: Decimal,
    monthly_rate: Decimal,
    installment_count: u32,
) -> Result<Decimal> {
    validate_plan(purchase_amount, monthly_rate, installment_count)?;
    let n = Decimal::from(installment_count);
    if monthly_rate.is_zero() {
        return Ok(purchase_amount / n);
    }

    let overflow = || LedgerError::invalid("rate and installment count are too large");
    let growth = Decimal::ONE
        .checked_add(monthly_rate)
        .and_then(|base| base.checked_powu(u64::from(installment_count)))
        .ok_or_else(overflow)?;
    let numerator = purchase_amount
        .checked_mul(monthly_rate)
        .and_then(|v| v.checked_mul(growth))
        .ok_or_else(overflow)?;
    numerator
        .checked_div(growth - Decimal::ONE)
        .ok_or_else(overflow)
}

/// Total the installments must add up to, in whole cents.
pub fn financed_total(
    purchase_amount: Decimal,
    monthly_rate: Decimal,
    installment_count: u32,
) -> Result<Decimal> {
    if monthly_rate.is_zero() {
        validate_plan(purchase_amount, monthly_rate, installment_count)?;
        return Ok(round_cents(purchase_amount));
    }
    let payment = installment_payment(purchase_amount, monthly_rate, installment_count)?;
    payment
        .checked_mul(Decimal::from(installment_count))
        .map(round_cents)
        .ok_or_else(|| LedgerError::invalid("financed total overflows"))
}

/// Splits `total` into `count` cent amounts; all but the last are
/// `total / count` truncated to the cent and the last takes the remainder.
pub fn split_amounts(total: Decimal, count: u32) -> Vec<Decimal> {
    if count == 0 {
        return Vec::new();
    }
    let base = (total / Decimal::from(count)).round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let mut amounts = vec![base; count as usize];
    let last = total - base * Decimal::from(count - 1);
    if let Some(slot) = amounts.last_mut() {
        *slot = last;
    }
    amounts
}

/// Expands a purchase into `installment_count` monthly entries.
///
/// With a single installment the result is exactly the plain entry
/// (same description, no installment markers). Fails with
/// `InvalidInput` before producing anything when the arguments are out
/// of range.
pub fn expand(
    owner: &str,
    draft: EntryDraft,
    monthly_rate: Decimal,
    installment_count: u32,
) -> Result<Vec<LedgerEntry>> {
    let total = financed_total(draft.amount, monthly_rate, installment_count)?;

    if installment_count == 1 {
        let mut entry = draft.into_entry(owner);
        entry.amount = total;
        return Ok(vec![entry]);
    }

    let amounts = split_amounts(total, installment_count);
    let mut entries = Vec::with_capacity(amounts.len());
    for (i, amount) in (0..installment_count).zip(amounts) {
        let date = draft
            .date
            .checked_add_months(Months::new(i))
            .ok_or_else(|| LedgerError::invalid("installment date out of range"))?;
        entries.push(LedgerEntry {
            id: None,
            owner: owner.to_string(),
            date,
            description: format!(
                "{} (installment {}/{})",
                draft.description,
                i + 1,
                installment_count
            ),
            amount,
            kind: draft.kind,
            payment_method: draft.payment_method,
            installment_index: Some(i + 1),
            installment_count: Some(installment_count),
            necessity: draft.necessity,
        });
    }
    Ok(entries)
}

/// Interest/principal breakdown of the plan on the outstanding balance.
///
/// Payments match the amounts [`expand`] generates; the last row takes
/// whatever balance is left so the plan closes at exactly zero.
pub fn schedule(
    purchase_amount: Decimal,
    monthly_rate: Decimal,
    installment_count: u32,
) -> Result<Vec<ScheduleRow>> {
    let total = financed_total(purchase_amount, monthly_rate, installment_count)?;
    let payments = split_amounts(total, installment_count);

    let mut balance = round_cents(purchase_amount);
    let mut rows = Vec::with_capacity(payments.len());
    for (i, payment) in (1..=installment_count).zip(payments) {
        let (interest, principal) = if i == installment_count {
            (payment - balance, balance)
        } else {
            let interest = round_cents(balance * monthly_rate);
            (interest, payment - interest)
        };
        balance -= principal;
        rows.push(ScheduleRow {
            index: i,
            payment,
            interest,
            principal,
            balance,
        });
    }
    Ok(rows)
}
