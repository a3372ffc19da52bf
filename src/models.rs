// models.rs
// Domain models persisted in MongoDB: users, sessions and ledger entries.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use mongodb::bson::{DateTime, oid::ObjectId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Largest amount a single entry may carry (10^15). Keeps every ledger
/// total far inside `Decimal` range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Trims `input`, mapping blank values to `None`.
pub fn clean_opt(input: Option<String>) -> Option<String> {
    input.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Direction of a movement. The stored amount is always a magnitude;
/// the sign comes from here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
        }
    }
}

impl FromStr for EntryKind {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "income" => Ok(EntryKind::Income),
            "expense" => Ok(EntryKind::Expense),
            other => Err(LedgerError::invalid(format!("unknown entry kind: {other:?}"))),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    DebitCard,
    CreditCard,
    BankTransfer,
    Installment,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::Cash,
        PaymentMethod::DebitCard,
        PaymentMethod::CreditCard,
        PaymentMethod::BankTransfer,
        PaymentMethod::Installment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Installment => "installment",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "debit_card" => Ok(PaymentMethod::DebitCard),
            "credit_card" => Ok(PaymentMethod::CreditCard),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "installment" => Ok(PaymentMethod::Installment),
            other => Err(LedgerError::invalid(format!(
                "unknown payment method: {other:?}"
            ))),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification used for the "superfluous spending" report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Necessity {
    Essential,
    NonEssential,
}

impl Necessity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Necessity::Essential => "essential",
            Necessity::NonEssential => "non_essential",
        }
    }
}

impl FromStr for Necessity {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "essential" => Ok(Necessity::Essential),
            "non_essential" => Ok(Necessity::NonEssential),
            other => Err(LedgerError::invalid(format!("unknown necessity: {other:?}"))),
        }
    }
}

impl fmt::Display for Necessity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One financial movement, stored in the `entries` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(rename = "username")]
    pub owner: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub kind: EntryKind,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub installment_index: Option<u32>,
    #[serde(default)]
    pub installment_count: Option<u32>,
    #[serde(default)]
    pub necessity: Option<Necessity>,
}

impl LedgerEntry {
    /// Amount with the sign of its kind applied: income positive, expense negative.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            EntryKind::Income => self.amount,
            EntryKind::Expense => -self.amount,
        }
    }

    pub fn is_expense(&self) -> bool {
        self.kind == EntryKind::Expense
    }

    /// Checks the invariants every stored entry must satisfy.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.owner.trim().is_empty() {
            return Err(LedgerError::invalid("entry owner is required"));
        }
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(LedgerError::invalid("amount must not be negative"));
        }
        if self.amount > MAX_AMOUNT {
            return Err(LedgerError::invalid(format!(
                "amount must not exceed {MAX_AMOUNT}"
            )));
        }
        match (self.installment_index, self.installment_count) {
            (None, None) => Ok(()),
            (Some(index), Some(count)) if count >= 1 && (1..=count).contains(&index) => Ok(()),
            (Some(index), Some(count)) => Err(LedgerError::invalid(format!(
                "installment {index}/{count} is out of range"
            ))),
            _ => Err(LedgerError::invalid(
                "installment index and count must be given together",
            )),
        }
    }
}

/// User document; `username` is unique (enforced by index).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub password_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
}

/// Session document stored in MongoDB linking a token to a user and expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub token: String,
    pub username: String,
    pub expires_at: DateTime,
}
