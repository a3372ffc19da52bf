use futures::stream::TryStreamExt;
use mongodb::bson::{Bson, doc, oid::ObjectId};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::{
    error::{LedgerError, Result},
    ledger::{EntryDraft, expand},
    models::{EntryKind, LedgerEntry},
};

use super::AppState;

/// All entries of `owner`, oldest first (ties by insertion order).
pub async fn fetch_entries(state: &AppState, owner: &str) -> Result<Vec<LedgerEntry>> {
    let mut cursor = state
        .entries
        .find(doc! { "username": owner })
        .sort(doc! { "date": 1, "_id": 1 })
        .await?;
    let mut items = Vec::new();
    while let Some(entry) = cursor.try_next().await? {
        items.push(entry);
    }
    debug!(owner, count = items.len(), "fetched entries");
    Ok(items)
}

pub async fn fetch_entries_by_kind(
    state: &AppState,
    owner: &str,
    kind: EntryKind,
) -> Result<Vec<LedgerEntry>> {
    let mut cursor = state
        .entries
        .find(doc! { "username": owner, "kind": kind.as_str() })
        .sort(doc! { "date": 1, "_id": 1 })
        .await?;
    let mut items = Vec::new();
    while let Some(entry) = cursor.try_next().await? {
        items.push(entry);
    }
    Ok(items)
}

pub async fn get_entry_by_id(state: &AppState, id: &ObjectId) -> Result<Option<LedgerEntry>> {
    state
        .entries
        .find_one(doc! { "_id": id })
        .await
        .map_err(Into::into)
}

pub async fn insert_entry(state: &AppState, entry: &LedgerEntry) -> Result<ObjectId> {
    entry.validate()?;
    let res = state.entries.insert_one(entry).await?;
    res.inserted_id
        .as_object_id()
        .ok_or_else(|| LedgerError::StorageUnavailable("entry insert missing _id".into()))
}

/// Inserts a batch after validating every entry, so an invalid entry
/// leaves the store untouched. Returned ids follow the input order.
pub async fn insert_entries(state: &AppState, entries: &[LedgerEntry]) -> Result<Vec<ObjectId>> {
    if entries.is_empty() {
        return Ok(Vec::new());
    }
    for entry in entries {
        entry.validate()?;
    }

    let res = state.entries.insert_many(entries).await?;
    let mut ids = Vec::with_capacity(entries.len());
    for i in 0..entries.len() {
        let id = res
            .inserted_ids
            .get(&i)
            .and_then(Bson::as_object_id)
            .ok_or_else(|| LedgerError::StorageUnavailable("entry insert missing _id".into()))?;
        ids.push(id);
    }
    Ok(ids)
}

/// Expands a purchase into its installments and stores all of them.
pub async fn record_purchase(
    state: &AppState,
    owner: &str,
    draft: EntryDraft,
    monthly_rate: Decimal,
    installment_count: u32,
) -> Result<Vec<ObjectId>> {
    let entries = expand(owner, draft, monthly_rate, installment_count)?;
    let ids = insert_entries(state, &entries).await?;
    info!(owner, installments = ids.len(), "recorded entry");
    Ok(ids)
}

/// Deletes the given ids, restricted to entries owned by `owner`.
/// Returns how many were removed; ids of other users are ignored.
pub async fn delete_entries(state: &AppState, owner: &str, ids: &[ObjectId]) -> Result<u64> {
    if ids.is_empty() {
        return Ok(0);
    }
    let res = state
        .entries
        .delete_many(doc! { "_id": { "$in": ids.to_vec() }, "username": owner })
        .await?;
    info!(owner, requested = ids.len(), deleted = res.deleted_count, "deleted entries");
    Ok(res.deleted_count)
}
