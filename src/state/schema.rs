use anyhow::Result;
use mongodb::{Database, IndexModel, bson::doc, options::IndexOptions};

pub(super) const USERS: &str = "users";
pub(super) const SESSIONS: &str = "sessions";
pub(super) const ENTRIES: &str = "entries";

pub(super) async fn ensure_collections(db: &Database) -> Result<()> {
    let existing = db.list_collection_names().await?;
    for name in [USERS, SESSIONS, ENTRIES] {
        if !existing.iter().any(|n| n == name) {
            db.create_collection(name).await?;
        }
    }
    Ok(())
}

pub(super) async fn ensure_indexes(db: &Database) -> Result<()> {
    db.collection::<mongodb::bson::Document>(USERS)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "username": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
        )
        .await?;
    db.collection::<mongodb::bson::Document>(SESSIONS)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "token": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
        )
        .await?;
    db.collection::<mongodb::bson::Document>(ENTRIES)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "username": 1, "date": 1 })
                .build(),
        )
        .await?;
    Ok(())
}
