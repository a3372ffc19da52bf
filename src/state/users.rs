use std::{
    sync::OnceLock,
    time::{Duration, SystemTime},
};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use data_encoding::BASE32_NOPAD;
use mongodb::{
    bson::{DateTime, doc, oid::ObjectId},
    error::{ErrorKind, WriteFailure},
};
use rand::RngCore;
use rand_core::OsRng;
use tracing::{info, warn};

use crate::{
    error::{LedgerError, Result},
    models::{Session, User},
};

use super::AppState;

const DUPLICATE_KEY: i32 = 11000;

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| LedgerError::Internal(format!("hash error: {e}")))
}

/// Checks `password` against a PHC hash string; the tag comparison inside
/// argon2 is constant-time.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Hash verified for unknown usernames so both failure paths cost the same.
fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hash_password("not-a-real-password").ok())
        .as_deref()
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == DUPLICATE_KEY
    )
}

pub async fn find_user(state: &AppState, username: &str) -> Result<Option<User>> {
    state
        .users
        .find_one(doc! { "username": username })
        .await
        .map_err(Into::into)
}

pub async fn register_user(state: &AppState, username: &str, password: &str) -> Result<ObjectId> {
    let username = username.trim();
    if username.is_empty() {
        return Err(LedgerError::invalid("username is required"));
    }
    if password.is_empty() {
        return Err(LedgerError::invalid("password is required"));
    }
    if find_user(state, username).await?.is_some() {
        return Err(LedgerError::invalid("username already taken"));
    }

    let password_hash = hash_password(password)?;
    let res = state
        .users
        .insert_one(User {
            id: None,
            username: username.to_string(),
            password_hash,
            created_at: Some(DateTime::from_system_time(SystemTime::now())),
        })
        .await
        .map_err(|e| {
            if is_duplicate_key(&e) {
                LedgerError::invalid("username already taken")
            } else {
                e.into()
            }
        })?;
    info!(username, "registered user");
    res.inserted_id
        .as_object_id()
        .ok_or_else(|| LedgerError::StorageUnavailable("user insert missing _id".into()))
}

/// True only when the user exists and the password matches.
pub async fn verify_credentials(state: &AppState, username: &str, password: &str) -> Result<bool> {
    match find_user(state, username.trim()).await? {
        Some(user) => Ok(verify_password(password, &user.password_hash)),
        None => {
            if let Some(hash) = dummy_hash() {
                let _ = verify_password(password, hash);
            }
            Ok(false)
        }
    }
}

pub async fn authenticate(state: &AppState, username: &str, password: &str) -> Result<()> {
    if verify_credentials(state, username, password).await? {
        Ok(())
    } else {
        warn!("login rejected");
        Err(LedgerError::AuthenticationFailed)
    }
}

pub async fn create_session(state: &AppState, username: &str) -> Result<String> {
    let _ = state
        .sessions
        .delete_many(doc! { "username": username })
        .await;

    let mut token_bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut token_bytes);
    let token = BASE32_NOPAD.encode(&token_bytes);

    let expires_at = DateTime::from_system_time(
        SystemTime::now() + Duration::from_secs(state.session_ttl_seconds),
    );

    state
        .sessions
        .insert_one(Session {
            id: None,
            token: token.clone(),
            username: username.to_string(),
            expires_at,
        })
        .await?;

    Ok(token)
}

pub async fn find_user_by_session(state: &AppState, token: &str) -> Result<Option<User>> {
    if let Some(session) = state.sessions.find_one(doc! { "token": token }).await? {
        let expires_at = session.expires_at.to_system_time();
        if expires_at <= SystemTime::now() {
            // Remove expired session, ignore result
            let _ = state.sessions.delete_one(doc! { "token": token }).await;
            return Ok(None);
        }
        find_user(state, &session.username).await
    } else {
        Ok(None)
    }
}

pub async fn delete_session(state: &AppState, token: &str) -> Result<()> {
    state.sessions.delete_one(doc! { "token": token }).await?;
    Ok(())
}
