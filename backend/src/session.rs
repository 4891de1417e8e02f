//! Server-side sessions.
//!
//! The browser holds a random token in a cookie; the database holds only its
//! SHA-256 hash, the owning user and an expiry. Losing the table therefore
//! logs everybody out, but leaking it does not let anyone log in.

use base64::engine::{general_purpose, Engine as _};
use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::{db::DbPool, extractors::AuthUser};

#[derive(sqlx::FromRow)]
struct SessionRecord {
    user_id: i64,
    username: String,
    expires_at: chrono::NaiveDateTime,
}

/// Hex-encoded SHA-256 of a session token, the form stored in `sessions.token_hash`.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

fn generate_token() -> String {
    let mut token_bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut token_bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(token_bytes)
}

/// Starts a session for `user_id` and returns the plaintext token for the cookie.
///
/// Also sweeps every expired session, so abandoned ones don't accumulate.
pub async fn create(db_pool: &DbPool, user_id: i64, ttl: Duration) -> Result<String, sqlx::Error> {
    let now = Utc::now();
    let pruned = sqlx::query("DELETE FROM sessions WHERE expires_at < $1")
        .bind(now.naive_utc())
        .execute(db_pool)
        .await?
        .rows_affected();
    if pruned > 0 {
        tracing::debug!("Pruned {} expired sessions", pruned);
    }

    let token = generate_token();
    let expires_at = (now + ttl).naive_utc();

    sqlx::query("INSERT INTO sessions (user_id, token_hash, expires_at) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(hash_token(&token))
        .bind(expires_at)
        .execute(db_pool)
        .await?;

    tracing::debug!("Session created for user {}", user_id);
    Ok(token)
}

/// Looks up the user behind a session token. Unknown tokens resolve to `None`;
/// expired ones are deleted and resolve to `None`.
pub async fn resolve(db_pool: &DbPool, token: &str) -> Result<Option<AuthUser>, sqlx::Error> {
    let token_hash = hash_token(token);

    let record: Option<SessionRecord> = sqlx::query_as(
        "SELECT s.user_id, u.username, s.expires_at
         FROM sessions s JOIN users u ON u.id = s.user_id
         WHERE s.token_hash = $1",
    )
    .bind(&token_hash)
    .fetch_optional(db_pool)
    .await?;

    let Some(record) = record else {
        return Ok(None);
    };

    if record.expires_at < Utc::now().naive_utc() {
        tracing::debug!("Session for user {} expired", record.user_id);
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(&token_hash)
            .execute(db_pool)
            .await?;
        return Ok(None);
    }

    Ok(Some(AuthUser {
        id: record.user_id,
        username: record.username,
    }))
}

pub async fn destroy(db_pool: &DbPool, token: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
        .bind(hash_token(token))
        .execute(db_pool)
        .await?;
    Ok(())
}
