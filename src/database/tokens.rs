// ABOUTME: OAuth token storage operations for the singleton token record
// ABOUTME: Wholesale replacement on every write, last writer wins
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::OAuthToken;
use chrono::{DateTime, Utc};
use sqlx::Row;

/// Fixed logical key of the singleton token record
const TOKEN_KEY: &str = "fitbit";

impl Database {
    /// Create the `tokens` table
    pub(super) async fn migrate_tokens(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS tokens (
                key TEXT PRIMARY KEY,
                access_token TEXT NOT NULL,
                refresh_token TEXT NOT NULL,
                token_type TEXT NOT NULL DEFAULT 'Bearer',
                expires_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::persistence(format!("failed to migrate tokens: {e}")))?;

        Ok(())
    }

    /// Overwrite the stored OAuth token.
    ///
    /// No versioning and no optimistic-concurrency check: concurrent
    /// refreshes both land here and the last writer wins, which is fine
    /// because every written token is a valid one.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn put_token(&self, token: &OAuthToken) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO tokens (key, access_token, refresh_token, token_type, expires_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (key) DO UPDATE SET
                access_token = excluded.access_token,
                refresh_token = excluded.refresh_token,
                token_type = excluded.token_type,
                expires_at = excluded.expires_at,
                updated_at = excluded.updated_at
            ",
        )
        .bind(TOKEN_KEY)
        .bind(&token.access_token)
        .bind(&token.refresh_token)
        .bind(&token.token_type)
        .bind(token.expires_at.timestamp())
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::persistence(format!("failed to store token: {e}")))?;

        Ok(())
    }

    /// Read the stored OAuth token, `None` if authorization never completed
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the stored expiry is
    /// corrupt.
    pub async fn get_token(&self) -> AppResult<Option<OAuthToken>> {
        let row = sqlx::query(
            r"
            SELECT access_token, refresh_token, token_type, expires_at
            FROM tokens WHERE key = $1
            ",
        )
        .bind(TOKEN_KEY)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::persistence(format!("failed to query token: {e}")))?;

        row.map(|row| {
            let expires_at: i64 = row.get("expires_at");
            Ok(OAuthToken {
                access_token: row.get("access_token"),
                refresh_token: row.get("refresh_token"),
                token_type: row.get("token_type"),
                expires_at: DateTime::from_timestamp(expires_at, 0).ok_or_else(|| {
                    AppError::internal(format!("invalid stored expiry: {expires_at}"))
                })?,
            })
        })
        .transpose()
    }
}
