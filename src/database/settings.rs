// ABOUTME: Credential storage operations for the singleton settings record
// ABOUTME: Stored under the fixed key "main"; the core never writes it
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::Credentials;
use chrono::Utc;
use sqlx::Row;

/// Fixed logical key of the singleton settings record
const SETTINGS_KEY: &str = "main";

impl Database {
    /// Create the `settings` table
    pub(super) async fn migrate_settings(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                client_id TEXT NOT NULL,
                client_secret TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::persistence(format!("failed to migrate settings: {e}")))?;

        Ok(())
    }

    /// Overwrite the stored application credentials
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn put_credentials(&self, credentials: &Credentials) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO settings (key, client_id, client_secret, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (key) DO UPDATE SET
                client_id = excluded.client_id,
                client_secret = excluded.client_secret,
                updated_at = excluded.updated_at
            ",
        )
        .bind(SETTINGS_KEY)
        .bind(&credentials.client_id)
        .bind(&credentials.client_secret)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::persistence(format!("failed to store credentials: {e}")))?;

        Ok(())
    }

    /// Read the stored application credentials, `None` if never set
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_credentials(&self) -> AppResult<Option<Credentials>> {
        let row = sqlx::query("SELECT client_id, client_secret FROM settings WHERE key = $1")
            .bind(SETTINGS_KEY)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::persistence(format!("failed to query credentials: {e}")))?;

        Ok(row.map(|row| Credentials {
            client_id: row.get("client_id"),
            client_secret: row.get("client_secret"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn credentials_round_trip() {
        let db = Database::new("sqlite::memory:").await.unwrap();

        assert_eq!(db.get_credentials().await.unwrap(), None);

        let credentials = Credentials {
            client_id: "abc".into(),
            client_secret: "xyz".into(),
        };
        db.put_credentials(&credentials).await.unwrap();

        assert_eq!(db.get_credentials().await.unwrap(), Some(credentials));
    }

    #[tokio::test]
    async fn put_overwrites_previous_credentials() {
        let db = Database::new("sqlite::memory:").await.unwrap();

        db.put_credentials(&Credentials {
            client_id: "first".into(),
            client_secret: "one".into(),
        })
        .await
        .unwrap();

        let replacement = Credentials {
            client_id: "second".into(),
            client_secret: "two".into(),
        };
        db.put_credentials(&replacement).await.unwrap();

        assert_eq!(db.get_credentials().await.unwrap(), Some(replacement));
    }
}
