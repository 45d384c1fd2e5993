// ABOUTME: SQLite-backed durable storage for credentials and the OAuth token
// ABOUTME: Pure storage; each record lives under a fixed logical key
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # Database Management
//!
//! Durable storage for the two singleton records the application owns: the
//! Fitbit client credentials and the OAuth token. Both are keyed by a fixed
//! logical name, so multi-account support later is a pure widening of the
//! key space.

mod settings;
mod tokens;

use crate::errors::{AppError, AppResult};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite, SqlitePool};

/// Database handle for credential and token storage
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open (creating if necessary) the database and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub async fn new(database_url: &str) -> AppResult<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_string =
            if database_url.starts_with("sqlite:") && !database_url.contains(":memory:") {
                format!("{database_url}?mode=rwc")
            } else {
                database_url.to_string()
            };

        let pool = if database_url.contains(":memory:") {
            // An in-memory SQLite database exists per connection; the pool
            // must hold exactly one connection and keep it alive.
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(&connection_string)
                .await
        } else {
            SqlitePool::connect(&connection_string).await
        }
        .map_err(|e| AppError::persistence(format!("failed to open database: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Run database migrations
    async fn migrate(&self) -> AppResult<()> {
        self.migrate_settings().await?;
        self.migrate_tokens().await?;
        Ok(())
    }
}
