// ABOUTME: Token source that refreshes transparently and persists every refresh
// ABOUTME: A caller never receives a token the durable store does not hold
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Supplies a currently valid `OAuth2` token to the API client layer.
//!
//! The durable store is the single source of truth: every token produced by
//! a refresh (and every token accepted from the authorization-code exchange)
//! is written through to the store *before* it is returned, so a process
//! restart always resumes from the newest refresh token instead of silently
//! reverting to a stale, possibly revoked one.

use crate::config::FitbitApiConfig;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::OAuthToken;
use crate::oauth2_client::{OAuth2Client, OAuth2Config};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// A source of currently valid `OAuth2` tokens.
///
/// Two capabilities: produce a valid token (refreshing if needed) and accept
/// a freshly issued token for persistence.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Return a currently valid token, refreshing and persisting if the held
    /// one is expired
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` when no token is on file, `ConfigMissing`
    /// when a refresh is needed but no credentials are stored,
    /// `ReauthorizationRequired` when the provider rejects the refresh
    /// token, `TransientError` on transport failure, and
    /// `PersistenceError` when the refreshed token cannot be stored.
    async fn token(&self) -> AppResult<OAuthToken>;

    /// Persist a freshly issued token and adopt it as the current one
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` when the token cannot be stored; the
    /// token is not adopted in that case.
    async fn accept(&self, token: OAuthToken) -> AppResult<OAuthToken>;
}

/// [`TokenSource`] backed by the durable store and the Fitbit token endpoint.
///
/// The in-memory copy only short-circuits the store read while the token is
/// valid; it is never authoritative across restarts.
pub struct PersistingTokenSource {
    database: Arc<Database>,
    fitbit: FitbitApiConfig,
    http: reqwest::Client,
    current: RwLock<Option<OAuthToken>>,
}

impl PersistingTokenSource {
    /// Create a token source over the given store and endpoint configuration
    #[must_use]
    pub fn new(database: Arc<Database>, fitbit: FitbitApiConfig, http: reqwest::Client) -> Self {
        Self {
            database,
            fitbit,
            http,
            current: RwLock::new(None),
        }
    }

    /// Build an `OAuth2` client from the stored credentials
    async fn oauth_client(&self) -> AppResult<OAuth2Client> {
        let credentials = self
            .database
            .get_credentials()
            .await?
            .ok_or_else(AppError::config_missing)?;

        Ok(OAuth2Client::new(
            OAuth2Config::for_fitbit(&credentials, &self.fitbit),
            self.http.clone(),
        ))
    }
}

#[async_trait]
impl TokenSource for PersistingTokenSource {
    async fn token(&self) -> AppResult<OAuthToken> {
        // Fast path: held token still valid, no I/O at all.
        {
            let held = self.current.read().await;
            if let Some(token) = held.as_ref() {
                if !token.will_expire_soon() {
                    return Ok(token.clone());
                }
            }
        }

        let stale = match self.current.read().await.clone() {
            Some(token) => token,
            None => self
                .database
                .get_token()
                .await?
                .ok_or_else(AppError::not_authenticated)?,
        };

        if !stale.will_expire_soon() {
            // Loaded from the store and still valid; adopt it.
            let mut held = self.current.write().await;
            *held = Some(stale.clone());
            return Ok(stale);
        }

        // No refresh coordination: concurrent callers may both reach this
        // point and both refresh. Each result is persisted and the last
        // writer wins; every persisted token is a valid one.
        debug!("access token expired, refreshing");
        let client = self.oauth_client().await?;
        let refreshed = client.refresh_token(&stale.refresh_token).await?;

        // Persist before handing the token to anyone. If this write fails
        // the whole operation fails; a restart must never resurrect a
        // refresh token the provider has already rotated away.
        self.database.put_token(&refreshed).await?;

        {
            let mut held = self.current.write().await;
            *held = Some(refreshed.clone());
        }

        info!("access token refreshed and persisted");
        Ok(refreshed)
    }

    async fn accept(&self, token: OAuthToken) -> AppResult<OAuthToken> {
        self.database.put_token(&token).await?;

        {
            let mut held = self.current.write().await;
            *held = Some(token.clone());
        }

        Ok(token)
    }
}
