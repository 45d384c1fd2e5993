// ABOUTME: Drives the two-leg authorization-code flow against Fitbit
// ABOUTME: Consent URL with CSRF state, then one-shot code exchange and persistence
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Authorization-code flow orchestration.
//!
//! Produces the consent redirect URL and converts the returned authorization
//! code into a persisted token. State nonces guard the callback against
//! cross-site forgery; each is single-use and expires after ten minutes.

use crate::config::FitbitApiConfig;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::OAuthToken;
use crate::oauth2_client::{OAuth2Client, OAuth2Config};
use crate::token_source::TokenSource;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// How long a pending consent state stays valid
const STATE_TTL_MINUTES: i64 = 10;

/// Orchestrates the authorization-code grant for the single stored identity
pub struct OAuthFlow {
    database: Arc<Database>,
    tokens: Arc<dyn TokenSource>,
    fitbit: FitbitApiConfig,
    http: reqwest::Client,
    pending_states: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl OAuthFlow {
    /// Create a flow over the given store, token sink, and endpoints
    #[must_use]
    pub fn new(
        database: Arc<Database>,
        tokens: Arc<dyn TokenSource>,
        fitbit: FitbitApiConfig,
        http: reqwest::Client,
    ) -> Self {
        Self {
            database,
            tokens,
            fitbit,
            http,
            pending_states: RwLock::new(HashMap::new()),
        }
    }

    /// Build the consent URL the user is redirected to, registering a fresh
    /// state nonce for the callback
    ///
    /// # Errors
    ///
    /// Returns `ConfigMissing` when no credentials are stored.
    pub async fn authorization_url(&self) -> AppResult<String> {
        let client = self.oauth_client().await?;

        let state = Uuid::new_v4().to_string();
        self.store_state(&state).await;

        client.authorization_url(&state)
    }

    /// Complete the flow: validate the state, exchange the code, persist the
    /// token. One-shot; authorization codes are single-use.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an unknown or expired state,
    /// `ExchangeFailed` with the provider payload when the code is rejected,
    /// and `PersistenceError` if the token cannot be stored.
    pub async fn complete_authorization(&self, code: &str, state: &str) -> AppResult<OAuthToken> {
        self.consume_state(state).await?;

        let client = self.oauth_client().await?;
        let token = client.exchange_code(code).await?;
        let token = self.tokens.accept(token).await?;

        info!("authorization completed, token persisted");
        Ok(token)
    }

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

    async fn store_state(&self, state: &str) {
        let now = Utc::now();
        let mut pending = self.pending_states.write().await;
        pending.insert(
            state.to_string(),
            now + Duration::minutes(STATE_TTL_MINUTES),
        );
        // Drop abandoned consents while we hold the lock anyway
        pending.retain(|_, expires_at| *expires_at > now);
    }

    async fn consume_state(&self, state: &str) -> AppResult<()> {
        let mut pending = self.pending_states.write().await;

        let expires_at = pending
            .remove(state)
            .ok_or_else(|| AppError::invalid_input("unknown authorization state"))?;

        if expires_at < Utc::now() {
            return Err(AppError::invalid_input("authorization state expired"));
        }

        Ok(())
    }
}
