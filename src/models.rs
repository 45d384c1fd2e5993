// ABOUTME: Core domain types for credentials, OAuth tokens, and step goal snapshots
// ABOUTME: Exactly one logical instance of each stored record exists at any time
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Common data structures shared across the crate.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Fitbit application credentials, supplied by the operator through the
/// settings form. Read-only to everything except the settings routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// OAuth2 client id issued by Fitbit
    pub client_id: String,
    /// OAuth2 client secret issued by Fitbit
    pub client_secret: String,
}

/// An OAuth2 token as persisted in the durable store.
///
/// Expiry is kept at whole-second precision; the store round-trips it as a
/// Unix timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthToken {
    /// Bearer token presented to the Fitbit API
    pub access_token: String,
    /// Long-lived token used to obtain fresh access tokens
    pub refresh_token: String,
    /// Token type as reported by the provider, normally `Bearer`
    pub token_type: String,
    /// Instant at which the access token stops being accepted
    pub expires_at: DateTime<Utc>,
}

impl OAuthToken {
    /// Whether the access token should be refreshed before use.
    ///
    /// Applies a safety margin so a token is never handed out when it could
    /// expire mid-flight of the dependent API call.
    #[must_use]
    pub fn will_expire_soon(&self) -> bool {
        self.expires_at <= Utc::now() + Duration::minutes(5)
    }
}

/// Derived daily step metrics served to clients and held in the short-TTL
/// cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStepGoals {
    /// Steps recorded so far today
    pub current: u32,
    /// The user's configured daily step goal
    pub goal: u32,
}
