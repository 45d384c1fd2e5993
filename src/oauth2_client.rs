// ABOUTME: OAuth2 client for the Fitbit authorization-code grant
// ABOUTME: Builds consent URLs and performs code exchange and token refresh
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! `OAuth2` client for the Fitbit authorization-code grant.
//!
//! The consent URL requests offline access so the provider issues a refresh
//! token alongside the access token. Exchange is one-shot by design:
//! authorization codes are single-use and expire quickly, so a failed
//! exchange is surfaced rather than retried.

use crate::config::FitbitApiConfig;
use crate::errors::{AppError, AppResult};
use crate::models::{Credentials, OAuthToken};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use url::Url;

/// Scopes requested from Fitbit
pub const FITBIT_SCOPES: &[&str] = &["activity", "weight", "profile"];

/// Static configuration for one `OAuth2` client application
#[derive(Debug, Clone)]
pub struct OAuth2Config {
    /// Client id issued by the provider
    pub client_id: String,
    /// Client secret issued by the provider
    pub client_secret: String,
    /// Authorization (consent) endpoint
    pub auth_url: String,
    /// Token endpoint
    pub token_url: String,
    /// Redirect URI registered with the provider
    pub redirect_uri: String,
    /// Scopes to request
    pub scopes: Vec<String>,
}

impl OAuth2Config {
    /// Assemble a Fitbit client configuration from stored credentials and
    /// the configured endpoints
    #[must_use]
    pub fn for_fitbit(credentials: &Credentials, api: &FitbitApiConfig) -> Self {
        Self {
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            auth_url: api.auth_url.clone(),
            token_url: api.token_url.clone(),
            redirect_uri: api.redirect_uri.clone(),
            scopes: FITBIT_SCOPES.iter().map(ToString::to_string).collect(),
        }
    }
}

/// `OAuth2` client bound to one provider configuration
pub struct OAuth2Client {
    config: OAuth2Config,
    client: reqwest::Client,
}

impl OAuth2Client {
    /// Create a new client sharing the given HTTP connection pool
    #[must_use]
    pub fn new(config: OAuth2Config, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// Build the consent URL the user is redirected to.
    ///
    /// Deterministic, no network call. Requests offline access so a refresh
    /// token is issued with the first exchange.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured authorization URL is malformed.
    pub fn authorization_url(&self, state: &str) -> AppResult<String> {
        let mut url = Url::parse(&self.config.auth_url)
            .map_err(|e| AppError::internal(format!("invalid auth URL: {e}")))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("access_type", "offline")
            .append_pair("state", state);

        Ok(url.to_string())
    }

    /// Exchange an authorization code for a token. One-shot, no retry.
    ///
    /// # Errors
    ///
    /// Returns `ExchangeFailed` with the provider's error payload when the
    /// provider rejects the code, `TransientError` on transport failure, and
    /// `DecodeError` when the response body is not a token.
    pub async fn exchange_code(&self, code: &str) -> AppResult<OAuthToken> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let payload = response.text().await.unwrap_or_default();
            return Err(AppError::exchange_failed(format!(
                "provider returned {status}: {payload}"
            )));
        }

        let payload: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::decode(format!("malformed token response: {e}")))?;

        token_from_response(payload, None)
    }

    /// Obtain a fresh token using the stored refresh token.
    ///
    /// # Errors
    ///
    /// Returns `ReauthorizationRequired` when the provider rejects the
    /// refresh token (revoked or expired), `TransientError` on transport
    /// failure or upstream outage, and `DecodeError` on an unexpected body.
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<OAuthToken> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_client_error() {
            let payload = response.text().await.unwrap_or_default();
            return Err(AppError::reauthorization_required(format!(
                "provider rejected refresh: {status}: {payload}"
            )));
        }
        if !status.is_success() {
            return Err(AppError::transient(format!(
                "token endpoint returned {status}"
            )));
        }

        let payload: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::decode(format!("malformed token response: {e}")))?;

        // Some providers rotate the refresh token on every refresh, others
        // return only a new access token; keep the old one in that case.
        token_from_response(payload, Some(refresh_token))
    }
}

/// Wire format of the provider's token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    token_type: String,
    expires_in: i64,
    refresh_token: Option<String>,
}

fn token_from_response(
    response: TokenResponse,
    previous_refresh: Option<&str>,
) -> AppResult<OAuthToken> {
    let refresh_token = response
        .refresh_token
        .or_else(|| previous_refresh.map(ToOwned::to_owned))
        .ok_or_else(|| AppError::decode("token response carried no refresh token"))?;

    // Whole-second expiry; the durable store round-trips Unix timestamps
    let expires_at = DateTime::from_timestamp(Utc::now().timestamp() + response.expires_in, 0)
        .ok_or_else(|| {
            AppError::decode(format!("implausible expires_in: {}", response.expires_in))
        })?;

    Ok(OAuthToken {
        access_token: response.access_token,
        refresh_token,
        token_type: response.token_type,
        expires_at,
    })
}

fn transport_error(e: reqwest::Error) -> AppError {
    let message = if e.is_timeout() {
        "token endpoint timed out"
    } else {
        "token endpoint unreachable"
    };
    AppError::transient(message).with_source(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> OAuth2Client {
        let config = OAuth2Config::for_fitbit(
            &Credentials {
                client_id: "abc".into(),
                client_secret: "xyz".into(),
            },
            &FitbitApiConfig {
                base_url: "https://api.fitbit.com".into(),
                auth_url: "https://www.fitbit.com/oauth2/authorize".into(),
                token_url: "https://api.fitbit.com/oauth2/token".into(),
                redirect_uri: "http://localhost:8080/fitbit/callback".into(),
            },
        );
        OAuth2Client::new(config, reqwest::Client::new())
    }

    #[test]
    fn authorization_url_carries_client_scopes_and_offline_access() {
        let url = test_client().authorization_url("state-1").unwrap();

        assert!(url.starts_with("https://www.fitbit.com/oauth2/authorize?"));
        assert!(url.contains("client_id=abc"));
        assert!(url.contains("response_type=code"));
        assert!(
            url.contains("scope=activity+weight+profile")
                || url.contains("scope=activity%20weight%20profile")
        );
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("state=state-1"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Ffitbit%2Fcallback"));
    }

    #[test]
    fn authorization_url_is_deterministic() {
        let client = test_client();
        assert_eq!(
            client.authorization_url("s").unwrap(),
            client.authorization_url("s").unwrap()
        );
    }

    #[test]
    fn refresh_token_is_kept_when_provider_does_not_rotate() {
        let response = TokenResponse {
            access_token: "A2".into(),
            token_type: "Bearer".into(),
            expires_in: 3600,
            refresh_token: None,
        };

        let token = token_from_response(response, Some("R1")).unwrap();
        assert_eq!(token.refresh_token, "R1");
        assert_eq!(token.access_token, "A2");
    }

    #[test]
    fn exchange_response_without_refresh_token_is_rejected() {
        let response = TokenResponse {
            access_token: "A1".into(),
            token_type: "Bearer".into(),
            expires_in: 3600,
            refresh_token: None,
        };

        let err = token_from_response(response, None).unwrap_err();
        assert_eq!(err.code, crate::errors::ErrorCode::DecodeError);
    }
}
