// ABOUTME: Environment-driven server configuration with Fitbit endpoint settings
// ABOUTME: Every knob has a production default so a bare environment still boots
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Server configuration loaded from environment variables.

use crate::errors::{AppError, AppResult};
use std::env;

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port the HTTP server listens on
    pub http_port: u16,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Fitbit API endpoints and redirect target
    pub fitbit: FitbitApiConfig,
    /// Outbound HTTP client behavior
    pub http: HttpClientConfig,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL
    pub url: String,
}

/// Fitbit API endpoint configuration
#[derive(Debug, Clone)]
pub struct FitbitApiConfig {
    /// Fitbit API base URL
    pub base_url: String,
    /// Fitbit authorization (consent) URL
    pub auth_url: String,
    /// Fitbit token endpoint URL
    pub token_url: String,
    /// Redirect URI registered with the Fitbit application
    pub redirect_uri: String,
}

/// Outbound HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Connection establishment timeout in seconds
    pub connect_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults suitable for local development.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable is present but unparseable.
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            http_port: env_var_parsed("HTTP_PORT", 8080)?,
            database: DatabaseConfig {
                url: env_var_or("DATABASE_URL", "sqlite:stepgoals.db"),
            },
            fitbit: FitbitApiConfig {
                base_url: env_var_or("FITBIT_API_BASE", "https://api.fitbit.com"),
                auth_url: env_var_or(
                    "FITBIT_AUTH_URL",
                    "https://www.fitbit.com/oauth2/authorize",
                ),
                token_url: env_var_or("FITBIT_TOKEN_URL", "https://api.fitbit.com/oauth2/token"),
                redirect_uri: env_var_or(
                    "FITBIT_REDIRECT_URI",
                    "http://localhost:8080/fitbit/callback",
                ),
            },
            http: HttpClientConfig {
                request_timeout_secs: env_var_parsed("HTTP_REQUEST_TIMEOUT_SECS", 30)?,
                connect_timeout_secs: env_var_parsed("HTTP_CONNECT_TIMEOUT_SECS", 10)?,
            },
        })
    }

    /// One-line summary for startup logging
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "http_port={} database={} fitbit_api={}",
            self.http_port, self.database.url, self.fitbit.base_url
        )
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_var_parsed<T: std::str::FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::invalid_input(format!("{key} is not a valid value: {raw}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults_apply_on_empty_environment() {
        env::remove_var("HTTP_PORT");
        env::remove_var("FITBIT_API_BASE");

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.fitbit.base_url, "https://api.fitbit.com");
        assert_eq!(
            config.fitbit.token_url,
            "https://api.fitbit.com/oauth2/token"
        );
    }

    #[test]
    #[serial]
    fn environment_overrides_defaults() {
        env::set_var("HTTP_PORT", "9999");
        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.http_port, 9999);
        env::remove_var("HTTP_PORT");
    }

    #[test]
    #[serial]
    fn invalid_port_is_rejected() {
        env::set_var("HTTP_PORT", "not-a-port");
        let result = ServerConfig::from_env();
        assert!(result.is_err());
        env::remove_var("HTTP_PORT");
    }
}
