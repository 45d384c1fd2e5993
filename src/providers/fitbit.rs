// ABOUTME: Fitbit Web API client for activity summaries and profile data
// ABOUTME: Authorized through a TokenSource; never touches token storage itself
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Fitbit Web API client.
//!
//! Issues authorized requests against the Fitbit REST API. Authorization is
//! delegated entirely to the [`TokenSource`], so refreshes (and their
//! persistence) happen transparently underneath every call.
//!
//! # API Documentation
//! - [Fitbit Web API](https://dev.fitbit.com/build/reference/web-api/)

use crate::errors::{AppError, AppResult};
use crate::token_source::TokenSource;
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Fitbit Web API client authorized by a [`TokenSource`]
#[derive(Clone)]
pub struct FitbitClient {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl FitbitClient {
    /// Create a client for the given API base URL
    pub fn new(
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenSource>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            tokens,
        }
    }

    /// Fetch the activity summary for one calendar date.
    ///
    /// The resource path uses zero-padded ISO dates (`2024-01-05`); Fitbit
    /// rejects unpadded single-digit months and days.
    ///
    /// # Errors
    ///
    /// Propagates token source failures, returns `TransientError` on
    /// transport or upstream failure, `ReauthorizationRequired` when the
    /// access token is rejected, and `DecodeError` on an unexpected body.
    pub async fn daily_activity(&self, date: NaiveDate) -> AppResult<DailyActivity> {
        let url = activity_resource(&self.base_url, date);
        debug!(%url, "fetching daily activity summary");

        let response = self.get_authorized(&url).await?;
        response
            .json()
            .await
            .map_err(|e| AppError::decode(format!("malformed activity summary: {e}")))
    }

    /// Fetch the user's profile document as raw JSON
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::daily_activity`].
    pub async fn profile(&self) -> AppResult<serde_json::Value> {
        let url = format!("{}/1/user/-/profile.json", self.base_url);

        let response = self.get_authorized(&url).await?;
        response
            .json()
            .await
            .map_err(|e| AppError::decode(format!("malformed profile document: {e}")))
    }

    async fn get_authorized(&self, url: &str) -> AppResult<reqwest::Response> {
        let token = self.tokens.token().await?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    "fitbit API timed out"
                } else {
                    "fitbit API unreachable"
                };
                AppError::transient(message).with_source(e)
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::reauthorization_required(
                "fitbit rejected the access token",
            ));
        }
        if !status.is_success() {
            return Err(AppError::transient(format!("fitbit API returned {status}")));
        }

        Ok(response)
    }
}

fn activity_resource(base_url: &str, date: NaiveDate) -> String {
    format!(
        "{base_url}/1/user/-/activities/date/{}.json",
        date.format("%Y-%m-%d")
    )
}

/// Subset of the Fitbit daily activity document this service consumes
#[derive(Debug, Clone, Deserialize)]
pub struct DailyActivity {
    /// Totals recorded so far today
    pub summary: ActivitySummary,
    /// The user's configured daily goals
    pub goals: ActivityGoals,
}

/// `summary` section of the daily activity document
#[derive(Debug, Clone, Deserialize)]
pub struct ActivitySummary {
    /// Steps recorded so far
    pub steps: u32,
}

/// `goals` section of the daily activity document
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityGoals {
    /// Daily step goal
    pub steps: u32,
}
