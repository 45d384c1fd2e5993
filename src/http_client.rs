// ABOUTME: Outbound HTTP client construction with timeout configuration
// ABOUTME: All Fitbit traffic flows through one pooled reqwest client per server
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Outbound HTTP client utilities.

use crate::config::HttpClientConfig;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Build the pooled HTTP client used for all outbound Fitbit traffic.
///
/// Every remote call made through this client carries a bounded request and
/// connect timeout, so a hung upstream surfaces as a retryable failure
/// instead of stalling the request handler.
#[must_use]
pub fn build_client(config: &HttpClientConfig) -> Client {
    ClientBuilder::new()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .build()
        .unwrap_or_else(|_| Client::new())
}
