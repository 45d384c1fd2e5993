// ABOUTME: Library entry point for the daily step goals backend
// ABOUTME: Fitbit OAuth2 token lifecycle management and cached goal metrics
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

#![deny(unsafe_code)]

//! # Step Goals Backend
//!
//! A small web backend that acts on behalf of one user against the Fitbit
//! Web API and serves derived daily step metrics to its own clients.
//!
//! ## Architecture
//!
//! - **`database`**: durable storage for the two singleton records, the
//!   application credentials and the `OAuth2` token
//! - **`oauth2_client`**: consent URL construction, authorization-code
//!   exchange, and token refresh against the Fitbit endpoints
//! - **`token_source`**: the token lifecycle core; hands out valid tokens
//!   and persists every refresh before a caller sees the result
//! - **`oauth_flow`**: the two-leg authorization-code flow with CSRF state
//! - **`providers`**: authorized Fitbit API client
//! - **`goals`** / **`cache`**: read-through daily goals with a 10 second
//!   time-to-live; failures are never cached
//! - **`routes`** / **`server`**: thin axum handlers over the core

/// In-memory TTL cache
pub mod cache;

/// Environment-driven configuration
pub mod config;

/// Durable credential and token storage
pub mod database;

/// Unified error handling
pub mod errors;

/// Daily step goals derivation
pub mod goals;

/// Shared outbound HTTP client
pub mod http_client;

/// Structured logging setup
pub mod logging;

/// Common data structures
pub mod models;

/// `OAuth2` client for the authorization-code grant
pub mod oauth2_client;

/// Authorization-code flow orchestration
pub mod oauth_flow;

/// Remote fitness provider clients
pub mod providers;

/// HTTP route handlers
pub mod routes;

/// Server assembly and serving
pub mod server;

/// Token lifecycle management
pub mod token_source;
