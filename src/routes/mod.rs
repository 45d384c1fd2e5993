// ABOUTME: Route module organization for the HTTP surface
// ABOUTME: Thin handlers only; all business logic lives in the service layers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! HTTP routes, organized by domain.
//!
//! Each module exposes a `router()` returning the routes for its domain;
//! handlers are thin wrappers that delegate to the core components and let
//! [`crate::errors::AppError`] render failures.

/// Fitbit authorization and profile routes
pub mod auth;
/// Daily step goals API route
pub mod goals;
/// Health check route
pub mod health;
/// Admin settings form routes
pub mod settings;
