// ABOUTME: Remote fitness provider clients
// ABOUTME: Currently Fitbit only; the token source is the seam for testing
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Remote fitness provider integrations.

/// Fitbit Web API client
pub mod fitbit;
