// ABOUTME: Fitbit OAuth routes for consent redirect, callback, and profile passthrough
// ABOUTME: The callback is the only place an authorization code enters the system
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Fitbit authorization routes.

use crate::errors::AppResult;
use crate::server::ServerContext;
use axum::extract::{Query, State};
use axum::response::{Json, Redirect};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

/// Query parameters Fitbit appends to the callback redirect
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: String,
    state: String,
}

/// Routes for the Fitbit authorization flow
pub fn router() -> Router<ServerContext> {
    Router::new()
        .route("/fitbit/auth", get(auth_handler))
        .route("/fitbit/callback", get(callback_handler))
        .route("/fitbit/profile", get(profile_handler))
}

/// Send the user to the Fitbit consent page
async fn auth_handler(State(context): State<ServerContext>) -> AppResult<Redirect> {
    let url = context.flow.authorization_url().await?;
    Ok(Redirect::temporary(&url))
}

/// Complete the authorization-code exchange and return home
async fn callback_handler(
    State(context): State<ServerContext>,
    Query(params): Query<CallbackParams>,
) -> AppResult<Redirect> {
    context
        .flow
        .complete_authorization(&params.code, &params.state)
        .await?;

    Ok(Redirect::temporary("/"))
}

/// Authorized passthrough of the provider's profile resource
async fn profile_handler(
    State(context): State<ServerContext>,
) -> AppResult<Json<serde_json::Value>> {
    let profile = context.fitbit.profile().await?;
    Ok(Json(profile))
}
