// ABOUTME: Daily step goals API route
// ABOUTME: Serves the cached snapshot produced by the goals service
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Step goals API route.

use crate::errors::AppResult;
use crate::models::DailyStepGoals;
use crate::server::ServerContext;
use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;

/// Response body of `/api/goals`
#[derive(Debug, Serialize)]
pub struct GoalsResponse {
    /// Step progress for today
    pub steps: DailyStepGoals,
}

/// Routes serving derived goal metrics
pub fn router() -> Router<ServerContext> {
    Router::new().route("/api/goals", get(goals_handler))
}

async fn goals_handler(State(context): State<ServerContext>) -> AppResult<Json<GoalsResponse>> {
    let steps = context.goals.daily_step_goals().await?;
    Ok(Json(GoalsResponse { steps }))
}
