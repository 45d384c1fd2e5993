// ABOUTME: Wires core components into shared request state and an axum router
// ABOUTME: Every store handle is injected at construction; no ambient globals
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Server assembly: shared context, router construction, and serving.

use crate::cache::InMemoryCache;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::goals::GoalsService;
use crate::http_client;
use crate::oauth_flow::OAuthFlow;
use crate::providers::fitbit::FitbitClient;
use crate::routes;
use crate::token_source::PersistingTokenSource;
use anyhow::Result;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Bound on live cache entries; the goals snapshot needs exactly one
const CACHE_MAX_ENTRIES: usize = 16;

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct ServerContext {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Durable credential and token storage
    pub database: Arc<Database>,
    /// Authorization-code flow driver
    pub flow: Arc<OAuthFlow>,
    /// Authorized Fitbit API client
    pub fitbit: FitbitClient,
    /// Cached daily goals service
    pub goals: GoalsService,
}

impl ServerContext {
    /// Assemble the component graph over one database handle
    #[must_use]
    pub fn new(config: ServerConfig, database: Database) -> Self {
        let config = Arc::new(config);
        let database = Arc::new(database);
        let http = http_client::build_client(&config.http);

        let tokens = Arc::new(PersistingTokenSource::new(
            database.clone(),
            config.fitbit.clone(),
            http.clone(),
        ));
        let fitbit = FitbitClient::new(config.fitbit.base_url.clone(), tokens.clone(), http.clone());
        let flow = Arc::new(OAuthFlow::new(
            database.clone(),
            tokens,
            config.fitbit.clone(),
            http,
        ));
        let goals = GoalsService::new(fitbit.clone(), InMemoryCache::new(CACHE_MAX_ENTRIES));

        Self {
            config,
            database,
            flow,
            fitbit,
            goals,
        }
    }
}

/// Build the full application router
#[must_use]
pub fn router(context: ServerContext) -> Router {
    let request_timeout = Duration::from_secs(context.config.http.request_timeout_secs);

    Router::new()
        .route("/", get(index_handler))
        .merge(routes::auth::router())
        .merge(routes::goals::router())
        .merge(routes::settings::router())
        .merge(routes::health::router())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(context)
}

/// Bind and serve until a shutdown signal arrives
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve(context: ServerContext) -> Result<()> {
    let addr = format!("0.0.0.0:{}", context.config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {addr}");

    axum::serve(listener, router(context))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

// Handler signatures must be async for axum routing
#[allow(clippy::unused_async)]
async fn index_handler() -> &'static str {
    "Daily step goals service\n"
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
