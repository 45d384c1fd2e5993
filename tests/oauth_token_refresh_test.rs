// ABOUTME: OAuth token lifecycle tests against an in-process stub provider
// ABOUTME: Covers exchange persistence, refresh persistence, and refresh rejection
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::uninlined_format_args
)]
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # OAuth Token Lifecycle Tests
//!
//! Every test runs against an in-process stub of the Fitbit token endpoint,
//! so the exchange and refresh wire behavior is exercised end to end without
//! leaving the machine.

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use axum::Router;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use stepgoals::config::FitbitApiConfig;
use stepgoals::database::Database;
use stepgoals::errors::ErrorCode;
use stepgoals::models::{Credentials, OAuthToken};
use stepgoals::oauth_flow::OAuthFlow;
use stepgoals::token_source::{PersistingTokenSource, TokenSource};
use tokio::sync::Mutex;

/// Scripted Fitbit token endpoint
struct StubProvider {
    token_requests: AtomicUsize,
    accept_refresh: AtomicBool,
    last_form: Mutex<Option<HashMap<String, String>>>,
}

impl StubProvider {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            token_requests: AtomicUsize::new(0),
            accept_refresh: AtomicBool::new(true),
            last_form: Mutex::new(None),
        })
    }
}

async fn token_endpoint(
    State(stub): State<Arc<StubProvider>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    stub.token_requests.fetch_add(1, Ordering::SeqCst);
    *stub.last_form.lock().await = Some(form.clone());

    match form.get("grant_type").map(String::as_str) {
        Some("authorization_code") => {
            if form.get("code").map(String::as_str) == Some("good-code") {
                Json(json!({
                    "access_token": "A1",
                    "refresh_token": "R1",
                    "token_type": "Bearer",
                    "expires_in": 3600,
                    "scope": "activity weight profile",
                    "user_id": "USER1"
                }))
                .into_response()
            } else {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "errors": [{"errorType": "invalid_grant", "message": "Authorization code invalid"}]
                    })),
                )
                    .into_response()
            }
        }
        Some("refresh_token") => {
            if stub.accept_refresh.load(Ordering::SeqCst) {
                Json(json!({
                    "access_token": "A2",
                    "refresh_token": "R2",
                    "token_type": "Bearer",
                    "expires_in": 3600
                }))
                .into_response()
            } else {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "errors": [{"errorType": "invalid_token", "message": "Refresh token invalid"}]
                    })),
                )
                    .into_response()
            }
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"errors": [{"errorType": "invalid_request"}]})),
        )
            .into_response(),
    }
}

async fn spawn_stub(stub: Arc<StubProvider>) -> String {
    let app = Router::new()
        .route("/oauth2/token", post(token_endpoint))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

fn fitbit_config(base: &str) -> FitbitApiConfig {
    FitbitApiConfig {
        base_url: base.to_string(),
        auth_url: format!("{base}/oauth2/authorize"),
        token_url: format!("{base}/oauth2/token"),
        redirect_uri: "http://localhost:8080/fitbit/callback".to_string(),
    }
}

fn token_with_expiry(access: &str, refresh: &str, offset_secs: i64) -> OAuthToken {
    OAuthToken {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        token_type: "Bearer".to_string(),
        expires_at: DateTime::from_timestamp(Utc::now().timestamp() + offset_secs, 0).unwrap(),
    }
}

async fn database_with_credentials() -> Arc<Database> {
    let db = Arc::new(Database::new("sqlite::memory:").await.unwrap());
    db.put_credentials(&Credentials {
        client_id: "abc".into(),
        client_secret: "xyz".into(),
    })
    .await
    .unwrap();
    db
}

fn flow_over(db: &Arc<Database>, config: &FitbitApiConfig) -> OAuthFlow {
    let http = reqwest::Client::new();
    let tokens = Arc::new(PersistingTokenSource::new(
        db.clone(),
        config.clone(),
        http.clone(),
    ));
    OAuthFlow::new(db.clone(), tokens, config.clone(), http)
}

fn state_from(consent_url: &str) -> String {
    url::Url::parse(consent_url)
        .unwrap()
        .query_pairs()
        .find(|(key, _)| key == "state")
        .map(|(_, value)| value.into_owned())
        .unwrap()
}

#[tokio::test]
async fn consent_url_lists_scopes_and_offline_access() {
    let db = database_with_credentials().await;
    let flow = flow_over(&db, &fitbit_config("http://localhost:1"));

    let consent_url = flow.authorization_url().await.unwrap();

    assert!(consent_url.contains("client_id=abc"));
    assert!(
        consent_url.contains("scope=activity+weight+profile")
            || consent_url.contains("scope=activity%20weight%20profile")
    );
    assert!(consent_url.contains("access_type=offline"));
    assert!(consent_url.contains("response_type=code"));
}

#[tokio::test]
async fn exchanging_good_code_persists_the_token() {
    let stub = StubProvider::new();
    let base = spawn_stub(stub.clone()).await;
    let db = database_with_credentials().await;
    let flow = flow_over(&db, &fitbit_config(&base));

    let state = state_from(&flow.authorization_url().await.unwrap());
    let token = flow.complete_authorization("good-code", &state).await.unwrap();

    assert_eq!(token.access_token, "A1");
    assert_eq!(token.refresh_token, "R1");
    // The returned token and the stored token are the same record
    assert_eq!(db.get_token().await.unwrap(), Some(token));
}

#[tokio::test]
async fn rejected_code_fails_once_and_persists_nothing() {
    let stub = StubProvider::new();
    let base = spawn_stub(stub.clone()).await;
    let db = database_with_credentials().await;
    let flow = flow_over(&db, &fitbit_config(&base));

    let state = state_from(&flow.authorization_url().await.unwrap());
    let err = flow
        .complete_authorization("expired-code", &state)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ExchangeFailed);
    // Codes are single-use: exactly one attempt, no retry
    assert_eq!(stub.token_requests.load(Ordering::SeqCst), 1);
    assert_eq!(db.get_token().await.unwrap(), None);
}

#[tokio::test]
async fn expired_token_is_refreshed_and_persisted_before_use() {
    let stub = StubProvider::new();
    let base = spawn_stub(stub.clone()).await;
    let db = database_with_credentials().await;
    db.put_token(&token_with_expiry("A1", "R1", -100)).await.unwrap();

    let source = PersistingTokenSource::new(
        db.clone(),
        fitbit_config(&base),
        reqwest::Client::new(),
    );

    let token = source.token().await.unwrap();
    assert_eq!(token.access_token, "A2");

    // The store holds the refreshed token, not the old one
    let stored = db.get_token().await.unwrap().unwrap();
    assert_eq!(stored.access_token, "A2");
    assert_eq!(stored.refresh_token, "R2");

    // The refresh carried the stored client credentials
    let form = stub.last_form.lock().await.clone().unwrap();
    assert_eq!(form.get("client_id").map(String::as_str), Some("abc"));
    assert_eq!(form.get("refresh_token").map(String::as_str), Some("R1"));
}

#[tokio::test]
async fn rejected_refresh_leaves_the_stored_token_untouched() {
    let stub = StubProvider::new();
    stub.accept_refresh.store(false, Ordering::SeqCst);
    let base = spawn_stub(stub.clone()).await;
    let db = database_with_credentials().await;

    let old = token_with_expiry("A1", "R1", -100);
    db.put_token(&old).await.unwrap();

    let source = PersistingTokenSource::new(
        db.clone(),
        fitbit_config(&base),
        reqwest::Client::new(),
    );

    let err = source.token().await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ReauthorizationRequired);

    // Nothing was persisted on the failure path
    assert_eq!(db.get_token().await.unwrap(), Some(old));
}

#[tokio::test]
async fn valid_token_is_served_with_zero_remote_calls() {
    let stub = StubProvider::new();
    let base = spawn_stub(stub.clone()).await;
    let db = database_with_credentials().await;
    let token = token_with_expiry("A1", "R1", 3600);
    db.put_token(&token).await.unwrap();

    let source = PersistingTokenSource::new(
        db.clone(),
        fitbit_config(&base),
        reqwest::Client::new(),
    );

    assert_eq!(source.token().await.unwrap(), token);
    assert_eq!(source.token().await.unwrap(), token);
    assert_eq!(stub.token_requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn persisted_token_survives_a_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("stepgoals.db").display());

    let token = token_with_expiry("A1", "R1", 3600);
    {
        let db = Database::new(&url).await.unwrap();
        db.put_token(&token).await.unwrap();
    }

    // A fresh handle over the same file sees the token, as after a restart
    let db = Database::new(&url).await.unwrap();
    assert_eq!(db.get_token().await.unwrap(), Some(token));
}

#[tokio::test]
async fn refresh_without_credentials_reports_missing_config() {
    let stub = StubProvider::new();
    let base = spawn_stub(stub.clone()).await;

    // Token on file, but the credentials record was never written
    let db = Arc::new(Database::new("sqlite::memory:").await.unwrap());
    db.put_token(&token_with_expiry("A1", "R1", -100)).await.unwrap();

    let source = PersistingTokenSource::new(
        db.clone(),
        fitbit_config(&base),
        reqwest::Client::new(),
    );

    let err = source.token().await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigMissing);
}
