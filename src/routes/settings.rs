// ABOUTME: Admin settings form for the Fitbit application credentials
// ABOUTME: GET renders the stored values, POST overwrites the singleton record
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Admin settings routes.

use crate::errors::AppResult;
use crate::models::Credentials;
use crate::server::ServerContext;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;
use tracing::info;

/// Fields posted by the settings form
#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    fitbit_client_id: String,
    fitbit_client_secret: String,
}

/// Routes for reading and writing the application credentials
pub fn router() -> Router<ServerContext> {
    Router::new().route("/admin/settings", get(show_handler).post(update_handler))
}

async fn show_handler(State(context): State<ServerContext>) -> AppResult<Html<String>> {
    let credentials = context.database.get_credentials().await?;
    Ok(Html(render_form(credentials.as_ref())))
}

async fn update_handler(
    State(context): State<ServerContext>,
    Form(form): Form<SettingsForm>,
) -> AppResult<Html<String>> {
    let credentials = Credentials {
        client_id: form.fitbit_client_id,
        client_secret: form.fitbit_client_secret,
    };

    context.database.put_credentials(&credentials).await?;
    info!("application credentials updated");

    Ok(Html(render_form(Some(&credentials))))
}

fn render_form(credentials: Option<&Credentials>) -> String {
    let client_id = credentials.map_or("", |c| c.client_id.as_str());
    let client_secret = credentials.map_or("", |c| c.client_secret.as_str());

    format!(
        r#"<html>
	<body>
		<form action="/admin/settings" method="post">
			<div><input value="{id}" name="fitbit_client_id" placeholder="Fitbit Client ID"></div>
			<div><input value="{secret}" name="fitbit_client_secret" placeholder="Fitbit Client Secret"></div>
			<div><input type="submit" value="Update"></div>
		</form>
	</body>
</html>
"#,
        id = html_escape::encode_double_quoted_attribute(client_id),
        secret = html_escape::encode_double_quoted_attribute(client_secret),
    )
}
