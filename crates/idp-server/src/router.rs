//! Route table.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::config::IdpConfig;
use crate::handlers::{artifact, ecp, metadata, password, query, slo, sso};
use crate::state::{IdpState, LOGIN_PAGE_PATH};

/// Builds the router over the configured paths.
pub fn build_router(config: &IdpConfig, state: IdpState) -> Router {
    Router::new()
        .route(&config.metadata_path, get(metadata::idp_metadata))
        .route(&config.sso_service_path, get(sso::redirect_sso))
        .route(&config.slo_service_path, get(slo::redirect_slo))
        .route(&config.ecp_service_path, post(ecp::ecp_sso))
        .route(&config.artifact_service_path, post(artifact::artifact_resolve))
        .route(&config.attribute_service_path, post(query::attribute_query))
        .route(
            LOGIN_PAGE_PATH,
            get(login_page).post(password::password_login),
        )
        .route("/idp/static/*path", get(static_asset))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct LoginPageParams {
    #[serde(rename = "requestId", default)]
    request_id: String,
    #[serde(default)]
    error: String,
}

/// The built-in login page.
///
/// Deployments usually front this with their own UI assets; this page keeps
/// the password flow usable out of the box.
async fn login_page(
    State(_state): State<IdpState>,
    Query(params): Query<LoginPageParams>,
) -> Response {
    let error_banner = if params.error.is_empty() {
        String::new()
    } else {
        format!("<p class=\"error\">{}</p>", html_escape(&params.error))
    };
    let page = format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>Sign in</title>
<style>body{{font-family:sans-serif;max-width:22em;margin:4em auto}}.error{{color:#b00}}</style>
</head>
<body>
<h1>Sign in</h1>
{error_banner}<form method="post" action="{action}">
<input type="hidden" name="requestId" value="{request_id}"/>
<label>Username <input name="username" autocomplete="username"/></label><br/>
<label>Password <input name="password" type="password" autocomplete="current-password"/></label><br/>
<input type="submit" value="Sign in"/>
</form>
</body>
</html>"#,
        error_banner = error_banner,
        action = LOGIN_PAGE_PATH,
        request_id = html_escape(&params.request_id),
    );
    Html(page).into_response()
}

/// Placeholder for delegated UI assets.
async fn static_asset() -> Response {
    (StatusCode::NOT_FOUND, "no such asset").into_response()
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
