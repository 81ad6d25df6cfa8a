//! Password login form handler.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::header::{HeaderMap, LOCATION};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Form;
use idp_cache::CacheStore;
use idp_ldap::PasswordValidator;
use idp_model::{AuthnRequest, LoginType, User};
use idp_saml::types::{authn_contexts, name_id_formats};
use idp_saml::{SamlError, SamlResult};
use serde::Deserialize;
use tracing::{info, warn};

use crate::attributes::apply_attribute_sources;
use crate::audit::Auditor;
use crate::handlers::client_ip;
use crate::respond::respond;
use crate::state::{IdpState, LOGIN_PAGE_PATH};

/// Message shown on the login page after a failed attempt. Upstream
/// directory faults produce the same text so outages are not probeable.
const LOGIN_ERROR: &str = "invalid login or password. Please try again";

/// Fields posted by the login form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Key of the cached authentication request.
    #[serde(rename = "requestId")]
    pub request_id: String,
    /// Supplied username.
    pub username: String,
    /// Supplied password.
    pub password: String,
}

/// POST handler for the login form.
pub async fn password_login(
    State(state): State<IdpState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    match handle_login(&state, &form, &headers, connect_info.as_ref()).await {
        Ok(response) => response,
        Err(e) => {
            if !matches!(e, SamlError::InvalidPassword) {
                warn!(error = %e, "password login failed");
            }
            login_redirect(&form.request_id, LOGIN_ERROR)
        }
    }
}

async fn handle_login(
    state: &IdpState,
    form: &LoginForm,
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
) -> SamlResult<Response> {
    // Keep the blob until authentication succeeds so the user can retry a
    // mistyped password; it is deleted exactly once, below.
    let blob = state
        .temp_cache
        .get(&form.request_id)
        .await
        .map_err(|e| SamlError::Cache(e.to_string()))?
        .ok_or_else(|| SamlError::BadForm("unknown or expired login request".to_string()))?;
    let request: AuthnRequest =
        serde_json::from_slice(&blob).map_err(|e| SamlError::Internal(e.to_string()))?;

    let attributes = match state
        .password_validator
        .validate(&form.username, &form.password)
        .await
    {
        Ok(attributes) => attributes,
        Err(e) if e.is_transient() => {
            // Reported to the caller as a bad password on purpose.
            warn!(error = %e, "password validator upstream failure");
            return Err(SamlError::InvalidPassword);
        }
        Err(_) => {
            info!(username = %form.username, "invalid password");
            return Err(SamlError::InvalidPassword);
        }
    };

    let mut user = User {
        name: form.username.clone(),
        format: name_id_formats::UNSPECIFIED.to_string(),
        context: authn_contexts::PASSWORD_PROTECTED_TRANSPORT.to_string(),
        ip: client_ip(headers, connect_info),
        x509_certificate: None,
        attributes: Vec::new(),
    };
    user.append_attribute_map(attributes);
    apply_attribute_sources(&state.attribute_sources, &mut user, &request).await?;
    state.auditor.log_success(&user, &request, LoginType::Password);
    info!(name = %user.name, "successful password login");

    state
        .temp_cache
        .delete(&form.request_id)
        .await
        .map_err(|e| SamlError::Cache(e.to_string()))?;

    respond(state, &request, &user).await
}

/// 302 back to the login page with the error in the query string.
fn login_redirect(request_id: &str, error: &str) -> Response {
    (
        StatusCode::FOUND,
        [(
            LOCATION,
            format!(
                "{LOGIN_PAGE_PATH}?requestId={}&error={}",
                form_encode(request_id),
                form_encode(error)
            ),
        )],
    )
        .into_response()
}

/// Form-style query escaping: spaces become `+`, matching how the login
/// page's query parameters are decoded on the way back in.
fn form_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_encoding_uses_plus_for_spaces() {
        assert_eq!(
            form_encode(LOGIN_ERROR),
            "invalid+login+or+password.+Please+try+again"
        );
    }
}
