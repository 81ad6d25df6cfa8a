//! HTTP handlers for the SAML surface.

pub mod artifact;
pub mod ecp;
pub mod metadata;
pub mod password;
pub mod query;
pub mod slo;
pub mod sso;

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::header::HeaderMap;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use idp_saml::SamlError;
use tracing::error;

/// Maps an engine error to a plain-text HTTP response.
///
/// Nothing is retried, and internals beyond the error's own message are not
/// surfaced.
pub(crate) fn error_response(err: &SamlError) -> Response {
    error!(error = %err, "request failed");
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, err.to_string()).into_response()
}

/// Decodes a query string into its last-one-wins parameter map.
pub(crate) fn parse_query(raw_query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(raw_query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Best-effort client IP for the assertion's subject locality.
pub(crate) fn client_ip(
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(first) = value.split(',').next() {
                return first.trim().to_string();
            }
        }
    }
    connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default()
}
