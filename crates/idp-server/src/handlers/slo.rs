//! Single logout over HTTP-Redirect.

use axum::extract::{RawQuery, State};
use axum::http::header::{HeaderMap, CONTENT_SECURITY_POLICY, CONTENT_TYPE, LOCATION, SET_COOKIE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use idp_model::LogoutRequest;
use idp_saml::bindings::{decode_redirect_message, logout_post_page, LOGOUT_SCRIPT_CSP_HASH};
use idp_saml::types::{parse_logout_request, SamlBinding};
use idp_saml::{SamlError, SamlResult};
use tracing::info;

use crate::handlers::{error_response, parse_query};
use crate::session::{clear_session_cookie, delete_session};
use crate::state::IdpState;

/// GET handler for the SLO endpoint.
pub async fn redirect_slo(
    State(state): State<IdpState>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
) -> Response {
    match handle_slo(&state, raw_query.as_deref().unwrap_or_default(), &headers).await {
        Ok(response) => response,
        Err(e) => error_response(&e),
    }
}

async fn handle_slo(
    state: &IdpState,
    raw_query: &str,
    headers: &HeaderMap,
) -> SamlResult<Response> {
    let params = parse_query(raw_query);
    let encoded = params
        .get("SAMLRequest")
        .ok_or_else(|| SamlError::BadForm("SAMLRequest parameter required".to_string()))?;
    let xml = decode_redirect_message(encoded)?;
    let parsed = parse_logout_request(&xml)?;

    let request = validate_logout_request(state, &parsed)?;

    // The session dies regardless of which binding carries the answer.
    delete_session(state, headers).await;
    let cookie = clear_session_cookie(&state.cookie_name, state.secure_cookies);

    let binding = SamlBinding::from_uri(&request.protocol_binding)
        .ok_or_else(|| SamlError::UnsupportedBinding(request.protocol_binding.clone()))?;

    let mut response = match binding {
        SamlBinding::HttpPost => {
            let page = logout_post_page(
                &request.single_logout_service_url,
                request.logout_response.as_deref().unwrap_or_default(),
            );
            (
                StatusCode::OK,
                [
                    (CONTENT_TYPE, "text/html".to_string()),
                    (
                        CONTENT_SECURITY_POLICY,
                        format!(
                            "default-src; script-src '{LOGOUT_SCRIPT_CSP_HASH}'; \
                             reflected-xss block; referrer no-referrer;"
                        ),
                    ),
                ],
                page,
            )
                .into_response()
        }
        SamlBinding::HttpRedirect => (
            StatusCode::FOUND,
            [(LOCATION, request.single_logout_service_url.clone())],
        )
            .into_response(),
        _ => return Err(SamlError::UnsupportedBinding(request.protocol_binding)),
    };

    response.headers_mut().append(
        SET_COOKIE,
        cookie
            .parse()
            .map_err(|_| SamlError::Internal("unrenderable cookie".to_string()))?,
    );
    Ok(response)
}

fn validate_logout_request(
    state: &IdpState,
    parsed: &idp_saml::types::ParsedLogoutRequest,
) -> SamlResult<LogoutRequest> {
    if parsed.issuer.is_empty() {
        return Err(SamlError::MissingElement(
            "request does not contain an issuer".to_string(),
        ));
    }
    info!(issuer = %parsed.issuer, "received logout request");

    let sp = state
        .registry
        .lookup(&parsed.issuer)
        .ok_or_else(|| SamlError::UnknownIssuer(parsed.issuer.clone()))?;

    let slo = sp.select_slo(parsed.single_logout_service_url.as_deref())?;

    Ok(LogoutRequest {
        id: parsed.id.clone(),
        issuer: parsed.issuer.clone(),
        single_logout_service_url: slo.location.clone(),
        protocol_binding: parsed
            .protocol_binding
            .clone()
            .unwrap_or_else(|| slo.binding.clone()),
        name_id: parsed.name_id.clone(),
        not_on_or_after: parsed.not_on_or_after,
        logout_response: parsed.logout_response.clone(),
    })
}
