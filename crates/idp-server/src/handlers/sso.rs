//! Single sign-on over HTTP-Redirect.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Extension, RawQuery, State};
use axum::http::header::HeaderMap;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use idp_cache::CacheStore;
use idp_model::{AuthnRequest, LoginType, User};
use idp_saml::bindings::decode_redirect_message;
use idp_saml::signature::verify_redirect_signature;
use idp_saml::types::{
    authn_contexts, name_id_formats, parse_authn_request, ParsedAuthnRequest,
};
use idp_saml::{SamlError, SamlResult};
use tracing::info;
use uuid::Uuid;

use crate::attributes::apply_attribute_sources;
use crate::audit::Auditor;
use crate::handlers::{client_ip, error_response, parse_query};
use crate::respond::respond;
use crate::session::user_from_session;
use crate::state::{ClientCert, IdpState, LOGIN_PAGE_PATH};

/// Longest RelayState the binding allows.
const MAX_RELAY_STATE: usize = 80;

/// GET handler for the SSO endpoint.
pub async fn redirect_sso(
    State(state): State<IdpState>,
    RawQuery(raw_query): RawQuery,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    client_cert: Option<Extension<ClientCert>>,
    headers: HeaderMap,
) -> Response {
    let raw_query = raw_query.unwrap_or_default();
    match handle_sso(
        &state,
        &raw_query,
        &headers,
        connect_info.as_ref(),
        client_cert.as_ref().map(|Extension(cert)| cert),
    )
    .await
    {
        Ok(response) => response,
        Err(e) => error_response(&e),
    }
}

async fn handle_sso(
    state: &IdpState,
    raw_query: &str,
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
    client_cert: Option<&ClientCert>,
) -> SamlResult<Response> {
    let params = parse_query(raw_query);

    let relay_state = params.get("RelayState").cloned().filter(|s| !s.is_empty());
    if relay_state.as_deref().is_some_and(|s| s.len() > MAX_RELAY_STATE) {
        return Err(SamlError::BadRelayState);
    }

    let encoded = params
        .get("SAMLRequest")
        .ok_or_else(|| SamlError::BadForm("SAMLRequest parameter required".to_string()))?;
    let xml = decode_redirect_message(encoded)?;
    let parsed = parse_authn_request(&xml)?;

    let request = validate_authn_request(state, &parsed, raw_query, &params, relay_state)?;

    // An existing session wins; then a TLS client certificate; then the form.
    if let Some(user) = user_from_session(state, headers).await {
        return respond(state, &request, &user).await;
    }

    if let Some(cert) = client_cert {
        let user = login_with_cert(state, cert, &request, headers, connect_info).await?;
        return respond(state, &request, &user).await;
    }

    let request_id = Uuid::new_v4().to_string();
    let blob = serde_json::to_vec(&request).map_err(|e| SamlError::Internal(e.to_string()))?;
    state
        .temp_cache
        .set(&request_id, blob)
        .await
        .map_err(|e| SamlError::Cache(e.to_string()))?;

    Ok((
        StatusCode::TEMPORARY_REDIRECT,
        [(
            axum::http::header::LOCATION,
            format!(
                "{LOGIN_PAGE_PATH}?requestId={}",
                urlencoding::encode(&request_id)
            ),
        )],
    )
        .into_response())
}

/// Validates a wire request against the issuer's registered metadata and
/// freezes it into the internal form.
///
/// `signature` carries `(raw_query, sig_alg, signature_b64)` on the redirect
/// path, where the detached signature over the raw query line is mandatory;
/// the ECP path authenticates at the transport instead and passes `None`.
pub(crate) fn validate_parsed_request(
    state: &IdpState,
    parsed: &ParsedAuthnRequest,
    relay_state: Option<String>,
    signature: Option<(&str, &str, &str)>,
) -> SamlResult<AuthnRequest> {
    if parsed.issuer.is_empty() {
        return Err(SamlError::MissingElement(
            "request does not contain an issuer".to_string(),
        ));
    }
    info!(issuer = %parsed.issuer, "received authentication request");

    let sp = state
        .registry
        .lookup(&parsed.issuer)
        .ok_or_else(|| SamlError::UnknownIssuer(parsed.issuer.clone()))?;

    let acs = sp.select_acs(
        parsed.assertion_consumer_service_index,
        parsed.assertion_consumer_service_url.as_deref(),
    )?;

    if let Some((raw_query, sig_alg, signature_b64)) = signature {
        verify_redirect_signature(raw_query, sig_alg, signature_b64, sp.public_key()?)?;
    }

    Ok(AuthnRequest {
        id: parsed.id.clone(),
        issuer: parsed.issuer.clone(),
        assertion_consumer_service_url: acs.location.clone(),
        assertion_consumer_service_index: parsed.assertion_consumer_service_index,
        protocol_binding: parsed
            .protocol_binding
            .clone()
            .unwrap_or_else(|| acs.binding.clone()),
        relay_state,
        issue_instant: parsed.issue_instant.unwrap_or_else(chrono::Utc::now),
        destination: parsed.destination.clone(),
    })
}

fn validate_authn_request(
    state: &IdpState,
    parsed: &ParsedAuthnRequest,
    raw_query: &str,
    params: &std::collections::HashMap<String, String>,
    relay_state: Option<String>,
) -> SamlResult<AuthnRequest> {
    let sig_alg = params
        .get("SigAlg")
        .ok_or_else(|| SamlError::SignatureMismatch("request is not signed (no SigAlg)".into()))?;
    let signature = params.get("Signature").ok_or_else(|| {
        SamlError::SignatureMismatch("request is not signed (no Signature)".into())
    })?;

    validate_parsed_request(
        state,
        parsed,
        relay_state,
        Some((raw_query, sig_alg, signature)),
    )
}

/// Builds and audits a PKI user from the TLS client certificate.
pub(crate) async fn login_with_cert(
    state: &IdpState,
    cert: &ClientCert,
    request: &AuthnRequest,
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
) -> SamlResult<User> {
    let mut user = User {
        name: cert.subject_dn(),
        format: name_id_formats::X509_SUBJECT_NAME.to_string(),
        context: authn_contexts::X509.to_string(),
        ip: client_ip(headers, connect_info),
        x509_certificate: Some(cert.der.clone()),
        attributes: Vec::new(),
    };
    apply_attribute_sources(&state.attribute_sources, &mut user, request).await?;
    state
        .auditor
        .log_success(&user, request, LoginType::Certificate);
    info!(name = %user.name, "successful PKI login");
    Ok(user)
}
