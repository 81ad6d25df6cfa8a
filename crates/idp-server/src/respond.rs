//! Response construction and binding dispatch.
//!
//! Every successful authentication funnels through [`respond`]: store the
//! user in the session cache, set the cookie, then deliver the signed
//! response the way the request's protocol binding demands.

use axum::http::header::{CONTENT_TYPE, LOCATION, SET_COOKIE};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use idp_cache::CacheStore;
use idp_model::{AuthnRequest, StoredResponse, User};
use idp_saml::artifact::new_artifact;
use idp_saml::bindings::response_post_page;
use idp_saml::types::{AuthnResponseParams, ResponseBuilder, SamlBinding, SignedResponse};
use idp_saml::{SamlError, SamlResult};
use tracing::info;

use crate::session::{session_cookie, store_user};
use crate::state::IdpState;

/// Builds the signed SAML Response answering `request` for `user`.
pub fn make_authn_response(
    state: &IdpState,
    request: &AuthnRequest,
    user: &User,
) -> SamlResult<SignedResponse> {
    ResponseBuilder::new(&state.signer).build_authn_response(&AuthnResponseParams {
        entity_id: &state.entity_id,
        server_name: &state.server_name,
        sp_entity_id: &request.issuer,
        in_response_to: &request.id,
        recipient: &request.assertion_consumer_service_url,
        user,
        attribute_name_format: &state.attribute_name_format,
    })
}

/// Stores the session, sets the cookie, and dispatches on the binding.
pub async fn respond(
    state: &IdpState,
    request: &AuthnRequest,
    user: &User,
) -> SamlResult<Response> {
    let session = store_user(state, user).await?;
    let cookie = session_cookie(&state.cookie_name, &session, state.secure_cookies);

    let binding = SamlBinding::from_uri(&request.protocol_binding)
        .ok_or_else(|| SamlError::UnsupportedBinding(request.protocol_binding.clone()))?;

    let mut response = match binding {
        SamlBinding::HttpArtifact => send_artifact_response(state, request, user).await?,
        SamlBinding::HttpPost => send_post_response(state, request, user)?,
        SamlBinding::Paos => send_ecp_response(state, request, user)?,
        _ => return Err(SamlError::UnsupportedBinding(request.protocol_binding.clone())),
    };

    response.headers_mut().append(
        SET_COOKIE,
        cookie
            .parse()
            .map_err(|_| SamlError::Internal("unrenderable cookie".to_string()))?,
    );
    Ok(response)
}

/// HTTP-POST delivery: auto-submitting form addressed to the ACS.
fn send_post_response(
    state: &IdpState,
    request: &AuthnRequest,
    user: &User,
) -> SamlResult<Response> {
    let signed = make_authn_response(state, request, user)?;
    let page = response_post_page(
        &signed.xml,
        &request.assertion_consumer_service_url,
        request.relay_state.as_deref(),
    );
    Ok(Html(page).into_response())
}

/// HTTP-Artifact delivery: cache the pending response and redirect the
/// browser to the ACS with the artifact reference.
async fn send_artifact_response(
    state: &IdpState,
    request: &AuthnRequest,
    user: &User,
) -> SamlResult<Response> {
    let artifact = new_artifact(&state.entity_id)?;

    let blob = serde_json::to_vec(&StoredResponse {
        request: request.clone(),
        user: user.clone(),
    })
    .map_err(|e| SamlError::Internal(e.to_string()))?;
    state
        .temp_cache
        .set(&artifact, blob)
        .await
        .map_err(|e| SamlError::Cache(e.to_string()))?;

    let mut target = url::Url::parse(&request.assertion_consumer_service_url)
        .map_err(|e| SamlError::Internal(format!("unparsable ACS URL: {e}")))?;
    target
        .query_pairs_mut()
        .append_pair("SAMLart", &artifact)
        .append_pair("RelayState", request.relay_state.as_deref().unwrap_or(""));

    info!(issuer = %request.issuer, "issued artifact redirect");

    // 302, not 307: the ACS GET must not be replayed as a POST.
    Ok((
        StatusCode::FOUND,
        [(LOCATION, target.to_string())],
    )
        .into_response())
}

/// PAOS delivery: SOAP envelope with the ECP headers.
fn send_ecp_response(
    state: &IdpState,
    request: &AuthnRequest,
    user: &User,
) -> SamlResult<Response> {
    let signed = make_authn_response(state, request, user)?;
    let envelope = ResponseBuilder::new(&state.signer)
        .build_ecp_envelope(&request.assertion_consumer_service_url, &signed.xml);
    Ok((
        StatusCode::OK,
        [(CONTENT_TYPE, "application/vnd.paos+xml")],
        envelope,
    )
        .into_response())
}
