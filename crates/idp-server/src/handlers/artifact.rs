//! Artifact resolution over SOAP.

use axum::extract::{Extension, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use idp_cache::CacheStore;
use idp_model::StoredResponse;
use idp_saml::types::{parse_artifact_resolve, ResponseBuilder};
use idp_saml::{SamlError, SamlResult};
use tracing::info;

use crate::handlers::error_response;
use crate::respond::make_authn_response;
use crate::state::{ClientCert, IdpState};

/// POST handler for the artifact resolution endpoint.
///
/// Transport authentication is required: the SP must present a TLS client
/// certificate. Message-level authentication is not checked.
pub async fn artifact_resolve(
    State(state): State<IdpState>,
    client_cert: Option<Extension<ClientCert>>,
    body: String,
) -> Response {
    let Some(Extension(cert)) = client_cert else {
        return error_response(&SamlError::MissingClientCert);
    };
    info!(subject = %cert.subject_dn(), "received artifact resolution request");

    match handle_artifact_resolve(&state, &body).await {
        Ok(response) => response,
        Err(e) => error_response(&e),
    }
}

async fn handle_artifact_resolve(state: &IdpState, body: &str) -> SamlResult<Response> {
    let resolve = parse_artifact_resolve(body)?;

    // Artifacts resolve exactly once.
    let blob = state
        .temp_cache
        .take(&resolve.artifact)
        .await
        .map_err(|e| SamlError::Cache(e.to_string()))?
        .ok_or_else(|| SamlError::BadForm("unknown or expired artifact".to_string()))?;
    let stored: StoredResponse =
        serde_json::from_slice(&blob).map_err(|e| SamlError::Internal(e.to_string()))?;

    let signed = make_authn_response(state, &stored.request, &stored.user)?;
    let envelope = ResponseBuilder::new(&state.signer).build_artifact_response_envelope(
        &state.entity_id,
        &resolve.id,
        &signed.xml,
    );

    Ok((
        StatusCode::OK,
        [(CONTENT_TYPE, "text/xml")],
        envelope,
    )
        .into_response())
}
