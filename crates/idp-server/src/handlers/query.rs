//! Attribute query over SOAP.

use axum::extract::{Extension, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use idp_model::{AuthnRequest, User};
use idp_saml::types::{
    authn_contexts, name_id_formats, parse_attribute_query, AuthnResponseParams, ResponseBuilder,
};
use idp_saml::{SamlError, SamlResult};
use tracing::info;

use crate::attributes::apply_attribute_sources;
use crate::handlers::error_response;
use crate::state::{ClientCert, IdpState};

/// POST handler for the attribute query endpoint.
///
/// Client-certificate authenticated, like artifact resolution. The response
/// is a signed assertion carrying whatever the attribute source chain knows
/// about the queried subject.
pub async fn attribute_query(
    State(state): State<IdpState>,
    client_cert: Option<Extension<ClientCert>>,
    body: String,
) -> Response {
    let Some(Extension(cert)) = client_cert else {
        return error_response(&SamlError::MissingClientCert);
    };
    info!(subject = %cert.subject_dn(), "received attribute query");

    match handle_attribute_query(&state, &body).await {
        Ok(response) => response,
        Err(e) => error_response(&e),
    }
}

async fn handle_attribute_query(state: &IdpState, body: &str) -> SamlResult<Response> {
    let query = parse_attribute_query(body)?;

    let issuer = query
        .issuer
        .clone()
        .ok_or_else(|| SamlError::MissingElement("Issuer".to_string()))?;
    let sp = state
        .registry
        .lookup(&issuer)
        .ok_or_else(|| SamlError::UnknownIssuer(issuer.clone()))?;
    // The assertion is delivered on this back channel; the recipient slot
    // still names the SP's default endpoint when it has one.
    let recipient = sp
        .select_acs(None, None)
        .map(|acs| acs.location.clone())
        .unwrap_or_default();

    let request = AuthnRequest {
        id: query.id.clone(),
        issuer: issuer.clone(),
        assertion_consumer_service_url: recipient.clone(),
        assertion_consumer_service_index: None,
        protocol_binding: String::new(),
        relay_state: None,
        issue_instant: chrono::Utc::now(),
        destination: None,
    };

    let mut user = User {
        name: query.subject.clone(),
        format: query
            .subject_format
            .clone()
            .unwrap_or_else(|| name_id_formats::UNSPECIFIED.to_string()),
        context: authn_contexts::PREVIOUS_SESSION.to_string(),
        ip: String::new(),
        x509_certificate: None,
        attributes: Vec::new(),
    };
    apply_attribute_sources(&state.attribute_sources, &mut user, &request).await?;

    let builder = ResponseBuilder::new(&state.signer);
    let signed = builder.build_authn_response(&AuthnResponseParams {
        entity_id: &state.entity_id,
        server_name: &state.server_name,
        sp_entity_id: &issuer,
        in_response_to: &query.id,
        recipient: &recipient,
        user: &user,
        attribute_name_format: &state.attribute_name_format,
    })?;
    let envelope = builder.build_soap_envelope(&signed.xml);

    Ok((StatusCode::OK, [(CONTENT_TYPE, "text/xml")], envelope).into_response())
}
