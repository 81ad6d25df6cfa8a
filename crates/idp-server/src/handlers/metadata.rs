//! IdP metadata endpoint.

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use idp_saml::metadata::idp_entity_descriptor;

use crate::state::IdpState;

/// GET handler for the metadata endpoint.
pub async fn idp_metadata(State(state): State<IdpState>) -> Response {
    let document = idp_entity_descriptor(
        &state.entity_id,
        state.signer.certificate_b64(),
        &state.endpoints,
    );
    (
        StatusCode::OK,
        [(CONTENT_TYPE, "application/samlmetadata+xml")],
        document,
    )
        .into_response()
}
