//! Cache-serializable protocol state.
//!
//! The engine freezes the validated wire request into an [`AuthnRequest`]
//! before redirecting the browser to the login page, and thaws it again when
//! the password form comes back. The artifact flow stores a
//! [`StoredResponse`] pair under the artifact key until the SP resolves it
//! over SOAP.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::User;

/// A validated authentication request, immutable once constructed.
///
/// This is the internal form: the ACS URL has already been resolved against
/// the SP's metadata, so downstream code can rely on it being present and
/// trustworthy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthnRequest {
    /// Request ID from the wire message, echoed as `InResponseTo`.
    pub id: String,
    /// SP entity ID.
    pub issuer: String,
    /// Resolved assertion consumer service location.
    pub assertion_consumer_service_url: String,
    /// ACS index named by the request, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertion_consumer_service_index: Option<u32>,
    /// Binding the response must use.
    pub protocol_binding: String,
    /// Opaque SP state, round-tripped untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relay_state: Option<String>,
    /// When the SP issued the request.
    pub issue_instant: DateTime<Utc>,
    /// Destination attribute from the wire message, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

/// A validated logout request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutRequest {
    /// Request ID from the wire message.
    pub id: String,
    /// SP entity ID.
    pub issuer: String,
    /// Resolved single logout service location.
    pub single_logout_service_url: String,
    /// Binding the logout response must use.
    pub protocol_binding: String,
    /// Subject being logged out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_id: Option<String>,
    /// Expiry of the logout request itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_on_or_after: Option<DateTime<Utc>>,
    /// Pre-built logout response payload supplied by the SP, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logout_response: Option<String>,
}

/// The blob cached under a SAML artifact between the ACS redirect and the
/// back-channel `ArtifactResolve` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    /// The request the response answers.
    pub request: AuthnRequest,
    /// The authenticated subject.
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authn_request_roundtrips_through_json() {
        let request = AuthnRequest {
            id: "_abc".to_string(),
            issuer: "https://sp.example/".to_string(),
            assertion_consumer_service_url: "https://sp.example/acs".to_string(),
            assertion_consumer_service_index: Some(0),
            protocol_binding: "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST".to_string(),
            relay_state: Some("token".to_string()),
            issue_instant: Utc::now(),
            destination: None,
        };

        let bytes = serde_json::to_vec(&request).unwrap();
        let decoded: AuthnRequest = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, request);
    }
}
