//! ECP (PAOS) single sign-on over SOAP.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Extension, State};
use axum::http::header::{HeaderMap, AUTHORIZATION};
use axum::response::Response;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use idp_ldap::PasswordValidator;
use idp_model::{LoginType, User};
use idp_saml::types::{authn_contexts, name_id_formats, parse_authn_request, SamlBinding};
use idp_saml::{SamlError, SamlResult};
use tracing::info;

use crate::attributes::apply_attribute_sources;
use crate::audit::Auditor;
use crate::handlers::sso::{login_with_cert, validate_parsed_request};
use crate::handlers::{client_ip, error_response};
use crate::respond::respond;
use crate::state::{ClientCert, IdpState};

/// POST handler for the ECP endpoint.
///
/// The enhanced client authenticates with HTTP Basic credentials or a TLS
/// client certificate; the AuthnRequest arrives SOAP-wrapped in the body.
pub async fn ecp_sso(
    State(state): State<IdpState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    client_cert: Option<Extension<ClientCert>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    match handle_ecp(
        &state,
        &body,
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

async fn handle_ecp(
    state: &IdpState,
    body: &str,
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
    client_cert: Option<&ClientCert>,
) -> SamlResult<Response> {
    let parsed = parse_authn_request(body)?;
    let mut request = validate_parsed_request(state, &parsed, None, None)?;
    // The response leaves over the reverse SOAP channel no matter what the
    // ACS metadata says.
    request.protocol_binding = SamlBinding::Paos.uri().to_string();

    let user = if let Some(cert) = client_cert {
        login_with_cert(state, cert, &request, headers, connect_info).await?
    } else {
        let (username, password) = basic_credentials(headers)?;
        let attributes = match state.password_validator.validate(&username, &password).await {
            Ok(attributes) => attributes,
            Err(e) if e.is_transient() => {
                tracing::warn!(error = %e, "password validator upstream failure");
                return Err(SamlError::InvalidPassword);
            }
            Err(_) => return Err(SamlError::InvalidPassword),
        };
        let mut user = User {
            name: username,
            format: name_id_formats::UNSPECIFIED.to_string(),
            context: authn_contexts::PASSWORD_PROTECTED_TRANSPORT.to_string(),
            ip: client_ip(headers, connect_info),
            x509_certificate: None,
            attributes: Vec::new(),
        };
        user.append_attribute_map(attributes);
        apply_attribute_sources(&state.attribute_sources, &mut user, &request).await?;
        state.auditor.log_success(&user, &request, LoginType::Password);
        info!(name = %user.name, "successful ECP password login");
        user
    };

    respond(state, &request, &user).await
}

/// Decodes the `Authorization: Basic` header.
fn basic_credentials(headers: &HeaderMap) -> SamlResult<(String, String)> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(SamlError::InvalidPassword)?;
    let encoded = header
        .strip_prefix("Basic ")
        .ok_or(SamlError::InvalidPassword)?;
    let decoded = BASE64
        .decode(encoded)
        .map_err(|_| SamlError::InvalidPassword)?;
    let decoded = String::from_utf8(decoded).map_err(|_| SamlError::InvalidPassword)?;
    let (username, password) = decoded
        .split_once(':')
        .ok_or(SamlError::InvalidPassword)?;
    Ok((username.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn basic_credentials_decode() {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {}", BASE64.encode("alice:s3cret"))).unwrap(),
        );
        let (user, pass) = basic_credentials(&headers).unwrap();
        assert_eq!(user, "alice");
        assert_eq!(pass, "s3cret");
    }

    #[test]
    fn missing_or_malformed_authorization_is_rejected() {
        assert!(basic_credentials(&HeaderMap::new()).is_err());

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer token"));
        assert!(basic_credentials(&headers).is_err());
    }
}
