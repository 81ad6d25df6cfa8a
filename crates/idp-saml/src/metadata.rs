//! IdP metadata document.
//!
//! Emits the EntityDescriptor service providers ingest to learn this IdP's
//! endpoints and signing certificate. Publishing anything beyond the IdP's
//! own descriptor is out of scope.

use crate::types::{xml_escape, SamlBinding, MD_NS};

/// Endpoint locations advertised in the IdP descriptor.
#[derive(Debug, Clone)]
pub struct IdpEndpoints {
    /// Single sign-on service location (HTTP-Redirect).
    pub sso_location: String,
    /// Single logout service location (HTTP-Redirect).
    pub slo_location: String,
    /// Artifact resolution service location (SOAP); advertised at index 1 to
    /// match the endpoint index baked into artifacts.
    pub artifact_location: String,
}

/// Renders the IdP EntityDescriptor.
#[must_use]
pub fn idp_entity_descriptor(
    entity_id: &str,
    certificate_b64: &str,
    endpoints: &IdpEndpoints,
) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<md:EntityDescriptor xmlns:md="{md}" entityID="{entity_id}">
    <md:IDPSSODescriptor WantAuthnRequestsSigned="true" protocolSupportEnumeration="urn:oasis:names:tc:SAML:2.0:protocol">
        <md:KeyDescriptor use="signing">
            <ds:KeyInfo xmlns:ds="http://www.w3.org/2000/09/xmldsig#">
                <ds:X509Data>
                    <ds:X509Certificate>{certificate}</ds:X509Certificate>
                </ds:X509Data>
            </ds:KeyInfo>
        </md:KeyDescriptor>
        <md:ArtifactResolutionService Binding="{soap}" Location="{artifact}" index="1"/>
        <md:NameIDFormat>urn:oasis:names:tc:SAML:1.1:nameid-format:unspecified</md:NameIDFormat>
        <md:NameIDFormat>urn:oasis:names:tc:SAML:1.1:nameid-format:X509SubjectName</md:NameIDFormat>
        <md:SingleSignOnService Binding="{redirect}" Location="{sso}"/>
        <md:SingleLogoutService Binding="{redirect}" Location="{slo}"/>
    </md:IDPSSODescriptor>
</md:EntityDescriptor>"#,
        md = MD_NS,
        entity_id = xml_escape(entity_id),
        certificate = certificate_b64,
        soap = SamlBinding::Soap.uri(),
        artifact = xml_escape(&endpoints.artifact_location),
        redirect = SamlBinding::HttpRedirect.uri(),
        sso = xml_escape(&endpoints.sso_location),
        slo = xml_escape(&endpoints.slo_location),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_contains_required_elements() {
        let endpoints = IdpEndpoints {
            sso_location: "https://idp.test/idp/SAML2/Redirect/SSO".to_string(),
            slo_location: "https://idp.test/idp/SAML2/Redirect/SLO".to_string(),
            artifact_location: "https://idp.test/idp/SAML2/SOAP/ArtifactResolution".to_string(),
        };
        let xml = idp_entity_descriptor("https://idp.test/", "TUlJQw==", &endpoints);

        assert!(xml.contains(r#"entityID="https://idp.test/""#));
        assert!(xml.contains("<ds:X509Certificate>TUlJQw==</ds:X509Certificate>"));
        assert!(xml.contains(r#"index="1""#));
        assert!(xml.contains("SingleSignOnService"));
        assert!(xml.contains("SingleLogoutService"));
        assert!(xml.contains("ArtifactResolutionService"));
    }
}
