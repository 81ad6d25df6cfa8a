//! Core SAML types: constants, wire-message parsers, and document rendering.

mod authn_request;
mod constants;
mod logout;
mod response;
mod soap;

pub use authn_request::{parse_authn_request, ParsedAuthnRequest};
pub use constants::*;
pub use logout::{parse_logout_request, ParsedLogoutRequest};
pub use response::{AuthnResponseParams, ResponseBuilder, SignedResponse};
pub use soap::{
    parse_artifact_resolve, parse_attribute_query, ParsedArtifactResolve, ParsedAttributeQuery,
};

/// Escapes text for inclusion in XML content or attribute values.
#[must_use]
pub fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            xml_escape(r#"<a b="c&d">'e'</a>"#),
            "&lt;a b=&quot;c&amp;d&quot;&gt;&apos;e&apos;&lt;/a&gt;"
        );
    }
}
