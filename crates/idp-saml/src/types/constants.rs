//! SAML 2.0 constants and URIs.
//!
//! Namespace URIs, binding URIs, NameID formats, authentication context
//! classes, and status codes as defined by the SAML 2.0 specification set.

/// SAML 2.0 assertion namespace URI.
pub const SAML_NS: &str = "urn:oasis:names:tc:SAML:2.0:assertion";

/// SAML 2.0 protocol namespace URI.
pub const SAMLP_NS: &str = "urn:oasis:names:tc:SAML:2.0:protocol";

/// SAML 2.0 metadata namespace URI.
pub const MD_NS: &str = "urn:oasis:names:tc:SAML:2.0:metadata";

/// SOAP 1.1 envelope namespace URI.
pub const SOAP_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// SAML 2.0 ECP profile namespace URI.
pub const ECP_NS: &str = "urn:oasis:names:tc:SAML:2.0:profiles:SSO:ecp";

/// XML Digital Signature namespace URI.
pub const XMLDSIG_NS: &str = "http://www.w3.org/2000/09/xmldsig#";

/// SOAP actor targeted by ECP headers.
pub const SOAP_ACTOR_NEXT: &str = "http://schemas.xmlsoap.org/soap/actor/next";

// ============================================================================
// Bindings
// ============================================================================

/// SAML binding types served by the IdP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamlBinding {
    /// HTTP POST binding.
    HttpPost,
    /// HTTP Redirect binding.
    HttpRedirect,
    /// HTTP Artifact binding.
    HttpArtifact,
    /// Reverse SOAP binding (ECP).
    Paos,
    /// SOAP binding.
    Soap,
}

impl SamlBinding {
    /// Returns the URI for this binding.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::HttpPost => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST",
            Self::HttpRedirect => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect",
            Self::HttpArtifact => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Artifact",
            Self::Paos => "urn:oasis:names:tc:SAML:2.0:bindings:PAOS",
            Self::Soap => "urn:oasis:names:tc:SAML:2.0:bindings:SOAP",
        }
    }

    /// Parses a binding from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST" => Some(Self::HttpPost),
            "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect" => Some(Self::HttpRedirect),
            "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Artifact" => Some(Self::HttpArtifact),
            "urn:oasis:names:tc:SAML:2.0:bindings:PAOS" => Some(Self::Paos),
            "urn:oasis:names:tc:SAML:2.0:bindings:SOAP" => Some(Self::Soap),
            _ => None,
        }
    }
}

// ============================================================================
// NameID formats
// ============================================================================

/// NameID format URIs used by the authenticators.
pub mod name_id_formats {
    /// Unspecified format (password logins).
    pub const UNSPECIFIED: &str = "urn:oasis:names:tc:SAML:1.1:nameid-format:unspecified";

    /// X.509 subject name format (PKI logins).
    pub const X509_SUBJECT_NAME: &str =
        "urn:oasis:names:tc:SAML:1.1:nameid-format:X509SubjectName";

    /// Email address format.
    pub const EMAIL: &str = "urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress";

    /// Transient identifier format.
    pub const TRANSIENT: &str = "urn:oasis:names:tc:SAML:2.0:nameid-format:transient";

    /// Persistent identifier format.
    pub const PERSISTENT: &str = "urn:oasis:names:tc:SAML:2.0:nameid-format:persistent";
}

// ============================================================================
// Authentication context classes
// ============================================================================

/// AuthnContextClassRef URIs.
pub mod authn_contexts {
    /// Password over a protected transport.
    pub const PASSWORD_PROTECTED_TRANSPORT: &str =
        "urn:oasis:names:tc:SAML:2.0:ac:classes:PasswordProtectedTransport";

    /// X.509 certificate authentication.
    pub const X509: &str = "urn:oasis:names:tc:SAML:2.0:ac:classes:X509";

    /// Reuse of a previous session.
    pub const PREVIOUS_SESSION: &str =
        "urn:oasis:names:tc:SAML:2.0:ac:classes:PreviousSession";
}

// ============================================================================
// Subject confirmation methods
// ============================================================================

/// Subject confirmation method URIs.
pub mod confirmation_methods {
    /// Bearer confirmation.
    pub const BEARER: &str = "urn:oasis:names:tc:SAML:2.0:cm:bearer";

    /// Sender-vouches confirmation.
    pub const SENDER_VOUCHES: &str = "urn:oasis:names:tc:SAML:2.0:cm:sender-vouches";
}

// ============================================================================
// Status codes
// ============================================================================

/// Top-level SAML status codes.
pub mod status_codes {
    /// Success status code.
    pub const SUCCESS: &str = "urn:oasis:names:tc:SAML:2.0:status:Success";

    /// Requester error status code.
    pub const REQUESTER: &str = "urn:oasis:names:tc:SAML:2.0:status:Requester";

    /// Responder error status code.
    pub const RESPONDER: &str = "urn:oasis:names:tc:SAML:2.0:status:Responder";
}

// ============================================================================
// Attribute name formats
// ============================================================================

/// Attribute name format URIs.
pub mod attribute_name_formats {
    /// Basic name format (default for emitted attributes).
    pub const BASIC: &str = "urn:oasis:names:tc:SAML:2.0:attrname-format:basic";

    /// URI name format.
    pub const URI: &str = "urn:oasis:names:tc:SAML:2.0:attrname-format:uri";
}

/// Generates a SAML message identifier (`_` + UUID), valid as an XML ID.
#[must_use]
pub fn new_saml_id() -> String {
    format!("_{}", uuid::Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_uri_roundtrip() {
        for binding in [
            SamlBinding::HttpPost,
            SamlBinding::HttpRedirect,
            SamlBinding::HttpArtifact,
            SamlBinding::Paos,
            SamlBinding::Soap,
        ] {
            assert_eq!(SamlBinding::from_uri(binding.uri()), Some(binding));
        }
    }

    #[test]
    fn unknown_binding_uri() {
        assert_eq!(SamlBinding::from_uri("urn:example:not-a-binding"), None);
    }

    #[test]
    fn saml_ids_are_xml_safe_and_unique() {
        let a = new_saml_id();
        let b = new_saml_id();
        assert!(a.starts_with('_'));
        assert_ne!(a, b);
    }
}
