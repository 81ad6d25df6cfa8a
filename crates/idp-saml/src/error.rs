//! SAML error types.
//!
//! One taxonomy covers the whole engine: wire-format problems, protocol
//! violations against registered metadata, authentication failures, and
//! internal faults. HTTP handlers map variants to status codes through
//! [`SamlError::http_status`].

use thiserror::Error;

/// Result type for SAML operations.
pub type SamlResult<T> = Result<T, SamlError>;

/// SAML protocol errors.
#[derive(Debug, Error)]
pub enum SamlError {
    // === Input ===
    /// XML parsing failed.
    #[error("malformed XML: {0}")]
    MalformedXml(String),

    /// Base64 decoding failed.
    #[error("base64 decode error: {0}")]
    BadBase64(String),

    /// DEFLATE decompression failed.
    #[error("deflate error: {0}")]
    BadDeflate(String),

    /// RelayState exceeded the 80-character limit.
    #[error("RelayState cannot be longer than 80 characters")]
    BadRelayState,

    /// A required form or query parameter was missing or unusable.
    #[error("bad request: {0}")]
    BadForm(String),

    /// A required XML element or attribute was missing.
    #[error("missing required element: {0}")]
    MissingElement(String),

    // === Protocol ===
    /// The request issuer is not a registered service provider.
    #[error("request from an unregistered issuer")]
    UnknownIssuer(String),

    /// No assertion consumer service could be selected.
    #[error("unable to determine assertion consumer service")]
    NoAcs,

    /// The request named an ACS URL that disagrees with the metadata.
    #[error("assertion consumer location in request does not match metadata")]
    AcsMismatch,

    /// The service provider has no single logout service.
    #[error("service provider has no single logout service")]
    NoSlo,

    /// The request named an SLO URL that disagrees with the metadata.
    #[error("single logout location in request does not match metadata")]
    SloMismatch,

    /// The request asked for a binding the IdP does not serve.
    #[error("unsupported protocol binding: {0}")]
    UnsupportedBinding(String),

    /// The redirect signature used an algorithm outside the supported set.
    #[error("unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    SignatureMismatch(String),

    // === Metadata ingestion ===
    /// SP metadata lacked the required signing certificate.
    #[error("service provider metadata does not contain an X509Certificate")]
    MissingCertificate,

    /// SP metadata was not a usable EntityDescriptor.
    #[error("malformed service provider metadata: {0}")]
    MalformedMetadata(String),

    /// The SP certificate did not parse, or its key is neither RSA nor DSA.
    #[error("invalid service provider certificate: {0}")]
    InvalidCertificate(String),

    // === Auth ===
    /// Wrong username or password (also covers upstream directory outages,
    /// which are deliberately indistinguishable to the caller).
    #[error("invalid login or password")]
    InvalidPassword,

    /// The endpoint requires TLS client-certificate authentication.
    #[error("client certificate required")]
    MissingClientCert,

    // === Internal ===
    /// Signing the assertion failed.
    #[error("signer failure: {0}")]
    SignerFailure(String),

    /// A cache read or write failed.
    #[error("cache error: {0}")]
    Cache(String),

    /// The configuration is unusable.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SamlError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::MalformedXml(_)
            | Self::BadBase64(_)
            | Self::BadDeflate(_)
            | Self::BadRelayState
            | Self::BadForm(_)
            | Self::MissingElement(_)
            | Self::UnknownIssuer(_)
            | Self::NoAcs
            | Self::AcsMismatch
            | Self::NoSlo
            | Self::SloMismatch
            | Self::UnsupportedBinding(_)
            | Self::UnsupportedAlgorithm(_)
            | Self::SignatureMismatch(_)
            | Self::MissingCertificate
            | Self::MalformedMetadata(_)
            | Self::InvalidCertificate(_) => 400,
            Self::InvalidPassword | Self::MissingClientCert => 401,
            Self::SignerFailure(_)
            | Self::Cache(_)
            | Self::ConfigInvalid(_)
            | Self::Internal(_) => 500,
        }
    }
}

impl From<quick_xml::Error> for SamlError {
    fn from(err: quick_xml::Error) -> Self {
        Self::MalformedXml(err.to_string())
    }
}

impl From<base64::DecodeError> for SamlError {
    fn from(err: base64::DecodeError) -> Self {
        Self::BadBase64(err.to_string())
    }
}

impl From<std::io::Error> for SamlError {
    fn from(err: std::io::Error) -> Self {
        Self::BadDeflate(err.to_string())
    }
}

impl From<openssl::error::ErrorStack> for SamlError {
    fn from(err: openssl::error::ErrorStack) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_codes() {
        assert_eq!(SamlError::BadRelayState.http_status(), 400);
        assert_eq!(SamlError::UnknownIssuer("x".into()).http_status(), 400);
        assert_eq!(SamlError::SignatureMismatch("x".into()).http_status(), 400);
        assert_eq!(SamlError::MissingClientCert.http_status(), 401);
        assert_eq!(SamlError::InvalidPassword.http_status(), 401);
        assert_eq!(SamlError::SignerFailure("x".into()).http_status(), 500);
    }
}
