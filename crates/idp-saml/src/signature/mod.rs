//! XML signature support.
//!
//! Two distinct jobs live here:
//!
//! - [`AssertionSigner`] produces enveloped XML-DSig signatures over rendered
//!   assertions, using the IdP's TLS key.
//! - [`verify_redirect_signature`] checks the *detached* signature that SAML
//!   Bindings §3.4.4.1 puts on HTTP-Redirect query strings, against the
//!   service provider's registered RSA or DSA public key.

mod signer;
mod validator;

pub use signer::AssertionSigner;
pub use validator::{signed_query_from_raw, verify_redirect_signature};

use openssl::hash::MessageDigest;

use crate::error::{SamlError, SamlResult};

/// Exclusive C14N without comments.
pub const EXCLUSIVE_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";

/// Enveloped-signature transform.
pub const ENVELOPED_SIGNATURE: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";

/// Signature algorithms the IdP signs or verifies with.
///
/// Signing supports the RSA family; redirect verification additionally
/// accepts the two DSA algorithms SPs are allowed to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureAlgorithm {
    /// RSA PKCS#1 v1.5 with SHA-1 (verification only, legacy SPs).
    RsaSha1,
    /// RSA PKCS#1 v1.5 with SHA-256 (default).
    #[default]
    RsaSha256,
    /// RSA PKCS#1 v1.5 with SHA-384.
    RsaSha384,
    /// RSA PKCS#1 v1.5 with SHA-512.
    RsaSha512,
    /// DSA with SHA-1 (verification only).
    DsaSha1,
    /// DSA with SHA-256 (verification only).
    DsaSha256,
}

impl SignatureAlgorithm {
    /// Returns the XML-DSig URI for this algorithm.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::RsaSha1 => "http://www.w3.org/2000/09/xmldsig#rsa-sha1",
            Self::RsaSha256 => "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256",
            Self::RsaSha384 => "http://www.w3.org/2001/04/xmldsig-more#rsa-sha384",
            Self::RsaSha512 => "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512",
            Self::DsaSha1 => "http://www.w3.org/2000/09/xmldsig#dsa-sha1",
            Self::DsaSha256 => "http://www.w3.org/2009/xmldsig11#dsa-sha256",
        }
    }

    /// Parses an algorithm from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            "http://www.w3.org/2000/09/xmldsig#rsa-sha1" => Some(Self::RsaSha1),
            "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256" => Some(Self::RsaSha256),
            "http://www.w3.org/2001/04/xmldsig-more#rsa-sha384" => Some(Self::RsaSha384),
            "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512" => Some(Self::RsaSha512),
            "http://www.w3.org/2000/09/xmldsig#dsa-sha1" => Some(Self::DsaSha1),
            "http://www.w3.org/2009/xmldsig11#dsa-sha256" => Some(Self::DsaSha256),
            _ => None,
        }
    }

    /// The message digest the algorithm hashes with.
    #[must_use]
    pub fn message_digest(&self) -> MessageDigest {
        match self {
            Self::RsaSha1 | Self::DsaSha1 => MessageDigest::sha1(),
            Self::RsaSha256 | Self::DsaSha256 => MessageDigest::sha256(),
            Self::RsaSha384 => MessageDigest::sha384(),
            Self::RsaSha512 => MessageDigest::sha512(),
        }
    }

    /// Returns true for the RSA family.
    #[must_use]
    pub const fn is_rsa(&self) -> bool {
        matches!(
            self,
            Self::RsaSha1 | Self::RsaSha256 | Self::RsaSha384 | Self::RsaSha512
        )
    }

    /// Returns true for the DSA family.
    #[must_use]
    pub const fn is_dsa(&self) -> bool {
        matches!(self, Self::DsaSha1 | Self::DsaSha256)
    }
}

/// Digest algorithms for the enveloped signature's Reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestAlgorithm {
    /// SHA-256 (default).
    #[default]
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
}

impl DigestAlgorithm {
    /// Returns the XML-DSig URI for this digest.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::Sha256 => "http://www.w3.org/2001/04/xmlenc#sha256",
            Self::Sha384 => "http://www.w3.org/2001/04/xmldsig-more#sha384",
            Self::Sha512 => "http://www.w3.org/2001/04/xmlenc#sha512",
        }
    }

    /// Parses a digest algorithm from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            "http://www.w3.org/2001/04/xmlenc#sha256" => Some(Self::Sha256),
            "http://www.w3.org/2001/04/xmldsig-more#sha384" => Some(Self::Sha384),
            "http://www.w3.org/2001/04/xmlenc#sha512" => Some(Self::Sha512),
            _ => None,
        }
    }

    /// The underlying message digest.
    #[must_use]
    pub fn message_digest(&self) -> MessageDigest {
        match self {
            Self::Sha256 => MessageDigest::sha256(),
            Self::Sha384 => MessageDigest::sha384(),
            Self::Sha512 => MessageDigest::sha512(),
        }
    }
}

/// Resolves the configured signing algorithm, defaulting to RSA-SHA256.
///
/// DSA algorithms are verification-only; configuring one for signing is a
/// configuration error.
pub fn signing_algorithm(configured: Option<&str>) -> SamlResult<SignatureAlgorithm> {
    match configured {
        None | Some("") => Ok(SignatureAlgorithm::RsaSha256),
        Some(uri) => {
            let alg = SignatureAlgorithm::from_uri(uri)
                .ok_or_else(|| SamlError::UnsupportedAlgorithm(uri.to_string()))?;
            if alg.is_dsa() {
                return Err(SamlError::ConfigInvalid(format!(
                    "cannot sign with {uri}: DSA is verification-only"
                )));
            }
            Ok(alg)
        }
    }
}
