//! Enveloped XML-DSig creation.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use openssl::hash::hash;
use openssl::pkey::{PKey, Private};
use openssl::sign::Signer;
use openssl::x509::X509;

use crate::error::{SamlError, SamlResult};

use super::{DigestAlgorithm, SignatureAlgorithm, ENVELOPED_SIGNATURE, EXCLUSIVE_C14N};

/// Signs rendered assertions with the IdP's private key.
///
/// The signer operates on the exact octets it is given: the digest covers the
/// assertion as rendered, and the `<ds:Signature>` element is spliced into
/// that same string after the Issuer element. Holds only immutable key
/// material, so a single instance is shared across request tasks.
pub struct AssertionSigner {
    key: PKey<Private>,
    certificate: X509,
    certificate_b64: String,
    signature_algorithm: SignatureAlgorithm,
    digest_algorithm: DigestAlgorithm,
}

impl AssertionSigner {
    /// Creates a signer from a parsed key and certificate.
    pub fn new(key: PKey<Private>, certificate: X509) -> SamlResult<Self> {
        let certificate_b64 = BASE64.encode(certificate.to_der()?);
        Ok(Self {
            key,
            certificate,
            certificate_b64,
            signature_algorithm: SignatureAlgorithm::default(),
            digest_algorithm: DigestAlgorithm::default(),
        })
    }

    /// Creates a signer from PEM-encoded key and certificate.
    pub fn from_pem(key_pem: &[u8], certificate_pem: &[u8]) -> SamlResult<Self> {
        let key = PKey::private_key_from_pem(key_pem)
            .map_err(|e| SamlError::ConfigInvalid(format!("unusable private key: {e}")))?;
        let certificate = X509::from_pem(certificate_pem)
            .map_err(|e| SamlError::ConfigInvalid(format!("unusable certificate: {e}")))?;
        Self::new(key, certificate)
    }

    /// Sets the signature algorithm.
    #[must_use]
    pub fn with_signature_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.signature_algorithm = algorithm;
        self
    }

    /// Sets the Reference digest algorithm.
    #[must_use]
    pub fn with_digest_algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.digest_algorithm = algorithm;
        self
    }

    /// The signing certificate.
    #[must_use]
    pub fn certificate(&self) -> &X509 {
        &self.certificate
    }

    /// The signing certificate as base64 DER, ready for KeyInfo or metadata.
    #[must_use]
    pub fn certificate_b64(&self) -> &str {
        &self.certificate_b64
    }

    /// Signs an assertion, returning the document with the enveloped
    /// `<ds:Signature>` inserted after the assertion's Issuer element.
    ///
    /// `reference_id` must be the value of the assertion's `ID` attribute.
    pub fn sign_assertion(&self, assertion_xml: &str, reference_id: &str) -> SamlResult<String> {
        let digest = hash(
            self.digest_algorithm.message_digest(),
            assertion_xml.as_bytes(),
        )
        .map_err(|e| SamlError::SignerFailure(e.to_string()))?;
        let digest_b64 = BASE64.encode(&digest);

        let signed_info = self.build_signed_info(reference_id, &digest_b64);

        let signature_value = self.sign_bytes(signed_info.as_bytes())?;
        let signature_b64 = BASE64.encode(&signature_value);

        let signature_element = format!(
            concat!(
                r#"<ds:Signature xmlns:ds="http://www.w3.org/2000/09/xmldsig#">"#,
                "{signed_info}",
                "<ds:SignatureValue>{signature_value}</ds:SignatureValue>",
                "<ds:KeyInfo><ds:X509Data><ds:X509Certificate>{certificate}</ds:X509Certificate></ds:X509Data></ds:KeyInfo>",
                "</ds:Signature>"
            ),
            signed_info = signed_info,
            signature_value = signature_b64,
            certificate = self.certificate_b64,
        );

        let insert_at = issuer_end(assertion_xml).ok_or_else(|| {
            SamlError::SignerFailure("assertion has no Issuer element".to_string())
        })?;

        let mut signed = String::with_capacity(assertion_xml.len() + signature_element.len());
        signed.push_str(&assertion_xml[..insert_at]);
        signed.push_str(&signature_element);
        signed.push_str(&assertion_xml[insert_at..]);
        Ok(signed)
    }

    fn build_signed_info(&self, reference_id: &str, digest_b64: &str) -> String {
        format!(
            concat!(
                r#"<ds:SignedInfo xmlns:ds="http://www.w3.org/2000/09/xmldsig#">"#,
                r#"<ds:CanonicalizationMethod Algorithm="{c14n}"/>"#,
                r#"<ds:SignatureMethod Algorithm="{sig_alg}"/>"#,
                r##"<ds:Reference URI="#{reference}">"##,
                "<ds:Transforms>",
                r#"<ds:Transform Algorithm="{enveloped}"/>"#,
                r#"<ds:Transform Algorithm="{c14n}"/>"#,
                "</ds:Transforms>",
                r#"<ds:DigestMethod Algorithm="{digest_alg}"/>"#,
                "<ds:DigestValue>{digest}</ds:DigestValue>",
                "</ds:Reference>",
                "</ds:SignedInfo>"
            ),
            c14n = EXCLUSIVE_C14N,
            sig_alg = self.signature_algorithm.uri(),
            reference = reference_id,
            enveloped = ENVELOPED_SIGNATURE,
            digest_alg = self.digest_algorithm.uri(),
            digest = digest_b64,
        )
    }

    fn sign_bytes(&self, data: &[u8]) -> SamlResult<Vec<u8>> {
        if !self.signature_algorithm.is_rsa() {
            return Err(SamlError::SignerFailure(format!(
                "cannot sign with {}",
                self.signature_algorithm.uri()
            )));
        }
        let mut signer = Signer::new(self.signature_algorithm.message_digest(), &self.key)
            .map_err(|e| SamlError::SignerFailure(e.to_string()))?;
        signer
            .sign_oneshot_to_vec(data)
            .map_err(|e| SamlError::SignerFailure(e.to_string()))
    }
}

/// Finds the byte offset just past the assertion's closing Issuer tag.
fn issuer_end(xml: &str) -> Option<usize> {
    for pattern in ["</saml:Issuer>", "</saml2:Issuer>", "</Issuer>"] {
        if let Some(pos) = xml.find(pattern) {
            return Some(pos + pattern.len());
        }
    }
    None
}
