//! Detached signature verification for the HTTP-Redirect binding.
//!
//! SAML 2.0 Bindings §3.4.4.1: the SP signs the octets of
//! `SAMLRequest=value&RelayState=value&SigAlg=value` where each value is the
//! raw, still-URL-encoded form from the request line. Re-encoding a decoded
//! value does not round-trip in general, so the canonical string must be
//! rebuilt from the raw query, never from parsed form parameters.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use openssl::pkey::{Id, PKeyRef, Public};
use openssl::sign::Verifier;

use crate::error::{SamlError, SamlResult};

use super::SignatureAlgorithm;

/// Rebuilds the signed octet string from a raw query string.
///
/// Values are taken verbatim from the wire; only the parameter order is
/// normalized to `SAMLRequest`, optional `RelayState`, `SigAlg`.
pub fn signed_query_from_raw(raw_query: &str) -> SamlResult<String> {
    let mut saml_request = None;
    let mut relay_state = None;
    let mut sig_alg = None;

    for part in raw_query.split('&') {
        if part.is_empty() {
            continue;
        }
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| SamlError::SignatureMismatch("unparsable query parameter".into()))?;
        match key {
            "SAMLRequest" => saml_request = Some(value),
            "RelayState" => relay_state = Some(value),
            "SigAlg" => sig_alg = Some(value),
            _ => {}
        }
    }

    let saml_request = saml_request
        .ok_or_else(|| SamlError::SignatureMismatch("query carries no SAMLRequest".into()))?;
    let sig_alg =
        sig_alg.ok_or_else(|| SamlError::SignatureMismatch("query carries no SigAlg".into()))?;

    let mut signed = format!("SAMLRequest={saml_request}");
    if let Some(state) = relay_state {
        signed.push_str("&RelayState=");
        signed.push_str(state);
    }
    signed.push_str("&SigAlg=");
    signed.push_str(sig_alg);
    Ok(signed)
}

/// Verifies the detached redirect signature against the SP's public key.
///
/// `sig_alg` and `signature_b64` are the already-URL-decoded parameter
/// values; `raw_query` is the untouched request query string. RSA signatures
/// are PKCS#1 v1.5; DSA signatures are the ASN.1 `{R,S}` sequence, and the
/// DER decoder rejects trailing bytes and non-positive components.
pub fn verify_redirect_signature(
    raw_query: &str,
    sig_alg: &str,
    signature_b64: &str,
    public_key: &PKeyRef<Public>,
) -> SamlResult<()> {
    let algorithm = SignatureAlgorithm::from_uri(sig_alg)
        .ok_or_else(|| SamlError::UnsupportedAlgorithm(sig_alg.to_string()))?;

    let key_matches = match public_key.id() {
        Id::RSA => algorithm.is_rsa(),
        Id::DSA => algorithm.is_dsa(),
        _ => false,
    };
    if !key_matches {
        return Err(SamlError::SignatureMismatch(format!(
            "signature algorithm {sig_alg} does not match the registered key"
        )));
    }

    let signature = BASE64
        .decode(signature_b64)
        .map_err(|e| SamlError::SignatureMismatch(format!("undecodable signature: {e}")))?;
    if signature.is_empty() {
        return Err(SamlError::SignatureMismatch("empty signature".into()));
    }

    let signed = signed_query_from_raw(raw_query)?;

    let mut verifier = Verifier::new(algorithm.message_digest(), public_key)
        .map_err(|e| SamlError::SignatureMismatch(e.to_string()))?;
    verifier
        .update(signed.as_bytes())
        .map_err(|e| SamlError::SignatureMismatch(e.to_string()))?;

    match verifier.verify(&signature) {
        Ok(true) => Ok(()),
        Ok(false) => Err(SamlError::SignatureMismatch(
            "signature does not match signed query".into(),
        )),
        Err(e) => Err(SamlError::SignatureMismatch(e.to_string())),
    }
}
