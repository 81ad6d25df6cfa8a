//! HTTP-Redirect binding codec.
//!
//! Wire form is RAW deflate (no zlib header) then base64. URL encoding is the
//! HTTP layer's business and has already been undone by the time the
//! parameter value reaches these functions.

use std::io::{Read, Write};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;

use crate::error::{SamlError, SamlResult};

/// Cap on the inflated message size; a legitimate SAML request is a few KB.
const MAX_INFLATED_SIZE: u64 = 64 * 1024;

/// Decodes a `SAMLRequest` query parameter into XML.
pub fn decode_redirect_message(encoded: &str) -> SamlResult<String> {
    let compressed = BASE64
        .decode(encoded)
        .map_err(|e| SamlError::BadBase64(e.to_string()))?;

    let mut xml = String::new();
    let decoder = DeflateDecoder::new(&compressed[..]);
    decoder
        .take(MAX_INFLATED_SIZE)
        .read_to_string(&mut xml)
        .map_err(|e| SamlError::BadDeflate(e.to_string()))?;
    if xml.len() as u64 >= MAX_INFLATED_SIZE {
        return Err(SamlError::BadDeflate(
            "message exceeds the inflated size limit".to_string(),
        ));
    }

    Ok(xml)
}

/// Encodes XML for a redirect-binding query parameter (deflate + base64).
pub fn encode_redirect_message(xml: &str) -> SamlResult<String> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(xml.as_bytes())
        .map_err(|e| SamlError::BadDeflate(e.to_string()))?;
    let compressed = encoder
        .finish()
        .map_err(|e| SamlError::BadDeflate(e.to_string()))?;
    Ok(BASE64.encode(compressed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let xml = r#"<samlp:AuthnRequest ID="_x">payload</samlp:AuthnRequest>"#;
        let encoded = encode_redirect_message(xml).unwrap();
        assert_eq!(decode_redirect_message(&encoded).unwrap(), xml);
    }

    #[test]
    fn invalid_base64_is_rejected() {
        assert!(matches!(
            decode_redirect_message("not base64!!!"),
            Err(SamlError::BadBase64(_))
        ));
    }

    #[test]
    fn undeflatable_payload_is_rejected() {
        let encoded = BASE64.encode(b"plain bytes, not deflate");
        assert!(matches!(
            decode_redirect_message(&encoded),
            Err(SamlError::BadDeflate(_))
        ));
    }
}
