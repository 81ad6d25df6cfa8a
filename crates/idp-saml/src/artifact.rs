//! SAML 2.0 artifact encoding.
//!
//! An artifact is not a random session ID: it is a base64-encoded 44-byte
//! array with a fixed layout.
//!
//! | Bytes | Content |
//! |---|---|
//! | 0..2 | `0x00 0x04`, the SAML 2.0 type code |
//! | 2..4 | `0x00 0x01`, the artifact resolution endpoint index |
//! | 4..24 | SHA-1 of the IdP entity ID (source ID) |
//! | 24..44 | SHA-1 of a fresh UUID (message handle) |

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use openssl::hash::{hash, MessageDigest};
use uuid::Uuid;

use crate::error::SamlResult;

/// Decoded artifact length.
pub const ARTIFACT_LEN: usize = 44;

/// SAML 2.0 artifact type code.
pub const TYPE_CODE: [u8; 2] = [0x00, 0x04];

/// Index of the artifact resolution endpoint advertised in metadata.
pub const ENDPOINT_INDEX: [u8; 2] = [0x00, 0x01];

/// Builds a fresh artifact for the given IdP entity ID.
///
/// Every call produces a distinct message handle.
pub fn new_artifact(entity_id: &str) -> SamlResult<String> {
    let mut artifact = [0u8; ARTIFACT_LEN];
    artifact[..2].copy_from_slice(&TYPE_CODE);
    artifact[2..4].copy_from_slice(&ENDPOINT_INDEX);

    let source_id = hash(MessageDigest::sha1(), entity_id.as_bytes())?;
    artifact[4..24].copy_from_slice(&source_id);

    let handle = hash(MessageDigest::sha1(), Uuid::new_v4().to_string().as_bytes())?;
    artifact[24..44].copy_from_slice(&handle);

    Ok(BASE64.encode(artifact))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTITY_ID: &str = "https://idp.test/";

    #[test]
    fn artifact_layout() {
        let decoded = BASE64.decode(new_artifact(ENTITY_ID).unwrap()).unwrap();
        assert_eq!(decoded.len(), ARTIFACT_LEN);
        assert_eq!(&decoded[..4], &[0x00, 0x04, 0x00, 0x01]);

        let source_id = hash(MessageDigest::sha1(), ENTITY_ID.as_bytes()).unwrap();
        assert_eq!(&decoded[4..24], source_id.as_ref());
    }

    #[test]
    fn message_handles_are_distinct() {
        let a = BASE64.decode(new_artifact(ENTITY_ID).unwrap()).unwrap();
        let b = BASE64.decode(new_artifact(ENTITY_ID).unwrap()).unwrap();
        assert_eq!(a[..24], b[..24]);
        assert_ne!(a[24..], b[24..]);
    }
}
