//! # idp-saml
//!
//! SAML 2.0 protocol implementation for the IdP:
//!
//! - **Request parsing** - AuthnRequest, LogoutRequest, and the SOAP-wrapped
//!   ArtifactResolve / ECP / AttributeQuery messages
//! - **Response rendering** - signed `Response`/`Assertion` documents and the
//!   SOAP envelopes that carry them
//! - **Bindings** - HTTP-Redirect (deflate + base64) and HTTP-POST codecs
//! - **XML signature** - enveloped XML-DSig over assertions, detached
//!   signature verification over redirect query strings
//! - **Artifacts** - the 44-byte SAML 2.0 artifact layout
//!
//! Signing operates on rendered octets: an assertion is serialized exactly
//! once, the signature is inserted into that string, and the surrounding
//! response embeds the signed fragment verbatim. Nothing is re-serialized
//! after signing.
//!
//! # SAML Specifications
//!
//! - [SAML 2.0 Core](https://docs.oasis-open.org/security/saml/v2.0/saml-core-2.0-os.pdf)
//! - [SAML 2.0 Bindings](https://docs.oasis-open.org/security/saml/v2.0/saml-bindings-2.0-os.pdf)
//! - [XML Signature](https://www.w3.org/TR/xmldsig-core1/)

#![forbid(unsafe_code)]

pub mod artifact;
pub mod bindings;
pub mod error;
pub mod metadata;
pub mod signature;
pub mod types;

pub use error::{SamlError, SamlResult};
