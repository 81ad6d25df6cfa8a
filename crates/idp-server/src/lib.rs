//! # idp-server
//!
//! The SAML IdP engine: protocol handlers for every endpoint, response
//! building and binding dispatch, the session cookie lifecycle, attribute
//! assembly, auditing, and the bootstrap that assembles all of it from
//! configuration.
//!
//! The HTTP listener itself is external. TLS termination in particular
//! happens in front of this router; a verified client certificate reaches the
//! engine as a [`ClientCert`] request extension.

#![forbid(unsafe_code)]

pub mod attributes;
pub mod audit;
pub mod bootstrap;
pub mod config;
pub mod handlers;
pub mod respond;
pub mod router;
pub mod session;
pub mod state;
pub mod tls;

pub use audit::{Auditor, NullAuditor};
pub use bootstrap::{serve, Idp, IdpBuilder};
pub use config::IdpConfig;
pub use state::{ClientCert, IdpState};
