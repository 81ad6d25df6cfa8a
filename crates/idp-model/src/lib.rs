//! # idp-model
//!
//! Domain models shared across the IdP workspace: the session-scoped
//! [`User`], the cache-serializable authentication and logout requests, and
//! the artifact response blob.
//!
//! Everything here is plain serde data. The protocol engine serializes these
//! types into the request/user caches and deserializes them back on the other
//! side of a redirect, so all types round-trip through JSON.

#![forbid(unsafe_code)]

mod request;
mod user;

pub use request::{AuthnRequest, LogoutRequest, StoredResponse};
pub use user::{Attribute, LoginType, User};
