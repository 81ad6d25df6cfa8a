//! # idp-ldap
//!
//! The password-validation seam of the IdP and its LDAP implementation.
//!
//! [`PasswordValidator`] is the capability the protocol engine holds: given a
//! username and password it either returns the user's directory attributes or
//! fails. The LDAP implementation does a search-then-bind: look the user up
//! under the configured search base, then prove the password by binding as
//! the entry's DN.

#![forbid(unsafe_code)]

mod config;
mod error;
mod escape;
mod validator;

pub use config::LdapConfig;
pub use error::{LdapError, LdapResult};
pub use escape::escape_filter;
pub use validator::{LdapPasswordValidator, PasswordValidator};
