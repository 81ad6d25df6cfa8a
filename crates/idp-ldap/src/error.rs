//! LDAP error types.

use thiserror::Error;

/// Result type for LDAP operations.
pub type LdapResult<T> = Result<T, LdapError>;

/// Errors from the password validator.
#[derive(Debug, Error)]
pub enum LdapError {
    /// Unknown account or wrong password.
    #[error("invalid login or password")]
    InvalidPassword,

    /// The directory could not be reached.
    #[error("LDAP connection error: {0}")]
    Connection(String),

    /// A bind operation failed for a reason other than bad credentials.
    #[error("LDAP bind error: {0}")]
    Bind(String),

    /// A search operation failed.
    #[error("LDAP search error: {0}")]
    Search(String),
}

impl LdapError {
    /// True for upstream faults (as opposed to a genuinely bad password).
    ///
    /// The engine logs these and still reports `InvalidPassword` to the
    /// browser, so a caller cannot probe for directory outages.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        !matches!(self, Self::InvalidPassword)
    }
}
