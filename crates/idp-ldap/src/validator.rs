//! Password validator trait and the LDAP search-then-bind implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, Scope, SearchEntry};
use tracing::{debug, warn};

use crate::config::LdapConfig;
use crate::error::{LdapError, LdapResult};
use crate::escape::escape_filter;

/// Directory attributes requested for authenticated users.
const USER_ATTRIBUTES: [&str; 6] = ["cn", "gidNumber", "memberUid", "uid", "uidNumber", "mail"];

/// Validates a username/password pair and produces the user's attributes.
///
/// `Err(LdapError::InvalidPassword)` covers both unknown accounts and wrong
/// passwords. Implementations must be safe to call from many request tasks at
/// once.
#[async_trait]
pub trait PasswordValidator: Send + Sync {
    /// Checks the credentials and returns the user's attribute map.
    async fn validate(
        &self,
        username: &str,
        password: &str,
    ) -> LdapResult<HashMap<String, Vec<String>>>;
}

/// LDAP bind-based validator.
///
/// Searches for `(cn=<user>)` under the configured base, then proves the
/// password by binding as each candidate entry's DN. The first successful
/// bind wins and returns that entry's attributes.
pub struct LdapPasswordValidator {
    config: LdapConfig,
}

impl LdapPasswordValidator {
    /// Creates a validator over the given settings.
    #[must_use]
    pub fn new(config: LdapConfig) -> Self {
        Self { config }
    }

    /// Opens a connection and binds with the given credentials.
    ///
    /// An empty DN binds anonymously.
    async fn connect(&self, bind_dn: &str, password: &str) -> LdapResult<Ldap> {
        let (conn, mut ldap) = LdapConnAsync::new(&self.config.addr)
            .await
            .map_err(|e| LdapError::Connection(e.to_string()))?;
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!("LDAP connection driver error: {e}");
            }
        });

        if bind_dn.is_empty() {
            return Ok(ldap);
        }

        let result = ldap
            .simple_bind(bind_dn, password)
            .await
            .map_err(|e| LdapError::Bind(e.to_string()))?;
        match result.rc {
            0 => Ok(ldap),
            // 49: invalidCredentials
            49 => Err(LdapError::InvalidPassword),
            rc => Err(LdapError::Bind(format!("bind failed with result code {rc}"))),
        }
    }

    /// Finds candidate entries for a username.
    async fn search_user(&self, username: &str) -> LdapResult<Vec<SearchEntry>> {
        let mut ldap = self
            .connect(&self.config.bind_dn, &self.config.bind_dn_credential)
            .await?;

        let filter = format!("(cn={})", escape_filter(username));
        let (entries, _result) = ldap
            .search(
                &self.config.search_base,
                Scope::Subtree,
                &filter,
                USER_ATTRIBUTES.to_vec(),
            )
            .await
            .map_err(|e| LdapError::Search(e.to_string()))?
            .success()
            .map_err(|e| LdapError::Search(e.to_string()))?;

        let _ = ldap.unbind().await;
        Ok(entries.into_iter().map(SearchEntry::construct).collect())
    }
}

#[async_trait]
impl PasswordValidator for LdapPasswordValidator {
    async fn validate(
        &self,
        username: &str,
        password: &str,
    ) -> LdapResult<HashMap<String, Vec<String>>> {
        // An empty password would turn the proof bind into an anonymous
        // bind, which directories accept.
        if password.is_empty() {
            return Err(LdapError::InvalidPassword);
        }

        let entries = self.search_user(username).await?;
        if entries.is_empty() {
            debug!(%username, "no directory entry matched");
            return Err(LdapError::InvalidPassword);
        }

        for entry in entries {
            match self.connect(&entry.dn, password).await {
                Ok(mut ldap) => {
                    let _ = ldap.unbind().await;
                    debug!(%username, dn = %entry.dn, "password bind succeeded");
                    let mut attrs = HashMap::new();
                    for name in USER_ATTRIBUTES {
                        if let Some(values) = entry.attrs.get(name) {
                            attrs.insert(name.to_string(), values.clone());
                        }
                    }
                    return Ok(attrs);
                }
                Err(LdapError::InvalidPassword) => continue,
                Err(e) => {
                    warn!(%username, dn = %entry.dn, error = %e, "password bind errored");
                    continue;
                }
            }
        }

        Err(LdapError::InvalidPassword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_uses_escaped_username() {
        let filter = format!("(cn={})", escape_filter("*)(uid=*"));
        assert_eq!(filter, "(cn=\\2a\\29\\28uid=\\2a)");
    }

    #[tokio::test]
    async fn empty_password_short_circuits() {
        // Must fail before any network traffic; the address is unroutable
        // and would otherwise produce a connection error.
        let validator = LdapPasswordValidator::new(LdapConfig {
            addr: "ldap://192.0.2.1:389".to_string(),
            ..LdapConfig::default()
        });
        let err = validator.validate("alice", "").await.unwrap_err();
        assert!(matches!(err, LdapError::InvalidPassword));
    }
}
