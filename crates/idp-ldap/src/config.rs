//! LDAP settings.

use serde::{Deserialize, Serialize};

/// Connection and search settings for the LDAP validator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LdapConfig {
    /// Directory address, e.g. `ldap://localhost:389` or `ldaps://…:636`.
    pub addr: String,
    /// Admin DN for the search bind; empty means bind anonymously.
    pub bind_dn: String,
    /// Credential for the admin DN.
    pub bind_dn_credential: String,
    /// Subtree to search for user entries.
    pub search_base: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kebab_case_keys_deserialize() {
        let config: LdapConfig = serde_json::from_str(
            r#"{"addr":"ldap://localhost:389","bind-dn":"cn=admin,dc=example,dc=com","bind-dn-credential":"secret","search-base":"ou=people,dc=example,dc=com"}"#,
        )
        .unwrap();
        assert_eq!(config.addr, "ldap://localhost:389");
        assert_eq!(config.bind_dn, "cn=admin,dc=example,dc=com");
        assert_eq!(config.search_base, "ou=people,dc=example,dc=com");
    }
}
