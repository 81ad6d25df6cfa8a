//! IdP configuration.
//!
//! The CLI loads this from a TOML file with kebab-case keys and hands the
//! typed struct to the bootstrap. Every field has a default, so an empty file
//! yields a development IdP on `127.0.0.1:9443`.

use std::collections::HashMap;

use idp_ldap::LdapConfig;
use idp_registry::ServiceProvider;
use serde::{Deserialize, Serialize};

/// A configured SP metadata endpoint fetched at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpMetadataUrl {
    /// The metadata URL.
    pub url: String,
}

/// A static user→attribute table entry for the default attribute source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAttributes {
    /// The username the attributes belong to.
    pub name: String,
    /// Attributes appended to matching authenticated users.
    #[serde(default)]
    pub attributes: HashMap<String, Vec<String>>,
}

/// Complete IdP configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct IdpConfig {
    /// Session cookie name.
    pub cookie_name: String,
    /// TLS certificate path (PEM). Empty or missing falls back to the
    /// built-in development pair.
    pub tls_certificate: String,
    /// TLS private key path (PEM).
    pub tls_private_key: String,
    /// CA bundle path handed to the fronting TLS listener.
    pub tls_ca: String,
    /// Address the listener binds.
    pub listen_address: String,
    /// Public host:port of this IdP; used in endpoint locations.
    pub server_name: String,
    /// IdP entity ID; defaults to `<scheme>://<server-name>/`.
    pub entity_id: String,
    /// Metadata endpoint path.
    pub metadata_path: String,
    /// SSO endpoint path (HTTP-Redirect).
    pub sso_service_path: String,
    /// SLO endpoint path (HTTP-Redirect).
    pub slo_service_path: String,
    /// ECP endpoint path (SOAP).
    pub ecp_service_path: String,
    /// Artifact resolution endpoint path (SOAP).
    pub artifact_service_path: String,
    /// Attribute query endpoint path (SOAP).
    pub attribute_service_path: String,
    /// TTL of the request/artifact cache, in seconds.
    pub temp_cache_duration: u64,
    /// TTL of the authenticated-user cache, in seconds.
    pub user_cache_duration: u64,
    /// Outgoing signature algorithm URI; empty means RSA-SHA256.
    pub signature_algorithm: String,
    /// Outgoing digest algorithm URI; empty means SHA-256.
    pub digest_algorithm: String,
    /// NameFormat attribute for emitted SAML attributes.
    pub saml_attribute_name_format: String,
    /// Whether the fronting listener speaks TLS; drives the URL scheme, the
    /// cookie `Secure` flag, and the client-certificate endpoints.
    pub tls_enable: bool,
    /// SP metadata endpoints fetched concurrently at startup.
    pub sp_metadata_urls: Vec<SpMetadataUrl>,
    /// Persisted SP registry.
    pub sps: Vec<ServiceProvider>,
    /// LDAP validator settings.
    pub ldap: LdapConfig,
    /// Static user→attribute table.
    pub users: Vec<UserAttributes>,
}

impl Default for IdpConfig {
    fn default() -> Self {
        Self {
            cookie_name: "idp-sess".to_string(),
            tls_certificate: String::new(),
            tls_private_key: String::new(),
            tls_ca: String::new(),
            listen_address: "127.0.0.1:9443".to_string(),
            server_name: "localhost:9443".to_string(),
            entity_id: String::new(),
            metadata_path: "/idp/metadata".to_string(),
            sso_service_path: "/idp/SAML2/Redirect/SSO".to_string(),
            slo_service_path: "/idp/SAML2/Redirect/SLO".to_string(),
            ecp_service_path: "/idp/SAML2/SOAP/ECP".to_string(),
            artifact_service_path: "/idp/SAML2/SOAP/ArtifactResolution".to_string(),
            attribute_service_path: "/idp/SAML2/SOAP/AttributeQuery".to_string(),
            temp_cache_duration: 300,
            user_cache_duration: 28800,
            signature_algorithm: String::new(),
            digest_algorithm: String::new(),
            saml_attribute_name_format: "urn:oasis:names:tc:SAML:2.0:attrname-format:basic"
                .to_string(),
            sp_metadata_urls: Vec::new(),
            sps: Vec::new(),
            ldap: LdapConfig::default(),
            users: Vec::new(),
            tls_enable: false,
        }
    }
}

impl IdpConfig {
    /// URL scheme implied by `tls-enable`.
    #[must_use]
    pub fn scheme(&self) -> &'static str {
        if self.tls_enable {
            "https"
        } else {
            "http"
        }
    }

    /// The effective entity ID.
    #[must_use]
    pub fn effective_entity_id(&self) -> String {
        if self.entity_id.is_empty() {
            format!("{}://{}/", self.scheme(), self.server_name)
        } else {
            self.entity_id.clone()
        }
    }

    /// Absolute location of an endpoint path.
    #[must_use]
    pub fn location(&self, path: &str) -> String {
        format!("{}://{}{}", self.scheme(), self.server_name, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_surface() {
        let config = IdpConfig::default();
        assert_eq!(config.cookie_name, "idp-sess");
        assert_eq!(config.sso_service_path, "/idp/SAML2/Redirect/SSO");
        assert_eq!(config.temp_cache_duration, 300);
        assert_eq!(config.user_cache_duration, 28800);
        assert_eq!(
            config.effective_entity_id(),
            "http://localhost:9443/"
        );
    }

    #[test]
    fn entity_id_follows_tls_scheme() {
        let config = IdpConfig {
            tls_enable: true,
            ..IdpConfig::default()
        };
        assert_eq!(config.effective_entity_id(), "https://localhost:9443/");
        assert_eq!(
            config.location("/idp/metadata"),
            "https://localhost:9443/idp/metadata"
        );
    }

    #[test]
    fn explicit_entity_id_wins() {
        let config = IdpConfig {
            entity_id: "https://idp.example/".to_string(),
            ..IdpConfig::default()
        };
        assert_eq!(config.effective_entity_id(), "https://idp.example/");
    }
}
