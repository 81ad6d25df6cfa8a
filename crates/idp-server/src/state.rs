//! Shared engine state.

use std::sync::Arc;

use idp_cache::CacheStore;
use idp_ldap::PasswordValidator;
use idp_registry::SpRegistry;
use idp_saml::metadata::IdpEndpoints;
use idp_saml::signature::AssertionSigner;

use crate::attributes::AttributeSource;
use crate::audit::Auditor;

/// Path of the login page the SSO handler redirects to.
pub const LOGIN_PAGE_PATH: &str = "/idp/static/login.html";

/// A verified TLS client certificate, inserted as a request extension by the
/// fronting listener.
#[derive(Debug, Clone)]
pub struct ClientCert {
    /// The certificate in DER form.
    pub der: Vec<u8>,
}

impl ClientCert {
    /// The subject DN, rendered `Type=value` comma-separated.
    ///
    /// Falls back to an empty string if the DER no longer parses; the
    /// listener already verified it, so that is not treated as fatal here.
    #[must_use]
    pub fn subject_dn(&self) -> String {
        let Ok(cert) = openssl::x509::X509::from_der(&self.der) else {
            return String::new();
        };
        let mut parts = Vec::new();
        for entry in cert.subject_name().entries() {
            let key = entry.object().nid().short_name().unwrap_or("UNKNOWN");
            let value = entry
                .data()
                .as_utf8()
                .map(|s| s.to_string())
                .unwrap_or_default();
            parts.push(format!("{key}={value}"));
        }
        parts.join(",")
    }
}

/// Everything the handlers share, behind one `Arc`.
pub struct Engine {
    /// IdP entity ID.
    pub entity_id: String,
    /// Public server name (host:port).
    pub server_name: String,
    /// Session cookie name.
    pub cookie_name: String,
    /// Whether session cookies carry the `Secure` flag.
    pub secure_cookies: bool,
    /// Whether client-certificate endpoints can be served at all.
    pub tls_enabled: bool,
    /// NameFormat for emitted attributes.
    pub attribute_name_format: String,
    /// Advertised endpoint locations.
    pub endpoints: IdpEndpoints,
    /// Registered service providers.
    pub registry: Arc<SpRegistry>,
    /// Short-TTL cache: pending requests and artifacts.
    pub temp_cache: Arc<dyn CacheStore>,
    /// Long-TTL cache: authenticated users by session UUID.
    pub user_cache: Arc<dyn CacheStore>,
    /// Assertion signer.
    pub signer: Arc<AssertionSigner>,
    /// Password validator.
    pub password_validator: Arc<dyn PasswordValidator>,
    /// Ordered attribute sources.
    pub attribute_sources: Vec<Arc<dyn AttributeSource>>,
    /// Login event sink.
    pub auditor: Arc<dyn Auditor>,
}

/// Cloneable handle to the shared state; what the router carries.
pub type IdpState = Arc<Engine>;
