//! IdP assembly.
//!
//! [`IdpBuilder`] turns an [`IdpConfig`] into a running engine: resolve the
//! derived constants, seed and fetch the SP registry, load signing material,
//! create the two caches, and wire the validator, attribute sources, and
//! auditor. Every collaborator can be overridden before `build`, which is
//! how tests inject stub validators and fixed signers.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use idp_cache::{CacheStore, MemoryCache};
use idp_ldap::{LdapPasswordValidator, PasswordValidator};
use idp_registry::{ingest_all, SpRegistry};
use idp_saml::metadata::IdpEndpoints;
use idp_saml::signature::AssertionSigner;
use idp_saml::{SamlError, SamlResult};
use tracing::{info, warn};

use crate::attributes::{AttributeSource, ConfigAttributeSource};
use crate::audit::{Auditor, NullAuditor};
use crate::config::IdpConfig;
use crate::router::build_router;
use crate::state::{Engine, IdpState};
use crate::tls;

/// A fully assembled IdP.
pub struct Idp {
    state: IdpState,
    router: Router,
}

impl Idp {
    /// Assembles an IdP from configuration with default collaborators.
    pub async fn from_config(config: IdpConfig) -> SamlResult<Self> {
        IdpBuilder::new(config).build().await
    }

    /// Starts a builder for overriding collaborators.
    #[must_use]
    pub fn builder(config: IdpConfig) -> IdpBuilder {
        IdpBuilder::new(config)
    }

    /// The shared engine state.
    #[must_use]
    pub fn state(&self) -> IdpState {
        Arc::clone(&self.state)
    }

    /// The HTTP router serving the full SAML surface.
    #[must_use]
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Builder for [`Idp`].
pub struct IdpBuilder {
    config: IdpConfig,
    signer: Option<AssertionSigner>,
    password_validator: Option<Arc<dyn PasswordValidator>>,
    attribute_sources: Option<Vec<Arc<dyn AttributeSource>>>,
    auditor: Option<Arc<dyn Auditor>>,
}

impl IdpBuilder {
    /// Creates a builder over the given configuration.
    #[must_use]
    pub fn new(config: IdpConfig) -> Self {
        Self {
            config,
            signer: None,
            password_validator: None,
            attribute_sources: None,
            auditor: None,
        }
    }

    /// Overrides the assertion signer.
    #[must_use]
    pub fn signer(mut self, signer: AssertionSigner) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Overrides the password validator.
    #[must_use]
    pub fn password_validator(mut self, validator: Arc<dyn PasswordValidator>) -> Self {
        self.password_validator = Some(validator);
        self
    }

    /// Overrides the attribute source chain.
    #[must_use]
    pub fn attribute_sources(mut self, sources: Vec<Arc<dyn AttributeSource>>) -> Self {
        self.attribute_sources = Some(sources);
        self
    }

    /// Overrides the auditor.
    #[must_use]
    pub fn auditor(mut self, auditor: Arc<dyn Auditor>) -> Self {
        self.auditor = Some(auditor);
        self
    }

    /// Assembles the engine and router.
    pub async fn build(self) -> SamlResult<Idp> {
        let config = self.config;

        // Constants derived from configuration.
        let entity_id = config.effective_entity_id();
        let endpoints = IdpEndpoints {
            sso_location: config.location(&config.sso_service_path),
            slo_location: config.location(&config.slo_service_path),
            artifact_location: config.location(&config.artifact_service_path),
        };

        // Registered SPs: persisted entries first, then the metadata URLs,
        // fetched concurrently. Fetch errors are logged per URL and do not
        // abort startup.
        let registry = Arc::new(SpRegistry::new());
        for mut sp in config.sps.clone() {
            sp.parse_certificate()?;
            registry.upsert(sp);
        }
        let urls: Vec<String> = config
            .sp_metadata_urls
            .iter()
            .map(|entry| entry.url.clone())
            .collect();
        if !urls.is_empty() {
            let ingested = ingest_all(&registry, &urls).await;
            info!(ingested, total = urls.len(), "fetched service provider metadata");
        }

        let signer = match self.signer {
            Some(signer) => signer,
            None => tls::load_signer(&config)?,
        };

        let temp_cache: Arc<dyn CacheStore> = Arc::new(MemoryCache::new(Duration::from_secs(
            config.temp_cache_duration,
        )));
        let user_cache: Arc<dyn CacheStore> = Arc::new(MemoryCache::new(Duration::from_secs(
            config.user_cache_duration,
        )));

        let password_validator = match self.password_validator {
            Some(validator) => validator,
            None => Arc::new(LdapPasswordValidator::new(config.ldap.clone())),
        };

        let attribute_sources = self.attribute_sources.unwrap_or_else(|| {
            vec![Arc::new(ConfigAttributeSource::new(&config.users)) as Arc<dyn AttributeSource>]
        });

        let auditor = self.auditor.unwrap_or_else(|| Arc::new(NullAuditor));

        if !config.tls_enable {
            warn!(
                "tls-enable is off: artifact resolution and attribute query require a TLS \
                 client certificate and cannot be served over plain HTTP"
            );
        }

        let state: IdpState = Arc::new(Engine {
            entity_id,
            server_name: config.server_name.clone(),
            cookie_name: config.cookie_name.clone(),
            secure_cookies: config.tls_enable,
            tls_enabled: config.tls_enable,
            attribute_name_format: config.saml_attribute_name_format.clone(),
            endpoints,
            registry,
            temp_cache,
            user_cache,
            signer: Arc::new(signer),
            password_validator,
            attribute_sources,
            auditor,
        });

        let router = build_router(&config, Arc::clone(&state));
        Ok(Idp { state, router })
    }
}

/// Runs the IdP on its configured listen address until the process ends.
pub async fn serve(idp: &Idp, listen_address: &str) -> SamlResult<()> {
    let listener = tokio::net::TcpListener::bind(listen_address)
        .await
        .map_err(|e| SamlError::ConfigInvalid(format!("cannot bind {listen_address}: {e}")))?;
    info!(%listen_address, "identity provider listening");
    axum::serve(
        listener,
        idp.router()
            .into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .map_err(|e| SamlError::Internal(e.to_string()))
}
