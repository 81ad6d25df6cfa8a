//! Service provider record and endpoint selection.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use idp_saml::{SamlError, SamlResult};
use openssl::pkey::{Id, PKey, PKeyRef, Public};
use openssl::x509::X509;
use serde::{Deserialize, Serialize};

/// An ACS or SLO endpoint from SP metadata, kept in metadata order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Endpoint index.
    #[serde(default)]
    pub index: u32,
    /// Whether the metadata marks this endpoint as the default.
    #[serde(default)]
    pub is_default: bool,
    /// Binding URI.
    pub binding: String,
    /// Endpoint location.
    pub location: String,
}

/// A registered service provider.
///
/// The persisted form carries the certificate as base64 DER; the public key
/// is derived once at ingestion and required before the SP can be used for
/// signature verification.
#[derive(Clone, Serialize, Deserialize)]
pub struct ServiceProvider {
    /// Stable entity ID, the registry key.
    pub entity_id: String,
    /// Assertion consumer services in metadata order.
    #[serde(default)]
    pub assertion_consumer_services: Vec<Endpoint>,
    /// Single logout services in metadata order.
    #[serde(default)]
    pub single_logout_services: Vec<Endpoint>,
    /// Signing certificate, base64-encoded DER.
    pub certificate: String,
    #[serde(skip)]
    public_key: Option<Arc<PKey<Public>>>,
}

impl ServiceProvider {
    /// Creates an SP record; call [`parse_certificate`](Self::parse_certificate)
    /// before using it.
    #[must_use]
    pub fn new(
        entity_id: String,
        assertion_consumer_services: Vec<Endpoint>,
        single_logout_services: Vec<Endpoint>,
        certificate: String,
    ) -> Self {
        Self {
            entity_id,
            assertion_consumer_services,
            single_logout_services,
            certificate,
            public_key: None,
        }
    }

    /// Decodes the stored certificate and derives the public key.
    ///
    /// Only RSA and DSA keys are accepted; anything else cannot verify a
    /// redirect signature and would leave the SP half-registered.
    pub fn parse_certificate(&mut self) -> SamlResult<()> {
        let der = BASE64
            .decode(self.certificate.replace(['\n', '\r', ' ', '\t'], ""))
            .map_err(|e| SamlError::InvalidCertificate(format!("not base64 DER: {e}")))?;
        let cert = X509::from_der(&der)
            .map_err(|e| SamlError::InvalidCertificate(format!("not an X.509 certificate: {e}")))?;
        let key = cert
            .public_key()
            .map_err(|e| SamlError::InvalidCertificate(format!("no usable public key: {e}")))?;
        match key.id() {
            Id::RSA | Id::DSA => {}
            other => {
                return Err(SamlError::InvalidCertificate(format!(
                    "unsupported key type {other:?}; expected RSA or DSA"
                )))
            }
        }
        self.public_key = Some(Arc::new(key));
        Ok(())
    }

    /// The derived public key.
    pub fn public_key(&self) -> SamlResult<&PKeyRef<Public>> {
        self.public_key
            .as_deref()
            .map(|k| &**k)
            .ok_or_else(|| {
                SamlError::ConfigInvalid(format!(
                    "service provider {} has no parsed certificate",
                    self.entity_id
                ))
            })
    }

    /// Selects the assertion consumer service for a request.
    ///
    /// Precedence is fixed: an exact index match wins, then an exact location
    /// match, then the first endpoint marked default. A request URL that
    /// disagrees with the selected endpoint is rejected outright so the
    /// response can never be reflected to an unregistered location.
    pub fn select_acs(&self, index: Option<u32>, url: Option<&str>) -> SamlResult<&Endpoint> {
        let services = &self.assertion_consumer_services;

        let by_index =
            index.and_then(|want| services.iter().find(|e| e.index == want));
        let by_location = || {
            url.and_then(|want| services.iter().find(|e| e.location == want))
        };
        let by_default = || services.iter().find(|e| e.is_default);

        let acs = by_index
            .or_else(by_location)
            .or_else(by_default)
            .ok_or(SamlError::NoAcs)?;

        if let Some(want) = url {
            if want != acs.location {
                return Err(SamlError::AcsMismatch);
            }
        }
        Ok(acs)
    }

    /// Selects the single logout service for a request.
    ///
    /// The first metadata entry wins; a request URL that disagrees with it is
    /// rejected.
    pub fn select_slo(&self, url: Option<&str>) -> SamlResult<&Endpoint> {
        let slo = self
            .single_logout_services
            .first()
            .ok_or(SamlError::NoSlo)?;
        if let Some(want) = url {
            if want != slo.location {
                return Err(SamlError::SloMismatch);
            }
        }
        Ok(slo)
    }
}
