//! Metadata fetch and startup fan-out.

use std::sync::Arc;

use idp_saml::{SamlError, SamlResult};
use tracing::{error, info};

use crate::metadata::parse_sp_metadata;
use crate::registry::SpRegistry;
use crate::sp::ServiceProvider;

/// Fetches and parses SP metadata from a URL.
pub async fn fetch_metadata(url: &str) -> SamlResult<ServiceProvider> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| SamlError::MalformedMetadata(format!("fetch failed: {e}")))?;
    if !response.status().is_success() {
        return Err(SamlError::MalformedMetadata(format!(
            "unexpected status code {} when requesting metadata",
            response.status().as_u16()
        )));
    }
    let body = response
        .text()
        .await
        .map_err(|e| SamlError::MalformedMetadata(format!("unreadable body: {e}")))?;
    parse_sp_metadata(&body)
}

/// Fetches every configured metadata URL concurrently and upserts the
/// results.
///
/// Each fetch runs as its own task; failures are logged per URL and do not
/// abort the others. The call returns once every fetch has finished, with the
/// number of providers ingested.
pub async fn ingest_all(registry: &Arc<SpRegistry>, urls: &[String]) -> usize {
    let mut handles = Vec::with_capacity(urls.len());
    for url in urls {
        let url = url.clone();
        let registry = Arc::clone(registry);
        handles.push(tokio::spawn(async move {
            info!(%url, "fetching service provider metadata");
            match fetch_metadata(&url).await {
                Ok(sp) => {
                    info!(%url, entity_id = %sp.entity_id, "registered service provider");
                    registry.upsert(sp);
                    true
                }
                Err(e) => {
                    error!(%url, error = %e, "failed to ingest service provider metadata");
                    false
                }
            }
        }));
    }

    let mut ingested = 0;
    for handle in handles {
        if matches!(handle.await, Ok(true)) {
            ingested += 1;
        }
    }
    ingested
}
