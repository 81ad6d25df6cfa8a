//! The `add service-provider` command.

use std::path::Path;

use anyhow::Context;
use idp_registry::parse_sp_metadata;

use crate::cli::AddCommand;
use crate::config_file;

/// Ingests SP metadata from a file or URL and persists it.
pub async fn run_add(config_path: &Path, command: AddCommand) -> anyhow::Result<()> {
    let AddCommand::ServiceProvider { source } = command;

    let metadata = read_metadata(&source).await?;
    let sp = parse_sp_metadata(&metadata)
        .map_err(|e| anyhow::anyhow!("unusable service provider metadata: {e}"))?;

    let mut config = config_file::load(config_path)?;
    let entity_id = sp.entity_id.clone();
    match config
        .sps
        .iter_mut()
        .find(|existing| existing.entity_id == entity_id)
    {
        Some(existing) => *existing = sp,
        None => config.sps.push(sp),
    }
    config_file::save(config_path, &config)?;

    println!("Successfully added service provider from metadata {source}");
    Ok(())
}

/// Reads metadata from an absolute URL or a local file path.
async fn read_metadata(source: &str) -> anyhow::Result<String> {
    if let Ok(url) = url::Url::parse(source) {
        if matches!(url.scheme(), "http" | "https") {
            let response = reqwest::get(url.clone())
                .await
                .with_context(|| format!("cannot fetch {source}"))?;
            if !response.status().is_success() {
                anyhow::bail!(
                    "unexpected status code {} when requesting metadata",
                    response.status().as_u16()
                );
            }
            return response.text().await.context("unreadable metadata body");
        }
    }
    std::fs::read_to_string(source).with_context(|| format!("cannot read {source}"))
}
