//! The `serve` command.

use std::path::Path;

use idp_server::{serve, Idp};

use crate::config_file;

/// Loads the configuration, assembles the IdP, and serves until terminated.
pub async fn run_serve(config_path: &Path) -> anyhow::Result<()> {
    let config = config_file::load(config_path)?;
    let listen_address = config.listen_address.clone();

    let idp = Idp::from_config(config)
        .await
        .map_err(|e| anyhow::anyhow!("cannot assemble identity provider: {e}"))?;

    serve(&idp, &listen_address)
        .await
        .map_err(|e| anyhow::anyhow!("server error: {e}"))
}
