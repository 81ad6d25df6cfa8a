//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// SAML 2.0 Identity Provider.
#[derive(Debug, Parser)]
#[command(name = "idp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, env = "IDP_CONFIG", default_value = "idp.toml")]
    pub config: PathBuf,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server.
    Serve,

    /// Add resources to the configuration.
    #[command(subcommand)]
    Add(AddCommand),

    /// Hash a password for use with the example user store.
    Hash,

    /// Cluster management commands.
    #[command(subcommand)]
    Cluster(ClusterCommand),
}

/// `add` subcommands.
#[derive(Debug, Subcommand)]
pub enum AddCommand {
    /// Parse service provider metadata into the configuration file.
    #[command(name = "service-provider")]
    ServiceProvider {
        /// Metadata file path or URL.
        source: String,
    },
}

/// `cluster` subcommands. Clustering of session state is out of scope; the
/// command surface exists so deployments can script against it.
#[derive(Debug, Subcommand)]
pub enum ClusterCommand {
    /// Show the cluster status of this node.
    Status,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn add_service_provider_parses() {
        let cli = Cli::parse_from([
            "idp",
            "add",
            "service-provider",
            "https://sp.example/metadata",
        ]);
        match cli.command {
            Command::Add(AddCommand::ServiceProvider { source }) => {
                assert_eq!(source, "https://sp.example/metadata");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_path_flag_overrides_default() {
        let cli = Cli::parse_from(["idp", "--config", "/etc/idp/idp.toml", "serve"]);
        assert_eq!(cli.config, PathBuf::from("/etc/idp/idp.toml"));
    }
}
