//! The `cluster` command.
//!
//! Session state is per-process; clustering is out of scope. The subcommand
//! exists so deployment tooling has a stable surface to query.

use crate::cli::ClusterCommand;

/// Reports the (single-node) cluster status.
pub fn run_cluster(command: ClusterCommand) -> anyhow::Result<()> {
    match command {
        ClusterCommand::Status => {
            println!("clustering is not configured; this node runs standalone");
            Ok(())
        }
    }
}
