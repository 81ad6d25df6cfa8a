//! # idp-cli
//!
//! Command-line surface of the identity provider: `serve`, `add
//! service-provider`, `hash`, and the `cluster` placeholder. Configuration
//! lives in a TOML file with kebab-case keys; `add service-provider` writes
//! ingested metadata back to the same file.

#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config_file;
