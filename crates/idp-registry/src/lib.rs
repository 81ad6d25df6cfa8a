//! # idp-registry
//!
//! Service provider knowledge: metadata ingestion, the entity-ID-keyed
//! registry, and ACS/SLO endpoint selection.
//!
//! The registry is read-mostly. Upserts install a fresh immutable snapshot;
//! request handlers clone the current snapshot pointer and read without
//! locks.

#![forbid(unsafe_code)]

mod ingest;
mod metadata;
mod registry;
mod sp;

pub use ingest::{fetch_metadata, ingest_all};
pub use metadata::parse_sp_metadata;
pub use registry::SpRegistry;
pub use sp::{Endpoint, ServiceProvider};
