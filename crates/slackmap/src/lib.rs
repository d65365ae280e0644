//! Slackmap storage layer.
//!
//! Adapters and services built on `slackmap_core`: storage backends, the query and
//! batch-write layer, the per-entity repository, change-stream dispatch and the
//! external-API cache.

pub mod cache;
pub mod config;
pub mod query;
pub mod repository;
pub mod storage;
pub mod stream;
pub mod telemetry;

pub use config::Config;
pub use repository::SlackmapRepository;
