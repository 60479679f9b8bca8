//! congress-ingest library interface
//!
//! Fetches congressional hearings, record issues and roll-call votes into
//! deduplicated YAML snapshots, and cleans or merges existing snapshots.

pub mod cleanup;
pub mod config;
pub mod error;
pub mod extractors;
pub mod models;
pub mod services;
pub mod storage;
pub mod types;
pub mod utils;
pub mod validators;
pub mod workflow;

pub use crate::error::ApiError;
pub use crate::types::{Entity, Partition};
