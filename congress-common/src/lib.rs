//! # Congress Common Library
//!
//! Shared code for the congressional dataset tools including:
//! - Error types
//! - Configuration loading (TOML + environment)
//! - Atomic file replacement
//! - Date and timestamp helpers

pub mod config;
pub mod error;
pub mod fs;
pub mod time;

pub use error::{Error, Result};
