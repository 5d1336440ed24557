//! Common types and utilities shared across Expo crates.
//!
//! This crate defines the run-level error type, the output format enum and
//! the observability helpers used throughout the Expo workspace. It stays
//! dependency-minimal so every crate can depend on it.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`ExpoError`] and [`Result`]: Run-level error handling
//! - [`OutputFormat`]: How harvested records are written out
//!
//! # Examples
//!
//! ```rust
//! use expo_common::OutputFormat;
//!
//! assert_eq!(OutputFormat::default(), OutputFormat::Csv);
//! assert_eq!(OutputFormat::Json.extension(), "json");
//! ```
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod observability;

/// Preferred output format for harvested records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    /// File extension conventionally used for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// Error types that abort a whole run.
///
/// Per-field and per-page failures never surface here; they degrade the
/// affected record instead.
#[derive(thiserror::Error, Debug)]
pub enum ExpoError {
    /// The URL list could not be read.
    #[error("failed to read URL list {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A driver (browser session, HTTP client) could not be started.
    #[error("Driver error: {0}")]
    Driver(#[from] anyhow::Error),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Results could not be written.
    #[error("failed to write {}: {message}", path.display())]
    Export { path: PathBuf, message: String },
}

/// Convenient alias for results that use [`ExpoError`].
pub type Result<T> = std::result::Result<T, ExpoError>;
