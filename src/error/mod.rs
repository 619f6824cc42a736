//! Error types and handling for the bundle updater
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`network`]: Remote check and download errors
//! - [`install`]: Checksum, extraction and promotion errors
//! - [`fs`]: File system errors
//! - [`config`]: Configuration errors
//!
//! Every component returns these errors to its caller. Only the update manager
//! swallows them, converting each one into "keep the baseline bundle".

pub mod config;
pub mod fs;
pub mod install;
pub mod network;

pub use config::{
    invalid as config_invalid, parse_failed as config_parse_failed,
    read_failed as config_read_failed,
};
pub use fs::file_operation;
pub use install::{checksum_mismatch, missing_entry, unzip_failed};
pub use network::{decode_failed, invalid_url, network_failed, no_data, server_error};

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for updater operations
#[derive(Error, Diagnostic, Debug)]
pub enum UpdaterError {
    // Network errors
    #[error("Network request failed: {message}")]
    #[diagnostic(
        code(bundle_updater::network::failed),
        help("Check connectivity to the update service; the current bundle stays active")
    )]
    Network { message: String },

    #[error("Invalid URL: {url}")]
    #[diagnostic(code(bundle_updater::network::invalid_url))]
    InvalidUrl { url: String },

    #[error("Server responded with status {status}")]
    #[diagnostic(code(bundle_updater::network::server))]
    Server { status: u16 },

    #[error("Failed to decode update response: {reason}")]
    #[diagnostic(code(bundle_updater::network::decode))]
    Decode { reason: String },

    #[error("No data received from {url}")]
    #[diagnostic(code(bundle_updater::network::no_data))]
    NoData { url: String },

    // Install errors
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    #[diagnostic(
        code(bundle_updater::install::checksum_mismatch),
        help("The downloaded archive may be corrupted or the published checksum is stale")
    )]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Failed to extract archive {archive}: {reason}")]
    #[diagnostic(code(bundle_updater::install::unzip))]
    Unzip { archive: String, reason: String },

    #[error("Bundle entry '{entry}' missing from extracted archive at {staging}")]
    #[diagnostic(
        code(bundle_updater::install::missing_entry),
        help("The archive must contain the configured entry file at its root")
    )]
    MissingEntry { entry: String, staging: String },

    // File system errors
    #[error("File operation failed on {path}: {reason}")]
    #[diagnostic(code(bundle_updater::fs::operation_failed))]
    FileOperation { path: String, reason: String },

    // Configuration errors
    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(bundle_updater::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(bundle_updater::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(bundle_updater::config::invalid))]
    ConfigInvalid { message: String },
}

impl From<std::io::Error> for UpdaterError {
    fn from(err: std::io::Error) -> Self {
        UpdaterError::FileOperation {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for UpdaterError {
    fn from(err: serde_json::Error) -> Self {
        UpdaterError::Decode {
            reason: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for UpdaterError {
    fn from(err: serde_yaml::Error) -> Self {
        UpdaterError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for UpdaterError {
    fn from(err: zip::result::ZipError) -> Self {
        UpdaterError::Unzip {
            archive: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for UpdaterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            UpdaterError::Decode {
                reason: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            UpdaterError::Server {
                status: status.as_u16(),
            }
        } else {
            UpdaterError::Network {
                message: err.to_string(),
            }
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, UpdaterError>;
