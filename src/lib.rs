//! Over-the-air bundle updater
//!
//! Decides which versioned payload bundle a host application loads at
//! startup, and installs newer bundles published by an update service
//! without ever leaving the host without a loadable bundle.
//!
//! - [`resolver`] picks the baseline from the persisted record or fallbacks
//! - [`client`] talks to the update service
//! - [`hash`] verifies downloaded archives
//! - [`installer`] extracts and atomically promotes archives
//! - [`store`] persists the active bundle record
//! - [`manager`] runs the whole startup flow

pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod hash;
pub mod installer;
pub mod logging;
pub mod manager;
pub mod resolver;
pub mod store;

#[cfg(test)]
mod test_fixtures;

pub use config::UpdaterConfig;
pub use domain::{BundleRecord, BundleVersion, Location};
pub use error::{Result, UpdaterError};
pub use manager::{FlowOutcome, FlowState, StartupHandle, StartupReport, UpdateManager};
