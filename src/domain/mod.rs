//! Domain models for the bundle updater
//!
//! Plain value types shared by every component: version tokens and their
//! ordering, bundle locations, and the persisted active-bundle record.

pub mod location;
pub mod record;
pub mod version;

pub use location::{Location, SHIPPED_SCHEME};
pub use record::BundleRecord;
pub use version::{
    BundleVersion, LexicographicComparator, RETIRED_SUFFIX, STAGING_SUFFIX, SemanticComparator,
    VersionComparator, VersionOrdering,
};
