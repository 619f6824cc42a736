//! Wire types of the version-check protocol

use serde::{Deserialize, Serialize};

use crate::domain::BundleVersion;

/// Body of the check request. The current bundle version is not sent; the
/// service answers with its latest bundle for this platform and shell.
#[derive(Debug, Clone, Serialize)]
pub struct CheckRequest<'a> {
    pub platform: &'a str,
    pub native_version: &'a str,
}

/// Latest bundle published by the update service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteUpdateInfo {
    #[serde(rename = "rn_version")]
    pub version: BundleVersion,

    #[serde(rename = "rn_zip_url")]
    pub archive_url: String,

    pub checksum: String,
}
