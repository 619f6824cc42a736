//! Where a loadable bundle lives

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Scheme prefix marking an asset inside the host's read-only packaged area
pub const SHIPPED_SCHEME: &str = "assets://";

/// A loadable bundle reference handed to the host runtime.
///
/// Serialized as a single string: a filesystem path, `assets://<asset>`, or an
/// `http(s)://` development-server URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Location {
    /// Bundle file extracted under the install root
    Installed(PathBuf),
    /// Asset shipped inside the host package
    Shipped(String),
    /// Bundle served by a local development server
    DevelopmentServer(String),
}

impl Location {
    pub fn parse(raw: &str) -> Self {
        if let Some(asset) = raw.strip_prefix(SHIPPED_SCHEME) {
            Location::Shipped(asset.to_string())
        } else if raw.starts_with("http://") || raw.starts_with("https://") {
            Location::DevelopmentServer(raw.to_string())
        } else {
            Location::Installed(PathBuf::from(raw))
        }
    }

    /// Filesystem path for installed bundles
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Location::Installed(path) => Some(path),
            _ => None,
        }
    }

    pub fn is_installed(&self) -> bool {
        matches!(self, Location::Installed(_))
    }

    /// True when an installed bundle file is present on disk
    pub fn installed_file_exists(&self) -> bool {
        self.as_path().is_some_and(Path::is_file)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Installed(path) => write!(f, "{}", path.display()),
            Location::Shipped(asset) => write!(f, "{SHIPPED_SCHEME}{asset}"),
            Location::DevelopmentServer(url) => f.write_str(url),
        }
    }
}

impl From<String> for Location {
    fn from(value: String) -> Self {
        Location::parse(&value)
    }
}

impl From<Location> for String {
    fn from(value: Location) -> Self {
        value.to_string()
    }
}
