use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage topology of a manifest.
///
/// Rendered into reports as `Embedded`, `Sidecar` or `Remote: <url>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestLocation {
    Embedded,
    Sidecar,
    Remote(String),
}

impl ManifestLocation {
    pub fn manifest_type(&self) -> ManifestType {
        match self {
            ManifestLocation::Embedded => ManifestType::Embedded,
            ManifestLocation::Sidecar => ManifestType::Sidecar,
            ManifestLocation::Remote(_) => ManifestType::Remote,
        }
    }
}

impl fmt::Display for ManifestLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestLocation::Embedded => f.write_str("Embedded"),
            ManifestLocation::Sidecar => f.write_str("Sidecar"),
            ManifestLocation::Remote(url) => write!(f, "Remote: {}", url),
        }
    }
}

/// `manifestType` value of a response payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestType {
    Embedded,
    Sidecar,
    Remote,
    None,
}
