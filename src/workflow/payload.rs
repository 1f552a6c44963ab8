use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::manifest::{ManifestDetails, ManifestLocation, ManifestReport, ManifestType};

/// Error text returned when verification finds no manifest
pub const NO_MANIFEST_MESSAGE: &str = "No C2PA manifest found";

/// JSON body returned by the sign, verify and import endpoints.
///
/// Optional URLs and `error` are omitted entirely when absent; a missing
/// `sidecarUrl` means there is no sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePayload {
    pub name: String,
    pub original_name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidecar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_manifest_url: Option<String>,
    pub manifest_type: ManifestType,
    pub manifest_details: Option<ManifestDetails>,
    pub report: Option<Value>,
    pub has_manifest: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponsePayload {
    /// Payload for a file whose manifest was found at `location`.
    ///
    /// Stamps `manifestLocation` into the report and derives the details
    /// from its active manifest, falling back to `original_name` as title.
    pub fn with_manifest(
        name: impl Into<String>,
        original_name: impl Into<String>,
        url: impl Into<String>,
        mut report: ManifestReport,
        location: ManifestLocation,
    ) -> Self {
        let original_name = original_name.into();
        report.set_location(&location);
        let details = ManifestDetails::from_report(&report, &original_name);

        Self {
            name: name.into(),
            original_name,
            url: url.into(),
            sidecar_url: None,
            remote_manifest_url: None,
            manifest_type: location.manifest_type(),
            manifest_details: Some(details),
            report: Some(report.into_value()),
            has_manifest: true,
            error: None,
        }
    }

    /// Payload for a file without a readable manifest
    pub fn without_manifest(
        name: impl Into<String>,
        original_name: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            original_name: original_name.into(),
            url: url.into(),
            sidecar_url: None,
            remote_manifest_url: None,
            manifest_type: ManifestType::None,
            manifest_details: None,
            report: None,
            has_manifest: false,
            error: Some(NO_MANIFEST_MESSAGE.to_string()),
        }
    }
}
