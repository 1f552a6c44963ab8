use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::report::ManifestReport;

const UNKNOWN_ISSUER: &str = "Unknown";
const UNKNOWN_GENERATOR: &str = "Unknown";
const UNKNOWN_FORMAT: &str = "unknown";

/// Normalized view of the active manifest.
///
/// Every field is always present: missing or empty values in the report
/// fall back to a fixed default rather than failing the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestDetails {
    pub title: String,
    pub issuer: String,
    pub sign_time: Option<String>,
    pub claim_generator: String,
    /// `claim_generator` as shown in the client's "Produced With" line
    pub claim_generator_display: String,
    pub format: String,
    pub instance_id: Option<String>,
    pub thumbnail: Option<Value>,
    pub assertions: Vec<Value>,
    pub ingredients: Vec<Value>,
}

impl ManifestDetails {
    /// Project the active manifest of `report`; `fallback_title` is used
    /// when the manifest has no title.
    pub fn from_report(report: &ManifestReport, fallback_title: &str) -> Self {
        let empty = Map::new();
        let manifest = report.active_manifest().unwrap_or(&empty);
        let signature = manifest.get("signature_info");

        let claim_generator = non_empty_str(manifest.get("claim_generator"))
            .unwrap_or(UNKNOWN_GENERATOR)
            .to_string();

        Self {
            title: non_empty_str(manifest.get("title"))
                .unwrap_or(fallback_title)
                .to_string(),
            issuer: non_empty_str(signature.and_then(|s| s.get("issuer")))
                .unwrap_or(UNKNOWN_ISSUER)
                .to_string(),
            sign_time: non_empty_str(signature.and_then(|s| s.get("time")))
                .map(str::to_owned),
            claim_generator_display: display_claim_generator(&claim_generator),
            claim_generator,
            format: non_empty_str(manifest.get("format"))
                .unwrap_or(UNKNOWN_FORMAT)
                .to_string(),
            instance_id: non_empty_str(manifest.get("instance_id")).map(str::to_owned),
            thumbnail: manifest.get("thumbnail").filter(|v| !v.is_null()).cloned(),
            assertions: array_or_empty(manifest.get("assertions")),
            ingredients: array_or_empty(manifest.get("ingredients")),
        }
    }
}

/// First whitespace-delimited token with `_` and `/` turned into spaces.
///
/// `"my_tool/v2 extra"` becomes `"my tool v2"`.
pub fn display_claim_generator(claim_generator: &str) -> String {
    claim_generator
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .replace(['_', '/'], " ")
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn array_or_empty(value: Option<&Value>) -> Vec<Value> {
    value
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report(value: Value) -> ManifestReport {
        ManifestReport::from_value(value).unwrap()
    }

    #[test]
    fn test_claim_generator_display() {
        assert_eq!(display_claim_generator("my_tool/v2 extra"), "my tool v2");
        assert_eq!(display_claim_generator("c2patool/0.9.12"), "c2patool 0.9.12");
        assert_eq!(display_claim_generator("Unknown"), "Unknown");
        assert_eq!(display_claim_generator(""), "");
    }

    #[test]
    fn test_details_from_full_manifest() {
        let report = report(json!({
            "active_manifest": "urn:uuid:1",
            "manifests": {
                "urn:uuid:1": {
                    "title": "sunset.jpg",
                    "format": "image/jpeg",
                    "instance_id": "xmp:iid:1234",
                    "claim_generator": "make_test_images/0.16.1 c2pa-rs/0.16.1",
                    "thumbnail": { "format": "image/jpeg", "identifier": "self#jumbf=t" },
                    "signature_info": {
                        "issuer": "C2PA Test Signing Cert",
                        "time": "2024-05-01T10:00:07+00:00"
                    },
                    "assertions": [{ "label": "c2pa.actions" }],
                    "ingredients": [{ "title": "original.jpg" }]
                }
            }
        }));

        let details = ManifestDetails::from_report(&report, "fallback.jpg");

        assert_eq!(details.title, "sunset.jpg");
        assert_eq!(details.issuer, "C2PA Test Signing Cert");
        assert_eq!(details.sign_time.as_deref(), Some("2024-05-01T10:00:07+00:00"));
        assert_eq!(details.claim_generator, "make_test_images/0.16.1 c2pa-rs/0.16.1");
        assert_eq!(details.claim_generator_display, "make test images 0.16.1");
        assert_eq!(details.format, "image/jpeg");
        assert_eq!(details.instance_id.as_deref(), Some("xmp:iid:1234"));
        assert!(details.thumbnail.is_some());
        assert_eq!(details.assertions.len(), 1);
        assert_eq!(details.ingredients.len(), 1);
    }

    #[test]
    fn test_details_defaults_when_fields_missing() {
        let report = report(json!({
            "active_manifest": "a",
            "manifests": { "a": { "title": "", "assertions": "not-a-list" } }
        }));

        let details = ManifestDetails::from_report(&report, "upload.png");

        assert_eq!(details.title, "upload.png");
        assert_eq!(details.issuer, "Unknown");
        assert_eq!(details.sign_time, None);
        assert_eq!(details.claim_generator, "Unknown");
        assert_eq!(details.format, "unknown");
        assert_eq!(details.instance_id, None);
        assert_eq!(details.thumbnail, None);
        assert!(details.assertions.is_empty());
        assert!(details.ingredients.is_empty());
    }

    #[test]
    fn test_details_without_active_manifest() {
        let details = ManifestDetails::from_report(&report(json!({})), "x.jpg");
        assert_eq!(details.title, "x.jpg");
        assert_eq!(details.issuer, "Unknown");
    }

    #[test]
    fn test_serialized_fields_are_never_absent() {
        let details = ManifestDetails::from_report(&report(json!({})), "x.jpg");
        let value = serde_json::to_value(&details).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "title",
            "issuer",
            "signTime",
            "claimGenerator",
            "claimGeneratorDisplay",
            "format",
            "instanceId",
            "thumbnail",
            "assertions",
            "ingredients",
        ] {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert!(object["signTime"].is_null());
        assert_eq!(object["assertions"], json!([]));
    }
}
