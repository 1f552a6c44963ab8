use serde_json::{Map, Value};
use thiserror::Error;

use super::location::ManifestLocation;

/// Field added to every report handed back to clients
pub const MANIFEST_LOCATION_FIELD: &str = "manifestLocation";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("report must be a JSON object")]
    NotAnObject,
}

/// JSON report emitted by the provenance tool.
///
/// The tool's fields are kept untouched; only `manifestLocation` is added.
/// Reads are defensive: any field may be missing or have an unexpected
/// shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestReport {
    fields: Map<String, Value>,
}

impl ManifestReport {
    pub fn parse(stdout: &[u8]) -> Result<Self, ReportError> {
        match serde_json::from_slice(stdout)? {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(ReportError::NotAnObject),
        }
    }

    pub fn from_value(value: Value) -> Result<Self, ReportError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(ReportError::NotAnObject),
        }
    }

    /// The manifest selected by `active_manifest`.
    ///
    /// `manifests` is either an object keyed by label (with
    /// `active_manifest` naming a label) or an array (with `active_manifest`
    /// an index or the `label` of an entry). The first entry is never used
    /// as a stand-in.
    pub fn active_manifest(&self) -> Option<&Map<String, Value>> {
        let manifests = self.fields.get("manifests")?;
        let active = self.fields.get("active_manifest")?;

        let entry = match (manifests, active) {
            (Value::Object(by_label), Value::String(label)) => by_label.get(label),
            (Value::Array(list), Value::Number(index)) => index
                .as_u64()
                .and_then(|i| usize::try_from(i).ok())
                .and_then(|i| list.get(i)),
            (Value::Array(list), Value::String(label)) => list
                .iter()
                .find(|m| m.get("label").and_then(Value::as_str) == Some(label.as_str())),
            _ => None,
        }?;

        entry.as_object()
    }

    /// First `validation_status` URL with an HTTP scheme, if any.
    pub fn remote_reference(&self) -> Option<&str> {
        self.fields
            .get("validation_status")?
            .as_array()?
            .iter()
            .filter_map(|status| status.get("url").and_then(Value::as_str))
            .find(|url| url.starts_with("http://") || url.starts_with("https://"))
    }

    pub fn set_location(&mut self, location: &ManifestLocation) {
        self.fields.insert(
            MANIFEST_LOCATION_FIELD.to_string(),
            Value::String(location.to_string()),
        );
    }

    pub fn location(&self) -> Option<&str> {
        self.fields.get(MANIFEST_LOCATION_FIELD)?.as_str()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report(value: Value) -> ManifestReport {
        ManifestReport::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        assert!(matches!(
            ManifestReport::parse(b"[1, 2]"),
            Err(ReportError::NotAnObject)
        ));
        assert!(matches!(
            ManifestReport::parse(b"Error: no manifest"),
            Err(ReportError::Json(_))
        ));
        assert!(ManifestReport::parse(br#"{"manifests": {}}"#).is_ok());
    }

    #[test]
    fn test_active_manifest_by_label_not_first_entry() {
        let report = report(json!({
            "active_manifest": "urn:uuid:second",
            "manifests": {
                "urn:uuid:first": { "title": "ingredient.jpg" },
                "urn:uuid:second": { "title": "signed.jpg" }
            }
        }));

        let active = report.active_manifest().unwrap();
        assert_eq!(active["title"], "signed.jpg");
    }

    #[test]
    fn test_active_manifest_by_index() {
        let report = report(json!({
            "active_manifest": 1,
            "manifests": [
                { "title": "ingredient.jpg" },
                { "title": "signed.jpg" }
            ]
        }));

        assert_eq!(report.active_manifest().unwrap()["title"], "signed.jpg");
    }

    #[test]
    fn test_active_manifest_by_label_in_array() {
        let report = report(json!({
            "active_manifest": "b",
            "manifests": [
                { "label": "a", "title": "ingredient.jpg" },
                { "label": "b", "title": "signed.jpg" }
            ]
        }));

        assert_eq!(report.active_manifest().unwrap()["title"], "signed.jpg");
    }

    #[test]
    fn test_active_manifest_missing() {
        assert!(report(json!({})).active_manifest().is_none());
        assert!(
            report(json!({ "active_manifest": "x", "manifests": { "y": {} } }))
                .active_manifest()
                .is_none()
        );
        assert!(
            report(json!({ "active_manifest": 5, "manifests": [{}] }))
                .active_manifest()
                .is_none()
        );
    }

    #[test]
    fn test_remote_reference() {
        let report = report(json!({
            "validation_status": [
                { "code": "claim.missing", "url": "self#jumbf=c2pa" },
                { "code": "remote", "url": "https://cdn.example.com/m.c2pa" }
            ]
        }));

        assert_eq!(
            report.remote_reference(),
            Some("https://cdn.example.com/m.c2pa")
        );
    }

    #[test]
    fn test_remote_reference_ignores_non_http() {
        let report = report(json!({
            "validation_status": [{ "url": "self#jumbf=c2pa" }, { "code": "x" }]
        }));
        assert!(report.remote_reference().is_none());
        assert!(ManifestReport::parse(b"{}").unwrap().remote_reference().is_none());
    }

    #[test]
    fn test_set_location() {
        let mut report = report(json!({ "active_manifest": "a" }));
        report.set_location(&ManifestLocation::Remote("http://h/m.c2pa".into()));

        assert_eq!(report.location(), Some("Remote: http://h/m.c2pa"));
        let value = report.into_value();
        assert_eq!(value["manifestLocation"], "Remote: http://h/m.c2pa");
        assert_eq!(value["active_manifest"], "a");
    }
}
