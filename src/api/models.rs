//! API models for the sign / verify endpoints.
//!
//! Query parameters come in camelCase, mirroring the client page:
//!
//! - `POST /upload?name=photo.jpg&manifestType=sidecar&addWatermark=true&watermarkText=demo`
//! - `POST /verify?name=photo.jpg`
//!
//! Successful responses use [`ResponsePayload`](crate::workflow::ResponsePayload);
//! failures use [`ErrorResponse`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::observability::MetricsSnapshot;

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UploadParams {
    pub name: Option<String>,
    /// `embedded` (default), `sidecar` or `remote`
    pub manifest_type: Option<String>,
    pub add_watermark: Option<String>,
    pub watermark_text: Option<String>,
}

impl UploadParams {
    pub fn watermark_requested(&self) -> bool {
        self.add_watermark
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct VerifyParams {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub components: HashMap<String, String>,
    pub version: String,
    pub metrics: MetricsSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_params_camel_case() {
        let params: UploadParams = serde_json::from_value(serde_json::json!({
            "name": "a.jpg",
            "manifestType": "remote",
            "addWatermark": "TRUE",
            "watermarkText": "demo"
        }))
        .unwrap();

        assert_eq!(params.manifest_type.as_deref(), Some("remote"));
        assert!(params.watermark_requested());
        assert!(!UploadParams::default().watermark_requested());
    }
}
