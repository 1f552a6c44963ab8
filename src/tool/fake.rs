//! In-process stand-in for the provenance tool
//!
//! Used by the test suites and handy for running the server without a
//! `c2patool` binary. Signing requests copy the input to the requested
//! output (and write a placeholder sidecar when asked), then return a
//! canned report.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{Placement, ProvenanceTool, ToolError, ToolRequest};
use crate::manifest::ManifestReport;
use crate::storage::sidecar_path_for;

/// Bytes written as the placeholder sidecar manifest
pub const FAKE_SIDECAR_BYTES: &[u8] = b"c2pa-sidecar-manifest";

#[derive(Debug)]
pub struct FakeTool {
    report: Value,
    failure: Option<String>,
    write_sidecars: bool,
    version: String,
    requests: Mutex<Vec<(PathBuf, ToolRequest)>>,
}

impl FakeTool {
    pub fn new(report: Value) -> Self {
        Self {
            report,
            failure: None,
            write_sidecars: true,
            version: "c2patool 0.0.0-fake".to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fake returning [`sample_report`]
    pub fn with_sample_report() -> Self {
        Self::new(sample_report())
    }

    /// Every run fails with `stderr`, like a non-zero exit
    pub fn failing(stderr: impl Into<String>) -> Self {
        Self {
            failure: Some(stderr.into()),
            ..Self::with_sample_report()
        }
    }

    /// Sidecar-mode signing succeeds without writing the sidecar file
    pub fn without_sidecars(mut self) -> Self {
        self.write_sidecars = false;
        self
    }

    /// Input paths and requests seen so far, in call order
    pub fn requests(&self) -> Vec<(PathBuf, ToolRequest)> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn record(&self, input: &Path, request: &ToolRequest) {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((input.to_path_buf(), request.clone()));
    }
}

fn io_failure(err: std::io::Error) -> ToolError {
    ToolError::Failed {
        status: "exit status: 1".to_string(),
        stderr: err.to_string(),
    }
}

#[async_trait]
impl ProvenanceTool for FakeTool {
    async fn run(
        &self,
        input: &Path,
        request: &ToolRequest,
    ) -> Result<ManifestReport, ToolError> {
        self.record(input, request);

        if let Some(stderr) = &self.failure {
            return Err(ToolError::Failed {
                status: "exit status: 1".to_string(),
                stderr: stderr.clone(),
            });
        }

        if let ToolRequest::Sign { output, placement } = request {
            tokio::fs::copy(input, output).await.map_err(io_failure)?;

            if *placement == Placement::Sidecar && self.write_sidecars {
                tokio::fs::write(sidecar_path_for(output), FAKE_SIDECAR_BYTES)
                    .await
                    .map_err(io_failure)?;
            }
        }

        Ok(ManifestReport::from_value(self.report.clone())?)
    }

    async fn version(&self) -> Result<String, ToolError> {
        match &self.failure {
            Some(stderr) => Err(ToolError::Failed {
                status: "exit status: 1".to_string(),
                stderr: stderr.clone(),
            }),
            None => Ok(self.version.clone()),
        }
    }
}

/// A report shaped like `c2patool` output for a freshly signed image.
///
/// The first manifest is an ingredient; the active one is the second.
pub fn sample_report() -> Value {
    json!({
        "active_manifest": "urn:uuid:active",
        "manifests": {
            "urn:uuid:ingredient": {
                "title": "ingredient.jpg",
                "claim_generator": "old_tool/1.0",
                "signature_info": { "issuer": "Ingredient Issuer" }
            },
            "urn:uuid:active": {
                "title": "sunset.jpg",
                "format": "image/jpeg",
                "instance_id": "xmp:iid:0001",
                "claim_generator": "c2pa_demo/0.1.0 c2pa-rs/0.36.0",
                "signature_info": {
                    "issuer": "C2PA Test Signing Cert",
                    "time": "2024-05-01T10:00:07+00:00"
                },
                "assertions": [
                    { "label": "c2pa.actions", "data": { "actions": [{ "action": "c2pa.created" }] } }
                ],
                "ingredients": []
            }
        }
    })
}
