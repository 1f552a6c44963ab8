use bytes::Bytes;
use tracing::info;

use super::{CleanupHandle, ResponsePayload, ScratchCleanup, WorkflowError, write_file};
use crate::manifest::{ManifestLocation, ManifestReport};
use crate::storage::{ArtifactKind, Operation, StorageLayout, StoredArtifact};
use crate::tool::{ProvenanceTool, ToolRequest};

/// An image uploaded for verification
#[derive(Debug, Clone)]
pub struct VerifyRequest {
    pub file_name: String,
    pub bytes: Bytes,
}

impl VerifyRequest {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug)]
pub struct VerifyOutcome {
    pub payload: ResponsePayload,
    /// The scratch copy served under the verify mount until cleanup runs
    pub scratch: StoredArtifact,
    /// Pending removal of the scratch copy
    pub cleanup: CleanupHandle,
}

/// Inspect an uploaded image for a manifest.
///
/// A tool failure is not an error here: it produces a payload with
/// `hasManifest: false`. The scratch copy is scheduled for removal either
/// way.
#[tracing::instrument(skip_all, fields(file = %request.file_name))]
pub async fn verify(
    layout: &StorageLayout,
    tool: &dyn ProvenanceTool,
    cleanup: &ScratchCleanup,
    request: VerifyRequest,
) -> Result<VerifyOutcome, WorkflowError> {
    let unique = layout.allocate_name(&request.file_name, Operation::Verify);
    let scratch = layout.verify_path(&unique);
    let url = layout.verify_url(&unique);

    write_file(&scratch, &request.bytes).await?;

    let result = tool.run(&scratch, &ToolRequest::Inspect).await;
    let handle = cleanup.schedule(scratch.clone());

    let payload = match result {
        Ok(report) => {
            let location = classify_location(layout, &request.file_name, &report).await;
            info!(%location, "Manifest found");
            ResponsePayload::with_manifest(unique, &request.file_name, url, report, location)
        }
        Err(e) => {
            info!(error = %e, "No manifest found");
            ResponsePayload::without_manifest(unique, &request.file_name, url)
        }
    };

    Ok(VerifyOutcome {
        payload,
        scratch: StoredArtifact::new(scratch, ArtifactKind::VerifyScratch),
        cleanup: handle,
    })
}

/// Decide where the manifest of a verified file lives.
///
/// A sidecar named after the declared file in the signed directory wins,
/// then an HTTP(S) reference in the validation statuses; otherwise the
/// manifest is embedded. A sidecar left over from an earlier signing of a
/// same-named file therefore also classifies as `Sidecar`.
pub async fn classify_location(
    layout: &StorageLayout,
    declared_name: &str,
    report: &ManifestReport,
) -> ManifestLocation {
    let sidecar = layout.signed_sidecar_for(declared_name);
    if tokio::fs::try_exists(&sidecar).await.unwrap_or(false) {
        return ManifestLocation::Sidecar;
    }

    match report.remote_reference() {
        Some(url) => ManifestLocation::Remote(url.to_string()),
        None => ManifestLocation::Embedded,
    }
}
