use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{ResponsePayload, SignRequest, StorageMode, WorkflowError, file_exists, write_file};
use crate::manifest::ManifestLocation;
use crate::storage::{
    ArtifactKind, Operation, StorageLayout, StoredArtifact, sidecar_name_for, sidecar_path_for,
};
use crate::tool::{Placement, ProvenanceTool, ToolRequest};

/// Result of a successful signing run
#[derive(Debug, Clone)]
pub struct SignOutcome {
    pub payload: ResponsePayload,
    /// Files left on disk for the client to fetch
    pub artifacts: Vec<StoredArtifact>,
}

/// Sign an uploaded image with the configured manifest definition.
///
/// The upload is stored under its original name in the upload directory,
/// signed into the signed directory under a freshly allocated unique name,
/// and removed again once signing succeeded. On failure the temporary
/// upload and any partial outputs stay behind.
#[tracing::instrument(skip_all, fields(file = %request.file_name, mode = ?request.mode))]
pub async fn sign(
    layout: &StorageLayout,
    tool: &dyn ProvenanceTool,
    request: SignRequest,
) -> Result<SignOutcome, WorkflowError> {
    if request.watermark_requested {
        // accepted for compatibility, never applied
        info!(
            text = request.watermark_text.as_deref().unwrap_or_default(),
            "Watermark requested"
        );
    }

    let unique = layout.allocate_name(&request.file_name, Operation::Signed);
    let job = SignJob {
        layout,
        tool,
        original: &request.file_name,
        upload_path: layout.upload_path(&request.file_name),
        signed_path: layout.signed_path(&unique),
        unique: &unique,
    };

    write_file(&job.upload_path, &request.bytes).await?;
    debug!(
        path = %job.upload_path.display(),
        bytes = request.bytes.len(),
        content_type = %request.content_type,
        "Stored upload"
    );

    let outcome = match request.mode {
        StorageMode::Embedded => job.embedded().await?,
        StorageMode::Sidecar => job.sidecar().await?,
        StorageMode::Remote => job.remote().await?,
    };

    discard_upload(&job.upload_path).await;

    info!(
        name = %outcome.payload.name,
        manifest_type = ?outcome.payload.manifest_type,
        artifacts = outcome.artifacts.len(),
        "Signed image"
    );
    Ok(outcome)
}

struct SignJob<'a> {
    layout: &'a StorageLayout,
    tool: &'a dyn ProvenanceTool,
    original: &'a str,
    unique: &'a str,
    upload_path: PathBuf,
    signed_path: PathBuf,
}

impl SignJob<'_> {
    async fn embedded(&self) -> Result<SignOutcome, WorkflowError> {
        let request = ToolRequest::sign(&self.signed_path, Placement::Embedded);
        let report = self.tool.run(&self.upload_path, &request).await?;

        Ok(SignOutcome {
            payload: ResponsePayload::with_manifest(
                self.unique,
                self.original,
                self.layout.signed_url(self.unique),
                report,
                ManifestLocation::Embedded,
            ),
            artifacts: vec![StoredArtifact::new(
                self.signed_path.clone(),
                ArtifactKind::SignedEmbedded,
            )],
        })
    }

    async fn sidecar(&self) -> Result<SignOutcome, WorkflowError> {
        let request = ToolRequest::sign(&self.signed_path, Placement::Sidecar);
        let report = self.tool.run(&self.upload_path, &request).await?;

        let sidecar_path = sidecar_path_for(&self.signed_path);
        if !file_exists(&sidecar_path).await? {
            warn!(path = %sidecar_path.display(), "Tool reported success without a sidecar");
            return Err(WorkflowError::SidecarNotCreated);
        }

        let mut payload = ResponsePayload::with_manifest(
            self.unique,
            self.original,
            self.layout.signed_url(self.unique),
            report,
            ManifestLocation::Sidecar,
        );
        payload.sidecar_url = Some(self.layout.signed_url(&sidecar_name_for(self.unique)));

        Ok(SignOutcome {
            payload,
            artifacts: vec![
                StoredArtifact::new(self.signed_path.clone(), ArtifactKind::SignedSidecarImage),
                StoredArtifact::new(sidecar_path, ArtifactKind::SignedSidecarManifest),
            ],
        })
    }

    /// Two tool runs: the first writes the image carrying only a reference
    /// to the manifest URL, the second writes the manifest that URL serves.
    ///
    /// `remoteManifestUrl` is advertised even when the second run left no
    /// manifest copy behind; that URL then answers 404 and no
    /// `RemoteManifestCopy` artifact is recorded.
    async fn remote(&self) -> Result<SignOutcome, WorkflowError> {
        self.layout
            .ensure_remote_dir()
            .await
            .map_err(WorkflowError::io("creating remote manifest directory"))?;

        let manifest_url = self.layout.remote_url(&sidecar_name_for(self.unique));
        let referencing = ToolRequest::sign(
            &self.signed_path,
            Placement::Remote {
                url: manifest_url.clone(),
            },
        );
        let report = self.tool.run(&self.upload_path, &referencing).await?;

        let remote_image = self.layout.remote_path(self.unique);
        let copy = ToolRequest::sign(&remote_image, Placement::Sidecar);
        self.tool.run(&self.upload_path, &copy).await?;

        let mut artifacts = vec![StoredArtifact::new(
            self.signed_path.clone(),
            ArtifactKind::RemoteImage,
        )];
        let manifest_copy = sidecar_path_for(&remote_image);
        if file_exists(&manifest_copy).await? {
            artifacts.push(StoredArtifact::new(
                manifest_copy,
                ArtifactKind::RemoteManifestCopy,
            ));
        } else {
            warn!(path = %manifest_copy.display(), "Remote manifest copy missing");
        }

        let mut payload = ResponsePayload::with_manifest(
            self.unique,
            self.original,
            self.layout.signed_url(self.unique),
            report,
            ManifestLocation::Remote(manifest_url.clone()),
        );
        payload.remote_manifest_url = Some(manifest_url);

        Ok(SignOutcome { payload, artifacts })
    }
}

async fn discard_upload(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!(path = %path.display(), error = %e, "Failed to remove temporary upload");
    }
}
