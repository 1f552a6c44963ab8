//! Manifest lifecycle workflows
//!
//! Each workflow takes the [`StorageLayout`](crate::storage::StorageLayout)
//! and a [`ProvenanceTool`](crate::tool::ProvenanceTool) explicitly and runs
//! sequentially: write the upload to disk, invoke the tool, inspect the
//! produced artifacts, and shape a [`ResponsePayload`].
//!
//! - [`sign`] - embed, sidecar or remote manifest for an uploaded image
//! - [`verify`] - inspect an uploaded image and classify its manifest
//! - [`import_sidecar`] - accept an image together with its sidecar manifest

mod cleanup;
mod import;
mod payload;
mod sign;
mod verify;

pub use cleanup::{CleanupHandle, ScratchCleanup};
pub use import::{UploadedFile, import_sidecar};
pub use payload::{NO_MANIFEST_MESSAGE, ResponsePayload};
pub use sign::{SignOutcome, sign};
pub use verify::{VerifyOutcome, VerifyRequest, classify_location, verify};

use bytes::Bytes;
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::tool::ToolError;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Sidecar manifest file not created")]
    SidecarNotCreated,

    #[error("Could not verify uploaded sidecar manifest")]
    SidecarRejected(#[source] ToolError),
}

impl WorkflowError {
    pub(crate) fn io(context: impl Into<String>) -> impl FnOnce(io::Error) -> Self {
        let context = context.into();
        move |source| WorkflowError::Io { context, source }
    }
}

/// Requested manifest storage topology for a signing run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageMode {
    #[default]
    Embedded,
    Sidecar,
    Remote,
}

impl StorageMode {
    /// `sidecar` and `remote` select those modes; anything else, including
    /// a missing value, signs with an embedded manifest.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("sidecar") => StorageMode::Sidecar,
            Some("remote") => StorageMode::Remote,
            _ => StorageMode::Embedded,
        }
    }
}

/// An image uploaded for signing
#[derive(Debug, Clone, bon::Builder)]
pub struct SignRequest {
    /// Client file name, already reduced to a bare file name
    #[builder(into)]
    pub file_name: String,
    #[builder(into)]
    pub bytes: Bytes,
    #[builder(into, default = mime::APPLICATION_OCTET_STREAM.to_string())]
    pub content_type: String,
    #[builder(default)]
    pub mode: StorageMode,
    #[builder(default)]
    pub watermark_requested: bool,
    pub watermark_text: Option<String>,
}

/// Write `bytes` to `path`, replacing any existing file.
pub(crate) async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), WorkflowError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(WorkflowError::io(format!("writing {}", path.display())))
}

pub(crate) async fn file_exists(path: &Path) -> Result<bool, WorkflowError> {
    tokio::fs::try_exists(path)
        .await
        .map_err(WorkflowError::io(format!("checking {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_mode_from_query() {
        assert_eq!(StorageMode::from_query(None), StorageMode::Embedded);
        assert_eq!(StorageMode::from_query(Some("embedded")), StorageMode::Embedded);
        assert_eq!(StorageMode::from_query(Some("sidecar")), StorageMode::Sidecar);
        assert_eq!(StorageMode::from_query(Some("remote")), StorageMode::Remote);
        assert_eq!(StorageMode::from_query(Some("bogus")), StorageMode::Embedded);
    }

    #[test]
    fn test_sign_request_defaults() {
        let request = SignRequest::builder()
            .file_name("photo.jpg")
            .bytes(vec![1u8, 2, 3])
            .build();

        assert_eq!(request.mode, StorageMode::Embedded);
        assert!(!request.watermark_requested);
        assert!(request.watermark_text.is_none());
        assert_eq!(request.content_type, "application/octet-stream");
    }

    #[test]
    fn test_sidecar_error_message_is_exact() {
        assert_eq!(
            WorkflowError::SidecarNotCreated.to_string(),
            "Sidecar manifest file not created"
        );
    }
}
