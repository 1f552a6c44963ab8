use bytes::Bytes;
use tracing::info;

use super::{ResponsePayload, WorkflowError, write_file};
use crate::manifest::ManifestLocation;
use crate::storage::{SIDECAR_EXTENSION, StorageLayout};
use crate::tool::{ProvenanceTool, ToolRequest};

/// One file part of a multipart upload
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Store an image with its sidecar manifest and confirm the tool reads it.
///
/// The image keeps its own name in the upload directory and the sidecar is
/// stored as `<image name>.c2pa`; the sidecar's own file name is ignored.
/// Both files stay in place even when the tool rejects the pair.
#[tracing::instrument(skip_all, fields(image = %image.file_name))]
pub async fn import_sidecar(
    layout: &StorageLayout,
    tool: &dyn ProvenanceTool,
    image: UploadedFile,
    sidecar: UploadedFile,
) -> Result<ResponsePayload, WorkflowError> {
    let image_path = layout.upload_path(&image.file_name);
    let sidecar_name = format!("{}.{}", image.file_name, SIDECAR_EXTENSION);

    write_file(&image_path, &image.bytes).await?;
    write_file(&layout.upload_path(&sidecar_name), &sidecar.bytes).await?;

    let report = tool
        .run(&image_path, &ToolRequest::Info)
        .await
        .map_err(WorkflowError::SidecarRejected)?;

    let mut payload = ResponsePayload::with_manifest(
        &image.file_name,
        &image.file_name,
        layout.upload_url(&image.file_name),
        report,
        ManifestLocation::Sidecar,
    );
    payload.sidecar_url = Some(layout.upload_url(&sidecar_name));

    info!(sidecar = %sidecar_name, declared = %sidecar.file_name, "Imported sidecar manifest");
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::manifest::ManifestType;
    use crate::tool::FakeTool;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, StorageLayout) {
        let temp_dir = TempDir::new().unwrap();
        let layout = StorageLayout::new(
            StorageConfig::rooted_at(temp_dir.path()),
            "http://localhost:8000",
        );
        layout.ensure_dirs().await.unwrap();
        (temp_dir, layout)
    }

    #[tokio::test]
    async fn test_import_stores_pair() {
        let (_temp_dir, layout) = setup().await;
        let tool = FakeTool::with_sample_report();

        let payload = import_sidecar(
            &layout,
            &tool,
            UploadedFile::new("photo.jpg", b"jpeg".to_vec()),
            UploadedFile::new("whatever.c2pa", b"manifest".to_vec()),
        )
        .await
        .unwrap();

        assert_eq!(payload.name, "photo.jpg");
        assert_eq!(payload.url, "http://localhost:8000/photo.jpg");
        assert_eq!(
            payload.sidecar_url.as_deref(),
            Some("http://localhost:8000/photo.jpg.c2pa")
        );
        assert_eq!(payload.manifest_type, ManifestType::Sidecar);
        assert!(payload.has_manifest);

        assert_eq!(
            std::fs::read(layout.upload_path("photo.jpg.c2pa")).unwrap(),
            b"manifest"
        );
        assert_eq!(
            tool.requests(),
            vec![(layout.upload_path("photo.jpg"), ToolRequest::Info)]
        );
    }

    #[tokio::test]
    async fn test_import_rejected_by_tool() {
        let (_temp_dir, layout) = setup().await;
        let tool = FakeTool::failing("manifest not found");

        let err = import_sidecar(
            &layout,
            &tool,
            UploadedFile::new("photo.jpg", b"jpeg".to_vec()),
            UploadedFile::new("photo.c2pa", b"garbage".to_vec()),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, WorkflowError::SidecarRejected(_)));
        assert_eq!(err.to_string(), "Could not verify uploaded sidecar manifest");
    }
}
