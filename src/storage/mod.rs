//! On-disk layout for uploads, verification scratch files and signed output
//!
//! Every artifact the workflows produce lives in one of four directories,
//! each served read-only under a fixed URL prefix:
//!
//! | Directory | URL prefix | Contents |
//! |---|---|---|
//! | upload | `/` | temporary originals, imported image + sidecar pairs |
//! | verify | `/verify-uploads` | verification scratch copies (short-lived) |
//! | signed | `/signed-images` | signed images and sidecar manifests |
//! | remote | `/remote-manifests` | manifests referenced by remote URLs |

use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::config::StorageConfig;

pub const SIGNED_MOUNT: &str = "/signed-images";
pub const VERIFY_MOUNT: &str = "/verify-uploads";
pub const REMOTE_MOUNT: &str = "/remote-manifests";

/// Bytes left as-is in a URL path segment: RFC 3986 unreserved characters
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Extension the tool uses for manifests stored outside the image
pub const SIDECAR_EXTENSION: &str = "c2pa";

/// Which workflow a generated file name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Signed,
    Verify,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Signed => "signed",
            Operation::Verify => "verify",
        }
    }
}

/// Kinds of files the workflows leave on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    SignedEmbedded,
    SignedSidecarImage,
    SignedSidecarManifest,
    RemoteImage,
    RemoteManifestCopy,
    VerifyScratch,
}

/// A file produced by a workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
}

impl StoredArtifact {
    pub fn new(path: PathBuf, kind: ArtifactKind) -> Self {
        Self { path, kind }
    }
}

/// Split a file name into `(base, extension-with-dot)`.
///
/// The extension starts at the last dot, ignoring a leading dot, so
/// `.profile` has no extension and `a.tar.gz` splits into `a.tar` + `.gz`.
pub fn split_name(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(0) | None => (file_name, ""),
        Some(idx) => file_name.split_at(idx),
    }
}

/// Filesystem-safe UTC timestamp truncated to whole seconds.
pub fn timestamp_token(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H-%M-%S").to_string()
}

/// `<base>_<operation>_<timestamp><.ext>` for a given instant.
pub fn unique_name(original: &str, operation: Operation, now: DateTime<Utc>) -> String {
    let (base, ext) = split_name(original);
    format!(
        "{}_{}_{}{}",
        base,
        operation.as_str(),
        timestamp_token(now),
        ext
    )
}

/// Reduce a client supplied name to its final path component.
///
/// Returns `None` when nothing usable remains (empty, `..`, `/`).
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let name = name.trim();
    match Path::new(name).components().next_back() {
        Some(Component::Normal(part)) => part.to_str().map(str::to_owned),
        _ => None,
    }
}

/// Where the tool writes a sidecar for a given output path.
pub fn sidecar_path_for(output: &Path) -> PathBuf {
    output.with_extension(SIDECAR_EXTENSION)
}

/// Directories plus the public URL scheme used to reach them.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    config: StorageConfig,
    public_url: String,
}

impl StorageLayout {
    pub fn new(config: StorageConfig, public_url: impl Into<String>) -> Self {
        let public_url = public_url.into().trim_end_matches('/').to_string();
        Self { config, public_url }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.config.upload_dir
    }

    pub fn verify_dir(&self) -> &Path {
        &self.config.verify_dir
    }

    pub fn signed_dir(&self) -> &Path {
        &self.config.signed_dir
    }

    pub fn remote_dir(&self) -> &Path {
        &self.config.remote_dir
    }

    /// Create the upload, verify and signed directories if missing.
    ///
    /// The remote directory is created on first use by
    /// [`ensure_remote_dir`](Self::ensure_remote_dir).
    pub async fn ensure_dirs(&self) -> io::Result<()> {
        for dir in [self.upload_dir(), self.verify_dir(), self.signed_dir()] {
            tokio::fs::create_dir_all(dir).await?;
        }
        Ok(())
    }

    pub async fn ensure_remote_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(self.remote_dir()).await
    }

    /// Unique name for `original` stamped with the current time.
    ///
    /// Two requests for the same base name within one second get the same
    /// name.
    pub fn allocate_name(&self, original: &str, operation: Operation) -> String {
        unique_name(original, operation, Utc::now())
    }

    pub fn upload_path(&self, name: &str) -> PathBuf {
        self.upload_dir().join(name)
    }

    pub fn verify_path(&self, name: &str) -> PathBuf {
        self.verify_dir().join(name)
    }

    pub fn signed_path(&self, name: &str) -> PathBuf {
        self.signed_dir().join(name)
    }

    pub fn remote_path(&self, name: &str) -> PathBuf {
        self.remote_dir().join(name)
    }

    /// Sidecar that a sidecar-mode signing of `original` would have left in
    /// the signed directory.
    pub fn signed_sidecar_for(&self, original: &str) -> PathBuf {
        self.signed_dir().join(sidecar_name_for(original))
    }

    pub fn upload_url(&self, name: &str) -> String {
        format!("{}/{}", self.public_url, encode_segment(name))
    }

    pub fn signed_url(&self, name: &str) -> String {
        format!("{}{}/{}", self.public_url, SIGNED_MOUNT, encode_segment(name))
    }

    pub fn verify_url(&self, name: &str) -> String {
        format!("{}{}/{}", self.public_url, VERIFY_MOUNT, encode_segment(name))
    }

    pub fn remote_url(&self, name: &str) -> String {
        format!("{}{}/{}", self.public_url, REMOTE_MOUNT, encode_segment(name))
    }
}

fn encode_segment(name: &str) -> String {
    utf8_percent_encode(name, PATH_SEGMENT).to_string()
}

/// Percent-decode a request path; `None` when it is not valid UTF-8.
pub fn decode_url_path(path: &str) -> Option<String> {
    percent_decode_str(path)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

/// Sidecar file name (`<base>.c2pa`) for a file name.
pub fn sidecar_name_for(file_name: &str) -> String {
    let (base, _) = split_name(file_name);
    format!("{}.{}", base, SIDECAR_EXTENSION)
}
