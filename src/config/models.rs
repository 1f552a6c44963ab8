use crate::humanize::ByteSize;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub tool: ToolConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Origin used when building URLs handed back to clients
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// Directory holding the static client page
    #[serde(default = "default_client_dir")]
    pub client_dir: PathBuf,
    /// Limit for raw image bodies on `/upload` and `/verify`
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: ByteSize,
    /// Limit for the multipart body on `/upload-with-sidecar`
    #[serde(default = "default_max_multipart_bytes")]
    pub max_multipart_bytes: ByteSize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            public_url: default_public_url(),
            client_dir: default_client_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            max_multipart_bytes: default_max_multipart_bytes(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

fn default_public_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_client_dir() -> PathBuf {
    PathBuf::from("client")
}

fn default_max_upload_bytes() -> ByteSize {
    ByteSize::mib(20)
}

fn default_max_multipart_bytes() -> ByteSize {
    ByteSize::gib(2)
}

/// On-disk directories used by the workflows.
///
/// Passed explicitly into every workflow call (via
/// [`StorageLayout`](crate::storage::StorageLayout)) so tests can point
/// them at temporary directories.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    #[serde(default = "default_verify_dir")]
    pub verify_dir: PathBuf,
    #[serde(default = "default_signed_dir")]
    pub signed_dir: PathBuf,
    #[serde(default = "default_remote_dir")]
    pub remote_dir: PathBuf,
    /// Seconds before a verification scratch file is removed
    #[serde(default = "default_scratch_ttl_secs")]
    pub scratch_ttl_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            verify_dir: default_verify_dir(),
            signed_dir: default_signed_dir(),
            remote_dir: default_remote_dir(),
            scratch_ttl_secs: default_scratch_ttl_secs(),
        }
    }
}

impl StorageConfig {
    /// All four directories rooted under `base`; used by tests.
    pub fn rooted_at(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            upload_dir: base.join(default_upload_dir()),
            verify_dir: base.join(default_verify_dir()),
            signed_dir: base.join(default_signed_dir()),
            remote_dir: base.join(default_remote_dir()),
            scratch_ttl_secs: default_scratch_ttl_secs(),
        }
    }
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_verify_dir() -> PathBuf {
    PathBuf::from("verify-uploads")
}

fn default_signed_dir() -> PathBuf {
    PathBuf::from("signed-images")
}

fn default_remote_dir() -> PathBuf {
    PathBuf::from("remote-manifests")
}

fn default_scratch_ttl_secs() -> u64 {
    60
}

/// External provenance tool configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolConfig {
    /// Path to the `c2patool` executable
    #[serde(default = "default_program")]
    pub program: PathBuf,
    /// Manifest definition passed with `-m` when signing
    #[serde(default = "default_manifest_definition")]
    pub manifest_definition: PathBuf,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            manifest_definition: default_manifest_definition(),
        }
    }
}

fn default_program() -> PathBuf {
    PathBuf::from("./c2patool")
}

fn default_manifest_definition() -> PathBuf {
    PathBuf::from("manifest.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:8000");
        assert_eq!(config.server.public_url, "http://localhost:8000");
        assert_eq!(config.server.max_upload_bytes, ByteSize::mib(20));
        assert_eq!(config.storage.signed_dir, PathBuf::from("signed-images"));
        assert_eq!(config.storage.scratch_ttl_secs, 60);
        assert_eq!(config.tool.program, PathBuf::from("./c2patool"));
    }

    #[test]
    fn test_rooted_storage() {
        let storage = StorageConfig::rooted_at("/tmp/demo");
        assert_eq!(storage.upload_dir, PathBuf::from("/tmp/demo/uploads"));
        assert_eq!(
            storage.remote_dir,
            PathBuf::from("/tmp/demo/remote-manifests")
        );
    }
}
