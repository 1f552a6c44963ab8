//! External provenance tool
//!
//! The signing/verification binary is treated as an opaque capability:
//! given an input file and a [`ToolRequest`], it either prints a JSON
//! [`ManifestReport`] or fails.
//!
//! - [`ProvenanceTool`] - the seam the workflows depend on
//! - [`C2paTool`] - runs the `c2patool` executable
//! - [`FakeTool`] - in-process double with canned reports

mod c2patool;
pub mod fake;

pub use c2patool::C2paTool;
pub use fake::FakeTool;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::manifest::{ManifestReport, ReportError};

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("provenance tool exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("provenance tool produced an unreadable report: {0}")]
    InvalidReport(#[from] ReportError),
}

/// Where a signing run stores the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Inside the output image
    Embedded,
    /// Next to the output image as `<stem>.c2pa`
    Sidecar,
    /// Only a reference to `url` goes into the output image
    Remote { url: String },
}

/// One invocation of the tool against an input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolRequest {
    /// Read-only inspection; prints the manifest store report
    Inspect,
    /// Summary information about the file's manifest store
    Info,
    /// Sign the input with the manifest definition and write `output`
    Sign { output: PathBuf, placement: Placement },
}

impl ToolRequest {
    pub fn sign(output: impl Into<PathBuf>, placement: Placement) -> Self {
        ToolRequest::Sign {
            output: output.into(),
            placement,
        }
    }

    /// Command-line arguments following the input path.
    pub fn to_args(&self, manifest_definition: &Path) -> Vec<String> {
        match self {
            ToolRequest::Inspect => Vec::new(),
            ToolRequest::Info => vec!["--info".to_string()],
            ToolRequest::Sign { output, placement } => {
                let mut args = vec![
                    "-m".to_string(),
                    manifest_definition.display().to_string(),
                ];
                match placement {
                    Placement::Embedded => {}
                    Placement::Sidecar => args.push("--sidecar".to_string()),
                    Placement::Remote { url } => {
                        args.push("--remote".to_string());
                        args.push(url.clone());
                    }
                }
                args.push("-o".to_string());
                args.push(output.display().to_string());
                // overwrite existing output
                args.push("-f".to_string());
                args
            }
        }
    }
}

/// External provenance tool
#[async_trait]
pub trait ProvenanceTool: Send + Sync {
    /// Run `request` against `input` and parse the printed report
    async fn run(
        &self,
        input: &Path,
        request: &ToolRequest,
    ) -> Result<ManifestReport, ToolError>;

    /// Version string as printed by the tool
    async fn version(&self) -> Result<String, ToolError>;
}
