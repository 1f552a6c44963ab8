use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{ProvenanceTool, ToolError, ToolRequest};
use crate::config::ToolConfig;
use crate::manifest::ManifestReport;

/// Runs the `c2patool` executable.
///
/// No timeout is applied: a hung tool stalls the calling request.
#[derive(Debug, Clone)]
pub struct C2paTool {
    program: PathBuf,
    manifest_definition: PathBuf,
}

impl C2paTool {
    pub fn new(program: impl Into<PathBuf>, manifest_definition: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            manifest_definition: manifest_definition.into(),
        }
    }

    pub fn from_config(config: &ToolConfig) -> Self {
        Self::new(&config.program, &config.manifest_definition)
    }

    async fn exec(&self, args: &[String]) -> Result<Output, ToolError> {
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .await
            .map_err(|source| ToolError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(status = %output.status, %stderr, "Provenance tool failed");
            return Err(ToolError::Failed {
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(output)
    }
}

#[async_trait]
impl ProvenanceTool for C2paTool {
    async fn run(
        &self,
        input: &Path,
        request: &ToolRequest,
    ) -> Result<ManifestReport, ToolError> {
        let mut args = vec![input.display().to_string()];
        args.extend(request.to_args(&self.manifest_definition));

        debug!(program = %self.program.display(), ?args, "Invoking provenance tool");
        let output = self.exec(&args).await?;

        Ok(ManifestReport::parse(&output.stdout)?)
    }

    async fn version(&self) -> Result<String, ToolError> {
        let output = self.exec(&["--version".to_string()]).await?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
