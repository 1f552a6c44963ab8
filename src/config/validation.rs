use super::models::Config;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("public_url '{url}' must start with http:// or https://")]
    InvalidPublicUrl { url: String },

    #[error("storage directory '{dir}' is used for more than one purpose")]
    SharedStorageDirectory { dir: String },

    #[error("tool program path must not be empty")]
    MissingToolProgram,

    #[error("scratch_ttl_secs must be positive")]
    InvalidScratchTtl,

    #[error("{field} must be positive")]
    InvalidBodyLimit { field: &'static str },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_server(config)?;
    validate_storage(config)?;
    validate_tool(config)?;
    Ok(())
}

fn validate_server(config: &Config) -> Result<(), ValidationError> {
    let url = &config.server.public_url;
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ValidationError::InvalidPublicUrl { url: url.clone() });
    }

    if config.server.max_upload_bytes.as_u64() == 0 {
        return Err(ValidationError::InvalidBodyLimit {
            field: "max_upload_bytes",
        });
    }

    if config.server.max_multipart_bytes.as_u64() == 0 {
        return Err(ValidationError::InvalidBodyLimit {
            field: "max_multipart_bytes",
        });
    }

    Ok(())
}

/// The workflows tell artifacts apart by directory, so the four
/// directories must not overlap.
fn validate_storage(config: &Config) -> Result<(), ValidationError> {
    let storage = &config.storage;
    let mut seen = HashSet::new();

    for dir in [
        &storage.upload_dir,
        &storage.verify_dir,
        &storage.signed_dir,
        &storage.remote_dir,
    ] {
        if !seen.insert(dir) {
            return Err(ValidationError::SharedStorageDirectory {
                dir: dir.display().to_string(),
            });
        }
    }

    if storage.scratch_ttl_secs == 0 {
        return Err(ValidationError::InvalidScratchTtl);
    }

    Ok(())
}

fn validate_tool(config: &Config) -> Result<(), ValidationError> {
    if config.tool.program.as_os_str().is_empty() {
        return Err(ValidationError::MissingToolProgram);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::humanize::ByteSize;
    use std::path::PathBuf;

    #[test]
    fn test_valid_config() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_public_url_scheme() {
        let mut config = Config::default();
        config.server.public_url = "ftp://localhost".to_string();

        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidPublicUrl { .. })
        ));
    }

    #[test]
    fn test_shared_directories_rejected() {
        let mut config = Config::default();
        config.storage.verify_dir = config.storage.signed_dir.clone();

        assert!(matches!(
            validate(&config),
            Err(ValidationError::SharedStorageDirectory { .. })
        ));
    }

    #[test]
    fn test_zero_scratch_ttl() {
        let mut config = Config::default();
        config.storage.scratch_ttl_secs = 0;

        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidScratchTtl)
        ));
    }

    #[test]
    fn test_empty_tool_program() {
        let mut config = Config::default();
        config.tool.program = PathBuf::new();

        assert!(matches!(
            validate(&config),
            Err(ValidationError::MissingToolProgram)
        ));
    }

    #[test]
    fn test_zero_upload_limit() {
        let mut config = Config::default();
        config.server.max_upload_bytes = ByteSize(0);

        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidBodyLimit {
                field: "max_upload_bytes"
            })
        ));
    }
}
