use thiserror::Error;

use crate::storage::sanitize_file_name;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestValidationError {
    #[error("name query parameter is required")]
    MissingName,
    #[error("file name '{0}' does not contain a usable file name")]
    UnusableName(String),
    #[error("Both image and sidecar files are required")]
    MissingMultipartPart,
}

/// Validate a client supplied file name and reduce it to its last
/// path component.
pub fn validate_file_name(name: Option<&str>) -> Result<String, RequestValidationError> {
    let name = name
        .filter(|n| !n.trim().is_empty())
        .ok_or(RequestValidationError::MissingName)?;

    sanitize_file_name(name).ok_or_else(|| RequestValidationError::UnusableName(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert_eq!(validate_file_name(Some("photo.jpg")).unwrap(), "photo.jpg");
        assert_eq!(
            validate_file_name(Some("../../etc/passwd")).unwrap(),
            "passwd"
        );
        assert_eq!(
            validate_file_name(Some("dir/sub/shot.png")).unwrap(),
            "shot.png"
        );
    }

    #[test]
    fn test_missing_name() {
        assert_eq!(
            validate_file_name(None),
            Err(RequestValidationError::MissingName)
        );
        assert_eq!(
            validate_file_name(Some("  ")),
            Err(RequestValidationError::MissingName)
        );
    }

    #[test]
    fn test_unusable_name() {
        assert!(matches!(
            validate_file_name(Some("..")),
            Err(RequestValidationError::UnusableName(_))
        ));
        assert!(matches!(
            validate_file_name(Some("/")),
            Err(RequestValidationError::UnusableName(_))
        ));
    }
}
