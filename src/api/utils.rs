//! API utility functions
//!
//! Pure, stateless helpers for HTTP request processing, kept apart from
//! services.rs so they can be unit tested.

use axum::body::Body;
use axum::http::{HeaderMap, header};
use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};

use crate::api::error::ApiError;

/// Parses and validates a Content-Type for raw image uploads
///
/// Accepts any `image/*` media type, with or without parameters.
///
/// Rejects:
/// - `application/octet-stream`
/// - `text/plain`
/// - Malformed media types
pub fn parse_image_content_type(content_type: &str) -> Result<mime::Mime, ApiError> {
    let media_type: mime::Mime = content_type.parse().map_err(|_| {
        ApiError::InvalidPayload(format!("invalid Content-Type: {}", content_type))
    })?;

    if media_type.type_() != mime::IMAGE {
        return Err(ApiError::InvalidPayload(format!(
            "Content-Type must be image/*, got: {}/{}",
            media_type.type_(),
            media_type.subtype()
        )));
    }

    Ok(media_type)
}

/// Content-Type header of an image upload
pub fn image_content_type(headers: &HeaderMap) -> Result<mime::Mime, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::InvalidPayload("missing Content-Type header".into()))?;

    parse_image_content_type(content_type)
}

/// Reads the full request body, failing once it exceeds `max_size` bytes
pub async fn read_body(body: Body, max_size: usize) -> Result<Bytes, ApiError> {
    let data = Limited::new(body, max_size)
        .collect()
        .await
        .map_err(|err| {
            if err.downcast_ref::<LengthLimitError>().is_some() {
                ApiError::PayloadTooLarge(max_size)
            } else {
                ApiError::Internal(err.to_string())
            }
        })?
        .to_bytes();

    if data.is_empty() {
        return Err(ApiError::InvalidPayload("request body is empty".into()));
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_image_content_type_valid() {
        assert!(parse_image_content_type("image/jpeg").is_ok());
        assert!(parse_image_content_type("image/png").is_ok());
        assert!(parse_image_content_type("image/svg+xml").is_ok());
        assert!(parse_image_content_type("image/webp; q=1").is_ok());
    }

    #[test]
    fn test_parse_image_content_type_invalid() {
        assert!(parse_image_content_type("application/octet-stream").is_err());
        assert!(parse_image_content_type("text/plain").is_err());
        assert!(parse_image_content_type("imagejpeg").is_err());
        assert!(parse_image_content_type("").is_err());
    }

    #[test]
    fn test_missing_content_type() {
        let err = image_content_type(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn test_read_body_ok() {
        let data = read_body(Body::from(vec![7u8; 1000]), 1000).await.unwrap();
        assert_eq!(data.len(), 1000);
    }

    #[tokio::test]
    async fn test_read_body_too_large() {
        let result = read_body(Body::from(vec![0u8; 1000]), 999).await;
        match result {
            Err(ApiError::PayloadTooLarge(limit)) => assert_eq!(limit, 999),
            other => panic!("Expected PayloadTooLarge error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_read_body_empty() {
        let result = read_body(Body::empty(), 100).await;
        assert!(matches!(result, Err(ApiError::InvalidPayload(_))));
    }
}
