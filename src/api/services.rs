use axum::{
    Json,
    body::Body,
    extract::{Multipart, Query, Request, State, multipart::MultipartError},
    http::{HeaderMap, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use std::collections::HashMap;
use tower::ServiceExt;
use tower_http::services::ServeDir;
use uuid::Uuid;

use super::{
    models::{HealthResponse, UploadParams, VerifyParams},
    state::AppState,
    validation::{RequestValidationError, validate_file_name},
};
use crate::api::error::ApiError;
use crate::storage::{SIDECAR_EXTENSION, decode_url_path, sanitize_file_name};
use crate::workflow::{self, SignRequest, StorageMode, UploadedFile, VerifyRequest};

/// Sign endpoint (POST /upload)
///
/// The body is the raw image (`Content-Type: image/*`); `name` names it and
/// `manifestType` picks embedded, sidecar or remote storage. Responds with
/// the signed image URL, manifest details and the full report.
///
/// Tool failures and a missing sidecar come back as 500.
#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn upload_image(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    body: Body,
) -> Result<impl IntoResponse, ApiError> {
    let content_type = super::utils::image_content_type(&headers)?;
    let file_name =
        validate_file_name(params.name.as_deref()).map_err(map_validation_error)?;
    let bytes =
        super::utils::read_body(body, state.config.server.max_upload_bytes.as_usize()).await?;

    let request = SignRequest::builder()
        .file_name(file_name)
        .bytes(bytes)
        .content_type(content_type.to_string())
        .mode(StorageMode::from_query(params.manifest_type.as_deref()))
        .watermark_requested(params.watermark_requested())
        .maybe_watermark_text(params.watermark_text)
        .build();

    match workflow::sign(&state.layout, state.tool.as_ref(), request).await {
        Ok(outcome) => {
            state.metrics.sign_completed();
            Ok((StatusCode::OK, Json(outcome.payload)))
        }
        Err(err) => {
            state.metrics.sign_failed();
            Err(err.into())
        }
    }
}

/// Verify endpoint (POST /verify)
///
/// An image without a readable manifest is still a 200 with
/// `hasManifest: false`. The scratch copy stays reachable under
/// `/verify-uploads` until the cleanup delay elapses.
#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn verify_image(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
    headers: HeaderMap,
    body: Body,
) -> Result<impl IntoResponse, ApiError> {
    super::utils::image_content_type(&headers)?;
    let file_name =
        validate_file_name(params.name.as_deref()).map_err(map_validation_error)?;
    let bytes =
        super::utils::read_body(body, state.config.server.max_upload_bytes.as_usize()).await?;

    let outcome = workflow::verify(
        &state.layout,
        state.tool.as_ref(),
        &state.cleanup,
        VerifyRequest::new(file_name, bytes),
    )
    .await?;

    state.metrics.verification(outcome.payload.has_manifest);
    tracing::debug!(
        scratch = %outcome.scratch.path.display(),
        kind = ?outcome.scratch.kind,
        "Scratch copy awaiting cleanup"
    );

    // dropping the handle leaves the removal scheduled
    Ok((StatusCode::OK, Json(outcome.payload)))
}

/// Sidecar import endpoint (POST /upload-with-sidecar)
///
/// Multipart form with an `image` part and a `sidecar` part.
#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn upload_with_sidecar(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let limit = state.config.server.max_multipart_bytes.as_usize();
    let map_err = |err: MultipartError| map_multipart_error(err, limit);

    let mut image: Option<(Option<String>, Bytes)> = None;
    let mut sidecar: Option<(Option<String>, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(map_err)? {
        let slot = match field.name() {
            Some("image") => &mut image,
            Some("sidecar") => &mut sidecar,
            _ => continue,
        };
        let file_name = field.file_name().and_then(sanitize_file_name);
        let bytes = field.bytes().await.map_err(map_err)?;
        *slot = Some((file_name, bytes));
    }

    let (Some((image_name, image_bytes)), Some((sidecar_name, sidecar_bytes))) = (image, sidecar)
    else {
        return Err(map_validation_error(
            RequestValidationError::MissingMultipartPart,
        ));
    };

    let image_name = image_name
        .ok_or_else(|| ApiError::InvalidPayload("image part has no file name".into()))?;

    let payload = workflow::import_sidecar(
        &state.layout,
        state.tool.as_ref(),
        UploadedFile::new(image_name, image_bytes),
        UploadedFile::new(sidecar_name.unwrap_or_default(), sidecar_bytes),
    )
    .await?;

    state.metrics.sidecar_imported();

    Ok((StatusCode::OK, Json(payload)))
}

/// Tool version endpoint (GET /version)
pub async fn tool_version(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let version = state
        .tool
        .version()
        .await
        .map_err(|e| ApiError::ToolFailure(e.to_string()))?;

    Ok((StatusCode::OK, version))
}

/// Health check endpoint (GET /health)
///
/// Returns 503 Service Unavailable if any storage directory is missing.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let mut components = HashMap::new();
    components.insert("api".to_string(), "healthy".to_string());

    let layout = &state.layout;
    let dirs = [layout.upload_dir(), layout.verify_dir(), layout.signed_dir()];
    let mut storage_healthy = true;
    for dir in dirs {
        storage_healthy &= tokio::fs::try_exists(dir).await.unwrap_or(false);
    }
    components.insert(
        "storage".to_string(),
        if storage_healthy { "healthy" } else { "unhealthy" }.to_string(),
    );

    let all_healthy = components.values().all(|status| status == "healthy");
    let overall_status = if all_healthy { "healthy" } else { "unhealthy" };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: overall_status.to_string(),
        components,
        version: env!("CARGO_PKG_VERSION").to_string(),
        metrics: state.metrics.snapshot(),
    };

    (status_code, Json(response))
}

/// Fallback for every unrouted request
///
/// `GET *.c2pa` serves sidecars from the upload directory. Anything else is
/// looked up in the client directory first, then the upload directory.
pub async fn static_files(State(state): State<AppState>, request: Request) -> Response {
    let path = request.uri().path();
    let is_sidecar = path
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext == SIDECAR_EXTENSION);

    if request.method() == Method::GET && is_sidecar {
        let path = path.to_string();
        return serve_sidecar(&state, &path).await;
    }

    let service = ServeDir::new(&state.config.server.client_dir)
        .fallback(ServeDir::new(state.layout.upload_dir()));

    match service.oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(e) => match e {},
    }
}

async fn serve_sidecar(state: &AppState, path: &str) -> Response {
    let Some(name) = decode_url_path(path).and_then(|decoded| sanitize_file_name(&decoded))
    else {
        return ApiError::NotFound("Sidecar file not found".into()).into_response();
    };

    match tokio::fs::read(state.layout.upload_path(&name)).await {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime::APPLICATION_OCTET_STREAM.as_ref())],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::debug!(%name, error = %e, "Sidecar lookup failed");
            ApiError::NotFound("Sidecar file not found".into()).into_response()
        }
    }
}

/// Maps request validation errors to API errors
fn map_validation_error(err: RequestValidationError) -> ApiError {
    ApiError::InvalidPayload(err.to_string())
}

fn map_multipart_error(err: MultipartError, limit: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(limit)
    } else {
        ApiError::InvalidPayload(err.body_text())
    }
}
