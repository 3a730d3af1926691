use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// JSON body of every error response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("upload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: u64 },
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("transcode failed: {0}")]
    TranscodeFailed(String),
    #[error("probe failed: {0}")]
    ProbeFailed(String),
    #[error("object store upload failed: {0}")]
    StoreUploadFailed(String),
    /// The object was stored but the video record could not be updated.
    /// `orphan_removed` tells whether the stored object was cleaned up again.
    #[error("stored object {key} but failed to update the video record: {reason}")]
    MetadataSyncFailed { key: String, reason: String, orphan_removed: bool },
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::ProbeFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::StoreUploadFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::Io(_)
            | AppError::TranscodeFailed(_)
            | AppError::MetadataSyncFailed { .. }
            | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::BadRequest(_) => "bad_request",
            AppError::PayloadTooLarge { .. } => "payload_too_large",
            AppError::UnsupportedMediaType(_) => "unsupported_media_type",
            AppError::Io(_) => "io_error",
            AppError::TranscodeFailed(_) => "transcode_failed",
            AppError::ProbeFailed(_) => "probe_failed",
            AppError::StoreUploadFailed(_) => "store_upload_failed",
            AppError::MetadataSyncFailed { .. } => "metadata_sync_failed",
            AppError::Database(_) => "database_error",
        }
    }

    /// Maps a failure while locating the multipart field.
    pub fn from_multipart(err: MultipartError, limit: u64) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge { limit }
        } else {
            AppError::BadRequest(err.body_text())
        }
    }

    /// Maps a failure while reading the body of the file field.
    pub fn from_body_read(err: MultipartError, limit: u64) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge { limit }
        } else {
            AppError::Io(std::io::Error::other(err.body_text()))
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::MetadataSyncFailed { key, reason, orphan_removed: true } => {
                tracing::error!(%key, %reason, "Video record not updated; stored object was removed");
                format!("The record could not be updated; the uploaded object {} was discarded", key)
            }
            AppError::MetadataSyncFailed { key, reason, orphan_removed: false } => {
                tracing::error!(%key, %reason, "Object stored but video record not updated; needs reconciliation");
                format!("Upload was stored as {} but the record could not be updated", key)
            }
            AppError::Io(_) | AppError::TranscodeFailed(_) | AppError::Database(_) => {
                tracing::error!(error = %self, "Internal server error");
                "Internal server error".to_string()
            }
            AppError::StoreUploadFailed(_) => {
                tracing::error!(error = %self, "Object store error");
                "Failed to store uploaded media".to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(ErrorResponse {
            error: message,
            code: self.code().to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_http_status() {
        assert_eq!(AppError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::PayloadTooLarge { limit: 10 }.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::UnsupportedMediaType("video/avi".into()).status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            AppError::MetadataSyncFailed { key: "k".into(), reason: "r".into(), orphan_removed: true }.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn metadata_sync_failure_is_surfaced_distinctly() {
        let response = AppError::MetadataSyncFailed {
            key: "landscape/abc.mp4".into(),
            reason: "connection reset".into(),
            orphan_removed: false,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["code"], "metadata_sync_failed");
        assert!(body["error"].as_str().unwrap().contains("landscape/abc.mp4"));
        assert!(!body["error"].as_str().unwrap().contains("connection reset"));
    }

    #[tokio::test]
    async fn internal_details_are_not_echoed() {
        let response = AppError::TranscodeFailed("ffmpeg: moov atom not found".into()).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["code"], "transcode_failed");
    }

    #[tokio::test]
    async fn discarded_orphan_is_not_reported_as_stored() {
        let response = AppError::MetadataSyncFailed {
            key: "portrait/xyz.mp4".into(),
            reason: "connection reset".into(),
            orphan_removed: true,
        }
        .into_response();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let message = body["error"].as_str().unwrap();
        assert_eq!(body["code"], "metadata_sync_failed");
        assert!(message.contains("discarded"));
        assert!(!message.contains("was stored as"));
    }
}
