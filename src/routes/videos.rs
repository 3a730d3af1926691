use axum::{
    extract::{Multipart, Path, State},
    response::Json,
    Extension,
};
use futures::StreamExt;
use uuid::Uuid;
use crate::error::{AppError, ErrorResponse};
use crate::middleware::auth::AuthUser;
use crate::models::video::VideoRecord;
use crate::services::ingest::IncomingFile;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/video_upload/{video_id}",
    tag = "Videos",
    params(("video_id" = Uuid, Path, description = "Video record to attach the upload to")),
    request_body(content = Vec<u8>, description = "Multipart form with a `video` field (video/mp4)", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video transcoded, stored and linked", body = VideoRecord),
        (status = 400, description = "Malformed multipart body or missing field", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "Upload exceeds the size limit", body = ErrorResponse),
        (status = 415, description = "Unsupported content type", body = ErrorResponse),
        (status = 422, description = "No usable video stream", body = ErrorResponse),
        (status = 500, description = "Transcode or metadata failure", body = ErrorResponse),
        (status = 502, description = "Object store rejected the upload", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_video(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(video_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<VideoRecord>, AppError> {
    // Ownership is settled before a single body byte is read.
    let video = state.ingest.authorize(&user, video_id).await?;
    let limit = state.ingest.settings().max_video_bytes;

    let field = loop {
        match multipart
            .next_field()
            .await
            .map_err(|e| AppError::from_multipart(e, limit))?
        {
            Some(field) if field.name() == Some("video") => break field,
            Some(_) => continue,
            None => return Err(AppError::BadRequest("No video field found".to_string())),
        }
    };

    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    tracing::info!(%video_id, user_id = %user.user_id, %content_type, "Receiving video upload");

    let body = field
        .map(move |chunk| chunk.map_err(|e| AppError::from_body_read(e, limit)))
        .boxed();
    let updated = state
        .ingest
        .ingest_video(video, IncomingFile { content_type, body })
        .await?;

    Ok(Json(updated))
}

#[utoipa::path(
    post,
    path = "/api/thumbnail_upload/{video_id}",
    tag = "Videos",
    params(("video_id" = Uuid, Path, description = "Video record to attach the thumbnail to")),
    request_body(content = Vec<u8>, description = "Multipart form with a `thumbnail` field (image/jpeg or image/png)", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Thumbnail stored and linked", body = VideoRecord),
        (status = 400, description = "Malformed multipart body or missing field", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "Upload exceeds the size limit", body = ErrorResponse),
        (status = 415, description = "Unsupported or mismatched image type", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_thumbnail(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(video_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<VideoRecord>, AppError> {
    let video = state.ingest.authorize(&user, video_id).await?;
    let limit = state.ingest.settings().max_thumbnail_bytes;

    let field = loop {
        match multipart
            .next_field()
            .await
            .map_err(|e| AppError::from_multipart(e, limit))?
        {
            Some(field) if field.name() == Some("thumbnail") => break field,
            Some(_) => continue,
            None => return Err(AppError::BadRequest("No thumbnail field found".to_string())),
        }
    };

    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    tracing::info!(%video_id, user_id = %user.user_id, %content_type, "Receiving thumbnail upload");

    let body = field
        .map(move |chunk| chunk.map_err(|e| AppError::from_body_read(e, limit)))
        .boxed();
    let updated = state
        .ingest
        .ingest_thumbnail(video, IncomingFile { content_type, body })
        .await?;

    Ok(Json(updated))
}

#[utoipa::path(
    get,
    path = "/api/videos/{video_id}",
    tag = "Videos",
    params(("video_id" = Uuid, Path, description = "Video record id")),
    responses(
        (status = 200, description = "The video record", body = VideoRecord),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_video(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(video_id): Path<Uuid>,
) -> Result<Json<VideoRecord>, AppError> {
    let video = state.ingest.get_video(&user, video_id).await?;
    Ok(Json(video))
}
