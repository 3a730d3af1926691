use axum::body::Bytes;
use futures::stream::BoxStream;
use image::ImageFormat;
use sea_orm::DbErr;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;
use crate::config::Config;
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::media::{MediaType, UploadKind};
use crate::models::video::VideoRecord;
use crate::services::aspect::classify;
use crate::services::keys::{self, ObjectKey};
use crate::services::probe::MediaProbe;
use crate::services::s3::ObjectStore;
use crate::services::staging::StagedArtifact;
use crate::services::transcoder::Transcoder;
use crate::services::video_store::VideoStore;

/// Leading bytes inspected when checking a thumbnail's real format.
const SNIFF_BYTES: u64 = 64;

/// Hidden directory under the assets root where thumbnails are staged.
pub const THUMBNAIL_STAGING_DIR: &str = ".staging";

/// The file part of an upload request, not yet read.
pub struct IncomingFile<'a> {
    pub content_type: String,
    pub body: BoxStream<'a, Result<Bytes, AppError>>,
}

/// A video record that has passed the ownership check.
///
/// Only [`IngestService::authorize`] builds one, so the upload operations
/// cannot run for a caller that does not own the record.
#[derive(Debug)]
pub struct AuthorizedVideo(VideoRecord);

impl AuthorizedVideo {
    pub fn record(&self) -> &VideoRecord {
        &self.0
    }

    pub fn into_record(self) -> VideoRecord {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub temp_dir: PathBuf,
    pub assets_root: PathBuf,
    pub public_base_url: String,
    pub max_video_bytes: u64,
    pub max_thumbnail_bytes: u64,
}

impl From<&Config> for IngestSettings {
    fn from(config: &Config) -> Self {
        Self {
            temp_dir: config.temp_dir.clone(),
            assets_root: config.assets_root.clone(),
            public_base_url: config.public_base_url.clone(),
            max_video_bytes: config.max_video_bytes,
            max_thumbnail_bytes: config.max_thumbnail_bytes,
        }
    }
}

pub struct IngestService {
    videos: Arc<dyn VideoStore>,
    objects: Arc<dyn ObjectStore>,
    transcoder: Arc<dyn Transcoder>,
    probe: Arc<dyn MediaProbe>,
    settings: IngestSettings,
}

impl IngestService {
    pub fn new(
        videos: Arc<dyn VideoStore>,
        objects: Arc<dyn ObjectStore>,
        transcoder: Arc<dyn Transcoder>,
        probe: Arc<dyn MediaProbe>,
        settings: IngestSettings,
    ) -> Self {
        Self {
            videos,
            objects,
            transcoder,
            probe,
            settings,
        }
    }

    pub fn settings(&self) -> &IngestSettings {
        &self.settings
    }

    /// Loads the record and checks that `user` owns it.
    pub async fn authorize(&self, user: &AuthUser, video_id: Uuid) -> Result<AuthorizedVideo, AppError> {
        let video = self
            .videos
            .get(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

        if video.user_id != user.user_id {
            tracing::warn!(%video_id, user_id = %user.user_id, "Access denied: caller does not own video");
            return Err(AppError::Forbidden("You are not the owner of this video".to_string()));
        }

        Ok(AuthorizedVideo(video))
    }

    /// Stages, remuxes, classifies and publishes a video, then records its
    /// playback URL. Every temp file is gone when this returns.
    #[tracing::instrument(skip_all, fields(video_id = %video.record().id))]
    pub async fn ingest_video(&self, video: AuthorizedVideo, upload: IncomingFile<'_>) -> Result<VideoRecord, AppError> {
        let media_type = UploadKind::Video
            .accept(&upload.content_type)
            .ok_or_else(|| AppError::UnsupportedMediaType(upload.content_type.clone()))?;

        let raw = StagedArtifact::capture(
            &self.settings.temp_dir,
            media_type.extension(),
            upload.body,
            self.settings.max_video_bytes,
        )
        .await?;

        let optimized = StagedArtifact::create(&self.settings.temp_dir, media_type.extension())?;
        self.transcoder.fast_start(raw.path(), optimized.path()).await?;

        let geometry = self.probe.probe(optimized.path()).await?;
        let classification = classify(geometry);
        let key = ObjectKey::generate(classification, media_type.as_str());
        tracing::info!(
            width = geometry.width,
            height = geometry.height,
            %classification,
            key = %key,
            "Uploading video"
        );

        self.objects
            .put_file(&key, optimized.path(), media_type.as_str())
            .await
            .map_err(|e| AppError::StoreUploadFailed(e.to_string()))?;

        let video_url = self.objects.public_url(&key);
        match self.videos.set_video_url(video.record().id, &video_url).await {
            Ok(updated) => {
                tracing::info!(key = %key, "Video published");
                Ok(updated)
            }
            Err(err) => Err(self.discard_orphan(&key, err).await),
        }
    }

    /// Stores a thumbnail under the assets directory and records its URL.
    #[tracing::instrument(skip_all, fields(video_id = %video.record().id))]
    pub async fn ingest_thumbnail(&self, video: AuthorizedVideo, upload: IncomingFile<'_>) -> Result<VideoRecord, AppError> {
        let media_type = UploadKind::Thumbnail
            .accept(&upload.content_type)
            .ok_or_else(|| AppError::UnsupportedMediaType(upload.content_type.clone()))?;

        // Same filesystem as the final location so persisting is a plain rename.
        let staging_dir = self.settings.assets_root.join(THUMBNAIL_STAGING_DIR);
        tokio::fs::create_dir_all(&staging_dir).await?;
        let staged = StagedArtifact::capture(
            &staging_dir,
            media_type.extension(),
            upload.body,
            self.settings.max_thumbnail_bytes,
        )
        .await?;

        let head = staged.read_head(SNIFF_BYTES).await?;
        let sniffed = image::guess_format(&head).ok();
        let content_matches = matches!(
            (media_type, sniffed),
            (MediaType::Jpeg, Some(ImageFormat::Jpeg)) | (MediaType::Png, Some(ImageFormat::Png))
        );
        if !content_matches {
            return Err(AppError::UnsupportedMediaType(format!(
                "file content does not match {}",
                media_type
            )));
        }

        let file_name = format!("{}{}", keys::random_id(), media_type.extension());
        let dest = self.settings.assets_root.join(&file_name);
        staged.persist(&dest)?;

        let thumbnail_url = format!("{}/assets/{}", self.settings.public_base_url, file_name);
        match self.videos.set_thumbnail_url(video.record().id, &thumbnail_url).await {
            Ok(updated) => {
                tracing::info!(file = %file_name, "Thumbnail stored");
                Ok(updated)
            }
            Err(err) => {
                tracing::error!(file = %file_name, error = %err, "Video record update failed after storing thumbnail");
                let orphan_removed = match tokio::fs::remove_file(&dest).await {
                    Ok(()) => true,
                    Err(remove_err) => {
                        tracing::error!(file = %file_name, error = %remove_err, "Failed to remove orphaned thumbnail");
                        false
                    }
                };
                Err(AppError::MetadataSyncFailed {
                    key: file_name,
                    reason: err.to_string(),
                    orphan_removed,
                })
            }
        }
    }

    pub async fn get_video(&self, user: &AuthUser, video_id: Uuid) -> Result<VideoRecord, AppError> {
        Ok(self.authorize(user, video_id).await?.into_record())
    }

    // Best-effort removal of an object whose record update failed. The error
    // is reported either way.
    async fn discard_orphan(&self, key: &ObjectKey, err: DbErr) -> AppError {
        tracing::error!(key = %key, error = %err, "Video record update failed after upload");
        let orphan_removed = match self.objects.delete(key).await {
            Ok(()) => {
                tracing::warn!(key = %key, "Removed orphaned object");
                true
            }
            Err(delete_err) => {
                tracing::error!(
                    key = %key,
                    error = %delete_err,
                    "Failed to remove orphaned object; manual reconciliation needed"
                );
                false
            }
        };
        AppError::MetadataSyncFailed {
            key: key.to_string(),
            reason: err.to_string(),
            orphan_removed,
        }
    }
}
