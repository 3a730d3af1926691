use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set, Unchanged};
use uuid::Uuid;
use crate::entities::video::{self, Entity as Video};
use crate::models::video::VideoRecord;

/// Video metadata store keyed by video id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<VideoRecord>, DbErr>;

    /// Sets only `video_url`, leaving the other columns as stored.
    async fn set_video_url(&self, id: Uuid, url: &str) -> Result<VideoRecord, DbErr>;

    /// Sets only `thumbnail_url`, leaving the other columns as stored.
    async fn set_thumbnail_url(&self, id: Uuid, url: &str) -> Result<VideoRecord, DbErr>;
}

pub struct SeaOrmVideoStore {
    db: DatabaseConnection,
}

impl SeaOrmVideoStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VideoStore for SeaOrmVideoStore {
    async fn get(&self, id: Uuid) -> Result<Option<VideoRecord>, DbErr> {
        let video = Video::find_by_id(id).one(&self.db).await?;
        Ok(video.map(VideoRecord::from))
    }

    async fn set_video_url(&self, id: Uuid, url: &str) -> Result<VideoRecord, DbErr> {
        let video = video::ActiveModel {
            id: Unchanged(id),
            video_url: Set(Some(url.to_string())),
            updated_at: Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        };

        let updated = video.update(&self.db).await?;
        Ok(VideoRecord::from(updated))
    }

    async fn set_thumbnail_url(&self, id: Uuid, url: &str) -> Result<VideoRecord, DbErr> {
        let video = video::ActiveModel {
            id: Unchanged(id),
            thumbnail_url: Set(Some(url.to_string())),
            updated_at: Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        };

        let updated = video.update(&self.db).await?;
        Ok(VideoRecord::from(updated))
    }
}
