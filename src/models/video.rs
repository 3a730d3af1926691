use serde::Serialize;
use uuid::Uuid;
use crate::entities::video;

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct VideoRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

impl From<video::Model> for VideoRecord {
    fn from(model: video::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            description: model.description,
            thumbnail_url: model.thumbnail_url,
            video_url: model.video_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
