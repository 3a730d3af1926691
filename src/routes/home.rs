use axum::response::Json;
use serde::Serialize;

#[derive(Serialize, utoipa::ToSchema)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub endpoints: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = RootResponse)
    ),
    tag = "General"
)]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Welcome to VideoBlobKit".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: vec![
            "POST /api/video_upload/{video_id}".to_string(),
            "POST /api/thumbnail_upload/{video_id}".to_string(),
            "GET /api/videos/{video_id}".to_string(),
            "GET /assets/{file}".to_string(),
            "GET /swagger-ui".to_string(),
        ],
    })
}
