mod home;
mod videos;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
    middleware,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use crate::middleware::auth::auth_middleware;
use crate::state::AppState;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Room for multipart boundaries and part headers on top of the file bytes.
const MULTIPART_SLACK: u64 = 64 * 1024;

// Define the OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        home::root,
        videos::upload_video,
        videos::upload_thumbnail,
        videos::get_video,
    ),
    components(
        schemas(
            home::RootResponse,
            crate::error::ErrorResponse,
            crate::models::video::VideoRecord,
        )
    ),
    tags(
        (name = "General", description = "General API information"),
        (name = "Videos", description = "Video and thumbnail ingestion for owned video records")
    ),
    info(
        title = "VideoBlobKit API",
        version = "0.1.0",
        description = "A Rust/Axum service that transcodes uploaded videos for fast-start playback and publishes them to S3",
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

// Add security scheme for JWT Bearer tokens
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer
                    )
                ),
            );
        }
    }
}

fn body_limit(file_limit: u64) -> DefaultBodyLimit {
    let total = file_limit.saturating_add(MULTIPART_SLACK);
    DefaultBodyLimit::max(usize::try_from(total).unwrap_or(usize::MAX))
}

pub fn create_routes(state: AppState) -> Router {
    let settings = state.ingest.settings().clone();

    // Swagger UI (stateless)
    let swagger_router: Router = SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into();

    // Every /api route requires a bearer token
    let api_routes = Router::new()
        .route(
            "/api/video_upload/{video_id}",
            post(videos::upload_video).layer(body_limit(settings.max_video_bytes)),
        )
        .route(
            "/api/thumbnail_upload/{video_id}",
            post(videos::upload_thumbnail).layer(body_limit(settings.max_thumbnail_bytes)),
        )
        .route("/api/videos/{video_id}", get(videos::get_video))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let app_routes = Router::new()
        .route("/", get(home::root))
        .merge(api_routes)
        .nest_service("/assets", ServeDir::new(&settings.assets_root))
        .with_state(state);

    Router::new()
        .merge(swagger_router)
        .merge(app_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
