use crate::{
    docs::ApiDoc,
    handlers::{
        clear_clip, delete_file, diagnostics, download_file, get_clip, get_file, get_room,
        health_check, list_files, ready_check, update_clip, upload_file,
    },
    websocket::websocket_handler,
    AppState,
};
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::get,
    routing::post,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create API routes
pub fn create_api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::<AppState>::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .route("/v1/diagnostics", get(diagnostics))
        .route("/v1/rooms/:tag", get(get_room))
        .route("/v1/clip/:tag", get(get_clip).post(update_clip).delete(clear_clip))
        .route(
            "/v1/upload/:tag",
            post(upload_file).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/v1/files/:tag", get(list_files))
        .route("/v1/file/:tag/:file_id", get(get_file).delete(delete_file))
        .route("/v1/download/:tag/:file_id", get(download_file))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(parsed)
}

/// Full application router: REST under `/api`, the WebSocket endpoint and
/// the Swagger UI.
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();
    Router::new()
        // Mount API routes
        .nest("/api", create_api_routes(config.max_upload_bytes))
        .route("/ws", get(websocket_handler))
        .with_state(state)
        // Mount Swagger UI
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(&config.cors_origin_list()))
        // Add tracing layer
        .layer(TraceLayer::new_for_http())
}
