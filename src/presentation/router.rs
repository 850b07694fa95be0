use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::config::{CorsOriginError, CorsSettings};
use crate::presentation::handlers::{health_handler, transcribe_handler};
use crate::presentation::state::AppState;

pub fn create_router(state: AppState) -> Result<Router, CorsOriginError> {
    let cors = cors_layer(&state.settings.cors)?;

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let upload = &state.settings.upload;

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/transcribe", post(transcribe_handler))
        .layer(DefaultBodyLimit::max(upload.max_upload_size_bytes));

    if upload.include_artifact_url {
        router = router.nest_service("/uploads", ServeDir::new(&upload.local_path));
    }

    Ok(router
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state))
}

/// Wildcard origins cannot be combined with credentials, so credentials are
/// only allowed for an explicit origin list.
fn cors_layer(settings: &CorsSettings) -> Result<CorsLayer, CorsOriginError> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(AllowHeaders::mirror_request());

    Ok(match settings.origins()? {
        None => layer.allow_origin(AllowOrigin::any()),
        Some(origins) => layer
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true),
    })
}
