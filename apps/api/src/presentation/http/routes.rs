use super::{
    handlers::{auth, graphics, health, report, status, upload},
    middleware::logging::logging_middleware,
    middleware::request_id::request_id_middleware,
    middleware::upload_gate::require_upload_session,
    state::AppState,
};
use axum::{
    Router, middleware,
    routing::{get, post},
};

pub fn create_router(state: AppState) -> Router {
    let upload_routes = Router::new()
        .route("/api/v1/graphics", post(upload::upload_graphic))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_upload_session,
        ));

    Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Sidebar
        .route("/api/v1/status", get(status::get_status))
        .route("/api/v1/auth/login", post(auth::login))
        // Uploader
        .route("/api/v1/upload/options", get(upload::upload_options))
        // Report
        .route("/api/v1/graphics", get(report::get_report))
        .route("/api/v1/graphics/{id}", get(graphics::get_graphic))
        .route("/api/v1/graphics/{id}/image", get(graphics::get_image))
        .route(
            "/api/v1/graphics/{id}/thumbnail",
            get(graphics::get_thumbnail),
        )
        // Upload (gated when a password is configured)
        .merge(upload_routes)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}
