pub mod config;

use std::path::Path;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use artographer_api::{AppState, dashboard, health, images, logs, pins, users};

/// Builds the full HTTP surface: JSON API, health check and the static
/// dashboard under `/dashboard`.
pub fn app(state: AppState, dashboard_dir: &Path) -> Router {
    let api_routes = Router::new()
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route("/api/users/{user_id}", get(users::get_user).delete(users::delete_user))
        .route("/api/users/{user_id}/resync", post(users::resync_user))
        .route(
            "/api/users/{user_id}/images",
            get(images::list_images).post(images::create_image),
        )
        .route(
            "/api/users/{user_id}/images/{image_id}",
            get(images::get_image).put(images::update_image).delete(images::delete_image),
        )
        .route("/api/users/{user_id}/pins", get(pins::list_pins).post(pins::create_pin))
        .route(
            "/api/users/{user_id}/pins/{entry_id}",
            get(pins::get_pin).put(pins::update_pin).delete(pins::delete_pin),
        )
        .route("/api/users/{user_id}/logs", get(logs::list_logs).post(logs::create_log))
        .route("/api/users/{user_id}/logs/tasks", get(logs::task_summary))
        .route("/api/dashboard", get(dashboard::get_dashboard))
        .route("/health", get(health))
        .with_state(state);

    Router::new()
        .merge(api_routes)
        .route("/", get(|| async { Redirect::temporary("/dashboard/") }))
        .nest_service("/dashboard", ServeDir::new(dashboard_dir))
        // The dashboard and the capture app are served from other origins
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "artographer=debug,tower_http=debug".into());

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
