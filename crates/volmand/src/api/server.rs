//! Router for the volume manager API.

use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use volman::VolumeService;

use super::{mounts, volumes};

/// Build the HTTP application over a volume service.
pub fn app(service: VolumeService) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/version", get(version))
        .route("/api/volumes", post(volumes::create_volume))
        .route("/api/mounts", post(mounts::create_mount))
        .route("/api/mounts/{id}", delete(mounts::delete_mount))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "volmand running" }))
}

async fn version() -> Json<Value> {
    Json(json!({ "version": env!("CARGO_PKG_VERSION") }))
}
