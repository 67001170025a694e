//! `POST /api/volumes`: registration.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use volman::VolumeService;

use super::{ApiError, run_to_completion};

/// Registration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVolumeRequest {
    /// Account name; hashed into the volume prefix.
    pub username: String,
    /// Password protecting the volume.
    pub password: String,
    /// Shared key gating registration; may be empty when no key is configured.
    #[serde(default)]
    pub registration_key: String,
}

/// Create a volume for a new user. Responds 201 with no body.
pub async fn create_volume(
    State(service): State<VolumeService>,
    payload: Result<Json<CreateVolumeRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = payload?;
    run_to_completion(async move {
        service
            .register(
                &request.username,
                &request.password,
                &request.registration_key,
            )
            .await
    })
    .await?;
    Ok(StatusCode::CREATED)
}
