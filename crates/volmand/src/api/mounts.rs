//! `POST /api/mounts` (login) and `DELETE /api/mounts/{id}` (logout).

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use volman::{MountId, SessionToken, VolumeService};

use super::{ApiError, run_to_completion};

/// Login request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMountRequest {
    /// Account name.
    pub username: String,
    /// Password unlocking the account's volume.
    pub password: String,
    /// Session token of the pooled container to attach to.
    pub tmpnb_id: String,
}

/// Successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountCreated {
    /// Mount id, `<volume id>.<tmpnb id>`.
    pub id: String,
}

/// Result of a logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountDeleted {
    /// The id addressed by the request.
    pub id: String,
    /// Whether anything was mounted and has now been detached.
    pub unmounted: bool,
}

/// Attach the user's volume to the session's container.
pub async fn create_mount(
    State(service): State<VolumeService>,
    payload: Result<Json<CreateMountRequest>, JsonRejection>,
) -> Result<Json<MountCreated>, ApiError> {
    let Json(request) = payload?;
    let token = SessionToken::new(request.tmpnb_id)?;
    let mount = run_to_completion(async move {
        service
            .login(&request.username, &request.password, &token)
            .await
    })
    .await?;
    Ok(Json(MountCreated {
        id: mount.to_string(),
    }))
}

/// Detach whatever is mounted on the addressed session's container.
///
/// `id` is a mount id or a bare session token. A container with nothing
/// mounted still answers 200, with `unmounted: false`. The only failures are
/// 400 when the trailing segment is not a session token and 500 when the
/// enter helper cannot be started.
pub async fn delete_mount(
    State(service): State<VolumeService>,
    Path(id): Path<String>,
) -> Result<Json<MountDeleted>, ApiError> {
    let token = MountId::session_token_of(&id)?;
    let unmounted = run_to_completion(async move { service.logout(&token).await }).await?;
    Ok(Json(MountDeleted { id, unmounted }))
}
