//! # volman-client
//!
//! Client for the volume manager, used by login and logout handlers to have a
//! user's volume attached to, or detached from, their session's container.
//!
//! ```no_run
//! # async fn demo() -> Result<(), volman_client::ClientError> {
//! let client = volman_client::VolumesClient::new("http://127.0.0.1:9005");
//! client.create_volume("alice", "password1", "").await?;
//! let mount_id = client.mount_volume("alice", "password1", "abc123").await?;
//! client.unmount_volume(&mount_id).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;

pub use error::{ClientError, ClientResult};

use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct CreateVolume<'a> {
    username: &'a str,
    password: &'a str,
    registration_key: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateMount<'a> {
    username: &'a str,
    password: &'a str,
    tmpnb_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct MountCreated {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MountDeleted {
    unmounted: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for the volume manager HTTP API.
#[derive(Debug, Clone)]
pub struct VolumesClient {
    client: Client,
    server_url: String,
}

impl VolumesClient {
    /// Create a client for the server at `server_url`, e.g. `http://127.0.0.1:9005`.
    pub fn new(server_url: impl Into<String>) -> Self {
        let server_url = server_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            server_url,
        }
    }

    /// Base URL of the server.
    #[must_use]
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Register a volume for `username`, protected by `password`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidKey`] if the registration key was refused
    /// - [`ClientError::Conflict`] if the user already has a volume
    /// - [`ClientError::Status`] for any other failure status
    /// - [`ClientError::Http`] if the server could not be reached
    pub async fn create_volume(
        &self,
        username: &str,
        password: &str,
        registration_key: &str,
    ) -> ClientResult<()> {
        let url = format!("{}/api/volumes", self.server_url);
        tracing::debug!(url = %url, username, "Creating volume");

        let response = self
            .client
            .post(&url)
            .json(&CreateVolume {
                username,
                password,
                registration_key,
            })
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED => Err(ClientError::InvalidKey),
            _ => Err(failure(response).await),
        }
    }

    /// Attach the volume of `username` to the container of session `tmpnb_id`.
    ///
    /// Returns the mount id to present at logout.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Unauthorized`] if the username or password is wrong
    /// - [`ClientError::Conflict`] if the container already has a volume
    /// - [`ClientError::Status`] for any other failure status
    /// - [`ClientError::Http`] if the server could not be reached
    pub async fn mount_volume(
        &self,
        username: &str,
        password: &str,
        tmpnb_id: &str,
    ) -> ClientResult<String> {
        let url = format!("{}/api/mounts", self.server_url);
        tracing::debug!(url = %url, username, tmpnb_id, "Mounting volume");

        let response = self
            .client
            .post(&url)
            .json(&CreateMount {
                username,
                password,
                tmpnb_id,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(failure(response).await);
        }
        let mount: MountCreated = response.json().await?;
        Ok(mount.id)
    }

    /// Detach whatever is mounted on the container named by `mount_id`.
    ///
    /// Returns whether anything was mounted.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Status`] if the server refused the id or failed
    /// - [`ClientError::Http`] if the server could not be reached
    pub async fn unmount_volume(&self, mount_id: &str) -> ClientResult<bool> {
        let url = format!("{}/api/mounts/{}", self.server_url, mount_id);
        tracing::debug!(url = %url, "Unmounting volume");

        let response = self.client.delete(&url).send().await?;
        if !response.status().is_success() {
            return Err(failure(response).await);
        }
        let deleted: MountDeleted = response.json().await?;
        Ok(deleted.unmounted)
    }
}

/// Turn a non-success response into the matching error.
async fn failure(response: Response) -> ClientError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text).map_or(text, |body| body.message);

    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized { message },
        StatusCode::CONFLICT => ClientError::Conflict { message },
        _ => ClientError::Status {
            status: status.as_u16(),
            message,
        },
    }
}
