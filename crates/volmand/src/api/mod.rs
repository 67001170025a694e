//! HTTP API.

use std::future::Future;

use volman::{VolmanError, VolmanResult};

pub mod error;
pub mod mounts;
pub mod server;
pub mod volumes;

pub use error::{ApiError, ErrorBody};
pub use server::app;

/// Run a flow on its own task and wait for it.
///
/// Hyper drops a handler's future when the client disconnects; a spawned flow
/// still runs every remaining backend command to completion.
pub(crate) async fn run_to_completion<F, T>(flow: F) -> Result<T, ApiError>
where
    F: Future<Output = VolmanResult<T>> + Send + 'static,
    T: Send + 'static,
{
    let outcome = tokio::spawn(flow).await.map_err(|e| VolmanError::Internal {
        message: format!("request task failed: {e}"),
    })?;
    Ok(outcome?)
}
