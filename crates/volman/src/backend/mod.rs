//! The volume-management seam.
//!
//! Everything the flows need from the host goes through [`VolumeBackend`]:
//! find, create, probe, attach, and detach. [`CommandBackend`] drives the
//! real host tooling; [`MemoryBackend`] keeps the same state in memory.

use async_trait::async_trait;
use volman_common::{ContainerRuntimeId, VolmanResult, VolumeId, VolumePrefix};

mod command;
mod memory;

pub use command::CommandBackend;
pub use memory::MemoryBackend;

/// Volume and mount operations offered by the host.
///
/// Probes and detaches answer `Ok(false)` when the backend ran and said no.
/// Creates and attaches have no such answer: a refusal is
/// [`VolmanError::Backend`](volman_common::VolmanError::Backend) carrying the
/// backend's stderr, so the flows can report it.
#[async_trait]
pub trait VolumeBackend: Send + Sync {
    /// Find the volume for a prefix.
    async fn find_volume(&self, prefix: &VolumePrefix) -> VolmanResult<Option<VolumeId>>;

    /// Create a volume with the given name.
    async fn create_volume(&self, volume: &VolumeId) -> VolmanResult<()>;

    /// Whether the container has something mounted at `mount_point`.
    async fn has_mount(
        &self,
        container: &ContainerRuntimeId,
        mount_point: &str,
    ) -> VolmanResult<bool>;

    /// Attach a volume to a container.
    async fn mount_volume(
        &self,
        volume: &VolumeId,
        container: &ContainerRuntimeId,
    ) -> VolmanResult<()>;

    /// Detach whatever is mounted at `mount_point` in the container.
    async fn unmount_volume(
        &self,
        container: &ContainerRuntimeId,
        mount_point: &str,
    ) -> VolmanResult<bool>;
}
