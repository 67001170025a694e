//! Backend driven by host command-line tools.

use async_trait::async_trait;
use volman_common::{ContainerRuntimeId, VolmanResult, VolumeId, VolumePrefix};

use super::VolumeBackend;
use crate::config::CommandBackendConfig;
use crate::directory::VolumeDirectory;
use crate::mounts::MountOrchestrator;

/// Production backend: every operation is one external command.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    directory: VolumeDirectory,
    mounts: MountOrchestrator,
}

impl CommandBackend {
    /// Create a backend from its command configuration.
    #[must_use]
    pub fn new(config: CommandBackendConfig) -> Self {
        Self {
            directory: VolumeDirectory::new(config.docker.clone()),
            mounts: MountOrchestrator::new(config),
        }
    }
}

#[async_trait]
impl VolumeBackend for CommandBackend {
    async fn find_volume(&self, prefix: &VolumePrefix) -> VolmanResult<Option<VolumeId>> {
        self.directory.find(prefix).await
    }

    async fn create_volume(&self, volume: &VolumeId) -> VolmanResult<()> {
        self.directory.create(volume).await
    }

    async fn has_mount(
        &self,
        container: &ContainerRuntimeId,
        mount_point: &str,
    ) -> VolmanResult<bool> {
        self.mounts.is_mounted(container, mount_point).await
    }

    async fn mount_volume(
        &self,
        volume: &VolumeId,
        container: &ContainerRuntimeId,
    ) -> VolmanResult<()> {
        self.mounts.mount(volume, container).await
    }

    async fn unmount_volume(
        &self,
        container: &ContainerRuntimeId,
        mount_point: &str,
    ) -> VolmanResult<bool> {
        self.mounts.unmount(container, mount_point).await
    }
}
