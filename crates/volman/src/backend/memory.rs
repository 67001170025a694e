//! In-memory backend for exercising the flows without host tooling.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use volman_common::{
    ContainerRuntimeId, DEFAULT_WORK_DIR, VolmanError, VolmanResult, VolumeId, VolumePrefix,
};

use super::VolumeBackend;
use crate::directory::scan_listing;

#[derive(Debug, Default)]
struct MemoryState {
    /// Volume names in creation order, as a listing would show them.
    volumes: Vec<String>,
    /// Container id -> attached volume name.
    mounts: HashMap<String, String>,
    listing_failure: Option<String>,
    create_failure: Option<String>,
    mount_failure: Option<String>,
}

/// Backend that keeps volumes and mounts in memory.
///
/// Lookups use the same listing scan as the command backend, so prefix
/// matching behaves identically. Mounts always land on one work directory.
#[derive(Debug)]
pub struct MemoryBackend {
    work_dir: String,
    state: Mutex<MemoryState>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Create an empty backend mounting at the default work directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            work_dir: DEFAULT_WORK_DIR.to_string(),
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Use a different in-container work directory.
    #[must_use]
    pub fn with_work_dir(mut self, work_dir: impl Into<String>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    /// Seed an existing volume.
    #[must_use]
    pub fn with_volume(self, name: impl Into<String>) -> Self {
        self.state.lock().volumes.push(name.into());
        self
    }

    /// Make listing fail with `stderr` until cleared with `None`.
    pub fn fail_listing(&self, stderr: Option<&str>) {
        self.state.lock().listing_failure = stderr.map(str::to_string);
    }

    /// Make volume creation fail with `stderr` until cleared with `None`.
    pub fn fail_creates(&self, stderr: Option<&str>) {
        self.state.lock().create_failure = stderr.map(str::to_string);
    }

    /// Make the attach step fail with `stderr` until cleared with `None`.
    pub fn fail_mounts(&self, stderr: Option<&str>) {
        self.state.lock().mount_failure = stderr.map(str::to_string);
    }

    /// Names of all volumes, in creation order.
    #[must_use]
    pub fn volumes(&self) -> Vec<String> {
        self.state.lock().volumes.clone()
    }

    /// The volume attached to a container, if any.
    #[must_use]
    pub fn mounted(&self, container: &str) -> Option<String> {
        self.state.lock().mounts.get(container).cloned()
    }
}

#[async_trait]
impl VolumeBackend for MemoryBackend {
    async fn find_volume(&self, prefix: &VolumePrefix) -> VolmanResult<Option<VolumeId>> {
        let state = self.state.lock();
        if let Some(stderr) = &state.listing_failure {
            return Err(VolmanError::Backend {
                command: "volume ls".to_string(),
                stderr: stderr.clone(),
            });
        }
        let listing = state.volumes.join("\n");
        scan_listing(&listing, prefix.as_str())
            .map(|name| {
                VolumeId::parse(name).map_err(|_| VolmanError::Backend {
                    command: "volume ls".to_string(),
                    stderr: format!("listed volume '{name}' is not a volume id"),
                })
            })
            .transpose()
    }

    async fn create_volume(&self, volume: &VolumeId) -> VolmanResult<()> {
        let mut state = self.state.lock();
        if let Some(stderr) = &state.create_failure {
            return Err(VolmanError::Backend {
                command: "volume create".to_string(),
                stderr: stderr.clone(),
            });
        }
        state.volumes.push(volume.to_string());
        Ok(())
    }

    async fn has_mount(
        &self,
        container: &ContainerRuntimeId,
        mount_point: &str,
    ) -> VolmanResult<bool> {
        Ok(mount_point == self.work_dir
            && self.state.lock().mounts.contains_key(container.as_str()))
    }

    async fn mount_volume(
        &self,
        volume: &VolumeId,
        container: &ContainerRuntimeId,
    ) -> VolmanResult<()> {
        let mut state = self.state.lock();
        if let Some(stderr) = &state.mount_failure {
            return Err(VolmanError::Backend {
                command: "attach".to_string(),
                stderr: stderr.clone(),
            });
        }
        state
            .mounts
            .insert(container.to_string(), volume.to_string());
        Ok(())
    }

    async fn unmount_volume(
        &self,
        container: &ContainerRuntimeId,
        mount_point: &str,
    ) -> VolmanResult<bool> {
        if mount_point != self.work_dir {
            return Ok(false);
        }
        Ok(self.state.lock().mounts.remove(container.as_str()).is_some())
    }
}
