//! Attaching volumes to, and detaching them from, running containers.

use volman_common::{ContainerRuntimeId, VolmanError, VolmanResult, VolumeId};

use crate::config::CommandBackendConfig;
use crate::process::CommandSpec;

/// Probes and changes container mounts through host helpers.
#[derive(Debug, Clone)]
pub struct MountOrchestrator {
    config: CommandBackendConfig,
}

impl MountOrchestrator {
    /// Create an orchestrator using the configured helpers.
    #[must_use]
    pub const fn new(config: CommandBackendConfig) -> Self {
        Self { config }
    }

    /// Whether `mount_point` appears in the container's mount table.
    ///
    /// A container that cannot be reached reports `false`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the CLI cannot be started.
    pub async fn is_mounted(
        &self,
        container: &ContainerRuntimeId,
        mount_point: &str,
    ) -> VolmanResult<bool> {
        let probe = format!("cat /proc/mounts | grep -q -- '{mount_point}'");
        let output = CommandSpec::new(&self.config.docker)
            .args(["exec", container.as_str(), "sh", "-c", probe.as_str()])
            .run()
            .await?;
        Ok(output.success())
    }

    /// Attach `volume` to the container via the attach helper.
    ///
    /// The helper receives `VOLUME`, `CONTAINER`, and `HOSTMOUNT` in its environment.
    ///
    /// # Errors
    ///
    /// Returns [`VolmanError::Backend`] with the helper's stderr if it exits
    /// non-zero, or [`VolmanError::Spawn`] if it cannot be started.
    pub async fn mount(
        &self,
        volume: &VolumeId,
        container: &ContainerRuntimeId,
    ) -> VolmanResult<()> {
        let mut spec = CommandSpec::new(&self.config.attach_helper)
            .env("VOLUME", volume.as_str())
            .env("CONTAINER", container.as_str())
            .env("HOSTMOUNT", &self.config.host_mount);
        if let Some(dir) = &self.config.attach_dir {
            spec = spec.current_dir(dir);
        }

        let output = spec.run().await?;
        if output.success() {
            return Ok(());
        }

        let stderr = output.stderr_lossy();
        tracing::warn!(
            prefix = volume.prefix(),
            container = %container,
            exit_code = output.exit_code,
            stderr = %stderr,
            "Attach helper failed"
        );
        Err(VolmanError::Backend {
            command: self.config.attach_helper.display().to_string(),
            stderr,
        })
    }

    /// Unmount whatever is mounted at `mount_point` inside the container.
    ///
    /// # Errors
    ///
    /// Returns an error only if the enter helper cannot be started.
    pub async fn unmount(
        &self,
        container: &ContainerRuntimeId,
        mount_point: &str,
    ) -> VolmanResult<bool> {
        let output = CommandSpec::new(&self.config.enter)
            .args([container.as_str(), "umount", mount_point])
            .run()
            .await?;
        if !output.success() {
            tracing::warn!(
                container = %container,
                exit_code = output.exit_code,
                stderr = %output.stderr_lossy(),
                "Unmount failed (may not be mounted)"
            );
        }
        Ok(output.success())
    }
}
