//! Volume lookup and creation.

use std::path::PathBuf;

use volman_common::{VolmanError, VolmanResult, VolumeId, VolumePrefix};

use crate::process::CommandSpec;

/// Finds and creates volumes through the volume CLI.
#[derive(Debug, Clone)]
pub struct VolumeDirectory {
    docker: PathBuf,
}

impl VolumeDirectory {
    /// Create a directory backed by the given volume CLI.
    pub fn new(docker: impl Into<PathBuf>) -> Self {
        Self {
            docker: docker.into(),
        }
    }

    /// Find the volume whose name contains `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`VolmanError::Backend`] if listing fails or the matching name
    /// is not a volume id.
    pub async fn find(&self, prefix: &VolumePrefix) -> VolmanResult<Option<VolumeId>> {
        let spec = CommandSpec::new(&self.docker).args(["volume", "ls"]);
        let output = spec.run().await?;
        if !output.success() {
            return Err(VolmanError::Backend {
                command: spec.to_string(),
                stderr: output.stderr_lossy(),
            });
        }

        let listing = output.stdout_lossy();
        scan_listing(&listing, prefix.as_str())
            .map(|name| {
                VolumeId::parse(name).map_err(|_| VolmanError::Backend {
                    command: spec.to_string(),
                    stderr: format!("listed volume '{name}' is not a volume id"),
                })
            })
            .transpose()
    }

    /// Create the volume named `volume`.
    ///
    /// # Errors
    ///
    /// Returns [`VolmanError::Backend`] with the CLI's stderr if it exits
    /// non-zero, or [`VolmanError::Spawn`] if it cannot be started.
    pub async fn create(&self, volume: &VolumeId) -> VolmanResult<()> {
        let output = CommandSpec::new(&self.docker)
            .args(["volume", "create", "--name"])
            .arg(volume.as_str())
            .run()
            .await?;
        if output.success() {
            return Ok(());
        }

        let stderr = output.stderr_lossy();
        tracing::warn!(
            prefix = volume.prefix(),
            exit_code = output.exit_code,
            stderr = %stderr,
            "Volume create failed"
        );
        Err(VolmanError::Backend {
            command: "volume create".to_string(),
            stderr,
        })
    }
}

/// Locate `prefix` in a volume listing.
///
/// Returns the text from the first occurrence of `prefix` up to the end of
/// its line. Any name containing `prefix` matches, not only names starting
/// with it; 40-character digests make accidental overlap practically
/// impossible.
#[must_use]
pub fn scan_listing<'a>(listing: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }
    let start = listing.find(prefix)?;
    let rest = &listing[start..];
    let end = rest.find('\n').unwrap_or(rest.len());
    Some(rest[..end].trim_end())
}
