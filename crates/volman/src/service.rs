//! Registration, login, and logout flows.
//!
//! Each flow turns backend booleans into domain errors at the point where
//! their meaning is known: an existing volume is a conflict only when
//! registering, and a missing one is an authorization failure when logging in.

use std::sync::Arc;

use volman_common::{
    ContainerRuntimeId, MountId, SessionToken, VolmanError, VolmanResult, VolumeId, VolumePrefix,
};

use crate::backend::VolumeBackend;
use crate::config::ServiceConfig;
use crate::identity;
use crate::locks::KeyedLocks;

/// The volume manager's use cases over a [`VolumeBackend`].
#[derive(Clone)]
pub struct VolumeService {
    backend: Arc<dyn VolumeBackend>,
    config: ServiceConfig,
    locks: KeyedLocks,
}

impl std::fmt::Debug for VolumeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VolumeService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl VolumeService {
    /// Create a service over `backend`.
    pub fn new(backend: Arc<dyn VolumeBackend>, config: ServiceConfig) -> Self {
        Self {
            backend,
            config,
            locks: KeyedLocks::new(),
        }
    }

    /// The service configuration.
    #[must_use]
    pub const fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Map a session token to its container.
    #[must_use]
    pub fn container_for(&self, token: &SessionToken) -> ContainerRuntimeId {
        ContainerRuntimeId::from_session(&self.config.pool_prefix, token)
    }

    /// Create a volume owned by `username` and unlocked by `password`.
    ///
    /// Returns the new volume's prefix.
    ///
    /// # Errors
    ///
    /// - [`VolmanError::InvalidRegistrationKey`] if a key is required and does not match
    /// - [`VolmanError::VolumeExists`] if the user already has a volume
    /// - [`VolmanError::CreateFailed`] with the backend's stderr if it refuses the create
    /// - [`VolmanError::Backend`] if the volume listing fails
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        registration_key: &str,
    ) -> VolmanResult<VolumePrefix> {
        if let Some(required) = &self.config.registration_key {
            if required != registration_key {
                return Err(VolmanError::InvalidRegistrationKey);
            }
        }

        let prefix = identity::derive_prefix(username);
        let _guard = self.locks.lock(format!("volume:{prefix}")).await;

        if self.backend.find_volume(&prefix).await?.is_some() {
            return Err(VolmanError::VolumeExists {
                prefix: prefix.to_string(),
            });
        }

        let suffix = self.hash_password(password).await?;
        let volume = VolumeId::from_parts(&prefix, &suffix);
        self.backend
            .create_volume(&volume)
            .await
            .map_err(|e| {
                refusal(e, |stderr| VolmanError::CreateFailed {
                    prefix: prefix.to_string(),
                    stderr,
                })
            })?;

        tracing::info!(prefix = %prefix, "Created volume");
        Ok(prefix)
    }

    /// Attach the volume of `username` to the session's container.
    ///
    /// # Errors
    ///
    /// - [`VolmanError::AlreadyMounted`] if the container's work directory is in use
    /// - [`VolmanError::VolumeNotFound`] if the user has no volume
    /// - [`VolmanError::WrongPassword`] if the password does not unlock it
    /// - [`VolmanError::MountFailed`] with the helper's stderr if it fails
    /// - [`VolmanError::Backend`] if the volume listing fails
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        token: &SessionToken,
    ) -> VolmanResult<MountId> {
        let container = self.container_for(token);
        let _guard = self.locks.lock(format!("container:{container}")).await;

        if self
            .backend
            .has_mount(&container, &self.config.work_dir)
            .await?
        {
            return Err(VolmanError::AlreadyMounted {
                token: token.to_string(),
            });
        }

        let prefix = identity::derive_prefix(username);
        let Some(volume) = self.backend.find_volume(&prefix).await? else {
            return Err(VolmanError::VolumeNotFound {
                prefix: prefix.to_string(),
            });
        };

        if !self.check_password(&volume, password).await? {
            return Err(VolmanError::WrongPassword {
                prefix: prefix.to_string(),
            });
        }

        self.backend
            .mount_volume(&volume, &container)
            .await
            .map_err(|e| {
                refusal(e, |stderr| VolmanError::MountFailed {
                    prefix: prefix.to_string(),
                    token: token.to_string(),
                    stderr,
                })
            })?;

        tracing::info!(prefix = %prefix, container = %container, "Mounted volume");
        Ok(MountId::new(volume, token.clone()))
    }

    /// Unmount the work directory of the session's container.
    ///
    /// Returns whether anything was unmounted. No ownership check is made:
    /// the caller vouches for the session.
    ///
    /// # Errors
    ///
    /// Returns an error only if the unmount command cannot be run.
    pub async fn logout(&self, token: &SessionToken) -> VolmanResult<bool> {
        let container = self.container_for(token);
        let _guard = self.locks.lock(format!("container:{container}")).await;

        let unmounted = self
            .backend
            .unmount_volume(&container, &self.config.work_dir)
            .await?;
        if unmounted {
            tracing::info!(container = %container, "Unmounted volume");
        }
        Ok(unmounted)
    }

    async fn hash_password(&self, password: &str) -> VolmanResult<String> {
        let password = password.to_owned();
        let cost = self.config.bcrypt_cost;
        tokio::task::spawn_blocking(move || identity::derive_suffix(&password, cost))
            .await
            .map_err(|e| VolmanError::Internal {
                message: format!("hashing task failed: {e}"),
            })?
    }

    async fn check_password(&self, volume: &VolumeId, password: &str) -> VolmanResult<bool> {
        let volume = volume.to_string();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || identity::verify_ownership(&volume, &password))
            .await
            .map_err(|e| VolmanError::Internal {
                message: format!("verification task failed: {e}"),
            })?
    }
}

/// Name a backend refusal after the step that was refused, keeping its stderr.
fn refusal(err: VolmanError, step: impl FnOnce(String) -> VolmanError) -> VolmanError {
    match err {
        VolmanError::Backend { stderr, .. } => step(stderr),
        other => other,
    }
}
