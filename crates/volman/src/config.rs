//! Service and backend configuration.

use std::path::PathBuf;

use volman_common::DEFAULT_WORK_DIR;

use crate::identity::DEFAULT_COST;

/// Settings for the registration and login flows.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Prefix mapping session tokens to container runtime ids.
    pub pool_prefix: String,
    /// Key required to register, if any.
    pub registration_key: Option<String>,
    /// Path inside containers where user volumes are attached.
    pub work_dir: String,
    /// bcrypt work factor for new volume suffixes.
    pub bcrypt_cost: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            pool_prefix: String::new(),
            registration_key: None,
            work_dir: DEFAULT_WORK_DIR.to_string(),
            bcrypt_cost: DEFAULT_COST,
        }
    }
}

impl ServiceConfig {
    /// Set the pool prefix.
    #[must_use]
    pub fn with_pool_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.pool_prefix = prefix.into();
        self
    }

    /// Require a registration key. An empty key disables the gate.
    #[must_use]
    pub fn with_registration_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.registration_key = (!key.is_empty()).then_some(key);
        self
    }

    /// Set the in-container work directory.
    #[must_use]
    pub fn with_work_dir(mut self, dir: impl Into<String>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Set the bcrypt work factor.
    #[must_use]
    pub const fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }
}

/// Commands and paths used by [`CommandBackend`](crate::CommandBackend).
#[derive(Debug, Clone)]
pub struct CommandBackendConfig {
    /// Volume and container CLI (`volume ls`, `volume create`, `exec`).
    pub docker: PathBuf,
    /// Namespace-enter helper used to unmount inside a container.
    pub enter: PathBuf,
    /// Helper that attaches a volume to a running container.
    pub attach_helper: PathBuf,
    /// Working directory for the attach helper.
    pub attach_dir: Option<PathBuf>,
    /// Where the host root is mounted inside this service's container.
    pub host_mount: String,
}

impl Default for CommandBackendConfig {
    fn default() -> Self {
        Self {
            docker: PathBuf::from("docker"),
            enter: PathBuf::from("docker-enter"),
            attach_helper: PathBuf::from("./attach_work.sh"),
            attach_dir: None,
            host_mount: String::new(),
        }
    }
}

impl CommandBackendConfig {
    /// Set the volume and container CLI.
    #[must_use]
    pub fn with_docker(mut self, docker: impl Into<PathBuf>) -> Self {
        self.docker = docker.into();
        self
    }

    /// Set the namespace-enter helper.
    #[must_use]
    pub fn with_enter(mut self, enter: impl Into<PathBuf>) -> Self {
        self.enter = enter.into();
        self
    }

    /// Set the attach helper and the directory it runs in.
    #[must_use]
    pub fn with_attach_helper(
        mut self,
        helper: impl Into<PathBuf>,
        dir: Option<PathBuf>,
    ) -> Self {
        self.attach_helper = helper.into();
        self.attach_dir = dir;
        self
    }

    /// Set the host mount path passed to the attach helper.
    #[must_use]
    pub fn with_host_mount(mut self, host_mount: impl Into<String>) -> Self {
        self.host_mount = host_mount.into();
        self
    }
}
