//! Command-line and environment configuration, fixed at startup.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use volman::{CommandBackend, CommandBackendConfig, ServiceConfig, VolumeService};

/// volmand - attach per-user volumes to pooled containers
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// IP address for the REST API
    #[arg(long, env = "VOLMAN_IP", default_value = "127.0.0.1")]
    pub ip: IpAddr,

    /// Port for the REST API
    #[arg(long, env = "VOLMAN_PORT", default_value_t = 9005)]
    pub port: u16,

    /// Path where the host root is mounted in this container
    #[arg(long, env = "VOLMAN_HOST_MOUNT", default_value_t = String::new())]
    pub host_mount: String,

    /// Prefix assigned by the pool to its containers
    #[arg(long, env = "VOLMAN_POOL_PREFIX", default_value_t = String::new())]
    pub pool_prefix: String,

    /// Registration key required to create new volumes (empty: none)
    #[arg(
        long,
        env = "VOLMAN_REGISTRATION_KEY",
        default_value_t = String::new(),
        hide_env_values = true
    )]
    pub registration_key: String,

    /// Path inside containers where user volumes are mounted
    #[arg(long, env = "VOLMAN_WORK_DIR", default_value = volman::DEFAULT_WORK_DIR)]
    pub work_dir: String,

    /// Volume and container CLI
    #[arg(long, env = "VOLMAN_DOCKER", default_value = "docker")]
    pub docker: PathBuf,

    /// Helper that runs a command inside a container's namespaces
    #[arg(long, env = "VOLMAN_ENTER", default_value = "docker-enter")]
    pub enter: PathBuf,

    /// Helper that attaches a volume to a running container
    #[arg(long, env = "VOLMAN_ATTACH_HELPER", default_value = "./attach_work.sh")]
    pub attach_helper: PathBuf,

    /// Working directory for the attach helper (default: current directory)
    #[arg(long, env = "VOLMAN_ATTACH_DIR")]
    pub attach_dir: Option<PathBuf>,

    /// bcrypt work factor for new volumes
    #[arg(
        long,
        env = "VOLMAN_BCRYPT_COST",
        default_value_t = volman::identity::DEFAULT_COST,
        value_parser = clap::value_parser!(u32).range(4..=31)
    )]
    pub bcrypt_cost: u32,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

impl Args {
    /// Address to listen on.
    #[must_use]
    pub const fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }

    /// Settings for the registration and login flows.
    #[must_use]
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig::default()
            .with_pool_prefix(&self.pool_prefix)
            .with_registration_key(&self.registration_key)
            .with_work_dir(&self.work_dir)
            .with_bcrypt_cost(self.bcrypt_cost)
    }

    /// Commands used to reach the host.
    #[must_use]
    pub fn backend_config(&self) -> CommandBackendConfig {
        CommandBackendConfig::default()
            .with_docker(&self.docker)
            .with_enter(&self.enter)
            .with_attach_helper(&self.attach_helper, self.attach_dir.clone())
            .with_host_mount(&self.host_mount)
    }

    /// Build the volume service over the host's command-line tools.
    #[must_use]
    pub fn service(&self) -> VolumeService {
        let backend = Arc::new(CommandBackend::new(self.backend_config()));
        VolumeService::new(backend, self.service_config())
    }
}
