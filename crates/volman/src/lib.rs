//! # volman
//!
//! Grants each user a private, durable volume that is attached to a pooled,
//! otherwise ephemeral container for the length of a session.
//!
//! The host's volume and container tooling is the only source of truth:
//! volume names carry both the owner's lookup key and the ownership proof,
//! and mount state is read back from the container itself.
//!
//! - [`process`]: run one external command and capture its result
//! - [`identity`]: derive volume prefixes and suffixes, verify ownership
//! - [`directory`]: find and create volumes
//! - [`mounts`]: probe, attach, and detach container mounts
//! - [`backend`]: the [`VolumeBackend`] seam with command and in-memory implementations
//! - [`service`]: registration, login, and logout flows

#![warn(missing_docs)]

pub mod backend;
pub mod config;
pub mod directory;
pub mod identity;
pub mod locks;
pub mod mounts;
pub mod process;
pub mod service;

pub use backend::{CommandBackend, MemoryBackend, VolumeBackend};
pub use config::{CommandBackendConfig, ServiceConfig};
pub use service::VolumeService;
pub use volman_common::{
    ContainerRuntimeId, DEFAULT_WORK_DIR, ErrorKind, MountId, SessionToken, VolmanError,
    VolmanResult, VolumeId, VolumePrefix,
};
