//! # volman-common
//!
//! Shared types for the volume manager crates:
//! - Volume, mount, and container identifiers
//! - The error taxonomy shared by the library, daemon, and client

#![warn(missing_docs)]

pub mod error;
pub mod id;

pub use error::{ErrorKind, VolmanError, VolmanResult};
pub use id::{ContainerRuntimeId, MountId, SessionToken, VolumeId, VolumePrefix};

/// Well-known path inside pooled containers where a user volume is attached.
pub const DEFAULT_WORK_DIR: &str = "/home/jovyan/work";
