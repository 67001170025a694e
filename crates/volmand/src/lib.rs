//! volmand - volume manager daemon.
//!
//! Serves the HTTP API that registers user volumes and attaches them to
//! pooled containers on login.

#![warn(missing_docs)]

pub mod api;
pub mod config;

pub use config::Args;
