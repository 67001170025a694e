//! Error taxonomy for the volume manager.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using [`VolmanError`].
pub type VolmanResult<T> = Result<T, VolmanError>;

/// Broad category of a [`VolmanError`].
///
/// The HTTP layer maps each category to exactly one status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or insufficient input from the caller.
    Caller,
    /// Unknown identity, failed ownership proof, or bad registration key.
    Unauthorized,
    /// The resource already exists or is already mounted.
    Conflict,
    /// An external command failed or could not be run.
    Backend,
}

/// Errors produced while managing volumes and mounts.
#[derive(Error, Diagnostic, Debug)]
pub enum VolmanError {
    /// The request body or parameters could not be understood.
    #[error("Invalid request: {message}")]
    #[diagnostic(code(volman::request::invalid))]
    InvalidRequest {
        /// What was wrong with the request.
        message: String,
    },

    /// A volume identifier did not have the `prefix.suffix` shape.
    #[error("Malformed volume id {id}: {reason}")]
    #[diagnostic(
        code(volman::volume::malformed_id),
        help("Volume ids are '<sha1 hex>.<url-safe base64 bcrypt hash>'")
    )]
    MalformedVolumeId {
        /// The offending identifier.
        id: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A session token contained characters that cannot name a container.
    #[error("Invalid session token: {token}")]
    #[diagnostic(
        code(volman::session::invalid_token),
        help("Session tokens must be alphanumeric with hyphens and underscores, 1-64 characters")
    )]
    InvalidSessionToken {
        /// The rejected token.
        token: String,
    },

    /// Registration was attempted with the wrong shared key.
    #[error("Invalid registration key")]
    #[diagnostic(code(volman::registration::invalid_key))]
    InvalidRegistrationKey,

    /// No volume exists for the username.
    #[error("Volume prefix {prefix} does not exist")]
    #[diagnostic(code(volman::volume::not_found))]
    VolumeNotFound {
        /// Prefix derived from the username.
        prefix: String,
    },

    /// The password does not unlock the user's volume.
    #[error("Wrong password for volume prefix {prefix}")]
    #[diagnostic(code(volman::volume::wrong_password))]
    WrongPassword {
        /// Prefix derived from the username.
        prefix: String,
    },

    /// A volume already exists for the username.
    #[error("Volume {prefix} exists")]
    #[diagnostic(code(volman::volume::exists))]
    VolumeExists {
        /// Prefix derived from the username.
        prefix: String,
    },

    /// The container already has a volume on its work directory.
    #[error("Volume already mounted on {token}")]
    #[diagnostic(code(volman::mount::already_mounted))]
    AlreadyMounted {
        /// Session token of the container.
        token: String,
    },

    /// A backend command exited non-zero where success was required.
    #[error("Backend command '{command}' failed: {stderr}")]
    #[diagnostic(code(volman::backend::failed))]
    Backend {
        /// The command that failed.
        command: String,
        /// Its standard error output.
        stderr: String,
    },

    /// The backend refused to create the volume.
    #[error("Unable to create volume {prefix}: {stderr}")]
    #[diagnostic(code(volman::volume::create_failed))]
    CreateFailed {
        /// Prefix derived from the username.
        prefix: String,
        /// Standard error of the create command.
        stderr: String,
    },

    /// The attach helper failed.
    #[error("Unable to mount volume prefix {prefix} on {token}: {stderr}")]
    #[diagnostic(code(volman::mount::failed))]
    MountFailed {
        /// Prefix derived from the username.
        prefix: String,
        /// Session token of the container.
        token: String,
        /// Standard error of the attach helper.
        stderr: String,
    },

    /// An external command could not be started at all.
    #[error("Failed to execute {command}: {source}")]
    #[diagnostic(
        code(volman::backend::spawn),
        help("Check that the command exists and is executable by the service user")
    )]
    Spawn {
        /// The command that could not be started.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    #[diagnostic(code(volman::hash))]
    Hash(String),

    /// Internal error (should not happen).
    #[error("Internal error: {message}")]
    #[diagnostic(code(volman::internal))]
    Internal {
        /// The error message.
        message: String,
    },
}

impl VolmanError {
    /// The category this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest { .. }
            | Self::MalformedVolumeId { .. }
            | Self::InvalidSessionToken { .. } => ErrorKind::Caller,
            Self::InvalidRegistrationKey
            | Self::VolumeNotFound { .. }
            | Self::WrongPassword { .. } => ErrorKind::Unauthorized,
            Self::VolumeExists { .. } | Self::AlreadyMounted { .. } => ErrorKind::Conflict,
            Self::Backend { .. }
            | Self::CreateFailed { .. }
            | Self::MountFailed { .. }
            | Self::Spawn { .. }
            | Self::Hash(_)
            | Self::Internal { .. } => ErrorKind::Backend,
        }
    }
}

impl From<serde_json::Error> for VolmanError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidRequest {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = VolmanError::AlreadyMounted {
            token: "abc123".to_string(),
        };
        insta::assert_snapshot!(err.to_string(), @"Volume already mounted on abc123");

        let err = VolmanError::Backend {
            command: "docker volume ls".to_string(),
            stderr: "daemon unreachable".to_string(),
        };
        insta::assert_snapshot!(
            err.to_string(),
            @"Backend command 'docker volume ls' failed: daemon unreachable"
        );
    }

    #[test]
    fn refusals_carry_stderr() {
        let err = VolmanError::MountFailed {
            prefix: "ab".to_string(),
            token: "abc123".to_string(),
            stderr: "no such container".to_string(),
        };
        insta::assert_snapshot!(
            err.to_string(),
            @"Unable to mount volume prefix ab on abc123: no such container"
        );
        assert_eq!(err.kind(), ErrorKind::Backend);
    }

    #[test]
    fn unauthorized_messages_differ() {
        let missing = VolmanError::VolumeNotFound {
            prefix: "ab".to_string(),
        };
        let wrong = VolmanError::WrongPassword {
            prefix: "ab".to_string(),
        };
        assert_eq!(missing.kind(), wrong.kind());
        assert_ne!(missing.to_string(), wrong.to_string());
    }

    #[test]
    fn error_kinds() {
        assert_eq!(
            VolmanError::InvalidRegistrationKey.kind(),
            ErrorKind::Unauthorized
        );
        assert_eq!(
            VolmanError::VolumeExists {
                prefix: String::new()
            }
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            VolmanError::MalformedVolumeId {
                id: "x".to_string(),
                reason: "no separator".to_string(),
            }
            .kind(),
            ErrorKind::Caller
        );
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let err = VolmanError::Spawn {
            command: "docker".to_string(),
            source: io_err,
        };
        assert_eq!(err.kind(), ErrorKind::Backend);
    }

    #[test]
    fn error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: VolmanError = json_err.into();
        assert!(matches!(err, VolmanError::InvalidRequest { .. }));
    }
}
