use thiserror::Error;

/// Result type alias using [`ClientError`].
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors returned by [`VolumesClient`](crate::VolumesClient).
#[derive(Error, Debug)]
pub enum ClientError {
    /// Registration was refused because the registration key did not match.
    #[error("The registration key is invalid")]
    InvalidKey,

    /// Unknown username or wrong password.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Server-provided detail.
        message: String,
    },

    /// The volume already exists, or the container already has one mounted.
    #[error("Conflict: {message}")]
    Conflict {
        /// Server-provided detail.
        message: String,
    },

    /// Any other non-success status.
    #[error("Server responded {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided detail.
        message: String,
    },

    /// The request could not be sent or the response not read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    /// HTTP status behind this error, if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidKey | Self::Unauthorized { .. } => Some(401),
            Self::Conflict { .. } => Some(409),
            Self::Status { status, .. } => Some(*status),
            Self::Http(_) => None,
        }
    }
}
