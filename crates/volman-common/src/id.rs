//! Volume, mount, and container identifiers.
//!
//! None of these are stored by the service. A volume's durable identity is
//! its backend name, `prefix.suffix`; everything else is derived from it or
//! from the caller's session token.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{VolmanError, VolmanResult};

/// Hex digest of a username; the discoverable half of a volume id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VolumePrefix(String);

impl VolumePrefix {
    /// Length of a hex-encoded 20-byte digest.
    pub const LENGTH: usize = 40;

    /// Create a prefix, validating that it is a 40-character lowercase hex string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a digest.
    pub fn new(hex: impl Into<String>) -> VolmanResult<Self> {
        let hex = hex.into();
        let valid = hex.len() == Self::LENGTH
            && hex
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
        if !valid {
            return Err(VolmanError::MalformedVolumeId {
                id: hex,
                reason: "prefix is not a 40 character hex digest".to_string(),
            });
        }
        Ok(Self(hex))
    }

    /// Create a prefix without validation.
    ///
    /// The caller must pass a hex-encoded 20-byte digest.
    #[must_use]
    pub fn new_unchecked(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Get the prefix as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VolumePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VolumePrefix {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A volume name of the form `prefix.suffix`.
///
/// The prefix is everything before the first `.`; the suffix is the rest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VolumeId {
    name: String,
    split: usize,
}

impl VolumeId {
    /// Build a volume id from its two halves.
    #[must_use]
    pub fn from_parts(prefix: &VolumePrefix, suffix: &str) -> Self {
        Self {
            name: format!("{prefix}.{suffix}"),
            split: prefix.as_str().len(),
        }
    }

    /// Parse a volume name, splitting on the first `.`.
    ///
    /// # Errors
    ///
    /// Returns [`VolmanError::MalformedVolumeId`] if there is no separator or
    /// either half is empty.
    pub fn parse(name: impl Into<String>) -> VolmanResult<Self> {
        let name = name.into();
        let Some(split) = name.find('.') else {
            return Err(VolmanError::MalformedVolumeId {
                id: name,
                reason: "missing '.' separator".to_string(),
            });
        };
        if split == 0 || split + 1 == name.len() {
            return Err(VolmanError::MalformedVolumeId {
                id: name,
                reason: "empty prefix or suffix".to_string(),
            });
        }
        Ok(Self { name, split })
    }

    /// The username-derived half.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.name[..self.split]
    }

    /// The password-derived half.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.name[self.split + 1..]
    }

    /// The full backend volume name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for VolumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl FromStr for VolumeId {
    type Err = VolmanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Short token naming a pooled container session.
///
/// Tokens must:
/// - Be 1-64 characters long
/// - Contain only alphanumeric characters, hyphens, and underscores
/// - Start with an alphanumeric character
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Maximum length of a session token.
    pub const MAX_LENGTH: usize = 64;

    /// Create a session token, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the token format is invalid.
    pub fn new(token: impl Into<String>) -> VolmanResult<Self> {
        let token = token.into();
        Self::validate(&token)?;
        Ok(Self(token))
    }

    /// Get the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(token: &str) -> VolmanResult<()> {
        let invalid = || VolmanError::InvalidSessionToken {
            token: token.to_string(),
        };

        if token.is_empty() || token.len() > Self::MAX_LENGTH {
            return Err(invalid());
        }

        let mut chars = token.chars();
        if !chars.next().is_some_and(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid());
        }

        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(invalid());
        }

        Ok(())
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionToken {
    type Err = VolmanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Backend-addressable name of a running container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerRuntimeId(String);

impl ContainerRuntimeId {
    /// Map a session token to its container by prepending the pool prefix.
    #[must_use]
    pub fn from_session(pool_prefix: &str, token: &SessionToken) -> Self {
        Self(format!("{pool_prefix}{token}"))
    }

    /// Get the container id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerRuntimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContainerRuntimeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Handle for "this volume is attached to this container".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountId {
    /// The attached volume.
    pub volume: VolumeId,
    /// The container session it is attached to.
    pub token: SessionToken,
}

impl MountId {
    /// Create a mount id.
    #[must_use]
    pub const fn new(volume: VolumeId, token: SessionToken) -> Self {
        Self { volume, token }
    }

    /// Extract the session token addressed by a mount resource id.
    ///
    /// Accepts either a full mount id (`prefix.suffix.token`) or a bare token.
    ///
    /// # Errors
    ///
    /// Returns an error if the trailing segment is not a valid token.
    pub fn session_token_of(id: &str) -> VolmanResult<SessionToken> {
        let token = id.rsplit_once('.').map_or(id, |(_, token)| token);
        SessionToken::new(token)
    }
}

impl fmt::Display for MountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.volume, self.token)
    }
}

impl Serialize for MountId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
