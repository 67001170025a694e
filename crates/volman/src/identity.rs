//! Volume identity and ownership.
//!
//! A volume is named `prefix.suffix`. The prefix is the SHA-1 hex digest of
//! the username, so it can be found again at login. The suffix is a bcrypt
//! hash of the password encoded with the URL-safe base64 alphabet, so the
//! name itself proves ownership without storing anything else.
//!
//! Changing either algorithm orphans every existing volume.

use base64::{Engine as _, engine::general_purpose::URL_SAFE};
use sha1::{Digest, Sha1};
use volman_common::{VolmanError, VolmanResult, VolumeId, VolumePrefix};

/// Work factor used for new suffixes unless configured otherwise.
pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

/// Derive the lookup prefix for a username.
#[must_use]
pub fn derive_prefix(username: &str) -> VolumePrefix {
    VolumePrefix::new_unchecked(hex::encode(Sha1::digest(username.as_bytes())))
}

/// Derive a fresh, salted suffix for a password.
///
/// Each call draws a new salt, so two suffixes for the same password differ.
///
/// # Errors
///
/// Returns [`VolmanError::Hash`] if `cost` is outside bcrypt's range.
pub fn derive_suffix(password: &str, cost: u32) -> VolmanResult<String> {
    let hashed = bcrypt::hash(password.as_bytes(), cost)
        .map_err(|e| VolmanError::Hash(e.to_string()))?;
    Ok(URL_SAFE.encode(hashed.as_bytes()))
}

/// Check whether `password` unlocks the volume named `volume_id`.
///
/// The decoded suffix supplies the salt and cost; the password is rehashed
/// with them and compared against the suffix.
///
/// # Errors
///
/// Returns [`VolmanError::MalformedVolumeId`] if the id has no `.` separator
/// or its suffix does not decode to a bcrypt hash. A wrong password is
/// `Ok(false)`, never an error.
pub fn verify_ownership(volume_id: &str, password: &str) -> VolmanResult<bool> {
    let volume = VolumeId::parse(volume_id)?;
    let malformed = |reason: String| VolmanError::MalformedVolumeId {
        id: volume_id.to_string(),
        reason,
    };

    let decoded = URL_SAFE
        .decode(volume.suffix())
        .map_err(|e| malformed(format!("suffix is not url-safe base64: {e}")))?;
    let hashed =
        String::from_utf8(decoded).map_err(|_| malformed("suffix is not a bcrypt hash".into()))?;

    bcrypt::verify(password.as_bytes(), &hashed)
        .map_err(|e| malformed(format!("suffix is not a bcrypt hash: {e}")))
}
