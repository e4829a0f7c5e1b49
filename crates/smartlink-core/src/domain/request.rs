//! The provisioning request entity and its validation rules.
//!
//! A [`ProvisioningRequest`] carries everything the encoder needs: the WiFi
//! credentials to hand to the device, and the cloud token under which the
//! device will register once online. Validation runs before any encoding or
//! network activity, so a malformed request never causes a single datagram
//! to be sent.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Required character count of the region code (e.g. `"AZ"`, `"EU"`).
pub const REGION_CHARS: usize = 2;

/// Required character count of the provisioning token.
pub const TOKEN_CHARS: usize = 8;

/// Required character count of the token secret.
pub const SECRET_CHARS: usize = 4;

/// Maximum SSID length in UTF-8 bytes (802.11 limit).
pub const MAX_SSID_BYTES: usize = 32;

/// Maximum WPA passphrase length in UTF-8 bytes.
pub const MAX_PASSWORD_BYTES: usize = 64;

/// Errors raised when a request violates the protocol's length constraints.
///
/// Each variant names the offending field so callers can surface a precise
/// message to the user.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The region code is not exactly two characters.
    #[error("invalid region: expected {REGION_CHARS} characters, got {0}")]
    InvalidRegion(usize),

    /// The token is not exactly eight characters.
    #[error("invalid token: expected {TOKEN_CHARS} characters, got {0}")]
    InvalidToken(usize),

    /// The secret is not exactly four characters.
    #[error("invalid secret: expected {SECRET_CHARS} characters, got {0}")]
    InvalidSecret(usize),

    /// The SSID exceeds 32 UTF-8 bytes.
    #[error("invalid SSID: {0} bytes exceeds the {MAX_SSID_BYTES}-byte limit")]
    SsidTooLong(usize),

    /// The WiFi password exceeds 64 UTF-8 bytes.
    ///
    /// Some SmartLink senders never enforced this limit (a string-to-number
    /// comparison that is always false), so over-long passphrases made it
    /// onto the air and failed on the device instead. Rejecting them up
    /// front matches the intent of the SSID check.
    #[error("invalid WiFi password: {0} bytes exceeds the {MAX_PASSWORD_BYTES}-byte limit")]
    PasswordTooLong(usize),

    /// The device count is zero.
    #[error("invalid device count: must be at least 1")]
    InvalidDeviceCount,
}

/// Immutable input to the SmartLink encoder.
///
/// `region`, `token`, and `secret` come from the cloud token provider;
/// `ssid` and `wifi_password` identify the network the device should join.
/// `device_count` is how many devices are expected to register under this
/// token — it is not encoded on the wire, but the device watcher uses it
/// to know when provisioning is complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningRequest {
    /// Two-character region code (AZ=Americas, AY=Asia, EU=Europe).
    pub region: String,
    /// Eight-character provisioning token issued by the cloud.
    pub token: String,
    /// Four-character secret paired with the token.
    pub secret: String,
    /// Target network SSID, at most 32 UTF-8 bytes.
    pub ssid: String,
    /// Target network passphrase, at most 64 UTF-8 bytes.
    pub wifi_password: String,
    /// Number of devices expected to register under the token (≥ 1).
    pub device_count: u32,
}

impl ProvisioningRequest {
    /// Checks every length constraint, returning the first violation.
    ///
    /// Region, token, and secret are counted in characters (they are ASCII
    /// codes issued by the cloud); SSID and password limits are byte limits,
    /// so multi-byte UTF-8 SSIDs are measured as the device will see them.
    ///
    /// An empty SSID or password is legal — zero length is never an error.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let region_chars = self.region.chars().count();
        if region_chars != REGION_CHARS {
            return Err(ValidationError::InvalidRegion(region_chars));
        }

        let token_chars = self.token.chars().count();
        if token_chars != TOKEN_CHARS {
            return Err(ValidationError::InvalidToken(token_chars));
        }

        let secret_chars = self.secret.chars().count();
        if secret_chars != SECRET_CHARS {
            return Err(ValidationError::InvalidSecret(secret_chars));
        }

        if self.ssid.len() > MAX_SSID_BYTES {
            return Err(ValidationError::SsidTooLong(self.ssid.len()));
        }

        if self.wifi_password.len() > MAX_PASSWORD_BYTES {
            return Err(ValidationError::PasswordTooLong(self.wifi_password.len()));
        }

        if self.device_count == 0 {
            return Err(ValidationError::InvalidDeviceCount);
        }

        Ok(())
    }
}
