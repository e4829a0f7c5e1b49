//! External-collaborator traits for the provisioning flow.
//!
//! The broadcast engine itself never talks HTTP. Two remote collaborators
//! surround it:
//!
//! - a **token provider** that authenticates against the cloud and issues
//!   the `{token, secret}` pair encoded into the broadcast, and
//! - a **device watcher** that polls the cloud until devices registered
//!   under that token appear online.
//!
//! Both are specified here only at their interface boundary as async
//! traits. Production implementations live with whatever cloud client the
//! embedding application uses; tests use the generated mocks.

use async_trait::async_trait;
use thiserror::Error;

/// A provisioning token issued by the cloud for one registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkToken {
    /// Eight-character token.
    pub token: String,
    /// Four-character secret paired with the token.
    pub secret: String,
}

/// A device that came online under a provisioning token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedDevice {
    /// Cloud-assigned device identifier.
    pub id: String,
    /// Device display name, when the cloud reports one.
    pub name: Option<String>,
}

/// Errors from the token provider.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The cloud refused to issue a token (bad credentials, quota, ...).
    #[error("cloud rejected the token request: {0}")]
    Rejected(String),
    /// The request never completed.
    #[error("token request transport failure: {0}")]
    Transport(String),
}

/// Errors from the device watcher.
#[derive(Debug, Error)]
pub enum WatchError {
    /// No device registered under the token before the watcher gave up.
    #[error("no device appeared within {waited_secs}s")]
    TimedOut { waited_secs: u64 },
    /// The polling request never completed.
    #[error("device watch transport failure: {0}")]
    Transport(String),
}

/// Issues provisioning tokens. Invoked once per registration attempt,
/// before the broadcast phases begin. The engine does not retry on the
/// provider's behalf.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Requests a fresh token for a device in `timezone` (e.g. `"-05:00"`).
    async fn create_token(&self, timezone: &str) -> Result<LinkToken, TokenError>;
}

/// Polls for devices that registered using an issued token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceWatcher: Send + Sync {
    /// Resolves once `device_count` devices have appeared under `token`.
    async fn wait_for_token(
        &self,
        token: &str,
        device_count: u32,
    ) -> Result<Vec<LinkedDevice>, WatchError>;
}
