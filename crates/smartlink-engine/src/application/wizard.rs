//! End-to-end provisioning orchestration.
//!
//! The wizard combines the three steps a caller would otherwise wire up by
//! hand: obtain a provisioning token from the [`TokenProvider`], broadcast
//! the credentials through a [`SmartLinkEngine`], then hand control to the
//! [`DeviceWatcher`] to confirm devices registered under the token.
//!
//! Whatever the outcome, the engine's broadcast socket is released before
//! the wizard returns — a leaked bound socket would keep the host process
//! alive after provisioning.

use thiserror::Error;
use tracing::{debug, info};

use smartlink_core::ProvisioningRequest;

use crate::application::collaborators::{
    DeviceWatcher, LinkedDevice, TokenError, TokenProvider, WatchError,
};
use crate::application::register::{BroadcastLink, LinkError, Pacer, SmartLinkEngine};
use crate::infrastructure::storage::config::LinkConfig;

/// Errors from the full provisioning flow.
#[derive(Debug, Error)]
pub enum WizardError {
    /// The cloud did not issue a provisioning token.
    #[error("token provider failed: {0}")]
    Token(#[from] TokenError),

    /// Broadcasting the credentials failed.
    #[error(transparent)]
    Link(#[from] LinkError),

    /// No device confirmed registration under the token.
    #[error("device watch failed: {0}")]
    Watch(#[from] WatchError),
}

/// Per-call options for [`LinkWizard::link_device`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOptions {
    /// The SSID to send to the device.
    pub ssid: String,
    /// Password for the SSID.
    pub wifi_password: String,
    /// Number of devices being registered at once.
    pub devices: u32,
}

impl LinkOptions {
    /// Options for registering a single device.
    pub fn new(ssid: impl Into<String>, wifi_password: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            wifi_password: wifi_password.into(),
            devices: 1,
        }
    }
}

/// Orchestrates token issuance, broadcasting, and device confirmation.
pub struct LinkWizard<T: TokenProvider, W: DeviceWatcher> {
    provider: T,
    watcher: W,
    region: String,
    timezone: String,
}

impl<T: TokenProvider, W: DeviceWatcher> LinkWizard<T, W> {
    /// Builds a wizard using the region and timezone from `config`.
    pub fn new(provider: T, watcher: W, config: &LinkConfig) -> Self {
        Self {
            provider,
            watcher,
            region: config.region.clone(),
            timezone: config.timezone.clone(),
        }
    }

    /// Links device(s) to the WiFi network and the cloud.
    ///
    /// The engine's [`cleanup`](SmartLinkEngine::cleanup) runs
    /// unconditionally on every exit path, including token and watch
    /// failures.
    ///
    /// # Errors
    ///
    /// The first failing step's error, wrapped in [`WizardError`].
    pub async fn link_device<L: BroadcastLink, P: Pacer>(
        &self,
        engine: &mut SmartLinkEngine<L, P>,
        options: LinkOptions,
    ) -> Result<Vec<LinkedDevice>, WizardError> {
        let result = self.try_link(engine, options).await;
        engine.cleanup();
        result
    }

    async fn try_link<L: BroadcastLink, P: Pacer>(
        &self,
        engine: &mut SmartLinkEngine<L, P>,
        options: LinkOptions,
    ) -> Result<Vec<LinkedDevice>, WizardError> {
        let issued = self.provider.create_token(&self.timezone).await?;
        debug!(token = %issued.token, "received provisioning token");

        let request = ProvisioningRequest {
            region: self.region.clone(),
            token: issued.token.clone(),
            secret: issued.secret,
            ssid: options.ssid,
            wifi_password: options.wifi_password,
            device_count: options.devices,
        };

        engine.register_smart_link(&request).await?;

        info!("polling cloud for details on token");
        let devices = self
            .watcher
            .wait_for_token(&issued.token, options.devices)
            .await?;

        info!(count = devices.len(), "found device(s)");
        Ok(devices)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
