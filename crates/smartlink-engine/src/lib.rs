//! # smartlink-engine
//!
//! The SmartLink broadcast engine: drives the two timed UDP broadcast
//! phases that carry a [`ProvisioningRequest`] to a listening device, and
//! orchestrates the surrounding provisioning flow (token, broadcast, device
//! watch).
//!
//! Layering follows the usual application/infrastructure split:
//!
//! - **`application`** – the pacing loop ([`SmartLinkEngine`]), the
//!   external-collaborator traits ([`TokenProvider`], [`DeviceWatcher`]),
//!   and the [`LinkWizard`] that wires them together. Everything here works
//!   against traits, so it is tested with in-tree mocks and never opens a
//!   socket.
//!
//! - **`infrastructure`** – the real [`UdpBroadcastSession`] (socket
//!   lifecycle, zero-filled datagrams) and TOML configuration persistence.
//!
//! The protocol itself — what lengths to send and when — lives in
//! `smartlink-core`; this crate only executes the plan.

pub mod application;
pub mod infrastructure;

pub use application::collaborators::{
    DeviceWatcher, LinkToken, LinkedDevice, TokenError, TokenProvider, WatchError,
};
pub use application::register::{
    BroadcastLink, CancelFlag, LinkError, Pacer, Phase, SmartLinkEngine, TokioPacer,
};
pub use application::wizard::{LinkOptions, LinkWizard, WizardError};
pub use infrastructure::network::broadcast::{BroadcastConfig, UdpBroadcastSession};
pub use infrastructure::storage::config::{LinkConfig, NetworkSettings};

pub use smartlink_core::ProvisioningRequest;
