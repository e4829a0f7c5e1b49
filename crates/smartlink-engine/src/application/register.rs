//! The broadcast engine: one pacing loop that executes both transmission
//! phases of a SmartLink registration.
//!
//! The engine owns a [`BroadcastLink`] (the send side, usually a UDP
//! broadcast session) and a [`Pacer`] (the wait side, usually Tokio sleep)
//! and does nothing but walk the schedules from `smartlink-core`: send one
//! zero-filled datagram of the scheduled length, pause, repeat. All sends
//! within one registration are strictly sequential on a single timeline.
//!
//! Both seams are traits so unit tests can run the full 576 + 2100 send
//! sequence instantly against a recording link and a no-op pacer.
//!
//! # Cancellation
//!
//! The protocol itself has no abort concept: receivers expect the wake
//! phase to run to completion or first I/O error. This engine still adds a
//! cancellation flag checked between sends, since a registration takes tens
//! of seconds and callers need a way out. Cancellation never interrupts a
//! send already in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use smartlink_core::protocol::schedule::{data_schedule, wake_schedule, PacedSend};
use smartlink_core::{encode, EncodeError, ProvisioningRequest};

use crate::infrastructure::network::broadcast::{BroadcastConfig, UdpBroadcastSession};

/// Shared flag cancelling a registration between sends.
///
/// Clone it out of [`SmartLinkEngine::cancel_flag`] and store `true` from
/// any task; the engine checks it before every datagram.
pub type CancelFlag = Arc<AtomicBool>;

/// The two transmission phases of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Fixed wake-up cadence telling devices to start decoding.
    Wake,
    /// The encoded credential stream, repeated with ramping delays.
    Data,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Wake => write!(f, "wake-up"),
            Phase::Data => write!(f, "data"),
        }
    }
}

/// Errors that can abort a registration attempt.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The request failed validation or the encoder hit an internal
    /// inconsistency. Raised before any network activity.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// A datagram send failed. The first failure aborts the whole attempt;
    /// individual sends are never retried.
    #[error("broadcast failed during the {phase} phase: {source}")]
    Broadcast {
        phase: Phase,
        #[source]
        source: std::io::Error,
    },

    /// The cancellation flag was raised between sends.
    #[error("registration cancelled during the {phase} phase")]
    Cancelled { phase: Phase },
}

/// The send side of the engine: delivers one zero-filled datagram of the
/// requested byte length.
#[async_trait]
pub trait BroadcastLink: Send {
    /// Sends a broadcast datagram of exactly `length` zero bytes.
    async fn send_length(&mut self, length: usize) -> std::io::Result<()>;

    /// Releases the underlying transport resource.
    ///
    /// Must be idempotent, must never panic, and must be safe to call even
    /// if no send ever occurred.
    fn cleanup(&mut self);
}

/// The wait side of the engine. Real runs sleep; tests record and return.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Waits at least `duration`. A zero duration may return immediately.
    async fn pause(&self, duration: Duration);
}

/// Production pacer backed by the Tokio timer.
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Executes SmartLink registrations over a broadcast link.
///
/// One engine drives one registration attempt at a time; concurrent
/// registrations use separate engines with separate links, sharing
/// nothing. The caller (typically [`crate::LinkWizard`]) is responsible
/// for invoking [`cleanup`](SmartLinkEngine::cleanup) after any outcome.
pub struct SmartLinkEngine<L: BroadcastLink, P: Pacer> {
    link: L,
    pacer: P,
    cancel: CancelFlag,
}

impl SmartLinkEngine<UdpBroadcastSession, TokioPacer> {
    /// An engine over a real UDP broadcast session with real pacing.
    pub fn over_udp(config: BroadcastConfig) -> Self {
        Self::new(UdpBroadcastSession::new(config), TokioPacer)
    }
}

impl<L: BroadcastLink, P: Pacer> SmartLinkEngine<L, P> {
    /// Builds an engine from an explicit link and pacer.
    pub fn new(link: L, pacer: P) -> Self {
        Self {
            link,
            pacer,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A handle that cancels the running registration when set to `true`.
    pub fn cancel_flag(&self) -> CancelFlag {
        Arc::clone(&self.cancel)
    }

    /// The underlying link, for inspection.
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Broadcasts `request` to listening devices: the wake-up pattern,
    /// then 30 paced passes over the encoded credential stream.
    ///
    /// Validation (and therefore any [`EncodeError`]) surfaces before a
    /// single datagram is sent. The method resolves once both phases
    /// complete; it does not wait for any device to react — that is the
    /// device watcher's job.
    ///
    /// # Errors
    ///
    /// [`LinkError::Encode`] for invalid requests, [`LinkError::Broadcast`]
    /// on the first failed send, [`LinkError::Cancelled`] if the cancel
    /// flag is raised between sends.
    pub async fn register_smart_link(
        &mut self,
        request: &ProvisioningRequest,
    ) -> Result<(), LinkError> {
        let stream = encode(request)?;

        info!("sending SmartLink wake-up packets");
        self.run_phase(Phase::Wake, wake_schedule()).await?;

        info!(elements = stream.len(), "sending SmartLink data packets");
        self.run_phase(Phase::Data, data_schedule(&stream)).await?;

        info!("finished sending SmartLink packets");
        Ok(())
    }

    /// Releases the broadcast link's transport resource.
    pub fn cleanup(&mut self) {
        self.link.cleanup();
    }

    /// Walks one schedule: check cancellation, send, pause, repeat.
    async fn run_phase(
        &mut self,
        phase: Phase,
        schedule: impl Iterator<Item = PacedSend>,
    ) -> Result<(), LinkError> {
        for paced in schedule {
            if self.cancel.load(Ordering::Relaxed) {
                warn!("registration cancelled during the {phase} phase");
                return Err(LinkError::Cancelled { phase });
            }

            self.link
                .send_length(paced.length)
                .await
                .map_err(|source| {
                    warn!("send of {}-byte datagram failed: {source}", paced.length);
                    LinkError::Broadcast { phase, source }
                })?;

            self.pacer.pause(paced.pause).await;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
