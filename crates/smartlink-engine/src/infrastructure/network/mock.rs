//! In-tree test doubles for the broadcast seams.
//!
//! Lets tests run the full multi-thousand-send registration sequence
//! instantly: [`RecordingLink`] captures every requested datagram length
//! instead of touching a socket, and [`InstantPacer`] records requested
//! pauses and returns immediately instead of sleeping.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::application::register::{BroadcastLink, Pacer};

/// A [`BroadcastLink`] that records lengths instead of sending datagrams.
///
/// Optionally fails after a configured number of successful sends to
/// exercise the abort paths.
pub struct RecordingLink {
    sent: Vec<usize>,
    fail_after: Option<usize>,
    cleanup_calls: usize,
}

impl RecordingLink {
    /// A link on which every send succeeds.
    pub fn new() -> Self {
        Self {
            sent: Vec::new(),
            fail_after: None,
            cleanup_calls: 0,
        }
    }

    /// Lets the first `count` sends succeed and fails every send after.
    pub fn fail_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    /// Every length sent so far, in order.
    pub fn sent_lengths(&self) -> Vec<usize> {
        self.sent.clone()
    }

    /// How many times [`BroadcastLink::cleanup`] was called.
    pub fn cleanup_calls(&self) -> usize {
        self.cleanup_calls
    }
}

impl Default for RecordingLink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BroadcastLink for RecordingLink {
    async fn send_length(&mut self, length: usize) -> std::io::Result<()> {
        if let Some(limit) = self.fail_after {
            if self.sent.len() >= limit {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "injected send failure",
                ));
            }
        }
        self.sent.push(length);
        Ok(())
    }

    fn cleanup(&mut self) {
        self.cleanup_calls += 1;
    }
}

/// A [`Pacer`] that records every requested pause and never sleeps.
pub struct InstantPacer {
    recorded: Arc<Mutex<Vec<Duration>>>,
}

impl InstantPacer {
    pub fn new() -> Self {
        Self {
            recorded: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the recorded pauses, usable after the pacer moves
    /// into an engine.
    pub fn recorded(&self) -> Arc<Mutex<Vec<Duration>>> {
        Arc::clone(&self.recorded)
    }
}

impl Default for InstantPacer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Pacer for InstantPacer {
    async fn pause(&self, duration: Duration) {
        self.recorded.lock().expect("lock poisoned").push(duration);
    }
}
