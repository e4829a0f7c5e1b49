//! UDP broadcast session: the transport behind one registration attempt.
//!
//! Every "packet" this system transmits is a UDP broadcast datagram whose
//! payload is irrelevant — it is zero-filled — and whose *length* carries
//! the signal. The session therefore exposes exactly one send operation:
//! "broadcast `n` zero bytes".
//!
//! # Socket lifecycle
//!
//! The socket is bound lazily on the first send (local port 63145 with
//! `SO_BROADCAST` enabled) and reused for every remaining send of the
//! session. [`cleanup`](UdpBroadcastSession::cleanup) releases it so the
//! process is free to exit; it is idempotent and safe even when no send
//! ever happened. One session serves one registration attempt — sessions
//! are never pooled or shared between concurrent registrations, which is
//! also why no locking is needed: each session's socket has exactly one
//! writer and no reader.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tracing::{debug, info};

use crate::application::register::BroadcastLink;

/// Fixed local provisioning port the sender binds.
pub const SOURCE_PORT: u16 = 63145;

/// Fixed destination port listening devices observe.
pub const TARGET_PORT: u16 = 30011;

/// Largest datagram the length encoding can ask for; wire lengths are
/// always a value mod 256.
const MAX_WIRE_LENGTH: usize = 255;

/// Zero payload shared by every send.
const ZERO_PAYLOAD: [u8; MAX_WIRE_LENGTH] = [0; MAX_WIRE_LENGTH];

/// Addressing for one broadcast session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastConfig {
    /// Local port to bind. `0` lets the OS pick one (useful in tests).
    pub source_port: u16,
    /// Destination port on the broadcast address.
    pub target_port: u16,
    /// Destination address, normally the limited broadcast address.
    pub broadcast_address: IpAddr,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            source_port: SOURCE_PORT,
            target_port: TARGET_PORT,
            broadcast_address: IpAddr::V4(Ipv4Addr::BROADCAST),
        }
    }
}

/// A send-only UDP broadcast socket with lazy binding.
pub struct UdpBroadcastSession {
    config: BroadcastConfig,
    socket: Option<UdpSocket>,
}

impl UdpBroadcastSession {
    /// Creates a session; no socket is bound until the first send.
    pub fn new(config: BroadcastConfig) -> Self {
        Self {
            config,
            socket: None,
        }
    }

    /// A session with the standard provisioning ports and the limited
    /// broadcast address.
    pub fn with_defaults() -> Self {
        Self::new(BroadcastConfig::default())
    }

    /// The bound local address, if a send has already bound the socket.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }

    async fn bind_broadcast(config: &BroadcastConfig) -> std::io::Result<UdpSocket> {
        let bind_addr = SocketAddr::new(
            IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            config.source_port,
        );
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.set_broadcast(true)?;
        info!(
            "bound broadcast socket on {} targeting {}:{}",
            socket.local_addr()?,
            config.broadcast_address,
            config.target_port
        );
        Ok(socket)
    }
}

#[async_trait]
impl BroadcastLink for UdpBroadcastSession {
    async fn send_length(&mut self, length: usize) -> std::io::Result<()> {
        if length > MAX_WIRE_LENGTH {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("wire length {length} exceeds {MAX_WIRE_LENGTH}"),
            ));
        }

        if self.socket.is_none() {
            self.socket = Some(Self::bind_broadcast(&self.config).await?);
        }
        let socket = self.socket.as_ref().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotConnected, "socket released")
        })?;

        let dest = SocketAddr::new(self.config.broadcast_address, self.config.target_port);
        socket.send_to(&ZERO_PAYLOAD[..length], dest).await?;
        Ok(())
    }

    fn cleanup(&mut self) {
        if self.socket.take().is_some() {
            debug!("released broadcast socket");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_protocol_ports() {
        // Arrange / Act
        let config = BroadcastConfig::default();

        // Assert
        assert_eq!(config.source_port, 63145);
        assert_eq!(config.target_port, 30011);
        assert_eq!(
            config.broadcast_address,
            IpAddr::V4(Ipv4Addr::new(255, 255, 255, 255))
        );
    }

    #[test]
    fn test_cleanup_without_any_send_does_not_panic() {
        // Arrange
        let mut session = UdpBroadcastSession::with_defaults();

        // Act – twice, without a socket ever existing
        session.cleanup();
        session.cleanup();

        // Assert
        assert!(session.local_addr().is_none());
    }

    #[tokio::test]
    async fn test_first_send_binds_lazily_and_reuses_socket() {
        // Arrange – ephemeral port, loopback target so this runs anywhere
        let mut session = UdpBroadcastSession::new(BroadcastConfig {
            source_port: 0,
            target_port: 30011,
            broadcast_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
        });
        assert!(session.local_addr().is_none());

        // Act
        session.send_length(10).await.expect("send must succeed");
        let first = session.local_addr().expect("socket bound after send");
        session.send_length(3).await.expect("send must succeed");
        let second = session.local_addr().expect("socket still bound");

        // Assert – same socket across sends
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_oversized_length_is_rejected_without_binding() {
        // Arrange
        let mut session = UdpBroadcastSession::with_defaults();

        // Act
        let result = session.send_length(256).await;

        // Assert
        assert_eq!(
            result.expect_err("must fail").kind(),
            std::io::ErrorKind::InvalidInput
        );
        assert!(session.local_addr().is_none(), "no socket must be bound");
    }

    #[tokio::test]
    async fn test_send_after_cleanup_rebinds() {
        // Arrange
        let mut session = UdpBroadcastSession::new(BroadcastConfig {
            source_port: 0,
            target_port: 30011,
            broadcast_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
        });
        session.send_length(1).await.expect("send must succeed");
        session.cleanup();

        // Act – a fresh send lazily binds a new socket
        session.send_length(1).await.expect("send must succeed");

        // Assert
        assert!(session.local_addr().is_some());
    }
}
