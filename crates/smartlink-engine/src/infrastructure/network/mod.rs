//! Network infrastructure: the UDP broadcast session and its in-tree test
//! doubles.

pub mod broadcast;
pub mod mock;

pub use broadcast::{BroadcastConfig, UdpBroadcastSession, SOURCE_PORT, TARGET_PORT};
