//! Infrastructure layer: real sockets and on-disk configuration.

pub mod network;
pub mod storage;
