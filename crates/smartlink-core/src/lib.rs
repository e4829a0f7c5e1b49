//! # smartlink-core
//!
//! Pure protocol library for SmartLink-style WiFi provisioning: the CRC-8
//! engine, the credential-to-length-stream encoder, and the pacing schedules
//! for the two timed broadcast phases.
//!
//! This crate is used by the broadcast engine (`smartlink-engine`). It has
//! zero dependencies on sockets, timers, or OS APIs, so every protocol rule
//! can be unit-tested without network access or wall-clock time.
//!
//! # How SmartLink works (for beginners)
//!
//! A headless WiFi device fresh out of the box cannot join a network — it
//! does not know the SSID or password yet. SmartLink provisioning gets the
//! credentials to it *without* any existing connection:
//!
//! 1. The configurator (this library's caller) broadcasts UDP datagrams on
//!    the local network. The device, sniffing WiFi traffic in monitor mode,
//!    cannot decrypt the payloads — but it *can* observe each datagram's
//!    **length**.
//!
//! 2. The credentials are therefore encoded into a sequence of datagram
//!    lengths: a 4-element header carrying the total length and its CRC,
//!    followed by 6-element frames each covering a 4-byte window of the
//!    credential buffer with a per-frame CRC and sequence number.
//!
//! 3. The device reassembles the byte stream from the observed lengths,
//!    verifies the CRCs, discards corrupted frames, and resynchronises via
//!    the sequence counters. Once it has the SSID and password it joins the
//!    network and registers itself with the provisioning token.
//!
//! This crate defines:
//!
//! - **`protocol`** – the CRC-8 primitive, the tagged-element encoder that
//!   turns a [`ProvisioningRequest`] into an [`EncodedFrameStream`], and the
//!   pure `(length, pause)` schedules for the wake-up and data phases.
//!
//! - **`domain`** – the [`ProvisioningRequest`] entity and its validation
//!   rules, with no infrastructure dependencies.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `smartlink_core::encode` instead of `smartlink_core::protocol::encoder::encode`.
pub use domain::request::{ProvisioningRequest, ValidationError};
pub use protocol::crc8::crc8;
pub use protocol::element::{EncodedElement, EncodedFrameStream};
pub use protocol::encoder::{decode_header, encode, EncodeError};
pub use protocol::schedule::{data_schedule, wake_schedule, PacedSend};
