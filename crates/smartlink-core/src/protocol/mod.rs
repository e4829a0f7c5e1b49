//! Protocol module containing the CRC-8 primitive, the length-stream
//! encoder, and the broadcast pacing schedules.

pub mod crc8;
pub mod element;
pub mod encoder;
pub mod schedule;

pub use crc8::crc8;
pub use element::{EncodedElement, EncodedFrameStream};
pub use encoder::{decode_header, encode, EncodeError};
pub use schedule::{data_schedule, wake_schedule, PacedSend};
