//! Bit-reflected CRC-8 used for the length header and per-frame checksums.
//!
//! # What is a CRC? (for beginners)
//!
//! A cyclic redundancy check is a small checksum computed from a byte
//! sequence. The sender transmits the checksum alongside the data; the
//! receiver recomputes it and discards the data if the values differ. It
//! detects the bit flips and truncations that are common on a lossy channel
//! — and a channel made of *datagram lengths observed over the air* is very
//! lossy indeed.
//!
//! This is the reflected Maxim/Dallas 1-Wire polynomial with initial value
//! 0: for each input byte XORed into the running value, every set low bit
//! shifts the value right and folds in `0x8C`. The listening firmware
//! computes the same function independently, so the bit pattern here is a
//! wire-compatibility contract, not a style choice. Any deviation is a
//! correctness bug.

/// Computes the CRC-8 of `data`, starting from 0.
///
/// Applied cumulatively: each byte is XORed into the running value before
/// the per-byte bit loop, so `crc8(&[a, b])` equals feeding `b` into the
/// state left by `a`.
///
/// # Examples
///
/// ```rust
/// use smartlink_core::crc8;
///
/// assert_eq!(crc8(&[0x00]), 0);
/// assert_eq!(crc8(b"123456789"), 0xA1); // Maxim/Dallas check value
/// ```
pub fn crc8(data: &[u8]) -> u8 {
    data.iter().fold(0, |crc, &byte| crc_one_byte(crc ^ byte))
}

/// Processes one byte through the bit-reflected CRC register.
///
/// `(crc >> 1) ^ 0x8C` when the low bits differ is the reflected form of
/// the Maxim polynomial 0x31. No lookup table; 8 iterations per byte is
/// plenty for buffers this small.
fn crc_one_byte(mut byte: u8) -> u8 {
    let mut crc = 0u8;
    for _ in 0..8 {
        if (crc ^ byte) & 0x01 != 0 {
            crc = (crc >> 1) ^ 0x8C;
        } else {
            crc >>= 1;
        }
        byte >>= 1;
    }
    crc
}
