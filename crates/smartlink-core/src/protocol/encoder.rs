//! Encodes a provisioning request into the length-carrying element stream.
//!
//! Stream layout:
//! ```text
//! header:  [(len >> 4) | 0x10][(len & 0xF) | 0x20][(crc >> 4) | 0x30][(crc & 0xF) | 0x40]
//! frame*:  [frame_crc | 0x80][seq | 0x80][Data(b0)][Data(b1)][Data(b2)][Data(b3)]
//! ```
//! where `len` is the raw credential buffer length mod 256 and each frame
//! covers one 4-byte window of the buffer, zero-padded past the end. The
//! frame CRC is computed over `[seq, b0, b1, b2, b3]` so a receiver can
//! both spot corruption and resynchronise on the sequence counter.
//!
//! The raw credential buffer itself is:
//! ```text
//! [len(password)][password][len(region+token+secret)][region+token+secret][ssid]
//! ```
//! with single-byte length prefixes counting UTF-8 bytes.

use thiserror::Error;
use tracing::debug;

use crate::domain::request::{ProvisioningRequest, ValidationError};
use crate::protocol::crc8::crc8;
use crate::protocol::element::{
    EncodedElement, EncodedFrameStream, CRC_HIGH_TAG, CRC_LOW_TAG, FRAME_CONTROL_TAG,
    FRAME_DATA_BYTES, LENGTH_HIGH_TAG, LENGTH_LOW_TAG,
};

/// Errors that can occur while encoding a provisioning request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// The request violates a length constraint. Detected before any byte
    /// of the credential buffer is assembled.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The credential buffer was not filled to its declared size.
    ///
    /// This is an internal consistency defect, not a protocol condition;
    /// it indicates a bug in the encoder itself and must not be retried.
    #[error("credential buffer filled improperly: wrote {written} of {expected} bytes")]
    BufferMismatch { written: usize, expected: usize },
}

/// Encodes `request` into the ordered element stream the broadcast engine
/// transmits.
///
/// Validation runs first, so a caller that has not pre-validated still gets
/// a [`ValidationError`] before anything else happens.
///
/// # Errors
///
/// [`EncodeError::Validation`] for malformed requests;
/// [`EncodeError::BufferMismatch`] if the internal fill invariant breaks.
pub fn encode(request: &ProvisioningRequest) -> Result<EncodedFrameStream, EncodeError> {
    request.validate()?;

    let raw = build_credential_buffer(request)?;

    // Total frame byte count, wrapped into one byte. The raw buffer
    // already counts its two length-prefix bytes.
    let string_length = (raw.len() % 256) as u8;
    let string_length_crc = crc8(&[string_length]);

    let mut elements = Vec::with_capacity(stream_capacity(raw.len()));
    elements.extend(encode_header(string_length, string_length_crc));

    // Round the buffer length up to the next 4-byte boundary and walk it in
    // windows; positions past the real end read as zero.
    let rounded = raw.len().div_ceil(FRAME_DATA_BYTES) * FRAME_DATA_BYTES;
    let mut sequence: u8 = 0;

    for start in (0..rounded).step_by(FRAME_DATA_BYTES) {
        let mut window = [0u8; 1 + FRAME_DATA_BYTES];
        window[0] = sequence;
        for (offset, slot) in window[1..].iter_mut().enumerate() {
            *slot = raw.get(start + offset).copied().unwrap_or(0);
        }

        let frame_crc = crc8(&window);
        elements.push(EncodedElement::Control((frame_crc % 128) | FRAME_CONTROL_TAG));
        elements.push(EncodedElement::Control((sequence % 128) | FRAME_CONTROL_TAG));
        for &byte in &window[1..] {
            elements.push(EncodedElement::Data(byte));
        }

        sequence += 1;
    }

    debug!(
        raw_bytes = raw.len(),
        frames = sequence,
        elements = elements.len(),
        "encoded provisioning request"
    );

    Ok(EncodedFrameStream::new(elements))
}

/// Reverses the header nibble split, returning `(string_length, crc)`.
///
/// Returns `None` unless the slice starts with four control elements
/// carrying the expected marker bits. Mirrors the receiving firmware's
/// first decoding step and backs the header round-trip tests.
pub fn decode_header(elements: &[EncodedElement]) -> Option<(u8, u8)> {
    match elements {
        [EncodedElement::Control(a), EncodedElement::Control(b), EncodedElement::Control(c), EncodedElement::Control(d), ..]
            if a & 0xF0 == LENGTH_HIGH_TAG
                && b & 0xF0 == LENGTH_LOW_TAG
                && c & 0xF0 == CRC_HIGH_TAG
                && d & 0xF0 == CRC_LOW_TAG =>
        {
            let length = ((a & 0x0F) << 4) | (b & 0x0F);
            let crc = ((c & 0x0F) << 4) | (d & 0x0F);
            Some((length, crc))
        }
        _ => None,
    }
}

/// Builds the raw credential buffer and checks the fill invariant.
///
/// The check cannot trip as written, since `expected` and the pushes derive
/// from the same byte slices; it guards future edits to the assembly order.
fn build_credential_buffer(request: &ProvisioningRequest) -> Result<Vec<u8>, EncodeError> {
    let password = request.wifi_password.as_bytes();
    let region_token_secret =
        format!("{}{}{}", request.region, request.token, request.secret);
    let rts = region_token_secret.as_bytes();
    let ssid = request.ssid.as_bytes();

    let expected = 1 + password.len() + 1 + rts.len() + ssid.len();
    let mut raw = Vec::with_capacity(expected);

    raw.push(password.len() as u8);
    raw.extend_from_slice(password);
    raw.push(rts.len() as u8);
    raw.extend_from_slice(rts);
    raw.extend_from_slice(ssid);

    if raw.len() != expected {
        return Err(EncodeError::BufferMismatch {
            written: raw.len(),
            expected,
        });
    }

    Ok(raw)
}

/// Nibble-splits the length and its CRC into the four tagged header elements.
fn encode_header(string_length: u8, string_length_crc: u8) -> [EncodedElement; 4] {
    [
        EncodedElement::Control((string_length >> 4) | LENGTH_HIGH_TAG),
        EncodedElement::Control((string_length & 0x0F) | LENGTH_LOW_TAG),
        EncodedElement::Control((string_length_crc >> 4) | CRC_HIGH_TAG),
        EncodedElement::Control((string_length_crc & 0x0F) | CRC_LOW_TAG),
    ]
}

/// Exact element count for a raw buffer of `raw_len` bytes.
fn stream_capacity(raw_len: usize) -> usize {
    use crate::protocol::element::{FRAME_ELEMENTS, HEADER_ELEMENTS};
    HEADER_ELEMENTS + raw_len.div_ceil(FRAME_DATA_BYTES) * FRAME_ELEMENTS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::element::{FRAME_ELEMENTS, HEADER_ELEMENTS};

    /// The end-to-end scenario from the protocol description: 41 raw bytes,
    /// 11 frames, 70 elements.
    fn reference_request() -> ProvisioningRequest {
        ProvisioningRequest {
            region: "AZ".to_string(),
            token: "ABCDEFGH".to_string(),
            secret: "WXYZ".to_string(),
            ssid: "HOME-C168".to_string(),
            wifi_password: "795F48E494285B6A".to_string(),
            device_count: 1,
        }
    }

    #[test]
    fn test_reference_request_element_count() {
        // Arrange – raw buffer is 1+16+1+14+9 = 41 bytes → 11 frames
        let request = reference_request();

        // Act
        let stream = encode(&request).expect("encode must succeed");

        // Assert
        assert_eq!(stream.len(), HEADER_ELEMENTS + 11 * FRAME_ELEMENTS);
        assert_eq!(stream.len(), 70, "regression: exact element count");
    }

    #[test]
    fn test_reference_request_header_values() {
        // Arrange – string_length = 41 (0x29), crc8([0x29]) = 0xBF
        let request = reference_request();

        // Act
        let stream = encode(&request).expect("encode must succeed");
        let header: Vec<u8> = stream
            .header()
            .iter()
            .map(|e| match e {
                EncodedElement::Control(v) => *v,
                EncodedElement::Data(_) => panic!("header must be control elements"),
            })
            .collect();

        // Assert
        assert_eq!(header, vec![0x12, 0x29, 0x3B, 0x4F]);
    }

    #[test]
    fn test_header_round_trips_for_all_lengths() {
        for string_length in 0u8..=255 {
            // Arrange
            let crc = crc8(&[string_length]);

            // Act
            let header = encode_header(string_length, crc);
            let decoded = decode_header(&header);

            // Assert
            assert_eq!(decoded, Some((string_length, crc)));
        }
    }

    #[test]
    fn test_decode_header_rejects_wrong_markers() {
        // Arrange – frame-control elements instead of header elements
        let bogus = [
            EncodedElement::Control(0x82),
            EncodedElement::Control(0x80),
            EncodedElement::Data(0x01),
            EncodedElement::Data(0x02),
        ];

        // Act / Assert
        assert_eq!(decode_header(&bogus), None);
    }

    #[test]
    fn test_credential_buffer_layout() {
        // Arrange
        let request = reference_request();

        // Act
        let raw = build_credential_buffer(&request).expect("buffer must build");

        // Assert – [len(pw)][pw][len(rts)][rts][ssid]
        assert_eq!(raw.len(), 41);
        assert_eq!(raw[0], 16);
        assert_eq!(&raw[1..17], b"795F48E494285B6A");
        assert_eq!(raw[17], 14);
        assert_eq!(&raw[18..32], b"AZABCDEFGHWXYZ");
        assert_eq!(&raw[32..], b"HOME-C168");
    }

    #[test]
    fn test_final_frame_padding_is_zero() {
        // Arrange – 41 raw bytes round up to 44, so the last frame carries
        // one real byte ('8' of the SSID) and three zero pads.
        let request = reference_request();

        // Act
        let stream = encode(&request).expect("encode must succeed");
        let last_frame = stream.frames().last().expect("stream has frames");

        // Assert
        assert_eq!(last_frame[2], EncodedElement::Data(b'8'));
        assert_eq!(last_frame[3], EncodedElement::Data(0));
        assert_eq!(last_frame[4], EncodedElement::Data(0));
        assert_eq!(last_frame[5], EncodedElement::Data(0));
    }

    #[test]
    fn test_sequence_counters_increase_without_gaps() {
        // Arrange
        let request = reference_request();

        // Act
        let stream = encode(&request).expect("encode must succeed");
        let sequences: Vec<u8> = stream
            .frames()
            .map(|frame| match frame[1] {
                EncodedElement::Control(v) => v & !FRAME_CONTROL_TAG,
                EncodedElement::Data(_) => panic!("sequence must be a control element"),
            })
            .collect();

        // Assert
        let expected: Vec<u8> = (0..sequences.len() as u8).collect();
        assert_eq!(sequences, expected);
    }

    #[test]
    fn test_frame_crc_covers_sequence_and_window() {
        // Arrange
        let request = reference_request();
        let raw = build_credential_buffer(&request).expect("buffer must build");

        // Act
        let stream = encode(&request).expect("encode must succeed");

        // Assert – recompute each frame CRC independently
        for (index, frame) in stream.frames().enumerate() {
            let start = index * FRAME_DATA_BYTES;
            let mut window = [0u8; 5];
            window[0] = index as u8;
            for offset in 0..FRAME_DATA_BYTES {
                window[1 + offset] = raw.get(start + offset).copied().unwrap_or(0);
            }
            let expected = EncodedElement::Control((crc8(&window) % 128) | FRAME_CONTROL_TAG);
            assert_eq!(frame[0], expected, "frame {index} CRC mismatch");
        }
    }

    #[test]
    fn test_validation_failure_surfaces_before_encoding() {
        // Arrange
        let mut request = reference_request();
        request.token = "SHORT".to_string();

        // Act
        let result = encode(&request);

        // Assert
        assert_eq!(
            result,
            Err(EncodeError::Validation(ValidationError::InvalidToken(5)))
        );
    }

    #[test]
    fn test_empty_ssid_and_password_encode() {
        // Arrange – zero-length credentials are legal; raw buffer is
        // 1+0+1+14+0 = 16 bytes → exactly 4 frames, no padding.
        let mut request = reference_request();
        request.ssid = String::new();
        request.wifi_password = String::new();

        // Act
        let stream = encode(&request).expect("encode must succeed");

        // Assert
        assert_eq!(stream.len(), HEADER_ELEMENTS + 4 * FRAME_ELEMENTS);
        let (length, _) = decode_header(stream.header()).expect("valid header");
        assert_eq!(length, 16);
    }

    #[test]
    fn test_buffer_mismatch_reports_written_and_expected() {
        // Arrange – the fill check in build_credential_buffer cannot trip
        // through the public API (the buffer is assembled and measured in one
        // pass), so the variant is pinned directly: callers matching on it or
        // logging its message must keep seeing both counts.
        let error = EncodeError::BufferMismatch {
            written: 40,
            expected: 41,
        };

        // Act
        let message = error.to_string();

        // Assert
        assert_eq!(
            message,
            "credential buffer filled improperly: wrote 40 of 41 bytes"
        );
        assert_ne!(
            error,
            EncodeError::BufferMismatch {
                written: 41,
                expected: 41,
            }
        );
    }

    #[test]
    fn test_decoded_header_matches_maximum_buffer() {
        // Arrange – 64-byte password, 32-byte ssid: raw = 1+64+1+14+32 = 112,
        // the largest buffer a valid request can produce.
        let mut request = reference_request();
        request.wifi_password = "p".repeat(64);
        request.ssid = "s".repeat(32);

        // Act
        let stream = encode(&request).expect("encode must succeed");
        let (length, crc) = decode_header(stream.header()).expect("valid header");

        // Assert
        assert_eq!(length, 112);
        assert_eq!(crc, crc8(&[112]));
    }
}
