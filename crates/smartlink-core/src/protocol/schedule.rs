//! Pure pacing schedules for the two broadcast phases.
//!
//! The broadcast engine does nothing but walk an iterator of
//! `(length, pause)` pairs: send a datagram of `length` zero bytes, wait
//! `pause`, repeat. Keeping the schedules here — as plain iterators with no
//! sockets or timers — means the exact datagram counts, length ordering,
//! and delay ramps are all testable without wall-clock time.
//!
//! Timing is best-effort: pauses are lower bounds, not deadlines. The
//! receiving firmware tolerates jitter because every frame carries a
//! sequence counter it can resynchronise on.

use std::time::Duration;

use crate::protocol::element::EncodedFrameStream;

/// Datagram lengths of the wake-up pattern, in order.
pub const WAKE_PATTERN: [u8; 4] = [1, 3, 6, 10];

/// Number of times the wake-up pattern repeats.
pub const WAKE_REPETITIONS: usize = 144;

/// Number of full passes over the encoded stream in the data phase.
pub const DATA_PASSES: usize = 30;

/// Extra pause after each completed data pass, in milliseconds.
pub const PASS_GAP_MS: u64 = 200;

/// Per-element delay growth between data passes, in milliseconds.
pub const DATA_DELAY_STEP_MS: u64 = 3;

/// Once the per-element delay exceeds this, it resets.
pub const DATA_DELAY_MAX_MS: u64 = 26;

/// Value the per-element delay resets to.
pub const DATA_DELAY_RESET_MS: u64 = 6;

/// One paced transmission: a datagram length and the pause that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacedSend {
    /// Byte length of the zero-filled datagram.
    pub length: usize,
    /// Lower-bound pause before the next send.
    pub pause: Duration,
}

/// The phase-1 wake-up schedule.
///
/// 144 repetitions of datagram lengths `1, 3, 6, 10`; after each
/// repetition's final send the schedule pauses `(repetition mod 8) + 33`
/// milliseconds. This fixed cadence tells listening devices to start
/// decoding length-encoded frames.
pub fn wake_schedule() -> impl Iterator<Item = PacedSend> {
    (0..WAKE_REPETITIONS).flat_map(|repetition| {
        WAKE_PATTERN.iter().enumerate().map(move |(index, &length)| {
            let pause = if index == WAKE_PATTERN.len() - 1 {
                Duration::from_millis((repetition % 8) as u64 + 33)
            } else {
                Duration::ZERO
            };
            PacedSend {
                length: usize::from(length),
                pause,
            }
        })
    })
}

/// The phase-2 data schedule: 30 full passes over the stream's wire lengths.
///
/// The per-element delay starts at 0 ms and grows by 3 ms each pass; once
/// it exceeds 26 ms at the start of a pass it resets to 6 ms, so later
/// passes cycle 6→9→…→24 and give slow receivers repeated chances at every
/// cadence. After the last element of a pass an extra 200 ms gap separates
/// it from the next pass.
pub fn data_schedule(stream: &EncodedFrameStream) -> impl Iterator<Item = PacedSend> + '_ {
    let mut delay_ms: u64 = 0;

    (0..DATA_PASSES).flat_map(move |_| {
        if delay_ms > DATA_DELAY_MAX_MS {
            delay_ms = DATA_DELAY_RESET_MS;
        }
        let per_element = Duration::from_millis(delay_ms);
        delay_ms += DATA_DELAY_STEP_MS;

        let last = stream.len().saturating_sub(1);
        stream
            .elements()
            .iter()
            .enumerate()
            .map(move |(index, element)| PacedSend {
                length: element.wire_length(),
                pause: if index == last {
                    per_element + Duration::from_millis(PASS_GAP_MS)
                } else {
                    per_element
                },
            })
    })
}

/// The per-pass element delays the data schedule will use, in order.
///
/// Exposed for diagnostics and tests; mirrors the clamp-then-grow logic in
/// [`data_schedule`].
pub fn pass_delays_ms() -> [u64; DATA_PASSES] {
    let mut delays = [0u64; DATA_PASSES];
    let mut delay_ms: u64 = 0;
    for slot in delays.iter_mut() {
        if delay_ms > DATA_DELAY_MAX_MS {
            delay_ms = DATA_DELAY_RESET_MS;
        }
        *slot = delay_ms;
        delay_ms += DATA_DELAY_STEP_MS;
    }
    delays
}
