//! Test-only fakes for the timing, pin, and notifier abstractions, shared
//! across the transmitter and receiver unit tests.

use crate::error::VlcError;
use crate::hal::{Clock, PeriodicTimer};
use crate::receiver::{FrameNotifier, ReceiveMeta};
use core::cell::{Cell, RefCell};
use embedded_hal::digital::{Error, ErrorKind, ErrorType, OutputPin};

/// A clock that advances by a fixed step every time it is read, so bounded
/// wait loops make visible progress without real time actually passing.
pub(crate) struct StepClock {
    step: u32,
    now: Cell<u32>,
}

impl StepClock {
    pub(crate) fn new(step: u32) -> Self {
        Self {
            step,
            now: Cell::new(0),
        }
    }
}

impl Clock for StepClock {
    fn now_us(&self) -> u32 {
        let next = self.now.get().wrapping_add(self.step);
        self.now.set(next);
        next
    }
}

/// A timer whose `start_periodic_us` always succeeds and never ticks
/// anything, used to exercise a bounded completion wait in isolation from
/// the state machine it would otherwise drive.
#[derive(Default)]
pub(crate) struct FakeTimer {
    pub(crate) stopped: bool,
    pub(crate) last_period_us: Option<u32>,
}

impl PeriodicTimer for FakeTimer {
    fn start_periodic_us(&mut self, period_us: u32) -> Result<(), VlcError> {
        self.last_period_us = Some(period_us);
        Ok(())
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

/// An output pin that records every level it is driven to, instead of
/// asserting against a fixed expectation list. Useful when a test cares
/// about the total shape of a transmission (length, final level) rather
/// than replaying an exact edge-by-edge sequence.
#[derive(Debug, Default)]
pub(crate) struct RecordingPin {
    pub(crate) levels: std::vec::Vec<bool>,
}

#[derive(Debug)]
pub(crate) struct RecordingPinError;

impl Error for RecordingPinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl ErrorType for RecordingPin {
    type Error = RecordingPinError;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.push(true);
        Ok(())
    }
}

/// A [`FrameNotifier`] that discards the frame, for tests that only care
/// about state-machine transitions and never expect completion.
pub(crate) struct NullNotifier;

impl FrameNotifier for NullNotifier {
    fn on_frame_complete(&self, _frame: &[u8], _meta: ReceiveMeta) {}
}

/// A [`FrameNotifier`] that records the most recent completed frame.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    pub(crate) last: RefCell<Option<(std::vec::Vec<u8>, ReceiveMeta)>>,
}

impl FrameNotifier for RecordingNotifier {
    fn on_frame_complete(&self, frame: &[u8], meta: ReceiveMeta) {
        *self.last.borrow_mut() = Some((frame.to_vec(), meta));
    }
}

/// Applies the same bit-stuffing rule the transmitter uses (insert a `0`
/// after six consecutive transmitted `1`s, run counter reset every byte)
/// to produce the logical symbol stream for a framed body, without the
/// end-of-frame flag.
fn stuffed_bits(frame: &[u8]) -> std::vec::Vec<bool> {
    let mut out = std::vec::Vec::new();
    for &byte in frame {
        let mut run: u8 = 0;
        let mut i = 0;
        while i < 8 {
            if run >= 6 {
                out.push(false);
                run = 0;
                continue;
            }
            let bit = (byte >> (7 - i)) & 1 != 0;
            out.push(bit);
            run = if bit { run + 1 } else { 0 };
            i += 1;
        }
    }
    out
}

/// The literal, unstuffed end-of-frame flag bits, MSB first.
fn flag_bits() -> std::vec::Vec<bool> {
    let byte = crate::consts::VLC_END_FLAG;
    (0..8).map(|i| (byte >> (7 - i)) & 1 != 0).collect()
}

/// Simulates the exact GPIO edge sequence a [`crate::transmitter::ManchesterTransmitter`]
/// would produce for `frame` (preamble, bit-stuffed body, end-of-frame
/// flag), at a tick granularity of `half_symbol_us`. Returns the
/// timestamps, in microseconds, of every level change — i.e. exactly the
/// sequence [`crate::receiver::ManchesterReceiver::on_edge`] would be
/// called with on real hardware.
///
/// Mirrors [`crate::transmitter::ManchesterTransmitter::tick_body`]: each
/// symbol writes `!bit` then `bit`, and only level *changes* are edges —
/// a run of identical consecutive bits produces a boundary transition
/// between them, a run of differing bits does not.
pub(crate) fn build_manchester_edges(
    half_symbol_us: u32,
    num_sync_symbols: u8,
    frame: &[u8],
) -> std::vec::Vec<u32> {
    let mut edges = std::vec::Vec::new();
    let mut tick_index: u32 = 0;
    let mut current_level = false;

    let mut last_sync = false;
    for _ in 0..(2 * num_sync_symbols as u32) {
        let level = !last_sync;
        if level != current_level {
            edges.push(tick_index * half_symbol_us);
            current_level = level;
        }
        last_sync = level;
        tick_index += 1;
    }

    let mut bits = stuffed_bits(frame);
    bits.extend(flag_bits());

    for bit in bits {
        let first = !bit;
        if first != current_level {
            edges.push(tick_index * half_symbol_us);
            current_level = first;
        }
        tick_index += 1;

        let second = bit;
        if second != current_level {
            edges.push(tick_index * half_symbol_us);
            current_level = second;
        }
        tick_index += 1;
    }

    edges
}
