//! Manchester receiver state machine for the VLC link layer.
//!
//! Decodes a stream of GPIO edge timestamps into bytes: recovers the
//! symbol period from the preamble, un-stuffs bits, detects the
//! end-of-frame flag, and writes into a caller-supplied buffer.
//!
//! ## Design Notes
//!
//! This module knows nothing about link addresses, CRCs, or the upper
//! network stack — it decodes a raw bit stream and hands the framed bytes
//! (still `src | dst | payload | crc8`) to a [`FrameNotifier`]. See
//! [`crate::netif`] for frame validation and upward delivery.
//!
//! ## Gap classification
//!
//! Telling a boundary transition (forced by two consecutive equal bits)
//! apart from a data-bearing one can equivalently be done by comparing
//! half-symbol vs full-symbol gaps directly, or by accumulating phase; this
//! receiver accumulates elapsed time since the last *committed* bit rather
//! than comparing only the immediately preceding edge gap, so that a run of
//! identical bits keeps decoding correctly instead of only working when
//! consecutive bits differ. See `DESIGN.md` for the full reasoning.

use crate::consts::{
    BIT_STUFF_RUN, FIXED_POINT_SCALE, VLC_FRAME_LEN, VLC_SYNC_TIMEOUT_US,
};
use crate::logging::{vlc_debug, vlc_warn};

#[cfg(not(feature = "std"))]
use heapless::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

/// Direction of the most recent data-phase GPIO transition.
///
/// Tracked purely by toggling (every physical edge is, by definition, the
/// opposite level of the previous one), not by reading the pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Rising,
    Falling,
}

/// Outcome of a synchronous receive wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveState {
    /// A full frame (up to and including the end-of-frame flag) was
    /// decoded before the wait ended.
    Complete,
    /// The wait ended (inactivity timeout) with a partial byte or no
    /// frame at all still pending.
    Incomplete,
}

/// Metadata describing the outcome of a receive attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveMeta {
    /// Number of whole bytes committed to the receive buffer.
    pub num_bytes_read: usize,
    /// Recovered data rate, in bits per second, derived from the preamble.
    pub data_rate_bps: u32,
    /// Whether the end-of-frame flag was observed.
    pub state: ReceiveState,
}

/// Injected seam for "frame ready" notification.
///
/// Models the receiver ISR's callback into the upper stack without a
/// back-pointer to the owning netif (see `DESIGN.md`, "Cyclic callback
/// reference").
pub trait FrameNotifier {
    /// Invoked once, synchronously, when a complete frame (terminated by
    /// the end-of-frame flag) has been decoded. `frame` is the still-raw
    /// `src | dst | payload | crc8` byte sequence.
    fn on_frame_complete(&self, frame: &[u8], meta: ReceiveMeta);
}

/// Decodes Manchester-encoded, bit-stuffed edges into a byte buffer.
///
/// Driven externally by [`Self::on_edge`], called once per GPIO edge with
/// the current timestamp in microseconds. Owns no pin and no timer: on
/// real hardware, platform glue (see [`crate::timer`]) wires the both-edges
/// interrupt to this method through a `critical_section`-guarded
/// singleton.
#[derive(Debug)]
pub struct ManchesterReceiver {
    #[cfg(not(feature = "std"))]
    buf: Vec<u8, VLC_FRAME_LEN>,
    #[cfg(feature = "std")]
    buf: Vec<u8>,
    capacity: usize,
    received_byte: u8,
    current_bit_count: u8,
    byte_count: usize,
    last_edge: Edge,
    symbol_rate_us: u32,
    last_symbol_time: u32,
    remaining_sync_edges: u16,
    timeout_us: u32,
    bit_stuffing_count: u8,
    tolerance_percent: u8,
    num_sync_symbols: u8,
    /// Accumulated microseconds since the last committed (or assumed
    /// resynchronised) bit boundary; see module docs on gap classification.
    phase_accum_us: u32,
    /// `true` once the first preamble edge has been seen since reset.
    started: bool,
    /// Fixed-point (scale [`FIXED_POINT_SCALE`]) running sum of half-symbol
    /// deltas observed during preamble accumulation.
    sync_accum_scaled: u32,
    frame_done: bool,
    data_rate_bps: u32,
}

impl ManchesterReceiver {
    /// Creates a new receiver with an empty, internally-owned frame
    /// buffer (capacity [`VLC_FRAME_LEN`]), configured with
    /// `tolerance_percent` (edge-gap tolerance) and `num_sync_symbols`
    /// (expected preamble length). Starts in the "awaiting preamble" state.
    pub fn new(tolerance_percent: u8, num_sync_symbols: u8) -> Self {
        let mut me = Self {
            buf: Vec::new(),
            capacity: VLC_FRAME_LEN,
            received_byte: 0,
            current_bit_count: 0,
            byte_count: 0,
            last_edge: Edge::Falling,
            symbol_rate_us: 0,
            last_symbol_time: 0,
            remaining_sync_edges: 0,
            timeout_us: 0,
            bit_stuffing_count: 0,
            tolerance_percent,
            num_sync_symbols,
            phase_accum_us: 0,
            started: false,
            sync_accum_scaled: 0,
            frame_done: false,
            data_rate_bps: 0,
        };
        me.reset();
        me
    }

    /// The most recently decoded frame, valid once [`Self::is_done`] is
    /// `true`. Cleared by [`Self::reset`].
    pub fn frame(&self) -> &[u8] {
        self.buf.as_slice()
    }

    /// Clears the context so the next edge starts a new frame. Idempotent:
    /// calling twice in succession leaves the context identical to calling
    /// it once.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.received_byte = 0;
        self.current_bit_count = 0;
        self.byte_count = 0;
        self.last_edge = Edge::Falling;
        self.symbol_rate_us = 0;
        self.last_symbol_time = 0;
        self.remaining_sync_edges = 2 * self.num_sync_symbols as u16;
        self.timeout_us = 0;
        self.bit_stuffing_count = 0;
        self.phase_accum_us = 0;
        self.started = false;
        self.sync_accum_scaled = 0;
        self.frame_done = false;
        self.data_rate_bps = 0;
    }

    /// `true` once the end-of-frame flag has been observed and the decoded
    /// frame is waiting to be consumed.
    pub fn is_done(&self) -> bool {
        self.frame_done
    }

    fn restart_limit(&self) -> u32 {
        if self.timeout_us != 0 {
            self.timeout_us
        } else {
            VLC_SYNC_TIMEOUT_US
        }
    }

    /// Advances the state machine by one GPIO edge, invoked with the
    /// current monotonic timestamp in microseconds.
    pub fn on_edge<N: FrameNotifier>(&mut self, now_us: u32, notifier: &N) {
        if self.frame_done {
            return;
        }

        if !self.started {
            self.started = true;
            self.last_symbol_time = now_us;
            self.remaining_sync_edges -= 1;
            return;
        }

        let delta = now_us.wrapping_sub(self.last_symbol_time);

        if delta >= self.restart_limit() {
            vlc_debug!("vlc receiver: inactivity gap, resetting context");
            self.reset();
            self.started = true;
            self.last_symbol_time = now_us;
            self.remaining_sync_edges -= 1;
            return;
        }

        if self.remaining_sync_edges > 0 {
            self.sync_accum_scaled += delta * FIXED_POINT_SCALE;
            self.remaining_sync_edges -= 1;
            self.last_symbol_time = now_us;
            if self.remaining_sync_edges == 0 {
                let divisor = (2 * self.num_sync_symbols as u32).saturating_sub(1).max(1);
                let half_symbol_scaled = self.sync_accum_scaled / divisor;
                self.symbol_rate_us = 2 * (half_symbol_scaled / FIXED_POINT_SCALE);
                self.timeout_us = 2 * self.symbol_rate_us;
            }
            return;
        }

        self.last_edge = match self.last_edge {
            Edge::Rising => Edge::Falling,
            Edge::Falling => Edge::Rising,
        };
        self.last_symbol_time = now_us;

        if self.symbol_rate_us == 0 {
            return;
        }

        self.phase_accum_us += delta;
        let ratio_scaled = (self.phase_accum_us * FIXED_POINT_SCALE) / self.symbol_rate_us;
        let tolerance_scaled = (self.tolerance_percent as u32) * FIXED_POINT_SCALE / 100;
        let full_band = diff(ratio_scaled, FIXED_POINT_SCALE) <= tolerance_scaled;
        let half_band = diff(ratio_scaled, FIXED_POINT_SCALE / 2) <= tolerance_scaled / 2;

        if full_band {
            self.phase_accum_us = 0;
            let bit = self.last_edge == Edge::Rising;
            self.commit_bit(bit, notifier);
        } else if half_band {
            // Boundary transition: hold, waiting for the completing edge.
        } else {
            // Out-of-band gap: treat as noise, resynchronise the phase
            // accumulator rather than let it drift indefinitely.
            self.phase_accum_us = 0;
        }
    }

    fn commit_bit<N: FrameNotifier>(&mut self, bit: bool, notifier: &N) {
        if self.bit_stuffing_count == BIT_STUFF_RUN {
            if !bit {
                // Stuffed bit: discard, not part of the payload.
                self.bit_stuffing_count = 0;
                return;
            }
            self.bit_stuffing_count = BIT_STUFF_RUN + 1;
            return;
        }
        if self.bit_stuffing_count == BIT_STUFF_RUN + 1 {
            if !bit {
                self.data_rate_bps = if self.symbol_rate_us != 0 {
                    1_000_000 / self.symbol_rate_us
                } else {
                    0
                };
                self.frame_done = true;
                let meta = ReceiveMeta {
                    num_bytes_read: self.byte_count,
                    data_rate_bps: self.data_rate_bps,
                    state: ReceiveState::Complete,
                };
                notifier.on_frame_complete(self.buf.as_slice(), meta);
                return;
            }
            // Reserved/other flag pattern: not currently supported, treat
            // the bit as an ordinary run continuation.
            self.bit_stuffing_count += 1;
        }

        self.bit_stuffing_count = if bit { self.bit_stuffing_count + 1 } else { 0 };

        self.received_byte = (self.received_byte << 1) | (bit as u8);
        self.current_bit_count += 1;
        if self.current_bit_count == 8 {
            self.current_bit_count = 0;
            if self.byte_count >= self.capacity {
                vlc_warn!("vlc receiver: buffer overflow, dropping frame");
                self.reset();
                return;
            }
            #[cfg(not(feature = "std"))]
            {
                if self.buf.push(self.received_byte).is_err() {
                    vlc_warn!("vlc receiver: buffer overflow, dropping frame");
                    self.reset();
                    return;
                }
            }
            #[cfg(feature = "std")]
            self.buf.push(self.received_byte);
            self.byte_count += 1;
            self.received_byte = 0;
            self.bit_stuffing_count = 0;
        }
    }

    /// Synchronous receive wait: polls `clock` until either a frame
    /// completes or the inactivity gap since the last edge exceeds the
    /// current timeout (`symbol_rate_us`-derived once synced, the fixed
    /// sync-phase timeout before that).
    pub fn read_sync<C: crate::hal::Clock>(&mut self, clock: &C) -> ReceiveMeta {
        let wait_start = clock.now_us();
        loop {
            if self.frame_done {
                return ReceiveMeta {
                    num_bytes_read: self.byte_count,
                    data_rate_bps: self.data_rate_bps,
                    state: ReceiveState::Complete,
                };
            }
            let now = clock.now_us();
            // Before the first edge arrives there is no `last_symbol_time`
            // to measure a gap from; bound the wait against when this call
            // started instead.
            let reference = if self.started {
                self.last_symbol_time
            } else {
                wait_start
            };
            let gap = now.wrapping_sub(reference);
            if gap >= self.restart_limit() {
                return ReceiveMeta {
                    num_bytes_read: self.byte_count,
                    data_rate_bps: self.data_rate_bps,
                    state: ReceiveState::Incomplete,
                };
            }
        }
    }
}

fn diff(a: u32, b: u32) -> u32 {
    if a >= b { a - b } else { b - a }
}
