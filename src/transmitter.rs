//! Manchester transmitter state machine for the VLC link layer.
//!
//! Converts a framed byte buffer into a stream of GPIO edges at a
//! configured symbol rate: preamble, bit-stuffed body, end-of-frame flag.
//! The state machine itself only knows about bits and ticks; the caller is
//! responsible for wiring a real timer interrupt to call
//! [`ManchesterTransmitter::on_tick`] at the requested half-symbol period
//! (see [`crate::timer`] for the `critical_section`-based singleton
//! wiring used on real hardware).
//!
//! ## Design Notes
//!
//! This module does not assemble link frames, compute CRCs, or talk to the
//! upper network stack — it focuses solely on low-level Manchester
//! modulation. See [`crate::netif`] for frame assembly.

use crate::consts::{
    BIT_STUFF_RUN, VLC_END_FLAG, VLC_FRAME_LEN, VLC_MAX_BITRATE_BPS, VLC_WARN_BITRATE_BPS,
};
use crate::error::VlcError;
use crate::hal::{Clock, PeriodicTimer};
use crate::logging::{vlc_error, vlc_warn};
use embedded_hal::digital::OutputPin;

#[cfg(not(feature = "std"))]
use heapless::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

/// Transmitter state: preamble, framed body, end-of-frame flag, done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxState {
    Idle,
    Preamble,
    Body,
    Flag,
    Done,
}

/// Drives a single GPIO output through a Manchester-encoded, bit-stuffed
/// frame at a caller-controlled symbol rate.
///
/// `TX` must implement [`embedded_hal::digital::OutputPin`]; timing is
/// supplied externally through [`crate::hal::PeriodicTimer`] and
/// [`crate::hal::Clock`] so the state machine can be unit tested without
/// real hardware.
#[derive(Debug)]
pub struct ManchesterTransmitter<TX: OutputPin> {
    /// The LED output pin.
    pub tx: TX,
    state: TxState,
    #[cfg(not(feature = "std"))]
    buf: Vec<u8, VLC_FRAME_LEN>,
    #[cfg(feature = "std")]
    buf: Vec<u8>,
    buf_len: usize,
    /// Bit cursor, `0..8*length` for the framed body or `0..8` for the flag.
    bit_cursor: usize,
    /// Whether the next tick emits the first half (`true`) or second half
    /// (`false`) of the current symbol.
    is_data_edge: bool,
    current_bit: bool,
    stuffed_pending: bool,
    remaining_sync_signals: u16,
    last_sync_signal: bool,
    payload_transmitted: bool,
    bit_stuffing_count: u8,
    done: bool,
}

impl<TX: OutputPin> ManchesterTransmitter<TX> {
    /// Creates a new transmitter over the given output pin, idle and driven
    /// low.
    pub fn new(tx: TX) -> Self {
        let mut tx = tx;
        let _ = tx.set_low();
        Self {
            tx,
            state: TxState::Idle,
            buf: Vec::new(),
            buf_len: 0,
            bit_cursor: 0,
            is_data_edge: true,
            current_bit: false,
            stuffed_pending: false,
            remaining_sync_signals: 0,
            last_sync_signal: false,
            payload_transmitted: false,
            bit_stuffing_count: 0,
            done: true,
        }
    }

    /// Loads a new frame and resets the state machine to the preamble.
    ///
    /// `frame` is the already-assembled `src | dst | payload | crc8` byte
    /// sequence; bit stuffing and the end-of-frame flag are applied by the
    /// state machine itself and are not part of `frame`.
    pub fn begin(&mut self, frame: &[u8], num_sync_symbols: u8) -> Result<(), VlcError> {
        if frame.is_empty() {
            return Err(VlcError::BadMessage);
        }
        if frame.len() > VLC_FRAME_LEN {
            return Err(VlcError::MsgTooLarge);
        }
        self.buf.clear();
        #[cfg(not(feature = "std"))]
        self.buf
            .extend_from_slice(frame)
            .map_err(|_| VlcError::MsgTooLarge)?;
        #[cfg(feature = "std")]
        self.buf.extend_from_slice(frame);

        self.buf_len = frame.len();
        self.bit_cursor = 0;
        self.is_data_edge = true;
        self.current_bit = false;
        self.stuffed_pending = false;
        self.remaining_sync_signals = 2 * num_sync_symbols as u16;
        self.last_sync_signal = false;
        self.payload_transmitted = false;
        self.bit_stuffing_count = 0;
        self.done = false;
        self.state = TxState::Preamble;
        Ok(())
    }

    /// Returns `true` once the end-of-frame flag has been fully clocked out
    /// and the output has returned to idle-low.
    pub fn is_done(&self) -> bool {
        self.done
    }

    fn write_tx(&mut self, high: bool) {
        if high {
            self.tx.set_high().unwrap();
        } else {
            self.tx.set_low().unwrap();
        }
    }

    /// Advances the state machine by one half-symbol tick. Must be called
    /// at the configured half-symbol period (see [`Self::send`]).
    pub fn on_tick(&mut self) {
        if self.state == TxState::Preamble && self.remaining_sync_signals == 0 {
            self.state = TxState::Body;
        }
        match self.state {
            TxState::Idle | TxState::Done => {}
            TxState::Preamble => self.tick_preamble(),
            TxState::Body | TxState::Flag => self.tick_body(),
        }
    }

    fn tick_preamble(&mut self) {
        let level = !self.last_sync_signal;
        self.write_tx(level);
        self.last_sync_signal = level;
        self.remaining_sync_signals -= 1;
    }

    fn source_len_bits(&self) -> usize {
        if self.payload_transmitted { 8 } else { self.buf_len * 8 }
    }

    fn decode_next_bit(&mut self) -> bool {
        if !self.payload_transmitted && self.bit_stuffing_count >= BIT_STUFF_RUN {
            self.bit_stuffing_count = 0;
            self.stuffed_pending = true;
            return false;
        }
        self.stuffed_pending = false;
        let byte_idx = self.bit_cursor / 8;
        let bit_idx = self.bit_cursor % 8;
        let byte = if self.payload_transmitted {
            VLC_END_FLAG
        } else {
            self.buf[byte_idx]
        };
        let bit = (byte >> (7 - bit_idx)) & 1 != 0;
        if !self.payload_transmitted {
            self.bit_stuffing_count = if bit { self.bit_stuffing_count + 1 } else { 0 };
        }
        bit
    }

    fn tick_body(&mut self) {
        if self.is_data_edge {
            let bit = self.decode_next_bit();
            self.current_bit = bit;
            self.write_tx(!bit);
            self.is_data_edge = false;
            return;
        }

        self.write_tx(self.current_bit);
        self.is_data_edge = true;
        if !self.stuffed_pending {
            self.bit_cursor += 1;
            if !self.payload_transmitted && self.bit_cursor % 8 == 0 {
                self.bit_stuffing_count = 0;
            }
        }
        self.stuffed_pending = false;

        if self.bit_cursor >= self.source_len_bits() {
            if self.payload_transmitted {
                self.finish();
            } else {
                self.start_flag();
            }
        }
    }

    fn start_flag(&mut self) {
        self.payload_transmitted = true;
        self.state = TxState::Flag;
        self.bit_cursor = 0;
        self.is_data_edge = true;
        self.bit_stuffing_count = 0;
    }

    fn finish(&mut self) {
        self.state = TxState::Done;
        self.write_tx(false);
        self.done = true;
    }

    /// Synchronously transmits `frame`: configures the periodic timer at
    /// the half-symbol period implied by `bitrate_bps`, emits preamble,
    /// bit-stuffed body and end-of-frame flag, and returns once the frame
    /// has been fully clocked out or the bounded completion wait expires.
    ///
    /// `timer` must already be wired so that its ISR calls
    /// [`Self::on_tick`] — this function only starts and stops it.
    pub fn send<T: PeriodicTimer, C: Clock>(
        &mut self,
        timer: &mut T,
        clock: &C,
        frame: &[u8],
        bitrate_bps: u32,
        num_sync_symbols: u8,
    ) -> Result<(), VlcError> {
        if bitrate_bps > VLC_MAX_BITRATE_BPS {
            vlc_error!("requested bitrate exceeds the 1 MHz timer's hardware ceiling");
            return Err(VlcError::Transient);
        }
        if bitrate_bps > VLC_WARN_BITRATE_BPS {
            vlc_warn!("requested bitrate exceeds empirical ceiling");
        }

        self.begin(frame, num_sync_symbols)?;
        let half_symbol_us = 1_000_000 / (2 * bitrate_bps);
        timer.start_periodic_us(half_symbol_us)?;

        let body_bits = (frame.len() as u32) * 8;
        let stuffed_bits = body_bits + (body_bits / BIT_STUFF_RUN as u32) + 1;
        let total_half_symbols = (2 * num_sync_symbols as u32) + (stuffed_bits * 2) + 16;
        let expected_us = total_half_symbols.saturating_mul(half_symbol_us);
        let timeout_us = expected_us.saturating_mul(4).max(half_symbol_us * 64);

        let start_time = clock.now_us();
        loop {
            if self.is_done() {
                timer.stop();
                return Ok(());
            }
            if clock.now_us().wrapping_sub(start_time) >= timeout_us {
                timer.stop();
                self.state = TxState::Idle;
                self.done = true;
                return Err(VlcError::Timeout);
            }
        }
    }
}
