//! # vlc-link
//!
//! A portable, no_std Rust link-layer driver for single-LED, single-photodiode
//! visible light communication (VLC): Manchester-encoded bit transmission and
//! reception over one GPIO output and one GPIO input, HDLC-style framing
//! (preamble synchronization, bit stuffing, end-of-frame flag), and MAC
//! framing (6-byte source/destination addresses plus a CRC-8 trailer)
//! bridging to a generic upper network stack.
//!
//! This driver implements:
//! - `embedded-hal` traits for the transmit pin and timing sources
//! - Manchester (G.E. Thomas convention) encoding/decoding with
//!   self-clocking preamble recovery
//! - HDLC-style bit stuffing and end-of-frame flag detection
//! - CRC-8 (poly `0xAB`, init `0xCD`) link integrity checking
//! - interrupt-safe singleton access via `critical-section`
//! - optional tick sources using either timer/edge interrupts or blocking
//!   delay
//!
//! ## Crate features
//! | Feature               | Description |
//! |-----------------------|-------------|
//! | `std`                 | Disables `#![no_std]` support and replaces `heapless::Vec`s with `std::vec::Vec`s |
//! | `delay-loop`          | Uses `embedded_hal::delay::DelayNs` for the transmitter's tick source |
//! | `timer-isr` (default) | Uses `critical_section::with` singleton wiring for interrupt-driven tick/edge sources |
//! | `defmt-0-3`           | Uses `defmt` logging |
//! | `log`                 | Uses `log` logging |
//!
//! ## Scope
//!
//! This crate implements the link layer only: it does not implement an
//! upper network stack, EUI-48 address acquisition, a shell or measurement
//! command surface, or the GPIO/timer peripheral drivers themselves. Those
//! are all assumed to be supplied by the caller; see [`hal`] for the exact
//! seams. It also does not attempt collision detection, multi-frame
//! fragmentation, or forward error correction beyond the CRC-8 trailer —
//! half-duplex arbitration is limited to "don't transmit while a receive
//! edge interrupt is enabled" (see [`driver::VlcDriver::send`]).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vlc_link::driver::VlcDriver;
//! use vlc_link::netif::VlcConfig;
//!
//! let mut driver = VlcDriver::new(
//!     led_pin,
//!     rx_edge_interrupt,
//!     tx_timer,
//!     clock,
//!     upward_sink,
//!     local_mac_address,
//!     VlcConfig::default(),
//! );
//! driver.send(dst_mac_address, b"hello")?;
//! ```
//!
//! Or, drive the transmitter from a blocking delay loop instead of a timer
//! interrupt (feature `delay-loop`):
//!
//! ```rust,ignore
//! use vlc_link::timer::run_vlc_tx_tick_loop;
//!
//! run_vlc_tx_tick_loop(&mut driver, &mut delay, half_symbol_us);
//! ```
//!
//! ## Status
//!
//! This crate is in early development. Contributions welcome!
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "timer-isr")]
pub use critical_section;

#[cfg(all(feature = "timer-isr", not(feature = "std")))]
pub use heapless;

pub mod consts;
pub(crate) mod crc;
pub mod driver;
pub mod error;
pub mod hal;
pub(crate) mod logging;
pub mod netif;
pub mod receiver;
#[cfg(test)]
pub(crate) mod test_support;
pub mod timer;
pub mod transmitter;

#[cfg(all(test, feature = "std"))]
mod tests {
    use crate::netif::{MacAddress, UpperProtocol, UpwardSink, UpwardSnip, VlcConfig};
    use crate::receiver::{FrameNotifier, ManchesterReceiver, ReceiveMeta};
    use crate::transmitter::ManchesterTransmitter;
    use core::cell::RefCell;
    use embedded_hal::digital::{Error, ErrorKind, ErrorType, OutputPin};

    #[derive(Debug, Default)]
    struct LevelPin {
        levels: std::vec::Vec<bool>,
    }

    #[derive(Debug)]
    struct LevelPinError;

    impl Error for LevelPinError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    impl ErrorType for LevelPin {
        type Error = LevelPinError;
    }

    impl OutputPin for LevelPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.levels.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.levels.push(true);
            Ok(())
        }
    }

    struct Sink {
        last: RefCell<Option<UpwardSnip>>,
    }

    impl UpwardSink for Sink {
        fn on_receive(&self, snip: UpwardSnip) {
            *self.last.borrow_mut() = Some(snip);
        }
    }

    struct DirectNotifier<'a> {
        sink: &'a Sink,
    }

    impl<'a> FrameNotifier for DirectNotifier<'a> {
        fn on_frame_complete(&self, frame: &[u8], meta: ReceiveMeta) {
            if let Some(mut snip) = crate::netif::receive(
                frame,
                crate::consts::VLC_FRAME_LEN,
                UpperProtocol::Ipv6,
            ) {
                snip.data_rate_bps = meta.data_rate_bps;
                self.sink.on_receive(snip);
            }
        }
    }

    #[test]
    fn test_simulated_vlc_send_and_receive() {
        const SRC: MacAddress = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
        const DST: MacAddress = [0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F];
        let config = VlcConfig::default();

        let message = b"Hello, world!";
        let frame = crate::netif::assemble_frame(SRC, DST, message, config.mtu).unwrap();

        let mut transmitter = ManchesterTransmitter::new(LevelPin::default());
        // `send` blocks on a real timer ISR driving `on_tick`; here there is
        // no timer, so load the frame directly and drive the ticks by hand.
        transmitter
            .begin(&frame, config.num_sync_symbols)
            .expect("frame should be well-formed");
        while !transmitter.is_done() {
            transmitter.on_tick();
        }

        // Reconstruct the exact edge timestamps the transmitter just
        // produced, at the half-symbol period implied by the bitrate.
        let half_symbol_us = 1_000_000 / (2 * config.bitrate_bps);
        let edges = build_edges(half_symbol_us, config.num_sync_symbols, &frame);

        let mut receiver = ManchesterReceiver::new(config.tolerance_percent, config.num_sync_symbols);
        let sink = Sink {
            last: RefCell::new(None),
        };
        let notifier = DirectNotifier { sink: &sink };
        for &t in &edges {
            receiver.on_edge(t, &notifier);
        }

        assert!(receiver.is_done(), "receiver never saw a complete frame");
        let received = sink.last.borrow();
        let snip = received.as_ref().expect("no data received");
        assert_eq!(&snip.payload[..], &message[..]);
        assert_eq!(snip.header.src, SRC);
        assert_eq!(snip.header.dst, DST);
    }

    /// Independently re-derives the GPIO edge sequence a transmission of
    /// `frame` produces, mirroring `ManchesterTransmitter::tick_body`'s
    /// first-half/second-half symbol logic without depending on it, so
    /// this test cannot pass merely because both sides share a bug.
    fn build_edges(half_symbol_us: u32, num_sync_symbols: u8, frame: &[u8]) -> std::vec::Vec<u32> {
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

        let mut bits = std::vec::Vec::new();
        for &byte in frame {
            let mut run: u8 = 0;
            let mut i = 0;
            while i < 8 {
                if run >= crate::consts::BIT_STUFF_RUN {
                    bits.push(false);
                    run = 0;
                    continue;
                }
                let bit = (byte >> (7 - i)) & 1 != 0;
                bits.push(bit);
                run = if bit { run + 1 } else { 0 };
                i += 1;
            }
        }
        let flag = crate::consts::VLC_END_FLAG;
        for i in 0..8 {
            bits.push((flag >> (7 - i)) & 1 != 0);
        }

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
}
