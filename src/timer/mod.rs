//! Wiring helpers for driving [`crate::driver::VlcDriver`] from real
//! interrupts or a blocking delay loop.
//!
//! Two approaches, matching the crate's two timing-source features:
//! - `timer-isr` (default): `critical_section`-guarded singleton, driven
//!   from the transmitter's timer interrupt and the receiver's edge
//!   interrupt. See [`isr`] and the [`declare_vlc_driver!`] /
//!   [`setup_vlc_driver!`] / [`tick_vlc_tx_timer!`] / [`vlc_rx_edge!`] /
//!   [`send_vlc!`] macros.
//! - `delay-loop`: a blocking loop that calls
//!   [`crate::driver::VlcDriver::on_tx_tick`] at a fixed delay, for
//!   platforms without a free timer interrupt. See [`delay`].
//!
//! This crate performs no OCR/prescaler arithmetic: the half-symbol period
//! is computed once per [`crate::transmitter::ManchesterTransmitter::send`]
//! call from the configured bitrate, as plain integer division (see
//! `DESIGN.md`).

#[cfg(feature = "delay-loop")]
mod delay;
#[cfg(feature = "delay-loop")]
pub use delay::*;

#[cfg(feature = "timer-isr")]
mod isr;
#[cfg(feature = "timer-isr")]
pub use isr::*;

#[cfg(feature = "timer-isr")]
mod macros;
#[cfg(feature = "timer-isr")]
#[allow(unused_imports)]
pub use macros::*;
