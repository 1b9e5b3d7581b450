//! Constants used across the VLC link-layer implementation.
//!
//! This module defines protocol-wide constants used for buffer sizing,
//! frame layout, preamble control, bit stuffing, and timing.
//!
//! ## Key Concepts
//!
//! - **Frame layout**: source + destination MAC addresses, payload, CRC-8 trailer.
//! - **Preamble**: alternating-level training sequence used to recover the
//!   receiver's symbol clock.
//! - **Bit stuffing**: a run of six consecutive `1` bits forces an inserted
//!   `0`, keeping the end-of-frame flag unique on the wire.
//! - **Fixed-point scale**: clock recovery and tolerance checks use integer
//!   arithmetic scaled by 10 000 to avoid floating point in interrupt context.
//!
//! These values should be used wherever framing or timing logic is
//! implemented to ensure consistent frame boundaries.

/// Length, in bytes, of a single link-layer MAC address (source or destination).
pub const VLC_ADDR_LEN: usize = 6;

/// Maximum payload size, in bytes, carried by a single frame.
pub const VLC_MTU: usize = 1280;

/// Length, in bytes, of the CRC-8 trailer appended to every frame.
pub const VLC_CRC_SIZE: usize = 1;

/// Length, in bytes, of the source+destination address header.
pub const VLC_HEADER_LEN: usize = VLC_ADDR_LEN * 2;

/// Maximum length, in bytes, of a fully framed message: header + payload + CRC.
///
/// `12 (addresses) + 1280 (MTU) + 1 (CRC) = 1293`.
pub const VLC_FRAME_LEN: usize = VLC_HEADER_LEN + VLC_MTU + VLC_CRC_SIZE;

/// CRC-8 polynomial used for the frame trailer.
pub const VLC_CRC_POLY: u8 = 0xAB;

/// CRC-8 initial register value used for the frame trailer.
pub const VLC_CRC_INIT: u8 = 0xCD;

/// Default receiver tolerance, as a percentage of the recovered symbol period,
/// within which an edge gap is accepted as "one full symbol apart".
pub const VLC_DEFAULT_TOLERANCE_PERCENT: u8 = 30;

/// Default number of preamble symbols (`N_sync`) sent before the framed body.
pub const VLC_DEFAULT_NUM_SYNC_SYMBOLS: u8 = 4;

/// Default link bitrate, in bits per second.
pub const VLC_DEFAULT_BITRATE_BPS: u32 = 35_000;

/// Hard ceiling on requested bitrate, set by the 1 MHz timer resolution.
/// Requests above this fail with [`crate::error::VlcError::Transient`].
pub const VLC_MAX_BITRATE_BPS: u32 = 500_000;

/// Empirical bitrate above which [`crate::transmitter::ManchesterTransmitter::send`]
/// logs a warning but still proceeds.
pub const VLC_WARN_BITRATE_BPS: u32 = 40_000;

/// Safety timeout, in microseconds, applied while the receiver has not yet
/// recovered a symbol rate from the preamble ("no sync yet").
pub const VLC_SYNC_TIMEOUT_US: u32 = 5_000;

/// The literal end-of-frame flag byte, transmitted MSB-first with bit
/// stuffing disabled.
pub const VLC_END_FLAG: u8 = 0b1111_1110;

/// Run length of consecutive `1` bits that forces a stuffed `0`.
pub const BIT_STUFF_RUN: u8 = 6;

/// Scale factor used for fixed-point clock-recovery and tolerance arithmetic,
/// avoiding floating-point division inside the receiver's edge interrupt.
pub const FIXED_POINT_SCALE: u32 = 10_000;
