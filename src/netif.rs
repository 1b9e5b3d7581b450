//! Link framing and netif adapter: bridges the Manchester transmitter and
//! receiver to a generic upward network stack.
//!
//! On send, prepends source/destination MAC addresses and appends a CRC-8
//! trailer, then hands the assembled frame to
//! [`crate::transmitter::ManchesterTransmitter::send`]. On receive,
//! verifies the CRC, strips the header, and surfaces `(source,
//! destination, payload)` to the caller as an [`UpwardSnip`] — no
//! destination filtering is performed at this layer (see `DESIGN.md`).

use crate::consts::{
    VLC_ADDR_LEN, VLC_CRC_SIZE, VLC_DEFAULT_BITRATE_BPS, VLC_DEFAULT_NUM_SYNC_SYMBOLS,
    VLC_DEFAULT_TOLERANCE_PERCENT, VLC_FRAME_LEN, VLC_HEADER_LEN, VLC_MTU,
};
use crate::crc::crc8;
use crate::error::VlcError;
use crate::hal::{Clock, PeriodicTimer};
use crate::logging::vlc_warn;
use crate::receiver::{FrameNotifier, ReceiveMeta, ReceiveState};
use crate::transmitter::ManchesterTransmitter;
use embedded_hal::digital::OutputPin;

#[cfg(not(feature = "std"))]
use heapless::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

/// A 6-byte link-layer (EUI-48-shaped) address.
pub type MacAddress = [u8; VLC_ADDR_LEN];

/// Upper-layer protocol tag carried alongside a decoded frame, mirroring
/// the netif option `PROTO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpperProtocol {
    /// IPv6, the default.
    Ipv6,
    /// 6LoWPAN-compressed IPv6.
    SixLoWpan,
    /// No protocol negotiated; caller decides.
    Undefined,
}

impl Default for UpperProtocol {
    fn default() -> Self {
        UpperProtocol::Ipv6
    }
}

/// Configuration surface for the VLC link layer: a plain-data struct with
/// literal defaults, caller can override individual fields (no
/// config-file parsing crate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VlcConfig {
    /// Receiver edge-gap tolerance, as a percentage of the recovered
    /// symbol period.
    pub tolerance_percent: u8,
    /// Number of preamble symbols (`N_sync`) sent before the framed body.
    pub num_sync_symbols: u8,
    /// Whether the receiver is driven by [`crate::receiver::ManchesterReceiver::read_sync`]
    /// rather than purely by the async `RX_COMPLETE` notification.
    pub synchronous: bool,
    /// Link bitrate, in bits per second.
    pub bitrate_bps: u32,
    /// Maximum payload size, in bytes, carried by a single frame.
    pub mtu: usize,
    /// Default upper-layer protocol tag attached to decoded frames.
    pub default_protocol: UpperProtocol,
}

impl Default for VlcConfig {
    fn default() -> Self {
        Self {
            tolerance_percent: VLC_DEFAULT_TOLERANCE_PERCENT,
            num_sync_symbols: VLC_DEFAULT_NUM_SYNC_SYMBOLS,
            synchronous: false,
            bitrate_bps: VLC_DEFAULT_BITRATE_BPS,
            mtu: VLC_MTU,
            default_protocol: UpperProtocol::Ipv6,
        }
    }
}

/// The link-layer header of a decoded frame, carried alongside the payload
/// for the upper stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkHeader {
    /// Sender's link-layer address.
    pub src: MacAddress,
    /// Intended recipient's link-layer address. No filtering is performed
    /// here; the upper layer decides whether to accept frames not
    /// addressed to this node.
    pub dst: MacAddress,
}

/// A decoded frame ready for delivery to the upper network stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpwardSnip {
    /// Link-layer source/destination.
    pub header: LinkHeader,
    /// Upper-layer protocol tag.
    pub protocol: UpperProtocol,
    /// The decoded payload (frame bytes with header and CRC stripped).
    #[cfg(not(feature = "std"))]
    pub payload: Vec<u8, VLC_MTU>,
    /// The decoded payload (frame bytes with header and CRC stripped).
    #[cfg(feature = "std")]
    pub payload: Vec<u8>,
    /// Recovered data rate, in bits per second.
    pub data_rate_bps: u32,
}

/// An assembled, framed byte sequence (`src | dst | payload | crc8`),
/// ready for the transmitter.
#[cfg(not(feature = "std"))]
pub type Frame = Vec<u8, VLC_FRAME_LEN>;
/// An assembled, framed byte sequence (`src | dst | payload | crc8`),
/// ready for the transmitter.
#[cfg(feature = "std")]
pub type Frame = Vec<u8>;

/// Assembles `src | dst | payload` and appends the CRC-8 trailer,
/// returning the fully framed byte sequence.
///
/// Fails with [`VlcError::MsgTooLarge`] if the payload would push the
/// frame past `mtu + 12`, and with [`VlcError::BadMessage`] if the payload
/// is empty (a header-only frame is not a supported message).
pub fn assemble_frame(
    src: MacAddress,
    dst: MacAddress,
    payload: &[u8],
    mtu: usize,
) -> Result<Frame, VlcError> {
    if payload.is_empty() {
        return Err(VlcError::BadMessage);
    }
    if VLC_HEADER_LEN + payload.len() + VLC_CRC_SIZE > mtu + VLC_HEADER_LEN + VLC_CRC_SIZE {
        return Err(VlcError::MsgTooLarge);
    }

    let mut frame: Frame = Vec::new();

    #[cfg(not(feature = "std"))]
    {
        frame
            .extend_from_slice(&src)
            .map_err(|_| VlcError::MsgTooLarge)?;
        frame
            .extend_from_slice(&dst)
            .map_err(|_| VlcError::MsgTooLarge)?;
        frame
            .extend_from_slice(payload)
            .map_err(|_| VlcError::MsgTooLarge)?;
    }
    #[cfg(feature = "std")]
    {
        frame.extend_from_slice(&src);
        frame.extend_from_slice(&dst);
        frame.extend_from_slice(payload);
    }

    let trailer = crc8(&frame);
    #[cfg(not(feature = "std"))]
    frame.push(trailer).map_err(|_| VlcError::MsgTooLarge)?;
    #[cfg(feature = "std")]
    frame.push(trailer);

    Ok(frame)
}

/// Sends `payload` from `src` to `dst` over `transmitter`, using the
/// bitrate and preamble length from `config`. Returns the number of bytes
/// transmitted (including framing) on success.
pub fn send<TX: OutputPin, T: PeriodicTimer, C: Clock>(
    transmitter: &mut ManchesterTransmitter<TX>,
    timer: &mut T,
    clock: &C,
    src: MacAddress,
    dst: MacAddress,
    payload: &[u8],
    config: &VlcConfig,
) -> Result<usize, VlcError> {
    let frame = assemble_frame(src, dst, payload, config.mtu)?;
    transmitter.send(
        timer,
        clock,
        &frame,
        config.bitrate_bps,
        config.num_sync_symbols,
    )?;
    Ok(frame.len())
}

/// Validates and strips a raw decoded frame (`src | dst | payload | crc8`),
/// returning the upward snip on success. Drops (returns `None`) on a short
/// frame, a frame past buffer capacity, or a CRC mismatch — a corrupt frame
/// is indistinguishable from "no frame" at this boundary.
pub fn receive(raw: &[u8], buffer_capacity: usize, default_protocol: UpperProtocol) -> Option<UpwardSnip> {
    let min_len = 2 * VLC_ADDR_LEN + VLC_CRC_SIZE;
    if raw.len() < min_len {
        return None;
    }
    if raw.len() > buffer_capacity {
        vlc_warn!("vlc netif: frame past buffer capacity, dropping");
        return None;
    }
    let n = raw.len();
    let computed = crc8(&raw[..n - 1]);
    if computed != raw[n - 1] {
        vlc_warn!("vlc netif: CRC-8 mismatch, dropping frame");
        return None;
    }

    let mut src = [0u8; VLC_ADDR_LEN];
    let mut dst = [0u8; VLC_ADDR_LEN];
    src.copy_from_slice(&raw[0..VLC_ADDR_LEN]);
    dst.copy_from_slice(&raw[VLC_ADDR_LEN..2 * VLC_ADDR_LEN]);

    #[cfg(not(feature = "std"))]
    let mut payload: heapless::Vec<u8, VLC_MTU> = Vec::new();
    #[cfg(feature = "std")]
    let mut payload: std::vec::Vec<u8> = Vec::new();

    let payload_slice = &raw[2 * VLC_ADDR_LEN..n - 1];
    #[cfg(not(feature = "std"))]
    {
        if payload.extend_from_slice(payload_slice).is_err() {
            return None;
        }
    }
    #[cfg(feature = "std")]
    payload.extend_from_slice(payload_slice);

    Some(UpwardSnip {
        header: LinkHeader { src, dst },
        protocol: default_protocol,
        payload,
        data_rate_bps: 0,
    })
}

/// A [`FrameNotifier`] that validates a completed receive and forwards the
/// resulting [`UpwardSnip`] to an injected sink, mirroring the "frame
/// ready" notification path of §4.3/§4.4. Never surfaces receive-path
/// errors upward: a dropped frame is simply not forwarded.
#[derive(Debug)]
pub struct NetifNotifier<'a, S: UpwardSink> {
    buffer_capacity: usize,
    default_protocol: UpperProtocol,
    sink: &'a S,
}

/// Receiving side of the seam between the netif adapter and the upper
/// network stack: whatever constructs a [`crate::driver::VlcDriver`]
/// supplies one of these to receive decoded, validated frames.
pub trait UpwardSink {
    /// Invoked once per successfully validated frame.
    fn on_receive(&self, snip: UpwardSnip);
}

impl<'a, S: UpwardSink> NetifNotifier<'a, S> {
    /// Creates a notifier that validates decoded frames against
    /// `buffer_capacity` and tags them with `default_protocol` before
    /// forwarding to `sink`.
    pub fn new(buffer_capacity: usize, default_protocol: UpperProtocol, sink: &'a S) -> Self {
        Self {
            buffer_capacity,
            default_protocol,
            sink,
        }
    }
}

impl<'a, S: UpwardSink> FrameNotifier for NetifNotifier<'a, S> {
    fn on_frame_complete(&self, frame: &[u8], meta: ReceiveMeta) {
        if meta.state != ReceiveState::Complete {
            return;
        }
        if let Some(mut snip) = receive(frame, self.buffer_capacity, self.default_protocol) {
            snip.data_rate_bps = meta.data_rate_bps;
            self.sink.on_receive(snip);
        }
    }
}
