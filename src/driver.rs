//! Top-level VLC link-layer driver: owns the transmitter, receiver, and
//! their timing/interrupt sources, and glues them to the netif adapter.
//!
//! This is the type platform glue actually instantiates. It does not know
//! how its GPIO pins or timer are acquired (see [`crate::hal`] for the
//! traits it expects) or how the local link-layer address was obtained —
//! both are out of scope for this crate (see `DESIGN.md`).

use crate::consts::VLC_ADDR_LEN;
use crate::error::VlcError;
use crate::hal::{Clock, EdgeInterrupt, PeriodicTimer};
use crate::netif::{self, MacAddress, NetifNotifier, UpwardSink, VlcConfig};
use crate::receiver::{ManchesterReceiver, ReceiveMeta, ReceiveState};
use crate::transmitter::ManchesterTransmitter;
use embedded_hal::digital::OutputPin;

/// Owns a Manchester transmitter/receiver pair and bridges decoded,
/// validated frames to an injected [`UpwardSink`].
///
/// Type parameters mirror the injected seams of the lower-level state
/// machines: `TX` is the LED output pin, `EI` controls the receive pin's
/// both-edges interrupt, `T` is the transmitter's hardware timer, `C` is
/// the monotonic clock, and `S` is the upper stack's receive sink.
#[derive(Debug)]
pub struct VlcDriver<TX, EI, T, C, S>
where
    TX: OutputPin,
    EI: EdgeInterrupt,
    T: PeriodicTimer,
    C: Clock,
    S: UpwardSink,
{
    transmitter: ManchesterTransmitter<TX>,
    receiver: ManchesterReceiver,
    edge_interrupt: EI,
    timer: T,
    clock: C,
    sink: S,
    local_address: MacAddress,
    config: VlcConfig,
}

impl<TX, EI, T, C, S> VlcDriver<TX, EI, T, C, S>
where
    TX: OutputPin,
    EI: EdgeInterrupt,
    T: PeriodicTimer,
    C: Clock,
    S: UpwardSink,
{
    /// Brings the link up: constructs the transmitter and receiver state
    /// machines, and enables the receive edge interrupt so the link is
    /// listening by default. `local_address` is the already-acquired
    /// EUI-48 for this node; acquiring it is the caller's responsibility.
    pub fn new(
        tx: TX,
        mut edge_interrupt: EI,
        timer: T,
        clock: C,
        sink: S,
        local_address: MacAddress,
        config: VlcConfig,
    ) -> Self {
        edge_interrupt.enable();
        Self {
            transmitter: ManchesterTransmitter::new(tx),
            receiver: ManchesterReceiver::new(config.tolerance_percent, config.num_sync_symbols),
            edge_interrupt,
            timer,
            clock,
            sink,
            local_address,
            config,
        }
    }

    /// This node's link-layer address.
    pub fn local_address(&self) -> MacAddress {
        self.local_address
    }

    /// Frames and sends `payload` to `dst`, blocking (via the injected
    /// [`Clock`]) until the transmission completes or a bounded timeout
    /// elapses. The receive edge interrupt is disabled for the duration of
    /// the send, honoring "don't send while receiving".
    pub fn send(&mut self, dst: MacAddress, payload: &[u8]) -> Result<usize, VlcError> {
        let frame = netif::assemble_frame(self.local_address, dst, payload, self.config.mtu)?;
        self.edge_interrupt.disable();
        let result = self.transmitter.send(
            &mut self.timer,
            &self.clock,
            &frame,
            self.config.bitrate_bps,
            self.config.num_sync_symbols,
        );
        self.edge_interrupt.enable();
        result.map(|()| frame.len())
    }

    /// Invoked by the platform's timer interrupt to advance transmission
    /// by one half-symbol tick. A no-op if no send is in progress.
    pub fn on_tx_tick(&mut self) {
        self.transmitter.on_tick();
    }

    /// Invoked by the platform's both-edges GPIO interrupt on the receive
    /// pin, with the current monotonic timestamp in microseconds. Forwards
    /// completed, CRC-valid frames to the configured [`UpwardSink`] and
    /// resets the receiver for the next frame.
    pub fn on_rx_edge(&mut self, now_us: u32) {
        let notifier = NetifNotifier::new(
            self.config.mtu + 2 * VLC_ADDR_LEN + 1,
            self.config.default_protocol,
            &self.sink,
        );
        self.receiver.on_edge(now_us, &notifier);
        if self.receiver.is_done() {
            self.receiver.reset();
        }
    }

    /// Synchronous receive wait: polls the injected [`Clock`] until a
    /// frame completes or the inactivity timeout elapses, validates and
    /// forwards a completed frame the same way [`Self::on_rx_edge`] would,
    /// and resets the receiver before returning. Intended for
    /// [`VlcConfig::synchronous`] operation rather than interrupt-driven
    /// receive.
    pub fn read_sync(&mut self) -> ReceiveMeta {
        let meta = self.receiver.read_sync(&self.clock);
        if meta.state == ReceiveState::Complete {
            if let Some(mut snip) = netif::receive(
                self.receiver.frame(),
                self.config.mtu + 2 * VLC_ADDR_LEN + 1,
                self.config.default_protocol,
            ) {
                snip.data_rate_bps = meta.data_rate_bps;
                self.sink.on_receive(snip);
            }
        }
        self.receiver.reset();
        meta
    }

    /// Drops any in-progress receive state and returns to "awaiting
    /// preamble". Does not affect an in-progress send.
    pub fn reset_receive(&mut self) {
        self.receiver.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netif::UpperProtocol;
    use crate::test_support::{FakeTimer, RecordingPin, StepClock, build_manchester_edges};
    use core::cell::RefCell;

    const LOCAL: MacAddress = [1, 2, 3, 4, 5, 6];
    const PEER: MacAddress = [0xA, 0xB, 0xC, 0xD, 0xE, 0xF];

    #[derive(Default)]
    struct TestEdgeInterrupt {
        enabled: bool,
        enable_count: u32,
        disable_count: u32,
    }

    impl EdgeInterrupt for TestEdgeInterrupt {
        fn enable(&mut self) {
            self.enabled = true;
            self.enable_count += 1;
        }

        fn disable(&mut self) {
            self.enabled = false;
            self.disable_count += 1;
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        last: RefCell<Option<std::vec::Vec<u8>>>,
    }

    impl UpwardSink for RecordingSink {
        fn on_receive(&self, snip: crate::netif::UpwardSnip) {
            *self.last.borrow_mut() = Some(snip.payload[..].to_vec());
        }
    }

    fn make_driver() -> VlcDriver<RecordingPin, TestEdgeInterrupt, FakeTimer, StepClock, RecordingSink>
    {
        VlcDriver::new(
            RecordingPin::default(),
            TestEdgeInterrupt::default(),
            FakeTimer::default(),
            StepClock::new(50),
            RecordingSink::default(),
            LOCAL,
            VlcConfig {
                default_protocol: UpperProtocol::Ipv6,
                ..VlcConfig::default()
            },
        )
    }

    #[test]
    fn new_enables_the_receive_interrupt() {
        let driver = make_driver();
        assert!(driver.edge_interrupt.enabled);
        assert_eq!(driver.edge_interrupt.enable_count, 1);
    }

    #[test]
    fn send_rejects_empty_payload_without_touching_the_interrupt() {
        let mut driver = make_driver();
        let before = driver.edge_interrupt.disable_count;
        assert_eq!(driver.send(PEER, &[]), Err(VlcError::BadMessage));
        // assemble_frame fails before the interrupt is ever touched.
        assert_eq!(driver.edge_interrupt.disable_count, before);
    }

    #[test]
    fn send_disables_then_reenables_the_receive_interrupt() {
        let mut driver = make_driver();
        let _ = driver.send(PEER, &[0x41]);
        assert_eq!(driver.edge_interrupt.disable_count, 1);
        assert_eq!(driver.edge_interrupt.enable_count, 2); // once at new(), once after send
        assert!(driver.edge_interrupt.enabled);
    }

    #[test]
    fn on_rx_edge_forwards_a_complete_valid_frame_and_resets() {
        let mut driver = make_driver();
        let frame = netif::assemble_frame(PEER, LOCAL, &[0xCA, 0xFE], driver.config.mtu).unwrap();
        let edges = build_manchester_edges(400, driver.config.num_sync_symbols, &frame);
        for &t in &edges {
            driver.on_rx_edge(t);
        }
        assert_eq!(driver.sink.last.borrow().as_deref(), Some(&[0xCA, 0xFE][..]));
        assert!(!driver.receiver.is_done());
    }

    #[test]
    fn read_sync_reports_incomplete_on_inactivity_timeout() {
        let mut driver = make_driver();
        let meta = driver.read_sync();
        assert_eq!(meta.state, ReceiveState::Incomplete);
        assert!(driver.sink.last.borrow().is_none());
    }
}
