//! Timing abstractions that stand in for the platform's monotonic clock and
//! the hardware timer behind the transmitter's periodic tick.
//!
//! Neither trait touches a GPIO pin directly: the transmitter still drives
//! its output through `embedded_hal::digital::OutputPin`, but the *timing*
//! source is abstracted here so the state machines can be driven from unit
//! tests with synthetic timestamps instead of real hardware.

use crate::error::VlcError;

/// A monotonic microsecond time source.
///
/// Production code wraps a hardware counter; tests wrap a plain counter the
/// test can advance by hand.
pub trait Clock {
    /// Returns the current time in microseconds. Wraps on overflow; callers
    /// compute elapsed time with wrapping subtraction.
    fn now_us(&self) -> u32;
}

/// A periodic, one-shot-reset hardware timer driving the transmitter's tick.
///
/// The timer has no callback parameter: whatever calls
/// [`PeriodicTimer::start_periodic_us`] is expected to wire
/// the platform's timer interrupt to call
/// [`crate::transmitter::ManchesterTransmitter::on_tick`] independently
/// (directly, or through the `timer` module's critical-section helpers).
pub trait PeriodicTimer {
    /// Starts (or restarts) the timer so that it fires every `period_us`
    /// microseconds. Returns [`VlcError::Transient`] on configuration
    /// failure (e.g. the requested period cannot be represented).
    fn start_periodic_us(&mut self, period_us: u32) -> Result<(), VlcError>;

    /// Stops the timer. Safe to call even if it was never started.
    fn stop(&mut self);
}

/// Controls the both-edges GPIO interrupt behind the receiver's input pin.
///
/// The receiver never reads the pin directly through `embedded_hal`'s
/// `InputPin`: on real hardware the edge itself is what wakes the ISR, so
/// the only thing the driver needs to control is whether that interrupt
/// source is currently live. Synchronous mode disables it between frames;
/// [`crate::receiver::ManchesterReceiver::on_edge`] is invoked by whatever
/// platform glue wires this interrupt to the receiver.
pub trait EdgeInterrupt {
    /// Enables the both-edges interrupt on the receive pin.
    fn enable(&mut self);

    /// Disables the both-edges interrupt on the receive pin.
    fn disable(&mut self);
}
