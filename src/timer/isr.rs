//! `critical_section`-guarded singleton wiring for [`crate::driver::VlcDriver`].
//!
//! Mirrors the driver being owned by a single `static`, shared between the
//! main thread and whatever ISRs the platform wires to the transmitter's
//! timer and the receiver's edge interrupt.

use crate::driver::VlcDriver;
use crate::error::VlcError;
use crate::hal::{Clock, EdgeInterrupt, PeriodicTimer};
use crate::netif::{MacAddress, UpwardSink, VlcConfig};
use core::cell::RefCell;
use critical_section::Mutex;
use embedded_hal::digital::OutputPin;

/// Creates the empty `Mutex<RefCell<Option<VlcDriver<...>>>>` a `static`
/// singleton is declared with. Call once per `static`; populate it with
/// [`global_vlc_driver_setup`].
///
/// ```rust,ignore
/// static VLC_DRIVER: critical_section::Mutex<
///     core::cell::RefCell<Option<VlcDriver<Pin, MyEdgeInterrupt, MyTimer, MyClock, MySink>>>,
/// > = global_vlc_driver_init::<Pin, MyEdgeInterrupt, MyTimer, MyClock, MySink>();
/// ```
pub const fn global_vlc_driver_init<TX, EI, T, C, S>()
-> Mutex<RefCell<Option<VlcDriver<TX, EI, T, C, S>>>>
where
    TX: OutputPin,
    EI: EdgeInterrupt,
    T: PeriodicTimer,
    C: Clock,
    S: UpwardSink,
{
    Mutex::new(RefCell::new(None))
}

/// Constructs a [`VlcDriver`] and stores it in the global singleton.
pub fn global_vlc_driver_setup<TX, EI, T, C, S>(
    global_driver: &'static Mutex<RefCell<Option<VlcDriver<TX, EI, T, C, S>>>>,
    tx: TX,
    edge_interrupt: EI,
    timer: T,
    clock: C,
    sink: S,
    local_address: MacAddress,
    config: VlcConfig,
) where
    TX: OutputPin,
    EI: EdgeInterrupt,
    T: PeriodicTimer,
    C: Clock,
    S: UpwardSink,
{
    critical_section::with(|cs| {
        global_driver.borrow(cs).replace(Some(VlcDriver::new(
            tx,
            edge_interrupt,
            timer,
            clock,
            sink,
            local_address,
            config,
        )));
    });
}

/// Advances transmission by one tick. Call from the transmitter's timer
/// interrupt handler.
pub fn global_vlc_tx_tick<TX, EI, T, C, S>(
    global_driver: &'static Mutex<RefCell<Option<VlcDriver<TX, EI, T, C, S>>>>,
) where
    TX: OutputPin,
    EI: EdgeInterrupt,
    T: PeriodicTimer,
    C: Clock,
    S: UpwardSink,
{
    critical_section::with(|cs| {
        if let Some(driver) = global_driver.borrow(cs).borrow_mut().as_mut() {
            driver.on_tx_tick();
        }
    });
}

/// Advances reception by one GPIO edge. Call from the receive pin's
/// both-edges interrupt handler, with the current monotonic timestamp.
pub fn global_vlc_rx_edge<TX, EI, T, C, S>(
    global_driver: &'static Mutex<RefCell<Option<VlcDriver<TX, EI, T, C, S>>>>,
    now_us: u32,
) where
    TX: OutputPin,
    EI: EdgeInterrupt,
    T: PeriodicTimer,
    C: Clock,
    S: UpwardSink,
{
    critical_section::with(|cs| {
        if let Some(driver) = global_driver.borrow(cs).borrow_mut().as_mut() {
            driver.on_rx_edge(now_us);
        }
    });
}

/// Sends `payload` to `dst` through the global driver. Returns
/// [`VlcError::Transient`] if the driver has not been set up yet.
pub fn global_vlc_send<TX, EI, T, C, S>(
    global_driver: &'static Mutex<RefCell<Option<VlcDriver<TX, EI, T, C, S>>>>,
    dst: MacAddress,
    payload: &[u8],
) -> Result<usize, VlcError>
where
    TX: OutputPin,
    EI: EdgeInterrupt,
    T: PeriodicTimer,
    C: Clock,
    S: UpwardSink,
{
    critical_section::with(|cs| {
        let mut guard = global_driver.borrow(cs).borrow_mut();
        match guard.as_mut() {
            Some(driver) => driver.send(dst, payload),
            None => Err(VlcError::Transient),
        }
    })
}
