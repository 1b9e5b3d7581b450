/// Declares a `static` singleton holding a [`crate::driver::VlcDriver`]
/// behind a `critical_section` mutex.
///
/// # Arguments
/// - `$name`: identifier for the static
/// - `$tx`, `$ei`, `$timer`, `$clock`, `$sink`: concrete types for the
///   driver's five type parameters (see [`crate::driver::VlcDriver`])
///
/// ```rust,ignore
/// declare_vlc_driver!(VLC_DRIVER, MyTxPin, MyEdgeInterrupt, MyTimer, MyClock, MySink);
/// ```
#[macro_export]
macro_rules! declare_vlc_driver {
    ($name:ident, $tx:ty, $ei:ty, $timer:ty, $clock:ty, $sink:ty) => {
        static $name: $crate::critical_section::Mutex<
            core::cell::RefCell<
                Option<$crate::driver::VlcDriver<$tx, $ei, $timer, $clock, $sink>>,
            >,
        > = $crate::timer::global_vlc_driver_init::<$tx, $ei, $timer, $clock, $sink>();
    };
}

/// Initializes a singleton declared with [`declare_vlc_driver!`].
///
/// ```rust,ignore
/// setup_vlc_driver!(VLC_DRIVER, tx, edge_interrupt, timer, clock, sink, local_address, config);
/// ```
#[macro_export]
macro_rules! setup_vlc_driver {
    ($name:ident, $tx:expr, $ei:expr, $timer:expr, $clock:expr, $sink:expr, $addr:expr, $config:expr) => {
        $crate::timer::global_vlc_driver_setup(&$name, $tx, $ei, $timer, $clock, $sink, $addr, $config)
    };
}

/// Advances transmission on a singleton declared with
/// [`declare_vlc_driver!`]. Call from the transmitter's timer ISR.
#[macro_export]
macro_rules! tick_vlc_tx_timer {
    ($name:ident) => {
        $crate::timer::global_vlc_tx_tick(&$name)
    };
}

/// Advances reception on a singleton declared with [`declare_vlc_driver!`],
/// given the current monotonic timestamp. Call from the receive pin's
/// both-edges GPIO ISR.
#[macro_export]
macro_rules! vlc_rx_edge {
    ($name:ident, $now_us:expr) => {
        $crate::timer::global_vlc_rx_edge(&$name, $now_us)
    };
}

/// Sends a message through a singleton declared with
/// [`declare_vlc_driver!`].
#[macro_export]
macro_rules! send_vlc {
    ($name:ident, $dst:expr, $payload:expr) => {
        $crate::timer::global_vlc_send(&$name, $dst, $payload)
    };
}
