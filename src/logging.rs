//! Internal structured logging, forwarding to `log` and/or `defmt` depending
//! on which feature is enabled. Neither is required: with both features off
//! the macros below expand to nothing and are optimised away.

macro_rules! vlc_debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "log")]
        log::debug!($($arg)*);
        #[cfg(feature = "defmt-0-3")]
        defmt::debug!($($arg)*);
    };
}

macro_rules! vlc_warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "log")]
        log::warn!($($arg)*);
        #[cfg(feature = "defmt-0-3")]
        defmt::warn!($($arg)*);
    };
}

macro_rules! vlc_error {
    ($($arg:tt)*) => {
        #[cfg(feature = "log")]
        log::error!($($arg)*);
        #[cfg(feature = "defmt-0-3")]
        defmt::error!($($arg)*);
    };
}

pub(crate) use vlc_debug;
pub(crate) use vlc_error;
pub(crate) use vlc_warn;
