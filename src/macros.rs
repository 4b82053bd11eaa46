//! Logging shims.
//!
//! Each `log_*` macro forwards to `log` when the `log` feature is enabled and to
//! `defmt` when `defmt-0-3` is enabled. With neither feature they expand to
//! nothing, so only pass arguments that are used elsewhere as well.
//!
//! Format strings must stick to plain `{}` placeholders, the common subset of
//! both backends.

macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "log")]
        ::log::info!($($arg)*);
        #[cfg(feature = "defmt-0-3")]
        ::defmt::info!($($arg)*);
    }};
}

macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "log")]
        ::log::debug!($($arg)*);
        #[cfg(feature = "defmt-0-3")]
        ::defmt::debug!($($arg)*);
    }};
}

macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "log")]
        ::log::warn!($($arg)*);
        #[cfg(feature = "defmt-0-3")]
        ::defmt::warn!($($arg)*);
    }};
}

pub(crate) use log_debug;
pub(crate) use log_info;
pub(crate) use log_warn;
