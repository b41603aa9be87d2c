//! Logging macros that can be silenced per module.
//!
//! A module opts in by declaring a `ENABLE_LOGS` constant next to its
//! imports:
//!
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//! use crate::{log_debug, log_info};
//!
//! log_info!("Playback finished after {} trips", 12);
//! ```
//!
//! With the flag off the calls compile to nothing; with it on they forward to
//! the `log` facade, so `RUST_LOG` filtering still applies.

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}
