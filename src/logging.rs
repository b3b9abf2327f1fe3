//! Process-wide logging level.
//!
//! A single atomic word carries the level; the arithmetic core reads it
//! before emitting `log` records on its failure paths. Initialised to
//! [`LogLevel::None`] at first use.

use std::sync::atomic::{AtomicU8, Ordering};

/// The enumerated logging level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    None = 0,
    Debug = 1,
    Warning = 2,
    Error = 3,
}

static LOG_LEVEL: AtomicU8 = AtomicU8::new(0);

/// Sets the process-wide level.
pub fn set_log_level(level: LogLevel) {
    LOG_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Reads the process-wide level.
pub fn log_level() -> LogLevel {
    match LOG_LEVEL.load(Ordering::Relaxed) {
        1 => LogLevel::Debug,
        2 => LogLevel::Warning,
        3 => LogLevel::Error,
        _ => LogLevel::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_round_trips() {
        assert_eq!(log_level(), LogLevel::None);
        set_log_level(LogLevel::Warning);
        assert_eq!(log_level(), LogLevel::Warning);
        set_log_level(LogLevel::None);
    }
}
