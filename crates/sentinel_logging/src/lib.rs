#![deny(missing_docs)]
//! Shared logging utilities for the sentinel workspace.
//!
//! This crate provides the `sentinel_*` logging macros used by the engine and
//! the app, plus a minimal test initializer for the global logger. All macros
//! route through the `log` facade so the binary decides where output goes.

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! sentinel_trace {
    ($($arg:tt)*) => {{
        log::trace!(target: "sentinel", $($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! sentinel_debug {
    ($($arg:tt)*) => {{
        log::debug!(target: "sentinel", $($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! sentinel_info {
    ($($arg:tt)*) => {{
        log::info!(target: "sentinel", $($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! sentinel_warn {
    ($($arg:tt)*) => {{
        log::warn!(target: "sentinel", $($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! sentinel_error {
    ($($arg:tt)*) => {{
        log::error!(target: "sentinel", $($arg)*);
    }};
}

/// Level used by [`initialize_for_tests`]: debug in debug builds, info otherwise.
pub fn test_level() -> log::LevelFilter {
    if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized, so every
/// test can call it unconditionally.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let _ = CombinedLogger::init(vec![TermLogger::new(
        test_level(),
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Never,
    )]);
}
