//! crates/logging/src/tracing_macros.rs
//! Shorthand for emitting `tracing` events on the channel targets.
//!
//! The events only reach a channel when a [`ChannelLayer`](crate::ChannelLayer)
//! is installed.

/// Emit an event on the general channel.
///
/// # Example
/// ```ignore
/// log_general!(INFO, "Goin' Fast @ {}", url);
/// log_general!(DEBUG, verbosity = 2, "SEND HEADERS");
/// ```
#[macro_export]
macro_rules! log_general {
    ($lvl:ident, $($arg:tt)*) => {
        ::tracing::event!(target: "sanic::root", ::tracing::Level::$lvl, $($arg)*)
    };
}

/// Emit an event on the error channel.
///
/// # Example
/// ```ignore
/// log_error!(ERROR, "Exception occurred while handling uri: {}", uri);
/// ```
#[macro_export]
macro_rules! log_error {
    ($lvl:ident, $($arg:tt)*) => {
        ::tracing::event!(target: "sanic::error", ::tracing::Level::$lvl, $($arg)*)
    };
}

/// Emit an event on the access channel.
///
/// The access layout expects `host`, `request`, `status` and `byte` fields.
///
/// # Example
/// ```ignore
/// log_access!(INFO, host = "127.0.0.1", request = "GET /", status = 200u16, byte = 13u64, "");
/// ```
#[macro_export]
macro_rules! log_access {
    ($lvl:ident, $($arg:tt)*) => {
        ::tracing::event!(target: "sanic::access", ::tracing::Level::$lvl, $($arg)*)
    };
}
