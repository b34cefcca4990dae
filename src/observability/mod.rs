//! Observability for the PluralKit client.
//!
//! The client emits `tracing` events and spans; this module only installs
//! a subscriber for applications that do not bring their own.

mod logging;

pub use logging::{LogFormat, LogLevel, LoggingConfig};
