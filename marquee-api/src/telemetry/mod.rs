//! Marquee Telemetry - Structured Logging
//!
//! Installs the `tracing` subscriber shared by the three services.

pub mod tracer;

pub use tracer::{init_tracing, LogFormat, TelemetryConfig};
