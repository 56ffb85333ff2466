//! Core infrastructure shared by hive binaries and tests.
//!
//! # Modules
//!
//! - [`tracing_setup`] - Configures and installs the `tracing` subscriber

pub mod tracing_setup;

pub use tracing_setup::{TracingConfig, TracingFormat, TracingInitError};
