//! Node execution hooks for graph executors.
//!
//! Re-exports [`hive_graph`] (hook registry, dispatch, and hook-guarded node
//! execution) and [`hive_core`] (tracing setup).

pub use hive_core::{TracingConfig, TracingFormat};
pub use hive_graph::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use hive_core::{TracingConfig, TracingFormat};
    pub use hive_graph::prelude::*;
}
