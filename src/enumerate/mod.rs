//! Extremal ray enumeration by double description.
//!
//! This module contains:
//! - The [`Enumerator`] driver and its statistics
//! - The [`RayRegistry`] used to suppress duplicate rays
//! - Output sinks, cancellation and configuration

pub mod cancel;
pub mod config;
pub mod engine;
pub mod registry;
pub mod sink;

// Re-exports
pub use cancel::CancelHandle;
pub use config::{EnumerationConfig, HyperplaneOrder};
pub use engine::{line_intersection, EnumerationStats, Enumerator, EnumeratorState};
pub use registry::RayRegistry;
pub use sink::{FnSink, RaySink};
