//! Utility modules shared across the crate.
//!
//! This module contains:
//! - Error types
//! - The hyperplane matrix

pub mod errors;
pub mod matrix;

// Re-exports
pub use errors::*;
pub use matrix::{EqMatrix, RowView};
