//! Numeric and combinatorial building blocks for cone enumeration.
//!
//! This module provides the data the enumeration kernel works on:
//! - Arbitrary-precision integers with an infinity
//! - Integer rays and read-only coordinate views
//! - Zero-coordinate bitmasks
//! - Admissibility constraint groups

pub mod integer;
pub mod ray;
pub mod mask;
pub mod constraint;

pub use integer::{BigInt, Sign};
pub use ray::{dot_slices, RayVec, VectorView};
pub use mask::ZeroMask;
pub use constraint::ConstraintSet;
