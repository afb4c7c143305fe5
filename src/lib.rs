//! # RayEnum - Extremal Rays of Orthant Sections
//!
//! Enumerates the extremal rays of the polyhedral cone
//! `{x ∈ ℝⁿ : x ≥ 0, M·x = 0}` by the double description method, with an
//! optional restriction to rays satisfying a set of admissibility
//! constraints.
//!
//! ## Architecture
//!
//! ```text
//! EqMatrix + ConstraintSet + generators → Enumerator → RaySink
//!                                          │
//!                                          ├─ RayVec / BigInt arithmetic
//!                                          ├─ ZeroMask adjacency test
//!                                          └─ RayRegistry de-duplication
//! ```
//!
//! ## Example
//!
//! ```rust
//! use rayenum::prelude::*;
//!
//! // x0 + x1 = 2·x2 inside the positive orthant of ℝ³
//! let matrix = EqMatrix::from_rows(3, &[vec![1, 1, -2]])?;
//! let rays = rayenum::enumerate_extremal_rays(
//!     &matrix,
//!     &ConstraintSet::empty(),
//!     EnumerationConfig::default(),
//! )?;
//! assert_eq!(rays, vec![RayVec::from_i64s(&[2, 0, 1]), RayVec::from_i64s(&[0, 2, 1])]);
//! # Ok::<(), rayenum::RayEnumError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod enumerate;
pub mod polyhedral;
pub mod utils;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::enumerate::{
        CancelHandle, EnumerationConfig, EnumerationStats, Enumerator, EnumeratorState, FnSink,
        HyperplaneOrder, RayRegistry, RaySink,
    };
    pub use crate::polyhedral::{BigInt, ConstraintSet, RayVec, Sign, VectorView, ZeroMask};
    pub use crate::utils::errors::*;
    pub use crate::utils::matrix::{EqMatrix, RowView};
}

pub use utils::errors::{ParseError, ParseErrorKind, RayEnumError, Result};

use enumerate::{EnumerationConfig, Enumerator};
use polyhedral::{ConstraintSet, RayVec};
use utils::matrix::EqMatrix;

/// Enumerate the extremal rays of `{x ≥ 0 : matrix·x = 0}`, starting from
/// the axes of the orthant.
///
/// Each ray is primitive and appears once.
pub fn enumerate_extremal_rays(
    matrix: &EqMatrix,
    constraints: &ConstraintSet,
    config: EnumerationConfig,
) -> Result<Vec<RayVec>> {
    Enumerator::for_orthant(matrix, constraints)
        .with_config(config)
        .run_to_vec()
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
