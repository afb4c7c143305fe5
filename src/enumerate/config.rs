//! Enumeration configuration

use serde::{Deserialize, Serialize};

use crate::utils::matrix::EqMatrix;

/// Order in which hyperplanes are intersected with the cone.
///
/// The set of rays produced does not depend on the order; only the size of
/// the intermediate working sets does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HyperplaneOrder {
    /// Rows in the order they appear in the matrix
    #[default]
    AsGiven,
    /// Rows sorted by zero pattern, rows vanishing on earlier coordinates first
    ZeroPattern,
}

impl HyperplaneOrder {
    /// The row indices of `matrix` in processing order.
    pub fn arrange(self, matrix: &EqMatrix) -> Vec<usize> {
        match self {
            HyperplaneOrder::AsGiven => (0..matrix.rows()).collect(),
            HyperplaneOrder::ZeroPattern => matrix.zero_pattern_order(),
        }
    }
}

/// Configuration for an enumeration run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumerationConfig {
    /// Only produce rays satisfying the constraint set
    pub admissible_only: bool,

    /// Hyperplane processing order
    pub order: HyperplaneOrder,

    /// Candidate pairs examined between cancellation checks
    pub cancel_poll_interval: usize,
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        Self {
            admissible_only: false,
            order: HyperplaneOrder::AsGiven,
            cancel_poll_interval: 1024,
        }
    }
}

impl EnumerationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset restricting output to admissible rays
    pub fn admissible() -> Self {
        Self {
            admissible_only: true,
            ..Default::default()
        }
    }

    /// Enable/disable admissibility filtering
    pub fn admissible_only(mut self, flag: bool) -> Self {
        self.admissible_only = flag;
        self
    }

    /// Set hyperplane order
    pub fn order(mut self, order: HyperplaneOrder) -> Self {
        self.order = order;
        self
    }

    /// Set how many pairs are examined between cancellation checks
    pub fn cancel_poll_interval(mut self, pairs: usize) -> Self {
        self.cancel_poll_interval = pairs.max(1);
        self
    }
}
