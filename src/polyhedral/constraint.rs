//! Admissibility constraints over coordinate groups.
//!
//! A constraint group is a set of coordinate positions of which at most one
//! may be nonzero in any admissible ray. A pair of rays is admissible when
//! the union of their supports meets every group in at most one position,
//! which guarantees that every non-negative combination of the pair is
//! admissible too. Inadmissibility, on the other hand, survives any
//! non-negative combination, so inadmissible rays can be discarded early.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::polyhedral::integer::BigInt;
use crate::polyhedral::mask::ZeroMask;
use crate::polyhedral::ray::RayVec;
use crate::utils::errors::{RayEnumError, Result};

/// A family of "at most one nonzero coordinate" groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintSet {
    /// Each group lists coordinate indices in increasing order.
    groups: Vec<Vec<usize>>,
}

impl ConstraintSet {
    /// The empty constraint set, which admits everything.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add one group. Duplicate indices are collapsed.
    pub fn add_group(&mut self, indices: impl IntoIterator<Item = usize>) {
        let mut group: Vec<usize> = indices.into_iter().collect();
        group.sort_unstable();
        group.dedup();
        self.groups.push(group);
    }

    /// Builder-style [`ConstraintSet::add_group`].
    pub fn with_group(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.add_group(indices);
        self
    }

    /// Add one group per block.
    ///
    /// Coordinates are taken to be laid out in `n_blocks` consecutive blocks
    /// of `block_size` entries; for each block a group is added holding the
    /// positions `offsets` relative to the start of that block. This is the
    /// shape of the per-tetrahedron quadrilateral constraints.
    pub fn add_local(&mut self, block_size: usize, n_blocks: usize, offsets: &[usize]) -> Result<()> {
        check_offsets(block_size, offsets)?;
        for block in 0..n_blocks {
            let base = block * block_size;
            self.add_group(offsets.iter().map(|&o| base + o));
        }
        Ok(())
    }

    /// Add a single group covering `offsets` within every block.
    pub fn add_global(&mut self, block_size: usize, n_blocks: usize, offsets: &[usize]) -> Result<()> {
        check_offsets(block_size, offsets)?;
        self.add_group(
            (0..n_blocks).flat_map(|block| offsets.iter().map(move |&o| block * block_size + o)),
        );
        Ok(())
    }

    /// The groups, each sorted.
    pub fn groups(&self) -> &[Vec<usize>] {
        &self.groups
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True if there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Check that every index lies below `dim`.
    pub fn validate(&self, dim: usize) -> Result<()> {
        for (g, group) in self.groups.iter().enumerate() {
            if let Some(&bad) = group.iter().find(|&&i| i >= dim) {
                return Err(RayEnumError::invalid_input(format!(
                    "constraint group {} refers to coordinate {} but rays have length {}",
                    g, bad, dim
                )));
            }
        }
        Ok(())
    }

    /// Does `v` have at most one nonzero coordinate in every group?
    pub fn admits_ray(&self, v: &RayVec) -> bool {
        self.groups.iter().all(|group| support_in_group(v, group) <= 1)
    }

    /// Does the union of the supports of `u` and `v` meet every group in at
    /// most one coordinate?
    pub fn admits_pair(&self, u: &RayVec, v: &RayVec) -> bool {
        let nonzero = |r: &RayVec, i: usize| r.get(i).map(|c| !c.is_zero()).unwrap_or(false);
        self.groups.iter().all(|group| {
            group
                .iter()
                .filter(|&&i| nonzero(u, i) || nonzero(v, i))
                .take(2)
                .count()
                <= 1
        })
    }

    /// [`ConstraintSet::admits_ray`] given the ray's zero-coordinate mask.
    pub fn admits_zero_mask(&self, zeros: &ZeroMask) -> bool {
        self.groups
            .iter()
            .all(|group| group.iter().filter(|&&i| !zeros.contains(i)).take(2).count() <= 1)
    }

    /// [`ConstraintSet::admits_pair`] given both rays' zero-coordinate masks.
    pub fn admits_zero_masks(&self, x: &ZeroMask, y: &ZeroMask) -> bool {
        self.groups.iter().all(|group| {
            group
                .iter()
                .filter(|&&i| !(x.contains(i) && y.contains(i)))
                .take(2)
                .count()
                <= 1
        })
    }
}

fn check_offsets(block_size: usize, offsets: &[usize]) -> Result<()> {
    match offsets.iter().find(|&&o| o >= block_size) {
        Some(bad) => Err(RayEnumError::invalid_input(format!(
            "offset {} does not fit in a block of size {}",
            bad, block_size
        ))),
        None => Ok(()),
    }
}

impl fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (g, group) in self.groups.iter().enumerate() {
            if g > 0 {
                write!(f, "; ")?;
            }
            let items: Vec<String> = group.iter().map(|i| format!("x{}", i)).collect();
            write!(f, "at most one of {{{}}}", items.join(", "))?;
        }
        Ok(())
    }
}

/// Count the nonzero coordinates of `v` inside `group`.
pub fn support_in_group(v: &RayVec, group: &[usize]) -> usize {
    group
        .iter()
        .filter(|&&i| v.get(i).map(|c: &BigInt| !c.is_zero()).unwrap_or(false))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_admits_everything() {
        let c = ConstraintSet::empty();
        let v = RayVec::from_i64s(&[1, 2, 3]);
        assert!(c.admits_ray(&v));
        assert!(c.admits_pair(&v, &v));
        assert!(c.is_empty());
    }

    #[test]
    fn test_ray_and_pair_rules() {
        let c = ConstraintSet::empty().with_group([0, 1]);
        let a = RayVec::from_i64s(&[1, 0, 5]);
        let b = RayVec::from_i64s(&[0, 2, 5]);
        let both = RayVec::from_i64s(&[1, 1, 0]);
        assert!(c.admits_ray(&a));
        assert!(c.admits_ray(&b));
        assert!(!c.admits_ray(&both));
        assert!(!c.admits_pair(&a, &b));
        assert!(c.admits_pair(&a, &RayVec::from_i64s(&[3, 0, 0])));
    }

    #[test]
    fn test_mask_predicates_agree() {
        let c = ConstraintSet::empty().with_group([0, 1]).with_group([1, 2]);
        let rays = [
            RayVec::from_i64s(&[1, 0, 0]),
            RayVec::from_i64s(&[0, 1, 0]),
            RayVec::from_i64s(&[1, 0, 1]),
            RayVec::from_i64s(&[0, 0, 4]),
        ];
        for u in &rays {
            assert_eq!(c.admits_ray(u), c.admits_zero_mask(&u.zero_mask()));
            for v in &rays {
                assert_eq!(
                    c.admits_pair(u, v),
                    c.admits_zero_masks(&u.zero_mask(), &v.zero_mask())
                );
            }
        }
    }

    #[test]
    fn test_local_and_global_blocks() {
        let mut c = ConstraintSet::empty();
        c.add_local(7, 2, &[4, 5, 6]).unwrap();
        c.add_global(7, 2, &[6]).unwrap();
        assert_eq!(c.groups(), &[vec![4, 5, 6], vec![11, 12, 13], vec![6, 13]]);
        assert!(c.add_local(3, 1, &[3]).is_err());
        assert!(c.validate(14).is_ok());
        assert!(matches!(c.validate(13), Err(RayEnumError::InvalidInput(_))));
    }

    #[test]
    fn test_support_in_group() {
        let v = RayVec::from_i64s(&[1, 0, 2, 3]);
        assert_eq!(support_in_group(&v, &[0, 1, 2]), 2);
    }
}
