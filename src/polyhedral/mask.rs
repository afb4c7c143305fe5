//! Fixed-width bitsets over coordinate positions.
//!
//! During enumeration every working ray carries the set of coordinates at
//! which it vanishes. Adjacency of two rays is then a pure set question:
//! does any third ray vanish everywhere both of them vanish?

use smallvec::SmallVec;
use std::fmt;

const WORD_BITS: usize = 64;

/// A set of coordinate indices `0..len`, stored one bit per coordinate.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ZeroMask {
    words: SmallVec<[u64; 4]>,
    len: usize,
}

impl ZeroMask {
    /// An empty set over `len` coordinates.
    pub fn new(len: usize) -> Self {
        let n_words = len.div_ceil(WORD_BITS);
        Self {
            words: SmallVec::from_elem(0, n_words),
            len,
        }
    }

    /// The set of all `len` coordinates.
    pub fn full(len: usize) -> Self {
        let mut mask = Self::new(len);
        for word in mask.words.iter_mut() {
            *word = u64::MAX;
        }
        mask.clear_tail();
        mask
    }

    fn clear_tail(&mut self) {
        let rem = self.len % WORD_BITS;
        if rem != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << rem) - 1;
            }
        }
    }

    /// Number of coordinates the set ranges over.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if no coordinate is in the set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Add coordinate `i`. Indices outside the domain are ignored.
    #[inline]
    pub fn insert(&mut self, i: usize) {
        if i < self.len {
            self.words[i / WORD_BITS] |= 1u64 << (i % WORD_BITS);
        }
    }

    /// Remove coordinate `i`.
    #[inline]
    pub fn remove(&mut self, i: usize) {
        if i < self.len {
            self.words[i / WORD_BITS] &= !(1u64 << (i % WORD_BITS));
        }
    }

    /// Is coordinate `i` in the set?
    #[inline]
    pub fn contains(&self, i: usize) -> bool {
        i < self.len && self.words[i / WORD_BITS] & (1u64 << (i % WORD_BITS)) != 0
    }

    /// Number of coordinates in the set.
    pub fn cardinality(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Intersect with `other` in place.
    pub fn intersection_inplace(&mut self, other: &ZeroMask) {
        debug_assert_eq!(self.len, other.len, "mask domain mismatch");
        for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
            *a &= *b;
        }
    }

    /// The intersection of `self` and `other`.
    pub fn intersection(&self, other: &ZeroMask) -> ZeroMask {
        let mut out = self.clone();
        out.intersection_inplace(other);
        out
    }

    /// Is every element of `self` also in `other`?
    pub fn subset_of(&self, other: &ZeroMask) -> bool {
        debug_assert_eq!(self.len, other.len, "mask domain mismatch");
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(a, b)| a & !b == 0)
    }

    /// Does `self` contain every element common to both `x` and `y`?
    ///
    /// Equivalent to `x.intersection(y).subset_of(self)` without allocating.
    #[inline]
    pub fn contains_intersection(&self, x: &ZeroMask, y: &ZeroMask) -> bool {
        debug_assert_eq!(self.len, x.len, "mask domain mismatch");
        debug_assert_eq!(self.len, y.len, "mask domain mismatch");
        self.words
            .iter()
            .zip(x.words.iter().zip(y.words.iter()))
            .all(|(s, (a, b))| a & b & !s == 0)
    }

    /// Iterate over the coordinates in the set, in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(w, &word)| {
            let mut bits = word;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let tz = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some(w * WORD_BITS + tz)
            })
        })
    }
}

impl fmt::Debug for ZeroMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(len: usize, items: &[usize]) -> ZeroMask {
        let mut m = ZeroMask::new(len);
        for &i in items {
            m.insert(i);
        }
        m
    }

    #[test]
    fn test_insert_remove_contains() {
        let mut m = mask(130, &[0, 64, 129]);
        assert!(m.contains(64));
        assert!(!m.contains(63));
        assert_eq!(m.cardinality(), 3);
        m.remove(64);
        assert_eq!(m.iter().collect::<Vec<_>>(), vec![0, 129]);
        m.insert(500);
        assert_eq!(m.cardinality(), 2);
    }

    #[test]
    fn test_full_respects_domain() {
        let m = ZeroMask::full(70);
        assert_eq!(m.cardinality(), 70);
        assert!(!m.contains(70));
        assert!(ZeroMask::new(70).is_empty());
    }

    #[test]
    fn test_subset_and_common_containment() {
        let x = mask(8, &[1, 2, 3]);
        let y = mask(8, &[2, 3, 4]);
        let witness = mask(8, &[2, 3, 7]);
        let other = mask(8, &[2, 7]);
        assert!(witness.contains_intersection(&x, &y));
        assert!(!other.contains_intersection(&x, &y));
        assert!(x.intersection(&y).subset_of(&witness));
        assert!(!x.subset_of(&y));
    }
}
