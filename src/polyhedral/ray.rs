//! Integer rays through the origin.
//!
//! A [`RayVec`] is a fixed-length dense vector of [`BigInt`] standing for
//! the half-line `{t·v : t ≥ 0}`. Positive multiples describe the same ray;
//! [`RayVec::normalise`] picks the primitive representative.
//!
//! Infinite coordinates are inert: scaling and normalisation leave them
//! alone, and they absorb anything added to them.

use num_bigint::BigInt as Mpz;
use num_integer::Integer;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::polyhedral::integer::BigInt;
use crate::polyhedral::mask::ZeroMask;
use crate::utils::errors::{RayEnumError, Result};

/// Read-only access to a sequence of integer coordinates.
///
/// Implemented by owning rays and by borrowed matrix rows, so that dot
/// products can mix the two without copying.
pub trait VectorView {
    /// The coordinates as a slice.
    fn coords(&self) -> &[BigInt];

    /// Number of coordinates.
    fn dim(&self) -> usize {
        self.coords().len()
    }

    /// Bounds-checked coordinate access.
    fn entry(&self, i: usize) -> Result<&BigInt> {
        let coords = self.coords();
        coords
            .get(i)
            .ok_or(RayEnumError::IndexOutOfBounds { index: i, len: coords.len() })
    }

    /// Dot product with another view of the same length.
    fn dot<V: VectorView + ?Sized>(&self, other: &V) -> Result<BigInt> {
        dot_slices(self.coords(), other.coords())
    }
}

/// Sum of elementwise products.
///
/// A term with a zero factor contributes nothing even if the other factor
/// is infinite; any other term involving infinity makes the result infinite.
pub fn dot_slices(a: &[BigInt], b: &[BigInt]) -> Result<BigInt> {
    RayEnumError::check_dimension(a.len(), b.len())?;
    let mut acc = Mpz::zero();
    for (x, y) in a.iter().zip(b.iter()) {
        if x.is_zero() || y.is_zero() {
            continue;
        }
        match (x.as_finite(), y.as_finite()) {
            (Some(x), Some(y)) => acc += x * y,
            _ => return Ok(BigInt::infinity()),
        }
    }
    Ok(BigInt::from(acc))
}

impl VectorView for [BigInt] {
    fn coords(&self) -> &[BigInt] {
        self
    }
}

/// A ray through the origin with integer coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RayVec {
    coords: Vec<BigInt>,
}

impl RayVec {
    /// The zero vector of length `n`.
    pub fn zeros(n: usize) -> Self {
        Self {
            coords: vec![BigInt::zero(); n],
        }
    }

    /// The non-negative axis ray along coordinate `axis`.
    pub fn unit(n: usize, axis: usize) -> Result<Self> {
        RayEnumError::check_index(axis, n)?;
        let mut ray = Self::zeros(n);
        ray.coords[axis] = BigInt::one();
        Ok(ray)
    }

    /// Wrap the given coordinates.
    pub fn from_coords(coords: Vec<BigInt>) -> Self {
        Self { coords }
    }

    /// Build a ray from native integers.
    pub fn from_i64s(values: &[i64]) -> Self {
        Self {
            coords: values.iter().copied().map(BigInt::from).collect(),
        }
    }

    /// Number of coordinates.
    #[inline]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// True for the length-zero vector.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Coordinate `i`.
    pub fn get(&self, i: usize) -> Result<&BigInt> {
        self.entry(i)
    }

    /// Overwrite coordinate `i`.
    pub fn set(&mut self, i: usize, value: BigInt) -> Result<()> {
        RayEnumError::check_index(i, self.coords.len())?;
        self.coords[i] = value;
        Ok(())
    }

    /// Iterate over the coordinates.
    pub fn iter(&self) -> std::slice::Iter<'_, BigInt> {
        self.coords.iter()
    }

    /// Consume the ray, returning its coordinates.
    pub fn into_coords(self) -> Vec<BigInt> {
        self.coords
    }

    /// Elementwise `self += other`.
    pub fn add_assign(&mut self, other: &RayVec) -> Result<()> {
        RayEnumError::check_dimension(self.len(), other.len())?;
        for (a, b) in self.coords.iter_mut().zip(other.coords.iter()) {
            *a += b;
        }
        Ok(())
    }

    /// Elementwise `self -= other`.
    pub fn sub_assign(&mut self, other: &RayVec) -> Result<()> {
        RayEnumError::check_dimension(self.len(), other.len())?;
        for (a, b) in self.coords.iter_mut().zip(other.coords.iter()) {
            *a -= b;
        }
        Ok(())
    }

    /// Multiply every finite coordinate by `k`.
    pub fn scale_assign(&mut self, k: &BigInt) {
        for c in self.coords.iter_mut().filter(|c| !c.is_infinite()) {
            *c *= k;
        }
    }

    /// `self += k * other`.
    ///
    /// Infinite coordinates of `other` are carried over as infinity (unless
    /// `k` is zero, in which case nothing changes).
    pub fn add_scaled(&mut self, other: &RayVec, k: &BigInt) -> Result<()> {
        RayEnumError::check_dimension(self.len(), other.len())?;
        if k.is_zero() {
            return Ok(());
        }
        for (a, b) in self.coords.iter_mut().zip(other.coords.iter()) {
            if b.is_zero() || a.is_infinite() {
                continue;
            }
            if b.is_infinite() {
                *a = BigInt::infinity();
            } else {
                *a += &(b * k);
            }
        }
        Ok(())
    }

    /// `self -= k * other`.
    pub fn sub_scaled(&mut self, other: &RayVec, k: &BigInt) -> Result<()> {
        self.add_scaled(other, &-k)
    }

    /// Negate every finite coordinate.
    pub fn negate(&mut self) {
        for c in self.coords.iter_mut() {
            c.negate();
        }
    }

    /// Dot product with any coordinate view of the same length.
    pub fn dot<V: VectorView + ?Sized>(&self, other: &V) -> Result<BigInt> {
        dot_slices(&self.coords, other.coords())
    }

    /// True if every coordinate is zero.
    pub fn is_zero(&self) -> bool {
        self.coords.iter().all(BigInt::is_zero)
    }

    /// True if no coordinate is negative. Infinity counts as non-negative.
    pub fn is_non_negative(&self) -> bool {
        !self.coords.iter().any(BigInt::is_negative)
    }

    /// The set of coordinates that are exactly zero.
    pub fn zero_mask(&self) -> ZeroMask {
        let mut mask = ZeroMask::new(self.len());
        for (i, c) in self.coords.iter().enumerate() {
            if c.is_zero() {
                mask.insert(i);
            }
        }
        mask
    }

    /// The gcd of the finite coordinates (zero if they are all zero).
    pub fn content(&self) -> BigInt {
        BigInt::from(self.finite_gcd())
    }

    fn finite_gcd(&self) -> Mpz {
        let mut gcd = Mpz::zero();
        for v in self.coords.iter().filter_map(BigInt::as_finite) {
            if v.is_zero() {
                continue;
            }
            gcd = gcd.gcd(v);
            if gcd.is_one() {
                break;
            }
        }
        gcd
    }

    /// True if the finite coordinates have gcd 1.
    pub fn is_primitive(&self) -> bool {
        self.finite_gcd().is_one()
    }

    /// Divide every finite coordinate by their common gcd.
    ///
    /// Signs are preserved. A no-op when the finite part is zero or already
    /// primitive.
    pub fn normalise(&mut self) {
        let gcd = self.finite_gcd();
        if gcd.is_zero() || gcd.is_one() {
            return;
        }
        for c in self.coords.iter_mut() {
            if let Some(v) = c.as_finite_mut() {
                *v /= &gcd;
            }
        }
    }

    /// The primitive representative of this ray.
    pub fn normalised(mut self) -> Self {
        self.normalise();
        self
    }
}

impl VectorView for RayVec {
    fn coords(&self) -> &[BigInt] {
        &self.coords
    }
}

impl From<Vec<BigInt>> for RayVec {
    fn from(coords: Vec<BigInt>) -> Self {
        Self::from_coords(coords)
    }
}

impl FromIterator<BigInt> for RayVec {
    fn from_iter<I: IntoIterator<Item = BigInt>>(iter: I) -> Self {
        Self {
            coords: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for RayVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_keeps_signs() {
        let mut v = RayVec::from_i64s(&[6, -9, 0, 15]);
        v.normalise();
        assert_eq!(v, RayVec::from_i64s(&[2, -3, 0, 5]));
        assert!(v.is_primitive());

        let mut z = RayVec::zeros(3);
        z.normalise();
        assert!(z.is_zero());
    }

    #[test]
    fn test_normalise_skips_infinity() {
        let mut v = RayVec::from_coords(vec![
            BigInt::from(4),
            BigInt::infinity(),
            BigInt::from(8),
        ]);
        v.normalise();
        assert_eq!(v.get(0).unwrap(), &BigInt::from(1));
        assert!(v.get(1).unwrap().is_infinite());
        assert_eq!(v.get(2).unwrap(), &BigInt::from(2));
    }

    #[test]
    fn test_linear_combinations() {
        let mut a = RayVec::from_i64s(&[1, 2, 3]);
        let b = RayVec::from_i64s(&[1, 0, -1]);
        a.add_scaled(&b, &BigInt::from(2)).unwrap();
        assert_eq!(a, RayVec::from_i64s(&[3, 2, 1]));
        a.sub_scaled(&b, &BigInt::from(3)).unwrap();
        assert_eq!(a, RayVec::from_i64s(&[0, 2, 4]));
        a.sub_assign(&b).unwrap();
        assert_eq!(a, RayVec::from_i64s(&[-1, 2, 5]));
        a.add_assign(&b).unwrap();
        a.negate();
        assert_eq!(a, RayVec::from_i64s(&[0, -2, -4]));
        a.scale_assign(&BigInt::from(-2));
        assert_eq!(a, RayVec::from_i64s(&[0, 4, 8]));
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut a = RayVec::zeros(2);
        let b = RayVec::zeros(3);
        assert_eq!(
            a.add_assign(&b),
            Err(RayEnumError::DimensionMismatch { expected: 2, found: 3 })
        );
        assert!(a.dot(&b).is_err());
        assert!(matches!(a.get(2), Err(RayEnumError::IndexOutOfBounds { .. })));
        assert!(a.set(5, BigInt::one()).is_err());
        assert!(RayVec::unit(2, 2).is_err());
    }

    #[test]
    fn test_infinite_coordinates_are_inert() {
        let mut v = RayVec::from_coords(vec![BigInt::infinity(), BigInt::from(3)]);
        v.scale_assign(&BigInt::from(5));
        assert!(v.get(0).unwrap().is_infinite());
        assert_eq!(v.get(1).unwrap(), &BigInt::from(15));

        let w = RayVec::from_i64s(&[7, 1]);
        v.add_scaled(&w, &BigInt::from(2)).unwrap();
        assert!(v.get(0).unwrap().is_infinite());
        assert_eq!(v.get(1).unwrap(), &BigInt::from(17));

        let mut u = RayVec::from_i64s(&[1, 1]);
        u.add_scaled(&v, &BigInt::one()).unwrap();
        assert!(u.get(0).unwrap().is_infinite());
    }

    #[test]
    fn test_dot_with_infinity() {
        let v = RayVec::from_coords(vec![BigInt::infinity(), BigInt::from(2)]);
        let h0 = RayVec::from_i64s(&[0, 3]);
        let h1 = RayVec::from_i64s(&[1, 3]);
        assert_eq!(v.dot(&h0).unwrap(), BigInt::from(6));
        assert!(v.dot(&h1).unwrap().is_infinite());
    }

    #[test]
    fn test_zero_mask_and_display() {
        let v = RayVec::from_i64s(&[0, 5, 0]);
        assert_eq!(v.zero_mask().iter().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(v.to_string(), "(0, 5, 0)");
        assert!(v.is_non_negative());
        assert!(!RayVec::from_i64s(&[1, -1]).is_non_negative());
    }
}
