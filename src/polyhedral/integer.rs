//! Arbitrary-precision integers with a distinguished infinity.
//!
//! [`BigInt`] wraps a `num_bigint::BigInt` and adds a single extra value,
//! *infinity*, which is larger than every finite value, equal to itself,
//! its own negation, and absorbing under addition, subtraction and
//! multiplication. Operations that need a finite value (gcd, exact
//! division) report [`RayEnumError::InvalidOperation`] instead.

use num_bigint::BigInt as Mpz;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hasher;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use crate::utils::errors::{ParseError, ParseErrorKind, RayEnumError, Result};

/// Sign of an integer. Infinity is positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sign {
    /// Strictly less than zero
    Negative,
    /// Exactly zero
    Zero,
    /// Strictly greater than zero, or infinite
    Positive,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Repr {
    Finite(Mpz),
    Infinite,
}

/// A signed arbitrary-precision integer, or infinity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigInt {
    repr: Repr,
}

impl BigInt {
    /// Zero.
    pub fn zero() -> Self {
        Self { repr: Repr::Finite(Mpz::zero()) }
    }

    /// One.
    pub fn one() -> Self {
        Self { repr: Repr::Finite(Mpz::one()) }
    }

    /// The infinite value.
    pub fn infinity() -> Self {
        Self { repr: Repr::Infinite }
    }

    /// Is this the infinite value?
    #[inline]
    pub fn is_infinite(&self) -> bool {
        matches!(self.repr, Repr::Infinite)
    }

    /// Is this finite and equal to zero?
    #[inline]
    pub fn is_zero(&self) -> bool {
        match &self.repr {
            Repr::Finite(v) => v.is_zero(),
            Repr::Infinite => false,
        }
    }

    /// Is this finite and equal to one?
    pub fn is_one(&self) -> bool {
        match &self.repr {
            Repr::Finite(v) => v.is_one(),
            Repr::Infinite => false,
        }
    }

    /// Sign of the value; infinity counts as positive.
    #[inline]
    pub fn sign(&self) -> Sign {
        match &self.repr {
            Repr::Infinite => Sign::Positive,
            Repr::Finite(v) if v.is_zero() => Sign::Zero,
            Repr::Finite(v) if v.is_negative() => Sign::Negative,
            Repr::Finite(_) => Sign::Positive,
        }
    }

    /// Strictly greater than zero (infinity included).
    pub fn is_positive(&self) -> bool {
        self.sign() == Sign::Positive
    }

    /// Strictly less than zero.
    pub fn is_negative(&self) -> bool {
        self.sign() == Sign::Negative
    }

    /// Absolute value; infinity stays infinite.
    pub fn abs(&self) -> Self {
        match &self.repr {
            Repr::Finite(v) => Self { repr: Repr::Finite(v.abs()) },
            Repr::Infinite => Self::infinity(),
        }
    }

    /// Negate in place. Infinity is its own negation.
    pub fn negate(&mut self) {
        if let Repr::Finite(v) = &mut self.repr {
            *v = -std::mem::take(v);
        }
    }

    /// The underlying finite value, if any.
    pub fn as_finite(&self) -> Option<&Mpz> {
        match &self.repr {
            Repr::Finite(v) => Some(v),
            Repr::Infinite => None,
        }
    }

    pub(crate) fn as_finite_mut(&mut self) -> Option<&mut Mpz> {
        match &mut self.repr {
            Repr::Finite(v) => Some(v),
            Repr::Infinite => None,
        }
    }

    /// Convert to a native integer when finite and in range.
    pub fn to_i64(&self) -> Option<i64> {
        self.as_finite().and_then(ToPrimitive::to_i64)
    }

    fn require_finite(&self, op: &str) -> Result<&Mpz> {
        self.as_finite()
            .ok_or_else(|| RayEnumError::invalid_operation(format!("{} involving infinity", op)))
    }

    /// Greatest common divisor, always non-negative. `gcd(0, 0) = 0`.
    pub fn gcd(&self, other: &BigInt) -> Result<BigInt> {
        let a = self.require_finite("gcd")?;
        let b = other.require_finite("gcd")?;
        Ok(Self::from(a.gcd(b)))
    }

    /// Replace this value with `gcd(self, other)`.
    pub fn gcd_with(&mut self, other: &BigInt) -> Result<()> {
        *self = self.gcd(other)?;
        Ok(())
    }

    /// Least common multiple, always non-negative.
    pub fn lcm(&self, other: &BigInt) -> Result<BigInt> {
        let a = self.require_finite("lcm")?;
        let b = other.require_finite("lcm")?;
        Ok(Self::from(a.lcm(b)))
    }

    /// Divide by `divisor`, which must divide this value exactly.
    ///
    /// Fails with [`RayEnumError::InvalidOperation`] on infinity, a zero
    /// divisor, or a nonzero remainder.
    pub fn div_exact(&self, divisor: &BigInt) -> Result<BigInt> {
        let a = self.require_finite("division")?;
        let b = divisor.require_finite("division")?;
        if b.is_zero() {
            return Err(RayEnumError::invalid_operation("division by zero"));
        }
        if !(a % b).is_zero() {
            return Err(RayEnumError::invalid_operation(format!(
                "{} is not divisible by {}",
                a, b
            )));
        }
        Ok(Self::from(a / b))
    }

    /// Feed the sign-magnitude encoding of this value into `state`.
    ///
    /// Equal values always produce identical byte streams.
    pub fn hash_sign_magnitude<H: Hasher>(&self, state: &mut H) {
        match &self.repr {
            Repr::Infinite => state.write_u8(3),
            Repr::Finite(v) => {
                let tag = match v.sign() {
                    num_bigint::Sign::NoSign => 0,
                    num_bigint::Sign::Plus => 1,
                    num_bigint::Sign::Minus => 2,
                };
                state.write_u8(tag);
                let mut words = 0usize;
                for digit in v.magnitude().iter_u64_digits() {
                    state.write_u64(digit);
                    words += 1;
                }
                state.write_usize(words);
            }
        }
    }
}

impl Default for BigInt {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<Mpz> for BigInt {
    fn from(value: Mpz) -> Self {
        Self { repr: Repr::Finite(value) }
    }
}

macro_rules! from_native {
    ($($t:ty),*) => {
        $(
            impl From<$t> for BigInt {
                fn from(value: $t) -> Self {
                    Self::from(Mpz::from(value))
                }
            }
        )*
    };
}

from_native!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl FromStr for BigInt {
    type Err = RayEnumError;

    /// Parse a decimal literal: optional surrounding whitespace, an optional
    /// leading `+` or `-`, then digits. The literal `inf` denotes infinity.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix('-')
            .or_else(|| trimmed.strip_prefix('+'))
            .unwrap_or(trimmed);
        if body.eq_ignore_ascii_case("inf") {
            return Ok(Self::infinity());
        }
        if body.is_empty() {
            return Err(ParseError::new(ParseErrorKind::Empty, s).into());
        }
        if let Some(bad) = body.chars().find(|c| !c.is_ascii_digit()) {
            let kind = if bad == '+' || bad == '-' {
                ParseErrorKind::MisplacedSign
            } else {
                ParseErrorKind::InvalidDigit
            };
            return Err(ParseError::new(kind, s).into());
        }
        let magnitude = Mpz::parse_bytes(body.as_bytes(), 10)
            .ok_or_else(|| RayEnumError::from(ParseError::new(ParseErrorKind::InvalidDigit, s)))?;
        if trimmed.starts_with('-') {
            Ok(Self::from(-magnitude))
        } else {
            Ok(Self::from(magnitude))
        }
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Finite(v) => write!(f, "{}", v),
            Repr::Infinite => write!(f, "inf"),
        }
    }
}

impl Ord for BigInt {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.repr, &other.repr) {
            (Repr::Infinite, Repr::Infinite) => Ordering::Equal,
            (Repr::Infinite, Repr::Finite(_)) => Ordering::Greater,
            (Repr::Finite(_), Repr::Infinite) => Ordering::Less,
            (Repr::Finite(a), Repr::Finite(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for BigInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl AddAssign<&BigInt> for BigInt {
    fn add_assign(&mut self, rhs: &BigInt) {
        if rhs.is_infinite() {
            self.repr = Repr::Infinite;
        } else if let (Repr::Finite(a), Repr::Finite(b)) = (&mut self.repr, &rhs.repr) {
            *a += b;
        }
    }
}

impl SubAssign<&BigInt> for BigInt {
    fn sub_assign(&mut self, rhs: &BigInt) {
        if rhs.is_infinite() {
            self.repr = Repr::Infinite;
        } else if let (Repr::Finite(a), Repr::Finite(b)) = (&mut self.repr, &rhs.repr) {
            *a -= b;
        }
    }
}

impl MulAssign<&BigInt> for BigInt {
    fn mul_assign(&mut self, rhs: &BigInt) {
        if rhs.is_infinite() {
            self.repr = Repr::Infinite;
        } else if let (Repr::Finite(a), Repr::Finite(b)) = (&mut self.repr, &rhs.repr) {
            *a *= b;
        }
    }
}

macro_rules! forward_binop {
    ($Op:ident, $op:ident, $OpAssign:ident, $op_assign:ident) => {
        impl $OpAssign<BigInt> for BigInt {
            fn $op_assign(&mut self, rhs: BigInt) {
                <BigInt as $OpAssign<&BigInt>>::$op_assign(self, &rhs);
            }
        }

        impl $Op<&BigInt> for &BigInt {
            type Output = BigInt;

            fn $op(self, rhs: &BigInt) -> BigInt {
                let mut out = self.clone();
                <BigInt as $OpAssign<&BigInt>>::$op_assign(&mut out, rhs);
                out
            }
        }

        impl $Op<BigInt> for &BigInt {
            type Output = BigInt;

            fn $op(self, rhs: BigInt) -> BigInt {
                $Op::$op(self, &rhs)
            }
        }

        impl $Op<&BigInt> for BigInt {
            type Output = BigInt;

            fn $op(mut self, rhs: &BigInt) -> BigInt {
                <BigInt as $OpAssign<&BigInt>>::$op_assign(&mut self, rhs);
                self
            }
        }

        impl $Op<BigInt> for BigInt {
            type Output = BigInt;

            fn $op(mut self, rhs: BigInt) -> BigInt {
                <BigInt as $OpAssign<&BigInt>>::$op_assign(&mut self, &rhs);
                self
            }
        }
    };
}

forward_binop!(Add, add, AddAssign, add_assign);
forward_binop!(Sub, sub, SubAssign, sub_assign);
forward_binop!(Mul, mul, MulAssign, mul_assign);

impl Neg for BigInt {
    type Output = BigInt;

    fn neg(mut self) -> BigInt {
        self.negate();
        self
    }
}

impl Neg for &BigInt {
    type Output = BigInt;

    fn neg(self) -> BigInt {
        -self.clone()
    }
}

impl Serialize for BigInt {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BigInt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(s: &str) -> BigInt {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(int("  -42 ").to_i64(), Some(-42));
        assert_eq!(int("+7").to_i64(), Some(7));
        assert_eq!(int("inf"), BigInt::infinity());
        assert_eq!(int("-0"), BigInt::zero());
        let big = "123456789012345678901234567890123456789";
        assert_eq!(int(big).to_string(), big);
        assert_eq!(BigInt::infinity().to_string(), "inf");
    }

    #[test]
    fn test_parse_errors() {
        let kind = |s: &str| match s.parse::<BigInt>() {
            Err(RayEnumError::Parse(e)) => e.kind,
            other => panic!("expected parse error, got {:?}", other),
        };
        assert_eq!(kind(""), ParseErrorKind::Empty);
        assert_eq!(kind("-"), ParseErrorKind::Empty);
        assert_eq!(kind("12a"), ParseErrorKind::InvalidDigit);
        assert_eq!(kind("1-2"), ParseErrorKind::MisplacedSign);
        assert_eq!(kind("--2"), ParseErrorKind::MisplacedSign);
    }

    #[test]
    fn test_infinity_absorbs() {
        let inf = BigInt::infinity();
        let five = BigInt::from(5);
        assert!((&inf + &five).is_infinite());
        assert!((&five - &inf).is_infinite());
        assert!((&five * &inf).is_infinite());
        assert!((-&inf).is_infinite());
        assert!(inf > BigInt::from(i64::MAX));
        assert_eq!(inf.cmp(&BigInt::infinity()), Ordering::Equal);
        assert_eq!(inf.sign(), Sign::Positive);
    }

    #[test]
    fn test_ring_operations() {
        let a = BigInt::from(-12);
        let b = BigInt::from(18);
        assert_eq!(&a + &b, BigInt::from(6));
        assert_eq!(&a - &b, BigInt::from(-30));
        assert_eq!(&a * &b, BigInt::from(-216));
        assert_eq!(a.abs(), BigInt::from(12));
        assert_eq!(a.sign(), Sign::Negative);
        assert_eq!(BigInt::zero().sign(), Sign::Zero);
    }

    #[test]
    fn test_gcd_and_division() {
        let a = BigInt::from(-12);
        let b = BigInt::from(18);
        assert_eq!(a.gcd(&b).unwrap(), BigInt::from(6));
        assert_eq!(BigInt::zero().gcd(&BigInt::zero()).unwrap(), BigInt::zero());
        assert_eq!(a.lcm(&b).unwrap(), BigInt::from(36));
        assert_eq!(b.div_exact(&BigInt::from(-6)).unwrap(), BigInt::from(-3));

        let mut g = BigInt::from(4);
        g.gcd_with(&BigInt::from(10)).unwrap();
        assert_eq!(g, BigInt::from(2));

        assert!(matches!(
            a.gcd(&BigInt::infinity()),
            Err(RayEnumError::InvalidOperation(_))
        ));
        assert!(matches!(
            BigInt::infinity().div_exact(&b),
            Err(RayEnumError::InvalidOperation(_))
        ));
        assert!(matches!(
            b.div_exact(&BigInt::zero()),
            Err(RayEnumError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_div_exact_rejects_remainder() {
        assert!(matches!(
            BigInt::from(7).div_exact(&BigInt::from(2)),
            Err(RayEnumError::InvalidOperation(_))
        ));
        assert!(matches!(
            BigInt::from(-7).div_exact(&BigInt::from(3)),
            Err(RayEnumError::InvalidOperation(_))
        ));
        assert_eq!(BigInt::zero().div_exact(&BigInt::from(5)).unwrap(), BigInt::zero());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&BigInt::from(-3)).unwrap();
        assert_eq!(json, "\"-3\"");
        let back: BigInt = serde_json::from_str("\"inf\"").unwrap();
        assert!(back.is_infinite());
    }
}
