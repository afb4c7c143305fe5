//! Dense integer matrices of hyperplane normals.
//!
//! Each row of an [`EqMatrix`] is the normal vector of a hyperplane through
//! the origin; the subspace being enumerated is the common zero set of all
//! rows. The matrix is passive during enumeration: rows are only read, via
//! the borrowed [`RowView`].

use num_bigint::BigInt as Mpz;
use num_integer::Integer;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::polyhedral::{BigInt, RayVec, VectorView};
use crate::utils::errors::{RayEnumError, Result};

/// An `m × n` integer matrix stored row-major.
///
/// Deserialisation checks that the stored entries fill exactly `rows × cols`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEqMatrix")]
pub struct EqMatrix {
    data: Vec<BigInt>,
    rows: usize,
    cols: usize,
}

/// Serialised form of an [`EqMatrix`], before its shape is checked.
#[derive(Deserialize)]
struct RawEqMatrix {
    data: Vec<BigInt>,
    rows: usize,
    cols: usize,
}

impl TryFrom<RawEqMatrix> for EqMatrix {
    type Error = RayEnumError;

    fn try_from(raw: RawEqMatrix) -> Result<Self> {
        let expected = raw.rows.checked_mul(raw.cols).ok_or_else(|| {
            RayEnumError::invalid_input(format!("matrix shape {} × {} overflows", raw.rows, raw.cols))
        })?;
        if raw.data.len() != expected {
            return Err(RayEnumError::invalid_input(format!(
                "matrix of shape {} × {} needs {} entries, found {}",
                raw.rows,
                raw.cols,
                expected,
                raw.data.len()
            )));
        }
        Ok(Self {
            data: raw.data,
            rows: raw.rows,
            cols: raw.cols,
        })
    }
}

/// A read-only borrowed row of an [`EqMatrix`].
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    index: usize,
    coords: &'a [BigInt],
}

impl<'a> RowView<'a> {
    /// Which row of the matrix this is.
    pub fn index(&self) -> usize {
        self.index
    }

    /// True if every entry of the row is zero.
    pub fn is_zero(&self) -> bool {
        self.coords.iter().all(BigInt::is_zero)
    }

    /// Copy the row into an owning ray.
    pub fn to_ray(&self) -> RayVec {
        RayVec::from_coords(self.coords.to_vec())
    }
}

impl VectorView for RowView<'_> {
    fn coords(&self) -> &[BigInt] {
        self.coords
    }
}

impl EqMatrix {
    /// Create a new matrix with the given dimensions, initialized to zero.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![BigInt::zero(); rows * cols],
            rows,
            cols,
        }
    }

    /// Create a matrix from rows of native integers.
    ///
    /// `cols` is needed to describe a matrix with no rows.
    pub fn from_rows(cols: usize, rows: &[Vec<i64>]) -> Result<Self> {
        Self::from_bigint_rows(
            cols,
            rows.iter()
                .map(|row| row.iter().copied().map(BigInt::from).collect())
                .collect(),
        )
    }

    /// Create a matrix from rows of [`BigInt`].
    pub fn from_bigint_rows(cols: usize, rows: Vec<Vec<BigInt>>) -> Result<Self> {
        let n_rows = rows.len();
        let mut data = Vec::with_capacity(n_rows * cols);
        for row in rows {
            RayEnumError::check_dimension(cols, row.len())?;
            data.extend(row);
        }
        Ok(Self {
            data,
            rows: n_rows,
            cols,
        })
    }

    /// Get the number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Get the number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Get an element.
    pub fn entry(&self, row: usize, col: usize) -> Result<&BigInt> {
        RayEnumError::check_index(row, self.rows)?;
        RayEnumError::check_index(col, self.cols)?;
        Ok(&self.data[row * self.cols + col])
    }

    /// Set an element.
    pub fn set_entry(&mut self, row: usize, col: usize, value: BigInt) -> Result<()> {
        RayEnumError::check_index(row, self.rows)?;
        RayEnumError::check_index(col, self.cols)?;
        self.data[row * self.cols + col] = value;
        Ok(())
    }

    /// Get a row as a read-only view.
    pub fn row(&self, row: usize) -> Result<RowView<'_>> {
        RayEnumError::check_index(row, self.rows)?;
        let start = row * self.cols;
        Ok(RowView {
            index: row,
            coords: &self.data[start..start + self.cols],
        })
    }

    /// Iterate over all rows.
    pub fn iter_rows(&self) -> impl Iterator<Item = RowView<'_>> {
        (0..self.rows).map(move |row| {
            let start = row * self.cols;
            RowView {
                index: row,
                coords: &self.data[start..start + self.cols],
            }
        })
    }

    /// Matrix-vector product `M·v`.
    pub fn mul_vec(&self, v: &RayVec) -> Result<Vec<BigInt>> {
        RayEnumError::check_dimension(self.cols, v.len())?;
        self.iter_rows().map(|row| row.dot(v)).collect()
    }

    /// Row indices ordered by their zero pattern.
    ///
    /// Rows are compared column by column: the first column where exactly
    /// one of the two rows is zero decides, with the zero entry first.
    /// Rows with identical patterns keep their relative order.
    pub fn zero_pattern_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.rows).collect();
        order.sort_by(|&i, &j| self.compare_zero_patterns(i, j));
        order
    }

    fn compare_zero_patterns(&self, i: usize, j: usize) -> Ordering {
        for c in 0..self.cols {
            let zi = self.data[i * self.cols + c].is_zero();
            let zj = self.data[j * self.cols + c].is_zero();
            match (zi, zj) {
                (true, false) => return Ordering::Less,
                (false, true) => return Ordering::Greater,
                _ => {}
            }
        }
        Ordering::Equal
    }

    /// Rank over the rationals, by fraction-free elimination.
    ///
    /// Fails with [`RayEnumError::InvalidOperation`] if any entry is infinite.
    pub fn rank(&self) -> Result<usize> {
        let mut a: Vec<Vec<Mpz>> = Vec::with_capacity(self.rows);
        for row in self.iter_rows() {
            let finite: Option<Vec<Mpz>> =
                row.coords().iter().map(|c| c.as_finite().cloned()).collect();
            a.push(finite.ok_or_else(|| {
                RayEnumError::invalid_operation("rank of a matrix with infinite entries")
            })?);
        }

        let mut rank = 0;
        for col in 0..self.cols {
            let Some(pivot) = (rank..a.len()).find(|&r| !a[r][col].is_zero()) else {
                continue;
            };
            a.swap(rank, pivot);
            let pivot_row = a[rank].clone();
            for row in a.iter_mut().skip(rank + 1) {
                if row[col].is_zero() {
                    continue;
                }
                let factor = row[col].clone();
                for c in col..self.cols {
                    row[c] = &row[c] * &pivot_row[col] - &pivot_row[c] * &factor;
                }
                let content = row.iter().fold(Mpz::zero(), |g, x| g.gcd(x));
                if !content.is_zero() && !content.is_one() {
                    for x in row.iter_mut() {
                        *x /= &content;
                    }
                }
            }
            rank += 1;
            if rank == a.len() {
                break;
            }
        }
        Ok(rank)
    }
}

impl fmt::Display for EqMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[")?;
        for row in self.iter_rows() {
            write!(f, "  [")?;
            for (j, val) in row.coords().iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", val)?;
            }
            writeln!(f, "]")?;
        }
        write!(f, "]")
    }
}
