//! Boolean matrix kernels.
//!
//! [`BMat8`] packs a boolean matrix of dimension at most 8 into a single
//! `u64`: bit `8·i + j` (little-endian) is entry `(i, j)`, so byte `i` is
//! row `i`. Transpose, row-space basis, and column-space basis are the
//! scalar renditions of the packed algorithms used by the original.

use std::fmt;

use super::{Element, ElementWithOne, GreensPoints};

// ------------------------------------------------------------------------------------------------
// BMat8
// ------------------------------------------------------------------------------------------------

/// A boolean matrix of dimension at most 8 packed into a `u64`.
///
/// The dimension is not stored: a `BMat8` of dimension `n < 8` simply has
/// all bits outside the leading `n × n` block clear, and [`Element::degree`]
/// reports 8. Multiplication never mixes the padding into the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BMat8(pub u64);

impl BMat8 {
    /// A matrix from explicit rows of 0/1 entries.
    pub fn from_rows(rows: &[[u8; 8]]) -> Self {
        assert!(rows.len() <= 8);
        let mut data = 0u64;
        for (i, row) in rows.iter().enumerate() {
            for (j, &entry) in row.iter().enumerate() {
                if entry != 0 {
                    data |= 1u64 << (8 * i + j);
                }
            }
        }
        Self(data)
    }

    /// Entry `(i, j)`.
    pub fn get(&self, i: usize, j: usize) -> bool {
        (self.0 >> (8 * i + j)) & 1 == 1
    }

    /// Row `i` as a byte (bit `j` = entry `(i, j)`).
    pub fn row(&self, i: usize) -> u8 {
        (self.0 >> (8 * i)) as u8
    }

    /// The transpose, by the three-step bit-swap of an 8×8 bit matrix.
    pub fn transpose(&self) -> Self {
        let mut x = self.0;
        let mut y = (x ^ (x >> 7)) & 0x00AA_00AA_00AA_00AA;
        x ^= y ^ (y << 7);
        y = (x ^ (x >> 14)) & 0x0000_CCCC_0000_CCCC;
        x ^= y ^ (y << 14);
        y = (x ^ (x >> 28)) & 0x0000_0000_F0F0_F0F0;
        x ^= y ^ (y << 28);
        Self(x)
    }

    /// The canonical basis of the row space: duplicate rows removed, every
    /// row that is the union of other contained rows removed, survivors
    /// sorted descending and packed from row 0.
    pub fn row_space_basis(&self) -> Self {
        let mut rows: Vec<u8> = (0..8).map(|i| self.row(i)).filter(|&r| r != 0).collect();
        rows.sort_unstable_by(|a, b| b.cmp(a));
        rows.dedup();
        let mut basis: Vec<u8> = Vec::with_capacity(rows.len());
        for (i, &row) in rows.iter().enumerate() {
            let mut combined = 0u8;
            for (j, &other) in rows.iter().enumerate() {
                if i != j && other & row == other {
                    combined |= other;
                }
            }
            if combined != row {
                basis.push(row);
            }
        }
        let mut data = 0u64;
        for (i, &row) in basis.iter().enumerate() {
            data |= u64::from(row) << (8 * i);
        }
        Self(data)
    }

    /// The canonical basis of the column space.
    pub fn col_space_basis(&self) -> Self {
        self.transpose().row_space_basis().transpose()
    }

    /// The number of rows in the row-space basis.
    pub fn row_rank(&self) -> usize {
        let basis = self.row_space_basis();
        (0..8).filter(|&i| basis.row(i) != 0).count()
    }

    /// Whether this matrix is idempotent.
    pub fn is_idempotent(&self) -> bool {
        self.compose(self) == *self
    }
}

impl Element for BMat8 {
    fn compose(&self, other: &Self) -> Self {
        let mut data = 0u64;
        for i in 0..8 {
            let row = self.row(i);
            let mut out = 0u8;
            for j in 0..8 {
                if (row >> j) & 1 == 1 {
                    out |= other.row(j);
                }
            }
            data |= u64::from(out) << (8 * i);
        }
        Self(data)
    }

    fn degree(&self) -> usize {
        8
    }

    fn complexity(&self) -> usize {
        8 * 8
    }
}

impl ElementWithOne for BMat8 {
    fn one_of_degree(degree: usize) -> Self {
        assert!(degree <= 8);
        let mut data = 0u64;
        for i in 0..degree {
            data |= 1u64 << (8 * i + i);
        }
        Self(data)
    }
}

impl GreensPoints for BMat8 {
    /// Row-space basis, canonically packed.
    type Lambda = BMat8;

    /// Column-space basis, canonically packed.
    type Rho = BMat8;

    fn lambda(&self) -> BMat8 {
        self.row_space_basis()
    }

    fn rho(&self) -> BMat8 {
        self.col_space_basis()
    }

    fn lambda_act(&self, lambda: &BMat8) -> BMat8 {
        lambda.compose(self).row_space_basis()
    }

    fn rho_act(&self, rho: &BMat8) -> BMat8 {
        self.compose(rho).col_space_basis()
    }

    fn rank(&self) -> usize {
        self.row_rank()
    }
}

impl fmt::Display for BMat8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..8 {
            for j in 0..8 {
                write!(f, "{}", u8::from(self.get(i, j)))?;
            }
            if i != 7 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// General boolean matrices
// ------------------------------------------------------------------------------------------------

/// A boolean matrix of arbitrary dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoolMat {
    dim: usize,
    entries: Vec<bool>,
}

impl BoolMat {
    /// A matrix from a row-major entry list of length `dim * dim`.
    pub fn new(dim: usize, entries: Vec<bool>) -> Self {
        assert_eq!(entries.len(), dim * dim);
        Self { dim, entries }
    }

    /// Entry `(i, j)`.
    pub fn get(&self, i: usize, j: usize) -> bool {
        self.entries[i * self.dim + j]
    }
}

impl Element for BoolMat {
    fn compose(&self, other: &Self) -> Self {
        debug_assert_eq!(self.dim, other.dim);
        let n = self.dim;
        let mut entries = vec![false; n * n];
        for i in 0..n {
            for k in 0..n {
                if self.get(i, k) {
                    for j in 0..n {
                        if other.get(k, j) {
                            entries[i * n + j] = true;
                        }
                    }
                }
            }
        }
        Self { dim: n, entries }
    }

    fn degree(&self) -> usize {
        self.dim
    }

    fn complexity(&self) -> usize {
        self.dim * self.dim * self.dim
    }
}

impl ElementWithOne for BoolMat {
    fn one_of_degree(degree: usize) -> Self {
        let mut entries = vec![false; degree * degree];
        for i in 0..degree {
            entries[i * degree + i] = true;
        }
        Self {
            dim: degree,
            entries,
        }
    }
}
