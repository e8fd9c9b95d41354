//! Bipartition kernel.
//!
//! A bipartition of degree `n` is a set partition of
//! `{0, …, n-1} ∪ {0', …, (n-1)'}`, the diagram-monoid element underlying
//! the partition monoid. Blocks are stored as a label vector of length
//! `2n` (indices `0..n` are the top row, `n..2n` the bottom row),
//! canonicalised to first-occurrence numbering so equal partitions are
//! equal values.

use super::{Element, ElementWithOne};

/// A set partition of two rows of `n` points.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bipartition {
    degree: usize,
    /// Canonical block label of each of the `2 * degree` points.
    blocks: Vec<u8>,
}

impl Bipartition {
    /// A bipartition from a block-label vector of length `2 * degree`;
    /// the labels are renumbered canonically.
    pub fn new(degree: usize, blocks: Vec<u8>) -> Self {
        assert_eq!(blocks.len(), 2 * degree, "label vector has length 2n");
        Self {
            degree,
            blocks: canonicalise(&blocks),
        }
    }

    /// The block label of a top-row point.
    pub fn top(&self, i: usize) -> u8 {
        self.blocks[i]
    }

    /// The block label of a bottom-row point.
    pub fn bottom(&self, i: usize) -> u8 {
        self.blocks[self.degree + i]
    }

    /// The number of blocks.
    pub fn number_of_blocks(&self) -> usize {
        self.blocks.iter().map(|&b| usize::from(b) + 1).max().unwrap_or(0)
    }

    /// The transposition bipartition swapping top/bottom points `i` and
    /// `i + 1` (a permutation viewed as a diagram).
    pub fn transposition(degree: usize, i: usize) -> Self {
        let mut blocks: Vec<u8> = (0..degree as u8).collect();
        let mut bottom: Vec<u8> = (0..degree as u8).collect();
        bottom.swap(i, i + 1);
        blocks.extend(bottom);
        Self::new(degree, blocks)
    }

    /// The rotation bipartition (the n-cycle as a diagram).
    pub fn rotation(degree: usize) -> Self {
        let mut blocks: Vec<u8> = (0..degree as u8).collect();
        let bottom: Vec<u8> = (0..degree).map(|i| ((i + degree - 1) % degree) as u8).collect();
        blocks.extend(bottom);
        Self::new(degree, blocks)
    }

    /// The projection with singleton blocks `{0}` and `{0'}` and identity
    /// strands elsewhere.
    pub fn projection(degree: usize) -> Self {
        let mut blocks: Vec<u8> = vec![0; 2 * degree];
        for i in 1..degree {
            blocks[i] = i as u8;
            blocks[degree + i] = i as u8;
        }
        blocks[degree] = degree as u8; // 0' is its own block
        Self::new(degree, blocks)
    }

    /// The join with one block `{0, 1, 0', 1'}` and identity strands
    /// elsewhere.
    pub fn join(degree: usize) -> Self {
        assert!(degree >= 2);
        let mut blocks: Vec<u8> = vec![0; 2 * degree];
        blocks[1] = 0;
        blocks[degree] = 0;
        blocks[degree + 1] = 0;
        for i in 2..degree {
            blocks[i] = (i - 1) as u8;
            blocks[degree + i] = (i - 1) as u8;
        }
        Self::new(degree, blocks)
    }
}

impl Element for Bipartition {
    /// Stacks `self` on top of `other`, identifying `self`'s bottom row
    /// with `other`'s top row, and reads off the induced partition of
    /// `self`'s top row with `other`'s bottom row.
    fn compose(&self, other: &Self) -> Self {
        debug_assert_eq!(self.degree, other.degree);
        let n = self.degree;
        // Union-find over 3n points: self top (0..n), the identified
        // middle row (n..2n), other bottom (2n..3n).
        let mut parent: Vec<usize> = (0..3 * n).collect();
        fn find(parent: &mut [usize], mut x: usize) -> usize {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }
        let mut union = |parent: &mut Vec<usize>, a: usize, b: usize| {
            let a = find(parent, a);
            let b = find(parent, b);
            if a != b {
                parent[b] = a;
            }
        };
        // Blocks of self connect top and middle points.
        for i in 0..2 * n {
            for j in i + 1..2 * n {
                if self.blocks[i] == self.blocks[j] {
                    union(&mut parent, i, j);
                }
            }
        }
        // Blocks of other connect middle and bottom points: other's
        // point i lives at parent index n + i on either row.
        for i in 0..2 * n {
            for j in i + 1..2 * n {
                if other.blocks[i] == other.blocks[j] {
                    union(&mut parent, n + i, n + j);
                }
            }
        }
        let mut labels = Vec::with_capacity(2 * n);
        for i in 0..n {
            labels.push(find(&mut parent, i) as u8);
        }
        for i in 0..n {
            labels.push(find(&mut parent, 2 * n + i) as u8);
        }
        Self {
            degree: n,
            blocks: canonicalise(&labels),
        }
    }

    fn degree(&self) -> usize {
        self.degree
    }

    fn complexity(&self) -> usize {
        self.degree * self.degree
    }
}

impl ElementWithOne for Bipartition {
    fn one_of_degree(degree: usize) -> Self {
        let mut blocks: Vec<u8> = (0..degree as u8).collect();
        blocks.extend(0..degree as u8);
        Self::new(degree, blocks)
    }
}

/// First-occurrence renumbering of a label vector.
fn canonicalise(labels: &[u8]) -> Vec<u8> {
    let mut mapping = [u8::MAX; 256];
    let mut next = 0u8;
    labels
        .iter()
        .map(|&l| {
            if mapping[usize::from(l)] == u8::MAX {
                mapping[usize::from(l)] = next;
                next += 1;
            }
            mapping[usize::from(l)]
        })
        .collect()
}
