//! N-dimensional memo tables addressed by cursor tuples
//!
//! Cursor tuples are linearised row-major through [`Shape`]; the last
//! dimension has stride 1. A cursor's predecessor under any non-empty mask
//! therefore always has a strictly smaller flat offset, which is what lets
//! the bottom-up strategies sweep offsets in increasing order.
//!
//! Memory: a dense table holds `product(len_i + 1)` scores plus one bit per
//! cell. The sparse table only holds the cells actually visited.

use bitvec::vec::BitVec;
use fnv::FnvHashMap;

use crate::error::{AlignError, AlignResult};
use crate::types::Score;

/// Dimensions and strides of a cursor space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    dims: Vec<usize>,
    strides: Vec<usize>,
    cells: usize,
}

impl Shape {
    /// Build a row-major shape; fails if the cell count overflows `usize`
    pub fn new(dims: Vec<usize>) -> AlignResult<Self> {
        let mut strides = vec![0; dims.len()];
        let mut cells: usize = 1;
        for (i, &dim) in dims.iter().enumerate().rev() {
            strides[i] = cells;
            cells = cells
                .checked_mul(dim)
                .ok_or_else(|| AlignError::TableTooLarge {
                    cells: Self::cell_count(&dims),
                    limit: usize::MAX,
                })?;
        }
        Ok(Self { dims, strides, cells })
    }

    /// Cell count computed without overflow, for reporting
    pub fn cell_count(dims: &[usize]) -> u128 {
        dims.iter()
            .map(|&d| d as u128)
            .try_fold(1u128, |acc, d| acc.checked_mul(d))
            .unwrap_or(u128::MAX)
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn cells(&self) -> usize {
        self.cells
    }

    /// Flat offset of a cursor tuple
    pub fn offset(&self, cursor: &[usize]) -> usize {
        debug_assert_eq!(cursor.len(), self.rank());
        cursor
            .iter()
            .zip(&self.dims)
            .zip(&self.strides)
            .map(|((&c, &dim), &stride)| {
                debug_assert!(c < dim, "cursor component {c} out of range 0..{dim}");
                c * stride
            })
            .sum()
    }

    /// Cursor tuple stored at a flat offset
    pub fn cursor(&self, offset: usize) -> Vec<usize> {
        debug_assert!(offset < self.cells);
        self.dims
            .iter()
            .zip(&self.strides)
            .map(|(&dim, &stride)| (offset / stride) % dim)
            .collect()
    }

    /// Move `cursor` to the next offset in row-major order; false once exhausted
    pub fn step(&self, cursor: &mut [usize]) -> bool {
        for i in (0..cursor.len()).rev() {
            cursor[i] += 1;
            if cursor[i] < self.dims[i] {
                return true;
            }
            cursor[i] = 0;
        }
        false
    }
}

/// Write-once score cache over a cursor space
pub trait MemoTable {
    fn shape(&self) -> &Shape;

    fn get_at(&self, offset: usize) -> Option<Score>;

    /// Record a finalised score; a cell is never rewritten with a different value
    fn set_at(&mut self, offset: usize, score: Score);

    /// Number of finalised cells
    fn computed(&self) -> usize;

    fn get(&self, cursor: &[usize]) -> Option<Score> {
        self.get_at(self.shape().offset(cursor))
    }

    fn set(&mut self, cursor: &[usize], score: Score) {
        let offset = self.shape().offset(cursor);
        self.set_at(offset, score);
    }
}

/// Arena table: flat score storage plus a parallel computed bit set
///
/// Zero and negative scores are valid, so the bit set rather than a sentinel
/// marks which cells are finalised.
#[derive(Debug, Clone)]
pub struct DenseTable {
    shape: Shape,
    scores: Vec<Score>,
    computed: BitVec,
    filled: usize,
}

impl DenseTable {
    /// Allocate a table, refusing shapes with more than `max_cells` cells
    pub fn new(shape: Shape, max_cells: usize) -> AlignResult<Self> {
        if shape.cells() > max_cells {
            return Err(AlignError::TableTooLarge {
                cells: shape.cells() as u128,
                limit: max_cells,
            });
        }
        log::debug!(
            "Allocating dense table: dims {:?}, {} cells",
            shape.dims(),
            shape.cells()
        );
        let cells = shape.cells();
        Ok(Self {
            shape,
            scores: vec![0; cells],
            computed: BitVec::repeat(false, cells),
            filled: 0,
        })
    }
}

impl MemoTable for DenseTable {
    fn shape(&self) -> &Shape {
        &self.shape
    }

    fn get_at(&self, offset: usize) -> Option<Score> {
        if self.computed[offset] {
            Some(self.scores[offset])
        } else {
            None
        }
    }

    fn set_at(&mut self, offset: usize, score: Score) {
        if self.computed[offset] {
            debug_assert_eq!(
                self.scores[offset], score,
                "cell {offset} rewritten with a different score"
            );
            return;
        }
        self.scores[offset] = score;
        self.computed.set(offset, true);
        self.filled += 1;
    }

    fn computed(&self) -> usize {
        self.filled
    }
}

/// Hash-map table keyed by flat offset; memory grows with visited cells only
#[derive(Debug, Clone)]
pub struct SparseTable {
    shape: Shape,
    scores: FnvHashMap<usize, Score>,
}

impl SparseTable {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            scores: FnvHashMap::default(),
        }
    }
}

impl MemoTable for SparseTable {
    fn shape(&self) -> &Shape {
        &self.shape
    }

    fn get_at(&self, offset: usize) -> Option<Score> {
        self.scores.get(&offset).copied()
    }

    fn set_at(&mut self, offset: usize, score: Score) {
        let previous = self.scores.insert(offset, score);
        debug_assert!(
            previous.map_or(true, |p| p == score),
            "cell {offset} rewritten with a different score"
        );
    }

    fn computed(&self) -> usize {
        self.scores.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_strides() {
        let shape = Shape::new(vec![3, 4, 5]).unwrap();
        assert_eq!(shape.strides(), &[20, 5, 1]);
        assert_eq!(shape.cells(), 60);
        assert_eq!(shape.offset(&[2, 3, 4]), 59);
        assert_eq!(shape.offset(&[1, 0, 2]), 22);
        assert_eq!(shape.cursor(22), vec![1, 0, 2]);
    }

    #[test]
    fn test_shape_step_visits_offsets_in_order() {
        let shape = Shape::new(vec![2, 3]).unwrap();
        let mut cursor = vec![0, 0];
        let mut offsets = vec![shape.offset(&cursor)];
        while shape.step(&mut cursor) {
            offsets.push(shape.offset(&cursor));
        }
        assert_eq!(offsets, (0..6).collect::<Vec<_>>());
        assert_eq!(cursor, vec![0, 0]);
    }

    #[test]
    fn test_shape_overflow() {
        let err = Shape::new(vec![usize::MAX, 3]).unwrap_err();
        assert!(matches!(err, AlignError::TableTooLarge { .. }));
    }

    #[test]
    fn test_empty_shape_has_one_cell() {
        let shape = Shape::new(Vec::new()).unwrap();
        assert_eq!(shape.cells(), 1);
        assert_eq!(shape.offset(&[]), 0);
    }

    #[test]
    fn test_dense_get_set() {
        let mut table = DenseTable::new(Shape::new(vec![2, 2]).unwrap(), 16).unwrap();
        assert_eq!(table.get(&[1, 1]), None);

        // zero and negative scores must read back as present
        table.set(&[0, 0], 0);
        table.set(&[1, 1], -7);
        assert_eq!(table.get(&[0, 0]), Some(0));
        assert_eq!(table.get(&[1, 1]), Some(-7));
        assert_eq!(table.get(&[0, 1]), None);
        assert_eq!(table.computed(), 2);

        // identical rewrite is a no-op
        table.set(&[1, 1], -7);
        assert_eq!(table.computed(), 2);
    }

    #[test]
    fn test_dense_rejects_large_shape() {
        let err = DenseTable::new(Shape::new(vec![10, 10]).unwrap(), 99).unwrap_err();
        assert!(matches!(err, AlignError::TableTooLarge { cells: 100, limit: 99 }));
    }

    #[test]
    fn test_sparse_get_set() {
        let mut table = SparseTable::new(Shape::new(vec![100, 100, 100]).unwrap());
        assert_eq!(table.get(&[99, 0, 5]), None);
        table.set(&[99, 0, 5], 12);
        assert_eq!(table.get(&[99, 0, 5]), Some(12));
        assert_eq!(table.computed(), 1);
    }
}
