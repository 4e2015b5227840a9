//! Column masks for N-ary alignment
//!
//! A mask says, for one candidate alignment column, which sequences consume
//! their next symbol (bit set) and which contribute a gap (bit clear). The
//! all-gap mask is never produced: a column made only of gaps consumes nothing
//! and would let the search loop forever.

use bitvec::vec::BitVec;

use crate::table::Shape;
use crate::types::{Sequence, Symbol};

/// Which sequences advance in one alignment column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnMask {
    bits: BitVec,
}

impl ColumnMask {
    pub fn from_bits(bits: &[bool]) -> Self {
        Self {
            bits: bits.iter().copied().collect(),
        }
    }

    /// Number of sequences the mask spans
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Number of sequences contributing a real symbol
    pub fn advancing(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn is_all_gap(&self) -> bool {
        self.bits.not_any()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().by_vals()
    }

    /// The mask can be applied at `cursor` without any component going negative
    pub fn fits(&self, cursor: &[usize]) -> bool {
        self.bits.iter_ones().all(|i| cursor[i] > 0)
    }

    /// Step `cursor` back by one along every advancing sequence
    pub fn retreat(&self, cursor: &mut [usize]) {
        for i in self.bits.iter_ones() {
            debug_assert!(cursor[i] > 0, "cursor component {i} would go negative");
            cursor[i] -= 1;
        }
    }

    /// Undo [`ColumnMask::retreat`]
    pub fn advance(&self, cursor: &mut [usize]) {
        for i in self.bits.iter_ones() {
            cursor[i] += 1;
        }
    }

    /// Flat-offset distance between a cursor and its predecessor under this mask
    pub fn offset_delta(&self, shape: &Shape) -> usize {
        self.bits.iter_ones().map(|i| shape.strides()[i]).sum()
    }

    /// Fill `column` with the symbols this mask produces ending at `cursor`
    ///
    /// An advancing sequence contributes the symbol just before its cursor;
    /// every other sequence contributes a gap.
    pub fn fill_column(&self, sequences: &[Sequence], cursor: &[usize], column: &mut Vec<Symbol>) {
        column.clear();
        column.extend(self.bits.iter().by_vals().enumerate().map(|(i, advancing)| {
            if advancing {
                sequences[i].symbols()[cursor[i] - 1]
            } else {
                Symbol::Gap
            }
        }));
    }
}

/// Every mask of width `n` except the all-gap mask, `2^n - 1` in total
///
/// Built by binary-choice expansion: each partial mask is extended first with
/// a set bit, then with a clear bit. For `n = 2` the order is `11, 10, 01`.
pub fn generate_masks(n: usize) -> Vec<ColumnMask> {
    let mut masks = expand(n);
    masks.retain(|mask| !mask.is_all_gap());
    masks
}

fn expand(width: usize) -> Vec<ColumnMask> {
    if width == 0 {
        return vec![ColumnMask { bits: BitVec::new() }];
    }

    let mut masks = Vec::with_capacity(1 << width);
    for prefix in expand(width - 1) {
        let mut with_base = prefix.bits.clone();
        with_base.push(true);
        masks.push(ColumnMask { bits: with_base });

        let mut with_gap = prefix.bits;
        with_gap.push(false);
        masks.push(ColumnMask { bits: with_gap });
    }
    masks
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn as_strings(masks: &[ColumnMask]) -> Vec<String> {
        masks
            .iter()
            .map(|m| m.iter().map(|b| if b { '1' } else { '0' }).collect())
            .collect()
    }

    #[test]
    fn test_generation_order() {
        assert_eq!(as_strings(&generate_masks(2)), vec!["11", "10", "01"]);
        assert_eq!(
            as_strings(&generate_masks(3)),
            vec!["111", "110", "101", "100", "011", "010", "001"]
        );
    }

    #[test]
    fn test_small_widths() {
        assert!(generate_masks(0).is_empty());
        assert_eq!(as_strings(&generate_masks(1)), vec!["1"]);
    }

    #[test]
    fn test_fits_and_retreat() {
        let mask = ColumnMask::from_bits(&[true, false, true]);
        assert_eq!(mask.advancing(), 2);
        assert!(mask.fits(&[1, 0, 3]));
        assert!(!mask.fits(&[0, 5, 3]));

        let mut cursor = vec![1, 0, 3];
        mask.retreat(&mut cursor);
        assert_eq!(cursor, vec![0, 0, 2]);
        mask.advance(&mut cursor);
        assert_eq!(cursor, vec![1, 0, 3]);
    }

    #[test]
    fn test_fill_column() {
        let seqs = Sequence::encode_all(&["AC", "GT", "TT"]);
        let mask = ColumnMask::from_bits(&[true, false, true]);
        let mut column = Vec::new();
        mask.fill_column(&seqs, &[2, 1, 1], &mut column);
        assert_eq!(column, vec![Symbol::C, Symbol::Gap, Symbol::T]);
    }

    #[test]
    fn test_offset_delta() {
        // dims 3 x 4 x 5 -> strides 20, 5, 1
        let shape = Shape::new(vec![3, 4, 5]).unwrap();
        assert_eq!(ColumnMask::from_bits(&[true, true, true]).offset_delta(&shape), 26);
        assert_eq!(ColumnMask::from_bits(&[false, true, false]).offset_delta(&shape), 5);
    }

    proptest! {
        #[test]
        fn prop_mask_set_cardinality(n in 1usize..=10) {
            let masks = generate_masks(n);
            prop_assert_eq!(masks.len(), (1usize << n) - 1);
            prop_assert!(masks.iter().all(|m| m.len() == n && !m.is_all_gap()));

            let distinct: HashSet<_> = masks.iter().cloned().collect();
            prop_assert_eq!(distinct.len(), masks.len());
        }
    }
}
