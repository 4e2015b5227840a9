//! Column scoring for sum-of-pairs alignment
//!
//! Scores are kept in integer units scaled by [`ScoringParams::scale`] so that
//! accumulation never needs fractions; the final alignment score is divided by
//! the scale exactly once.

use serde::{Deserialize, Serialize};

use crate::error::{AlignError, AlignResult};
use crate::types::{Score, Sequence, Symbol};

/// Default scale applied to every pairwise score
pub const SCORE_SCALE: Score = 2;

/// Policy that scores one alignment column (one symbol per sequence)
pub trait ColumnScorer: Sync {
    /// Score a full column, in scaled units
    fn score_column(&self, column: &[Symbol]) -> Score;

    /// Divisor applied once to a total alignment score
    fn scale(&self) -> Score {
        1
    }
}

/// Pairwise scoring constants, already multiplied by `scale`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringParams {
    /// Reward for two equal bases
    pub match_score: Score,
    /// Penalty for two different bases
    pub mismatch: Score,
    /// Penalty for a base paired with a gap
    pub gap: Score,
    pub scale: Score,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            match_score: 6,
            mismatch: -4,
            gap: -3,
            scale: SCORE_SCALE,
        }
    }
}

impl ScoringParams {
    pub fn validate(&self) -> AlignResult<()> {
        if self.scale <= 0 {
            return Err(AlignError::invalid_input(format!(
                "score scale must be positive, got {}",
                self.scale
            )));
        }
        Ok(())
    }
}

/// Sum-of-pairs scorer over all unordered symbol pairs of a column
#[derive(Debug, Clone, Default)]
pub struct SumOfPairs {
    params: ScoringParams,
}

impl SumOfPairs {
    pub fn new(params: ScoringParams) -> Self {
        Self { params }
    }

    pub fn pair_score(&self, a: Symbol, b: Symbol) -> Score {
        match (a.is_gap(), b.is_gap()) {
            (true, true) => 0,
            (true, false) | (false, true) => self.params.gap,
            (false, false) if a == b => self.params.match_score,
            (false, false) => self.params.mismatch,
        }
    }
}

impl ColumnScorer for SumOfPairs {
    fn score_column(&self, column: &[Symbol]) -> Score {
        let mut sum = 0;
        for (i, &a) in column.iter().enumerate() {
            for &b in &column[i + 1..] {
                sum += self.pair_score(a, b);
            }
        }
        sum
    }

    fn scale(&self) -> Score {
        self.params.scale
    }
}

/// Sum-of-pairs score of one column under the default constants
pub fn column_score(column: &[Symbol]) -> Score {
    SumOfPairs::default().score_column(column)
}

/// Score an existing gapped alignment whose rows all have the same length
pub fn score_alignment<S: ColumnScorer + ?Sized>(
    scorer: &S,
    rows: &[Sequence],
) -> AlignResult<f64> {
    let Some(first) = rows.first() else {
        return Err(AlignError::invalid_input("alignment has no rows"));
    };
    let width = first.len();
    if let Some((index, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != width) {
        return Err(AlignError::invalid_input(format!(
            "row {} has {} columns, expected {}",
            index,
            row.len(),
            width
        )));
    }

    let mut column = Vec::with_capacity(rows.len());
    let mut total: i64 = 0;
    for col in 0..width {
        column.clear();
        column.extend(rows.iter().map(|row| row.symbols()[col]));
        total += i64::from(scorer.score_column(&column));
    }

    Ok(total as f64 / f64::from(scorer.scale()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Symbol::*;

    #[test]
    fn test_pair_scores() {
        let scorer = SumOfPairs::default();
        assert_eq!(scorer.pair_score(A, A), 6);
        assert_eq!(scorer.pair_score(A, C), -4);
        assert_eq!(scorer.pair_score(A, Gap), -3);
        assert_eq!(scorer.pair_score(Gap, T), -3);
        assert_eq!(scorer.pair_score(Gap, Gap), 0);
    }

    #[test]
    fn test_column_score() {
        // 6 matching pairs
        assert_eq!(column_score(&[A, A, A, A]), 36);
        // A-A match, two A-gap pairs
        assert_eq!(column_score(&[A, A, Gap]), 6 - 3 - 3);
        // pairs: GC, G-, GG, C-, CG, -G
        assert_eq!(column_score(&[G, C, Gap, G]), -4 - 3 + 6 - 3 - 4 - 3);
    }

    #[test]
    fn test_degenerate_columns() {
        assert_eq!(column_score(&[]), 0);
        assert_eq!(column_score(&[T]), 0);
        assert_eq!(column_score(&[Gap, Gap, Gap]), 0);
    }

    #[test]
    fn test_custom_params() {
        let scorer = SumOfPairs::new(ScoringParams {
            match_score: 1,
            mismatch: -1,
            gap: -2,
            scale: 1,
        });
        assert_eq!(scorer.score_column(&[A, C, Gap]), -1 - 2 - 2);
        assert_eq!(scorer.scale(), 1);
    }

    #[test]
    fn test_invalid_scale() {
        let params = ScoringParams { scale: 0, ..Default::default() };
        assert!(params.validate().is_err());
        assert!(ScoringParams::default().validate().is_ok());
    }

    #[test]
    fn test_score_alignment() {
        let rows = Sequence::encode_all(&["AC-T", "ACGT", "A-GT"]);
        // cols: AAA=18, CC-=6-6, -GG=6-6, TTT=18 -> 36 doubled
        let score = score_alignment(&SumOfPairs::default(), &rows).unwrap();
        assert_eq!(score, 18.0);
    }

    #[test]
    fn test_score_alignment_rejects_ragged_rows() {
        let rows = Sequence::encode_all(&["ACGT", "ACG"]);
        let err = score_alignment(&SumOfPairs::default(), &rows).unwrap_err();
        assert!(matches!(err, AlignError::InvalidInput(_)));

        let err = score_alignment(&SumOfPairs::default(), &[]).unwrap_err();
        assert!(matches!(err, AlignError::InvalidInput(_)));
    }
}
