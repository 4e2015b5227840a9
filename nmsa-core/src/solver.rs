//! Exact N-ary sum-of-pairs alignment scoring
//!
//! The optimal score at a cursor tuple is the best, over every feasible column
//! mask, of the predecessor's score plus the score of the column the mask
//! implies. Three strategies evaluate the same recurrence:
//!
//! - [`Strategy::Recursive`]: memoized top-down search from the full lengths.
//! - [`Strategy::Iterative`]: bottom-up sweep over flat offsets in increasing
//!   order; every predecessor has a strictly smaller offset.
//! - [`Strategy::Parallel`]: bottom-up wavefront over cursor-sum levels with
//!   each level scored on the rayon pool. Tuples on one level never depend on
//!   each other.
//!
//! Work is exponential in the sequence count (`2^N - 1` masks per tuple) and
//! polynomial in sequence length for fixed N.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::{AlignError, AlignResult};
use crate::mask::{generate_masks, ColumnMask};
use crate::scoring::{ColumnScorer, SumOfPairs};
use crate::table::{DenseTable, MemoTable, Shape, SparseTable};
use crate::types::{Score, Sequence, Symbol};

/// Largest sequence count accepted; the mask set doubles with every sequence
pub const MAX_SEQUENCES: usize = 24;

/// How the recurrence is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    #[default]
    Recursive,
    Iterative,
    Parallel,
}

/// Treatment of cursor tuples on the edge of the cursor space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Boundary {
    /// Any zero component scores 0, and no tuple scores below 0. Trailing
    /// symbols of the other sequences are free once one sequence is used up.
    #[default]
    FreeEnds,
    /// Only the all-zero tuple is terminal and scores are never floored,
    /// so every symbol of every sequence is paid for.
    Global,
}

impl Boundary {
    fn is_terminal(self, cursor: &[usize]) -> bool {
        match self {
            Boundary::FreeEnds => cursor.iter().any(|&c| c == 0),
            Boundary::Global => cursor.iter().all(|&c| c == 0),
        }
    }

    fn floor(self) -> Option<Score> {
        match self {
            Boundary::FreeEnds => Some(0),
            Boundary::Global => None,
        }
    }
}

/// Memo table backing the recursive strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableLayout {
    #[default]
    Dense,
    Sparse,
}

/// Solver options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub strategy: Strategy,
    pub boundary: Boundary,
    /// Only honoured by the recursive strategy; bottom-up sweeps fill every cell
    pub layout: TableLayout,
    /// Upper bound on dense table cells
    pub max_cells: usize,
    /// Upper bound on recursion depth for the recursive strategy
    pub max_depth: usize,
    /// Optional cap on evaluated cursor tuples
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_evaluations: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Recursive,
            boundary: Boundary::FreeEnds,
            layout: TableLayout::Dense,
            max_cells: 1 << 26,
            max_depth: 10_000,
            max_evaluations: None,
        }
    }
}

/// Outcome of one solve, with the counters gathered along the way
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveReport {
    /// Optimal score divided by the scorer scale
    pub score: f64,
    /// Optimal score in scorer units
    pub scaled_score: Score,
    pub sequences: usize,
    pub masks: usize,
    /// Cells in the full cursor space
    pub cells: usize,
    /// Table entries finalised during the search
    pub table_entries: usize,
    /// Non-terminal cursor tuples evaluated
    pub evaluated: u64,
    pub elapsed_ms: f64,
}

/// A mask together with the flat-offset step it implies
#[derive(Debug, Clone)]
struct MaskStep {
    mask: ColumnMask,
    delta: usize,
}

#[derive(Debug)]
struct Budget {
    limit: Option<u64>,
    used: u64,
}

impl Budget {
    fn new(limit: Option<u64>) -> Self {
        Self { limit, used: 0 }
    }

    fn charge(&mut self, tuples: u64) -> AlignResult<()> {
        self.used += tuples;
        match self.limit {
            Some(limit) if self.used > limit => Err(AlignError::BudgetExceeded { limit }),
            _ => Ok(()),
        }
    }
}

/// Everything one evaluation of the recurrence reads; shared by all strategies
struct Recurrence<'a, S> {
    sequences: &'a [Sequence],
    steps: &'a [MaskStep],
    scorer: &'a S,
    boundary: Boundary,
}

impl<S> Clone for Recurrence<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Recurrence<'_, S> {}

impl<S: ColumnScorer> Recurrence<'_, S> {
    /// Best score at a non-terminal `cursor`, pulling predecessor scores from
    /// `predecessor(cursor, offset)`. `cursor` is restored before returning.
    fn relax<F>(
        &self,
        cursor: &mut [usize],
        offset: usize,
        column: &mut Vec<Symbol>,
        mut predecessor: F,
    ) -> AlignResult<Score>
    where
        F: FnMut(&mut [usize], usize) -> AlignResult<Score>,
    {
        let mut best = self.boundary.floor();
        for step in self.steps {
            if !step.mask.fits(cursor) {
                continue;
            }
            step.mask.fill_column(self.sequences, cursor, column);
            let column_score = self.scorer.score_column(column);

            step.mask.retreat(cursor);
            let previous = predecessor(cursor, offset - step.delta);
            step.mask.advance(cursor);

            let candidate = previous? + column_score;
            best = Some(best.map_or(candidate, |b| b.max(candidate)));
        }
        debug_assert!(best.is_some(), "no feasible mask at cursor {cursor:?}");
        Ok(best.unwrap_or_default())
    }
}

/// Read a predecessor that a bottom-up order has already finalised
fn finalised(table: &DenseTable, offset: usize) -> Score {
    let score = table.get_at(offset);
    debug_assert!(score.is_some(), "predecessor {offset} read before it was scored");
    score.unwrap_or_default()
}

/// Memoized top-down search state
struct Search<'a, S, T> {
    rec: Recurrence<'a, S>,
    table: T,
    budget: Budget,
    max_depth: usize,
}

impl<S: ColumnScorer, T: MemoTable> Search<'_, S, T> {
    fn optimal(&mut self, cursor: &mut [usize], offset: usize, depth: usize) -> AlignResult<Score> {
        // Terminal tuples are answered directly and never stored
        if self.rec.boundary.is_terminal(cursor) {
            return Ok(0);
        }
        if let Some(score) = self.table.get_at(offset) {
            return Ok(score);
        }
        if depth >= self.max_depth {
            return Err(AlignError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        self.budget.charge(1)?;

        let rec = self.rec;
        let mut column = Vec::with_capacity(cursor.len());
        let best = rec.relax(cursor, offset, &mut column, |prev, prev_offset| {
            self.optimal(prev, prev_offset, depth + 1)
        })?;

        self.table.set_at(offset, best);
        Ok(best)
    }
}

/// Exact N-ary alignment solver over a swappable column scorer
#[derive(Debug, Clone)]
pub struct Solver<S = SumOfPairs> {
    scorer: S,
    config: SolverConfig,
}

impl Solver<SumOfPairs> {
    pub fn new(config: SolverConfig) -> Self {
        Self::with_scorer(SumOfPairs::default(), config)
    }
}

impl Default for Solver<SumOfPairs> {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl<S: ColumnScorer> Solver<S> {
    pub fn with_scorer(scorer: S, config: SolverConfig) -> Self {
        Self { scorer, config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Optimal score, divided by the scorer scale
    pub fn solve(&self, sequences: &[Sequence]) -> AlignResult<f64> {
        Ok(self.solve_report(sequences)?.score)
    }

    /// Optimal score in scorer units, before the scale is removed
    pub fn solve_scaled(&self, sequences: &[Sequence]) -> AlignResult<Score> {
        Ok(self.solve_report(sequences)?.scaled_score)
    }

    pub fn solve_report(&self, sequences: &[Sequence]) -> AlignResult<SolveReport> {
        self.validate(sequences)?;
        let start = Instant::now();

        let shape = Shape::new(sequences.iter().map(|s| s.len() + 1).collect())?;
        let steps: Vec<MaskStep> = generate_masks(sequences.len())
            .into_iter()
            .map(|mask| {
                let delta = mask.offset_delta(&shape);
                MaskStep { mask, delta }
            })
            .collect();

        log::info!(
            "Solving {} sequences (lengths {:?}) with {:?} strategy: {} masks, {} cells",
            sequences.len(),
            sequences.iter().map(Sequence::len).collect::<Vec<_>>(),
            self.config.strategy,
            steps.len(),
            shape.cells()
        );

        let rec = Recurrence {
            sequences,
            steps: &steps,
            scorer: &self.scorer,
            boundary: self.config.boundary,
        };
        let mut budget = Budget::new(self.config.max_evaluations);
        let cells = shape.cells();

        let (scaled_score, table_entries) = match self.config.strategy {
            Strategy::Recursive => match self.config.layout {
                TableLayout::Dense => {
                    let table = DenseTable::new(shape, self.config.max_cells)?;
                    self.run_recursive(rec, table, &mut budget)?
                }
                TableLayout::Sparse => {
                    self.run_recursive(rec, SparseTable::new(shape), &mut budget)?
                }
            },
            Strategy::Iterative => {
                self.warn_sparse_ignored();
                let mut table = DenseTable::new(shape, self.config.max_cells)?;
                let score = sweep(rec, &mut table, &mut budget)?;
                (score, table.computed())
            }
            Strategy::Parallel => {
                self.warn_sparse_ignored();
                let mut table = DenseTable::new(shape, self.config.max_cells)?;
                let score = wavefront(rec, &mut table, &mut budget)?;
                (score, table.computed())
            }
        };

        let score = f64::from(scaled_score) / f64::from(self.scorer.scale());
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        log::info!(
            "Optimal score {} ({} scaled), {} tuples evaluated in {:.2} ms",
            score,
            scaled_score,
            budget.used,
            elapsed_ms
        );

        Ok(SolveReport {
            score,
            scaled_score,
            sequences: sequences.len(),
            masks: steps.len(),
            cells,
            table_entries,
            evaluated: budget.used,
            elapsed_ms,
        })
    }

    fn validate(&self, sequences: &[Sequence]) -> AlignResult<()> {
        if sequences.is_empty() {
            return Err(AlignError::invalid_input("at least one sequence is required"));
        }
        if sequences.len() > MAX_SEQUENCES {
            return Err(AlignError::invalid_input(format!(
                "{} sequences exceeds the maximum of {}",
                sequences.len(),
                MAX_SEQUENCES
            )));
        }
        if self.scorer.scale() <= 0 {
            return Err(AlignError::invalid_input(format!(
                "score scale must be positive, got {}",
                self.scorer.scale()
            )));
        }
        Ok(())
    }

    fn warn_sparse_ignored(&self) {
        if self.config.layout == TableLayout::Sparse {
            log::warn!(
                "{:?} strategy fills every cell; using a dense table instead of the sparse layout",
                self.config.strategy
            );
        }
    }

    /// Runs the memoized search on its own thread, with a stack sized for `max_depth`
    fn run_recursive<T: MemoTable + Send>(
        &self,
        rec: Recurrence<'_, S>,
        table: T,
        budget: &mut Budget,
    ) -> AlignResult<(Score, usize)> {
        let mut cursor: Vec<usize> = rec.sequences.iter().map(Sequence::len).collect();
        let offset = table.shape().offset(&cursor);

        let mut search = Search {
            rec,
            table,
            budget: Budget::new(budget.limit),
            max_depth: self.config.max_depth,
        };
        let stack_size = search_stack_size(self.config.max_depth);
        log::debug!(
            "Recursive search thread: {} KiB stack for depth {}",
            stack_size >> 10,
            self.config.max_depth
        );

        let (result, used, entries) = std::thread::scope(|scope| -> AlignResult<_> {
            let handle = std::thread::Builder::new()
                .name("nmsa-search".to_string())
                .stack_size(stack_size)
                .spawn_scoped(scope, move || {
                    let result = search.optimal(&mut cursor, offset, 0);
                    (result, search.budget.used, search.table.computed())
                })?;
            match handle.join() {
                Ok(outcome) => Ok(outcome),
                Err(payload) => std::panic::resume_unwind(payload),
            }
        })?;
        budget.used = used;

        Ok((result?, entries))
    }
}

/// Stack bytes reserved per recursion level; covers unoptimised builds
const STACK_BYTES_PER_LEVEL: usize = 8 << 10;
const BASE_STACK_BYTES: usize = 1 << 20;

fn search_stack_size(max_depth: usize) -> usize {
    max_depth
        .saturating_mul(STACK_BYTES_PER_LEVEL)
        .saturating_add(BASE_STACK_BYTES)
}

/// Bottom-up sweep in increasing flat-offset order
fn sweep<S: ColumnScorer>(
    rec: Recurrence<'_, S>,
    table: &mut DenseTable,
    budget: &mut Budget,
) -> AlignResult<Score> {
    let shape = table.shape().clone();
    let mut cursor = vec![0; shape.rank()];
    let mut column = Vec::with_capacity(shape.rank());
    let mut offset = 0;

    loop {
        let score = if rec.boundary.is_terminal(&cursor) {
            0
        } else {
            budget.charge(1)?;
            let frozen: &DenseTable = table;
            rec.relax(&mut cursor, offset, &mut column, |_, prev| {
                Ok(finalised(frozen, prev))
            })?
        };
        table.set_at(offset, score);

        if !shape.step(&mut cursor) {
            break;
        }
        offset += 1;
    }

    Ok(finalised(table, shape.cells() - 1))
}

/// Bottom-up wavefront: all tuples with the same cursor sum are independent
fn wavefront<S: ColumnScorer>(
    rec: Recurrence<'_, S>,
    table: &mut DenseTable,
    budget: &mut Budget,
) -> AlignResult<Score> {
    let shape = table.shape().clone();
    let depth: usize = shape.dims().iter().map(|d| d - 1).sum();

    // Terminal tuples are settled up front; the rest are bucketed by cursor sum
    let mut levels: Vec<Vec<usize>> = vec![Vec::new(); depth + 1];
    let mut cursor = vec![0; shape.rank()];
    let mut offset = 0;
    loop {
        if rec.boundary.is_terminal(&cursor) {
            table.set_at(offset, 0);
        } else {
            levels[cursor.iter().sum::<usize>()].push(offset);
        }
        if !shape.step(&mut cursor) {
            break;
        }
        offset += 1;
    }

    for (level, offsets) in levels.iter().enumerate().filter(|(_, o)| !o.is_empty()) {
        budget.charge(offsets.len() as u64)?;
        log::debug!("Wavefront level {}: {} tuples", level, offsets.len());

        let frozen: &DenseTable = table;
        let scored = offsets
            .par_iter()
            .map_init(
                || Vec::with_capacity(shape.rank()),
                |column, &offset| {
                    let mut cursor = shape.cursor(offset);
                    let score = rec.relax(&mut cursor, offset, column, |_, prev| {
                        Ok(finalised(frozen, prev))
                    })?;
                    Ok::<_, AlignError>((offset, score))
                },
            )
            .collect::<AlignResult<Vec<(usize, Score)>>>()?;

        for (offset, score) in scored {
            table.set_at(offset, score);
        }
    }

    Ok(finalised(table, shape.cells() - 1))
}

/// Optimal alignment score of raw nucleotide strings under the default scorer
/// and solver configuration
pub fn solve<S: AsRef<str>>(raws: &[S]) -> AlignResult<f64> {
    Solver::new(SolverConfig::default()).solve(&Sequence::encode_all(raws))
}
