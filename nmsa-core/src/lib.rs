//! nmsa core library
//!
//! Exact optimal sum-of-pairs scoring for small sets of nucleotide sequences,
//! with column masks, memo tables and the solver strategies that fill them.

pub mod error;
pub mod types;
pub mod scoring;
pub mod mask;
pub mod table;
pub mod solver;
pub mod io;

// Re-export commonly used types and functions
pub use error::{AlignError, AlignResult};
pub use types::{Score, Sequence, Symbol};
pub use scoring::{
    column_score, score_alignment, ColumnScorer, ScoringParams, SumOfPairs, SCORE_SCALE,
};
pub use mask::{generate_masks, ColumnMask};
pub use table::{DenseTable, MemoTable, Shape, SparseTable};
pub use solver::{
    solve, Boundary, SolveReport, Solver, SolverConfig, Strategy, TableLayout, MAX_SEQUENCES,
};

/// Version information for the nmsa core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
