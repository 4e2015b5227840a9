//! Align command implementation - optimal score of a sequence set

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use nmsa_core::io::read_fasta;
use nmsa_core::{
    Boundary, Sequence, SolveReport, Solver, SolverConfig, Strategy, SumOfPairs, TableLayout,
};

use crate::config::Config;
use crate::error::{CliError, CliResult};
use crate::{BoundaryType, LayoutType, StrategyType};

impl From<StrategyType> for Strategy {
    fn from(value: StrategyType) -> Self {
        match value {
            StrategyType::Recursive => Strategy::Recursive,
            StrategyType::Iterative => Strategy::Iterative,
            StrategyType::Parallel => Strategy::Parallel,
        }
    }
}

impl From<BoundaryType> for Boundary {
    fn from(value: BoundaryType) -> Self {
        match value {
            BoundaryType::FreeEnds => Boundary::FreeEnds,
            BoundaryType::Global => Boundary::Global,
        }
    }
}

impl From<LayoutType> for TableLayout {
    fn from(value: LayoutType) -> Self {
        match value {
            LayoutType::Dense => TableLayout::Dense,
            LayoutType::Sparse => TableLayout::Sparse,
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn execute(
    config: &Config,
    sequences: Vec<String>,
    fasta: Option<PathBuf>,
    strategy: Option<StrategyType>,
    boundary: Option<BoundaryType>,
    layout: Option<LayoutType>,
    max_cells: Option<usize>,
    max_evaluations: Option<u64>,
    json: bool,
) -> Result<()> {
    let sequences = collect_sequences(&sequences, fasta.as_deref())?;
    let solver_config =
        build_solver_config(config, strategy, boundary, layout, max_cells, max_evaluations);

    log::info!(
        "Aligning {} sequences with {:?} strategy, {:?} boundary",
        sequences.len(),
        solver_config.strategy,
        solver_config.boundary
    );

    let report = run(config, solver_config, &sequences)?;

    if json {
        let out = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", out);
    } else {
        println!("{}", report.score);
    }

    Ok(())
}

/// Positional sequences first, then FASTA records in file order
pub fn collect_sequences(raw: &[String], fasta: Option<&Path>) -> CliResult<Vec<Sequence>> {
    let mut sequences = Sequence::encode_all(raw);

    if let Some(path) = fasta {
        if !path.exists() {
            return Err(CliError::file_not_found(path.to_path_buf()));
        }
        let records = read_fasta(path)?;
        log::info!("Loaded {} records from {}", records.len(), path.display());
        sequences.extend(records.into_iter().map(|record| record.seq));
    }

    Ok(sequences)
}

/// Apply command-line overrides on top of the configured solver options
pub fn build_solver_config(
    config: &Config,
    strategy: Option<StrategyType>,
    boundary: Option<BoundaryType>,
    layout: Option<LayoutType>,
    max_cells: Option<usize>,
    max_evaluations: Option<u64>,
) -> SolverConfig {
    let mut solver = config.solver.clone();

    if let Some(strategy) = strategy {
        solver.strategy = strategy.into();
    }
    if let Some(boundary) = boundary {
        solver.boundary = boundary.into();
    }
    if let Some(layout) = layout {
        solver.layout = layout.into();
    }
    if let Some(max_cells) = max_cells {
        solver.max_cells = max_cells;
    }
    if max_evaluations.is_some() {
        solver.max_evaluations = max_evaluations;
    }

    solver
}

pub fn run(
    config: &Config,
    solver_config: SolverConfig,
    sequences: &[Sequence],
) -> CliResult<SolveReport> {
    config.scoring.validate()?;
    let solver = Solver::with_scorer(SumOfPairs::new(config.scoring), solver_config);
    log::debug!("Solver options: {:?}", solver.config());
    Ok(solver.solve_report(sequences)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn raw(seqs: &[&str]) -> Vec<String> {
        seqs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let config = Config::default();
        let solver = build_solver_config(
            &config,
            Some(StrategyType::Iterative),
            Some(BoundaryType::Global),
            None,
            Some(1000),
            Some(50),
        );
        assert_eq!(solver.strategy, Strategy::Iterative);
        assert_eq!(solver.boundary, Boundary::Global);
        assert_eq!(solver.layout, TableLayout::Dense);
        assert_eq!(solver.max_cells, 1000);
        assert_eq!(solver.max_evaluations, Some(50));
    }

    #[test]
    fn test_no_overrides_keep_config_values() {
        let mut config = Config::default();
        config.solver.layout = TableLayout::Sparse;
        config.solver.max_evaluations = Some(7);
        let solver = build_solver_config(&config, None, None, None, None, None);
        assert_eq!(solver, config.solver);
    }

    #[test]
    fn test_collect_from_args_and_fasta() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, ">x\nGCCAGGAGG\n>y\nAATTTTGAGG").unwrap();
        file.flush().unwrap();

        let seqs = collect_sequences(&raw(&["AATTATGG", "ACATTGTTG"]), Some(file.path())).unwrap();
        assert_eq!(seqs.len(), 4);
        assert_eq!(seqs[0].to_string(), "AATTATGG");
        assert_eq!(seqs[3].to_string(), "AATTTTGAGG");

        let config = Config::default();
        let report = run(&config, config.solver.clone(), &seqs).unwrap();
        assert_eq!(report.score, 45.0);
    }

    #[test]
    fn test_missing_fasta() {
        let err = collect_sequences(&[], Some(Path::new("/nonexistent/seqs.fa"))).unwrap_err();
        assert!(matches!(err, CliError::FileNotFound { .. }));
    }

    #[test]
    fn test_run_reports_score() {
        let config = Config::default();
        let seqs = Sequence::encode_all(&["AA", "AA", "AA", "AA"]);
        let report = run(&config, config.solver.clone(), &seqs).unwrap();
        assert_eq!(report.score, 36.0);
        assert_eq!(report.sequences, 4);
    }

    #[test]
    fn test_run_errors_map_to_cli_errors() {
        let config = Config::default();
        let err = run(&config, config.solver.clone(), &[]).unwrap_err();
        assert!(matches!(err, CliError::InvalidInput { .. }));

        let solver = build_solver_config(&config, None, None, None, None, Some(1));
        let seqs = Sequence::encode_all(&["ACGT", "ACGT"]);
        let err = run(&config, solver, &seqs).unwrap_err();
        assert!(matches!(err, CliError::Resource { .. }));
    }
}
