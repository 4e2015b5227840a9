//! Evaluate command implementation - score an existing gapped alignment

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use nmsa_core::io::read_fasta;
use nmsa_core::{score_alignment, Sequence, SumOfPairs};

use crate::config::Config;
use crate::error::{CliError, CliResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub rows: usize,
    pub columns: usize,
    pub score: f64,
}

pub fn execute(config: &Config, fasta: PathBuf, json: bool) -> Result<()> {
    log::info!("Scoring alignment in {}", fasta.display());
    let report = evaluate(config, &fasta)?;

    if json {
        let out = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", out);
    } else {
        println!("{}", report.score);
    }

    Ok(())
}

pub fn evaluate(config: &Config, fasta: &Path) -> CliResult<EvaluationReport> {
    if !fasta.exists() {
        return Err(CliError::file_not_found(fasta.to_path_buf()));
    }
    config.scoring.validate()?;

    let rows: Vec<Sequence> = read_fasta(fasta)?.into_iter().map(|record| record.seq).collect();
    let score = score_alignment(&SumOfPairs::new(config.scoring), &rows)?;

    Ok(EvaluationReport {
        rows: rows.len(),
        columns: rows.first().map_or(0, Sequence::len),
        score,
    })
}
