//! Configuration handling for the nmsa CLI
//!
//! Supports loading configuration from nmsa.toml files with CLI argument overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use nmsa_core::{ScoringParams, SolverConfig};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub scoring: ScoringParams,
    #[serde(default)]
    pub solver: SolverConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default number of threads for the parallel strategy
    #[serde(default = "default_threads")]
    pub threads: usize,
}

fn default_threads() -> usize { num_cpus::get() }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                let default_path = PathBuf::from("nmsa.toml");
                if default_path.exists() {
                    log::info!("Loading configuration from: nmsa.toml");
                    Self::load_from_file(&default_path)?
                } else {
                    log::debug!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_toml()?)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nmsa_core::{Boundary, Strategy};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scoring.match_score, 6);
        assert_eq!(config.scoring.scale, 2);
        assert_eq!(config.solver.strategy, Strategy::Recursive);
        assert_eq!(config.solver.boundary, Boundary::FreeEnds);
        assert!(config.general.threads > 0);
    }

    #[test]
    fn test_config_roundtrip() -> Result<()> {
        let mut config = Config::default();
        config.solver.strategy = Strategy::Parallel;
        config.solver.max_evaluations = Some(1000);
        let temp_file = NamedTempFile::new()?;

        config.save_to_file(temp_file.path())?;
        let loaded = Config::load_from_file(temp_file.path())?;

        assert_eq!(loaded.solver, config.solver);
        assert_eq!(loaded.scoring, config.scoring);
        assert_eq!(loaded.general.threads, config.general.threads);

        Ok(())
    }

    #[test]
    fn test_partial_file_uses_defaults() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "[solver]\nboundary = \"global\"\n\n[scoring]\ngap = -5")?;

        let config = Config::load(Some(temp_file.path()))?;
        assert_eq!(config.solver.boundary, Boundary::Global);
        assert_eq!(config.solver.strategy, Strategy::Recursive);
        assert_eq!(config.scoring.gap, -5);
        assert_eq!(config.scoring.match_score, 6);

        Ok(())
    }

    #[test]
    fn test_invalid_file_is_an_error() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "[solver]\nstrategy = \"greedy\"")?;
        assert!(Config::load_from_file(temp_file.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_example_toml_generation() -> Result<()> {
        let example = Config::default().to_toml()?;
        assert!(example.contains("[general]"));
        assert!(example.contains("[scoring]"));
        assert!(example.contains("[solver]"));
        assert!(example.contains("free-ends"));
        Ok(())
    }
}
