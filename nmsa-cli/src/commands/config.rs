//! Config command implementation - print or write nmsa.toml

use anyhow::Result;
use std::path::PathBuf;

use crate::config::Config;

pub fn execute(config: &Config, example: bool, output: Option<PathBuf>) -> Result<()> {
    let selected = if example { Config::default() } else { config.clone() };

    match output {
        Some(path) => {
            selected.save_to_file(&path)?;
            log::info!("Wrote configuration to {}", path.display());
        }
        None => print!("{}", selected.to_toml()?),
    }

    Ok(())
}
