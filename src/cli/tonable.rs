//! Tonable command: derive the tone-eligible names from the identity map.

use crate::cli::common::{load_config, CliError, CliResult};
use crate::library::fsops::write_replacing;
use crate::tables::derive_tonable;
use clap::Args;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Derive the list of names that accept skin tones
#[derive(Debug, Clone, Args)]
pub struct TonableArgs {
    /// Write the JSON array to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

impl TonableArgs {
    /// Execute the tonable command
    pub fn execute(&self, config_path: Option<&Path>) -> CliResult<()> {
        let config = load_config(config_path)?;
        let source = &config.paths.emoji_to_name;

        let content = fs::read_to_string(source)
            .map_err(|e| CliError::io(format!("Failed to read {}: {e}", source.display())))?;
        let identities: HashMap<String, String> = serde_json::from_str(&content).map_err(|e| {
            CliError::validation(format!("Invalid identity table {}: {e}", source.display()))
        })?;

        let names: Vec<String> = derive_tonable(&identities).into_iter().collect();
        let json = serde_json::to_string_pretty(&names)
            .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?;

        match &self.out {
            Some(path) => {
                write_replacing(path, format!("{json}\n").as_bytes()).map_err(|e| {
                    CliError::io(format!("Failed to write {}: {e}", path.display()))
                })?;
                println!("{} tonable names written to {}", names.len(), path.display());
            }
            None => println!("{json}"),
        }
        Ok(())
    }
}
