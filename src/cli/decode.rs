//! Decode command: show how a vendor file name is interpreted.

use crate::cli::common::{load_config, print_json, CliError, CliResult};
use crate::codepoints::{CodepointDecoder, DecodeOptions};
use crate::pipeline::decode_options;
use crate::resolver::IdentityResolver;
use crate::tables::Tables;
use clap::Args;
use serde::Serialize;
use std::path::Path;
use tracing::warn;

/// Decode a codepoint-named file into its identity, tone and canonical name
#[derive(Debug, Clone, Args)]
pub struct DecodeArgs {
    /// File name to decode (e.g. 1f44b-1f3fd.png)
    #[arg(value_name = "FILENAME")]
    pub file_name: String,

    /// Use the naming convention of this configured set
    #[arg(long = "set", value_name = "NAME", conflicts_with_all = ["separator", "strip_prefix", "implicit_selector"])]
    pub set: Option<String>,

    /// Character between codepoints
    #[arg(long, value_name = "CHAR", default_value_t = '-')]
    pub separator: char,

    /// Prefix removed before decoding (e.g. emoji_u)
    #[arg(long, value_name = "PREFIX")]
    pub strip_prefix: Option<String>,

    /// Vendor drops U+FE0F from its file names
    #[arg(long)]
    pub implicit_selector: bool,

    /// Output result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct DecodeOutput<'a> {
    file_name: &'a str,
    identity: String,
    codepoints: Vec<String>,
    tone: Option<u8>,
    name: Option<&'a str>,
}

impl DecodeArgs {
    /// Execute the decode command
    pub fn execute(&self, config_path: Option<&Path>) -> CliResult<()> {
        let config = load_config(config_path)?;

        let options = match &self.set {
            Some(name) => {
                let set = config
                    .set(name)
                    .ok_or_else(|| CliError::validation(format!("Unknown set '{name}'")))?;
                decode_options(set).map_err(|e| CliError::validation(format!("{e:#}")))?
            }
            None => DecodeOptions {
                separator: self.separator,
                strip_prefix: self.strip_prefix.clone(),
                implicit_selector: self.implicit_selector,
            },
        };

        // Names are informational here, decoding works without tables
        let tables = Tables::load(&config.paths).unwrap_or_else(|e| {
            warn!("Lookup tables unavailable, names will not be resolved: {e:#}");
            Tables::default()
        });

        let decoded = CodepointDecoder::new(tables.fitzpatrick(), options)
            .decode(&self.file_name)
            .map_err(|e| CliError::validation(e.to_string()))?;
        let name = IdentityResolver::new(&tables).resolve(&decoded.identity, decoded.tone);

        let output = DecodeOutput {
            file_name: &self.file_name,
            identity: decoded.identity.clone(),
            codepoints: decoded
                .codepoints
                .iter()
                .map(|cp| format!("U+{cp:04X}"))
                .collect(),
            tone: decoded.tone.map(|tone| tone.get()),
            name,
        };

        if self.json {
            return print_json(&output);
        }

        println!("File:       {}", output.file_name);
        println!("Identity:   {}", output.identity);
        println!("Codepoints: {}", output.codepoints.join(" "));
        match output.tone {
            Some(level) => println!("Tone:       {level}"),
            None => println!("Tone:       none"),
        }
        match output.name {
            Some(name) => println!("Name:       {name}"),
            None => println!("Name:       (unresolved)"),
        }
        Ok(())
    }
}
