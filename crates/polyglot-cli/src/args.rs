//! Command line arguments.

use crate::export::ExtractSettings;
use anyhow::{bail, Result};
use clap::Parser;
use polyglot_common::Locale;
use polyglot_config::ExtractConfig;
use std::path::{Path, PathBuf};

/// Writes preload scripts out of a dictionary file.
#[derive(Debug, Clone, Parser)]
#[command(name = "polyglot-extract", version, about)]
pub struct Cli {
    /// Dictionary file to read.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output directory [default: the directory of the input].
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output file name, `$` standing for the locale [default: $.js].
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Write every locale in one file.
    #[arg(short, long)]
    pub grouped: bool,

    /// Export again whenever the input changes.
    #[arg(short, long)]
    pub watch: bool,

    /// Configuration file whose `extract` section provides defaults.
    #[arg(short, long, env = "POLYGLOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Locales to export.
    pub locales: Vec<Locale>,
}

impl Cli {
    /// Combines the arguments with the `extract` configuration section;
    /// arguments win.
    pub fn settings(self, config: &ExtractConfig) -> Result<ExtractSettings> {
        let Some(input) = self.input.or_else(|| config.input.clone()) else {
            bail!("Input must be specified");
        };
        let locales = if self.locales.is_empty() {
            config.locales.clone()
        } else {
            self.locales
        };
        if locales.is_empty() {
            bail!("At least one locale must be specified");
        }
        let output = self
            .output
            .or_else(|| config.output.clone())
            .unwrap_or_else(|| input_dir(&input));
        let pattern = self.pattern.unwrap_or_else(|| config.pattern.clone());
        if !pattern.contains('$') {
            bail!("Pattern {pattern:?} has no '$' to stand for the locale");
        }

        Ok(ExtractSettings {
            input,
            output,
            pattern,
            grouped: self.grouped || config.grouped,
            watch: self.watch || config.watch,
            locales,
            global: config.global.clone(),
        })
    }
}

fn input_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
