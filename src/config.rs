//! Configuration file handling.
//!
//! Loads `rd_insights.toml` and merges command-line overrides into it.

use crate::cli::Args;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "rd_insights.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub charts: ChartsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// CSV file to analyse.
    #[serde(default = "default_input_path")]
    pub path: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
        }
    }
}

fn default_input_path() -> PathBuf {
    PathBuf::from("research.csv")
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory for chart images.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Open saved charts in the system viewer.
    #[serde(default)]
    pub show: bool,

    /// Write the cleaned table as CSV.
    #[serde(default)]
    pub export_cleaned: bool,

    #[serde(default = "default_cleaned_path")]
    pub cleaned_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            show: false,
            export_cleaned: false,
            cleaned_path: default_cleaned_path(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("charts")
}

fn default_cleaned_path() -> PathBuf {
    PathBuf::from("cleaned_RD_data.csv")
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartsConfig {
    /// Categories shown in the top-sectors chart.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,

    /// Pixels per figure inch.
    #[serde(default = "default_dpi")]
    pub dpi: u32,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            histogram_bins: default_histogram_bins(),
            dpi: default_dpi(),
        }
    }
}

fn default_top_n() -> usize {
    10
}

fn default_histogram_bins() -> usize {
    30
}

fn default_dpi() -> u32 {
    100
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Explicit path if given, else `rd_insights.toml` if present, else defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            info!("Using config file {}", path.display());
            return Self::load(path);
        }

        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            info!("Found {}", DEFAULT_CONFIG_FILE);
            return Self::load(local);
        }

        Ok(Self::default())
    }

    /// Apply command-line overrides.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(input) = &args.input {
            self.input.path = input.clone();
        }
        if let Some(dir) = &args.output_dir {
            self.output.dir = dir.clone();
        }
        if args.show {
            self.output.show = true;
        }
        if args.export_cleaned {
            self.output.export_cleaned = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.input.path, PathBuf::from("research.csv"));
        assert_eq!(config.output.dir, PathBuf::from("charts"));
        assert!(!config.output.export_cleaned);
        assert_eq!(config.charts.top_n, 10);
        assert_eq!(config.charts.histogram_bins, 30);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [input]
            path = "data/rd.csv"

            [charts]
            top_n = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.input.path, PathBuf::from("data/rd.csv"));
        assert_eq!(config.charts.top_n, 5);
        assert_eq!(config.charts.histogram_bins, 30);
        assert_eq!(config.output.cleaned_path, PathBuf::from("cleaned_RD_data.csv"));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(Config::from_toml("[charts]\ntop_n = \"many\"").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[output]\nshow = true").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert!(config.output.show);
    }

    #[test]
    fn test_args_override_file() {
        let mut config = Config::from_toml("[input]\npath = \"a.csv\"").unwrap();
        let args = Args::parse_from(["rd_insights", "b.csv", "--export-cleaned"]);
        config.merge_with_args(&args);
        assert_eq!(config.input.path, PathBuf::from("b.csv"));
        assert!(config.output.export_cleaned);
        assert_eq!(config.output.dir, PathBuf::from("charts"));
    }
}
