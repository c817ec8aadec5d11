//! Run configuration for both passes.
//!
//! Every field has a default, so a JSON config file may name only the
//! fields it changes. Binaries layer positional args and flags on top.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_ROW_COUNT: u64 = 100_000;
pub const DEFAULT_TEMPLATE_PATH: &str = "customers.json";

pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_DATASET_PATH: &str = "customers_generated_10000_seed42.jsonl";
pub const DEFAULT_WINDOW_HOURS: i64 = 24;
/// One hundred years.
pub const MAX_WINDOW_HOURS: i64 = 24 * 366 * 100;
pub const VELOCITY_OUTPUT_PREFIX: &str = "velocity_";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// JSON-lines file of template records.
    pub template_path: PathBuf,
    /// Destination; derived from row count and seed when unset.
    pub output_path: Option<PathBuf>,
    pub seed: u64,
    pub row_count: u64,
}

impl GeneratorConfig {
    /// Load from a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        load_json(path.as_ref())
    }

    /// `customers_generated_{rows}_seed{seed}.jsonl` unless overridden.
    pub fn resolved_output_path(&self) -> PathBuf {
        self.output_path.clone().unwrap_or_else(|| {
            PathBuf::from(format!(
                "customers_generated_{}_seed{}.jsonl",
                self.row_count, self.seed
            ))
        })
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            template_path: PathBuf::from(DEFAULT_TEMPLATE_PATH),
            output_path: None,
            seed: DEFAULT_SEED,
            row_count: DEFAULT_ROW_COUNT,
        }
    }
}

/// How the aggregator treats an existing output file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Clear the output once at run start, then append batch by batch.
    #[default]
    Truncate,
    /// Keep prior content. Re-running over the same input duplicates records.
    Append,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VelocityConfig {
    pub input_path: PathBuf,
    /// Destination; `velocity_` + input file name when unset.
    pub output_path: Option<PathBuf>,
    pub batch_size: usize,
    pub write_mode: WriteMode,
    pub window_hours: i64,
    /// Abort once more than this many lines were skipped. None never aborts.
    pub max_malformed_lines: Option<u64>,
}

impl VelocityConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config: Self = load_json(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.batch_size >= 1, "batch_size must be at least 1");
        anyhow::ensure!(
            (0..=MAX_WINDOW_HOURS).contains(&self.window_hours),
            "window_hours must be between 0 and {MAX_WINDOW_HOURS}, got {}",
            self.window_hours
        );
        anyhow::ensure!(
            self.resolved_output_path() != self.input_path,
            "output path {} is the input file",
            self.input_path.display()
        );
        Ok(())
    }

    pub fn resolved_output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| derive_velocity_path(&self.input_path))
    }
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_DATASET_PATH),
            output_path: None,
            batch_size: DEFAULT_BATCH_SIZE,
            write_mode: WriteMode::Truncate,
            window_hours: DEFAULT_WINDOW_HOURS,
            max_malformed_lines: None,
        }
    }
}

/// Prefix the file name (not the directory) with `velocity_`.
pub fn derive_velocity_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{VELOCITY_OUTPUT_PREFIX}{name}"))
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
    let config = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Cannot parse {}: {e}", path.display()))?;
    Ok(config)
}
