//! create-dataset: generate a deterministic synthetic dataset from templates.
//!
//! Usage:
//!   create-dataset [ROWS] [--seed 42] [--template customers.json] [--output out.jsonl]
//!   create-dataset --config generator.json

mod cli;

use anyhow::Result;
use cli::Args;
use std::path::PathBuf;
use velocity_core::{generate_dataset, GeneratorConfig};

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::from_env();
    let mut config = match args.value("--config") {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(rows) = args.positional_parsed::<u64>(0, "row count")? {
        config.row_count = rows;
    }
    if let Some(seed) = args.parsed::<u64>("--seed")? {
        config.seed = seed;
    }
    if let Some(template) = args.value("--template") {
        config.template_path = PathBuf::from(template);
    }
    if let Some(output) = args.value("--output") {
        config.output_path = Some(PathBuf::from(output));
    }

    println!("create-dataset");
    println!("  rows:      {}", config.row_count);
    println!("  seed:      {}", config.seed);
    println!("  template:  {}", config.template_path.display());
    println!("  output:    {}", config.resolved_output_path().display());
    println!();

    let summary = generate_dataset(&config).inspect_err(|e| log::error!("{e}"))?;

    println!("=== GENERATION SUMMARY ===");
    println!("  templates:  {}", summary.templates_loaded);
    println!("  rows:       {}", summary.rows_written);
    println!("  saved to:   {}", summary.output_path.display());
    Ok(())
}
