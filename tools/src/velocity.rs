//! velocity: attach per-issuer 24h transaction velocity to a dataset.
//!
//! Usage:
//!   velocity [BATCH_SIZE] [DATASET] [--output out.jsonl] [--append | --truncate]
//!            [--window-hours 24] [--max-malformed N] [--config velocity.json]

mod cli;

use anyhow::Result;
use cli::Args;
use std::path::PathBuf;
use std::time::Instant;
use velocity_core::{run_velocity, VelocityConfig, WriteMode};

fn main() -> Result<()> {
    env_logger::init();
    let started = Instant::now();

    let args = Args::from_env();
    let mut config = match args.value("--config") {
        Some(path) => VelocityConfig::load(path)?,
        None => VelocityConfig::default(),
    };
    if let Some(batch_size) = args.positional_parsed::<usize>(0, "batch size")? {
        config.batch_size = batch_size;
    }
    if let Some(dataset) = args.positional(1) {
        config.input_path = PathBuf::from(dataset);
    }
    if let Some(output) = args.value("--output") {
        config.output_path = Some(PathBuf::from(output));
    }
    if args.has("--append") {
        config.write_mode = WriteMode::Append;
    }
    if args.has("--truncate") {
        config.write_mode = WriteMode::Truncate;
    }
    if let Some(hours) = args.parsed::<i64>("--window-hours")? {
        config.window_hours = hours;
    }
    if let Some(limit) = args.parsed::<u64>("--max-malformed")? {
        config.max_malformed_lines = Some(limit);
    }
    config.validate()?;

    let now = chrono::Utc::now();
    println!("velocity");
    println!("  dataset:     {}", config.input_path.display());
    println!("  batch size:  {}", config.batch_size);
    println!("  window:      {}h ending {}", config.window_hours, now.to_rfc3339());
    println!("  write mode:  {:?}", config.write_mode);
    println!();

    let report = run_velocity(&config, now).inspect_err(|e| log::error!("{e}"))?;

    println!("=== VELOCITY SUMMARY ===");
    println!("  batches:     {}", report.batches);
    println!("  records:     {}", report.records_written);
    println!("  skipped:     {}", report.lines_skipped);
    println!("  time taken:  {:.2?}", started.elapsed());
    println!("  saved to:    {}", report.output_path.display());
    Ok(())
}
