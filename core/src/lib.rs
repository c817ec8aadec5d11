//! Synthetic linked financial records and issuer velocity features.
//!
//! Two independent passes share only the JSON-lines file format:
//! the generator writes linked records from templates under a fixed
//! seed, and the velocity pass reads them back in batches and attaches
//! per-issuer transaction counts for a trailing window.

pub mod clock;
pub mod config;
pub mod error;
pub mod generator;
pub mod identity;
pub mod jsonl;
pub mod record;
pub mod rng;
pub mod template;
pub mod types;
pub mod velocity;

pub use config::{GeneratorConfig, VelocityConfig, WriteMode};
pub use error::{GenError, GenResult, VelocityError, VelocityResult};
pub use generator::{generate_dataset, DatasetGenerator, GenerationSummary};
pub use record::Record;
pub use velocity::{run_velocity, VelocityReport, VelocityWindow};
