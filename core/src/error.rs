use crate::types::LineNumber;
use std::io;
use thiserror::Error;

/// Fatal failures of the dataset generator.
#[derive(Error, Debug)]
pub enum GenError {
    #[error("Template file '{path}' not found")]
    TemplateNotFound { path: String },

    #[error("Template file '{path}' is malformed at line {line}: {reason}")]
    TemplateMalformed {
        path: String,
        line: LineNumber,
        reason: String,
    },

    #[error("Cannot write output '{path}': {source}")]
    Output {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type GenResult<T> = Result<T, GenError>;

/// Failures and warnings of the velocity aggregator.
///
/// `LineMalformed` is only ever surfaced through the reader's warning
/// stream. It is logged and the line skipped; it never ends a run.
#[derive(Error, Debug)]
pub enum VelocityError {
    #[error("File not found: {path}")]
    SourceNotFound { path: String },

    #[error("Error decoding JSON on line {line}: {source}")]
    LineMalformed {
        line: LineNumber,
        #[source]
        source: serde_json::Error,
    },

    #[error("Window of {hours} hours cannot be measured from {now}")]
    InvalidWindow { hours: i64, now: String },

    #[error("Output '{path}' is the input file")]
    OutputIsInput { path: String },

    #[error("Skipped {skipped} malformed lines, limit is {limit}")]
    TooManyMalformedLines { skipped: u64, limit: u64 },

    #[error("Cannot write output '{path}': {source}")]
    Output {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type VelocityResult<T> = Result<T, VelocityError>;
