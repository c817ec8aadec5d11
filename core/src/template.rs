//! Template loading.
//!
//! Templates are a JSON-lines file, one object per line. Template
//! correctness is a precondition of a run: any bad line aborts the
//! load rather than being skipped.

use crate::{
    error::{GenError, GenResult},
    record::Record,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Load every template record from a JSON-lines file.
pub fn load_templates(path: impl AsRef<Path>) -> GenResult<Vec<Record>> {
    let path = path.as_ref();
    let label = path.display().to_string();
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => GenError::TemplateNotFound { path: label.clone() },
        _ => GenError::Io(e),
    })?;
    let templates = parse_templates(BufReader::new(file), &label)?;
    log::info!("Loaded {} template records from {label}", templates.len());
    Ok(templates)
}

/// Parse templates from any line source. Blank lines are ignored.
pub fn parse_templates<R: BufRead>(reader: R, label: &str) -> GenResult<Vec<Record>> {
    let mut templates = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line_number = index as u64 + 1;
        let line = line.map_err(|e| GenError::TemplateMalformed {
            path: label.to_string(),
            line: line_number,
            reason: e.to_string(),
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let record: Record =
            serde_json::from_str(&line).map_err(|e| GenError::TemplateMalformed {
                path: label.to_string(),
                line: line_number,
                reason: e.to_string(),
            })?;
        templates.push(record);
    }

    if templates.is_empty() {
        return Err(GenError::TemplateMalformed {
            path: label.to_string(),
            line: 0,
            reason: "no template records".to_string(),
        });
    }
    Ok(templates)
}
