//! JSON-lines reading and writing for the velocity pass.
//!
//! Reading is lazy and fault-tolerant: a line that does not parse as a
//! record is yielded as a `LineMalformed` warning and the stream goes
//! on. Writing is append-only from a single writer.

use crate::{
    error::{VelocityError, VelocityResult},
    record::Record,
    types::LineNumber,
};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Lines, Write};
use std::path::Path;

/// Lazy record stream over a JSON-lines source. Blank lines are ignored.
pub struct JsonLines<R> {
    lines: Lines<R>,
    line_number: LineNumber,
}

impl<R: BufRead> JsonLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }

    pub fn line_number(&self) -> LineNumber {
        self.line_number
    }
}

impl JsonLines<BufReader<File>> {
    pub fn open(path: &Path) -> VelocityResult<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => VelocityError::SourceNotFound {
                path: path.display().to_string(),
            },
            _ => VelocityError::Io(e),
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for JsonLines<R> {
    type Item = VelocityResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line_number += 1;
            let line = match line {
                Ok(line) => line,
                // Invalid UTF-8: the bad line is consumed, so keep going.
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    return Some(Err(VelocityError::LineMalformed {
                        line: self.line_number,
                        source: serde_json::Error::io(e),
                    }));
                }
                Err(e) => return Some(Err(VelocityError::Io(e))),
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(serde_json::from_str(&line).map_err(|source| {
                VelocityError::LineMalformed {
                    line: self.line_number,
                    source,
                }
            }));
        }
    }
}

/// Groups a record stream into batches of up to `batch_size` parsed
/// records. Malformed lines are logged, counted, and dropped.
pub struct BatchReader<R> {
    records: JsonLines<R>,
    batch_size: usize,
    skipped: u64,
    max_malformed: Option<u64>,
    done: bool,
}

impl<R: BufRead> BatchReader<R> {
    pub fn new(records: JsonLines<R>, batch_size: usize) -> Self {
        Self {
            records,
            batch_size: batch_size.max(1),
            skipped: 0,
            max_malformed: None,
            done: false,
        }
    }

    /// Escalate to `TooManyMalformedLines` once `limit` is exceeded.
    pub fn with_malformed_limit(mut self, limit: Option<u64>) -> Self {
        self.max_malformed = limit;
        self
    }

    /// Lines skipped so far.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

impl<R: BufRead> Iterator for BatchReader<R> {
    type Item = VelocityResult<Vec<Record>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut batch = Vec::with_capacity(self.batch_size);
        while batch.len() < self.batch_size {
            match self.records.next() {
                None => break,
                Some(Ok(record)) => batch.push(record),
                Some(Err(warning @ VelocityError::LineMalformed { .. })) => {
                    log::warn!("{warning}");
                    self.skipped += 1;
                    if let Some(limit) = self.max_malformed {
                        if self.skipped > limit {
                            self.done = true;
                            return Some(Err(VelocityError::TooManyMalformedLines {
                                skipped: self.skipped,
                                limit,
                            }));
                        }
                    }
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        if batch.is_empty() {
            self.done = true;
            return None;
        }
        Some(Ok(batch))
    }
}

/// Clear (or create) an output file.
pub fn truncate_output(path: &Path) -> VelocityResult<()> {
    File::create(path).map_err(|source| VelocityError::Output {
        path: path.display().to_string(),
        source,
    })?;
    Ok(())
}

/// Append records to `path`, one JSON object per line.
/// The file is opened once per call and created when missing.
pub fn append_records(path: &Path, records: &[Record]) -> VelocityResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| VelocityError::Output {
            path: path.display().to_string(),
            source,
        })?;
    let mut out = BufWriter::new(file);
    for record in records {
        writeln!(out, "{}", record.to_json_line()?)?;
    }
    out.flush()?;
    Ok(())
}
