//! Fixtures for building and inspecting small delimited files in tests.
//!
//! Kept in the library (rather than a test-only module) so integration tests
//! and downstream crates can share the same default-dialect plumbing the
//! operations themselves use.

use crate::io::{RecordReader, RecordWriter};
use anyhow::Result;
use csv::StringRecord;
use std::path::Path;

/// Write literal `rows` to `path`, one record per row.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn write_rows(path: impl AsRef<Path>, rows: &[&[&str]]) -> Result<()> {
    let mut writer = RecordWriter::create(path)?;
    for row in rows {
        let rec: StringRecord = row.iter().copied().collect();
        writer.write(&rec)?;
    }
    writer.close()
}

/// Write `n` rows of the shape `{i},name-{i},{i * 10}`.
///
/// Handy for size-driven tests (splitting, interleaving, sampling) where the
/// content only needs to be distinguishable per row.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn write_numbered(path: impl AsRef<Path>, n: u64) -> Result<()> {
    let mut writer = RecordWriter::create(path)?;
    for i in 0..n {
        let rec: StringRecord = [i.to_string(), format!("name-{i}"), (i * 10).to_string()]
            .iter()
            .collect();
        writer.write(&rec)?;
    }
    writer.close()
}

/// Read `path` back as a vector of field vectors.
///
/// # Errors
/// Returns an error if the file cannot be opened or a record fails to parse.
pub fn read_rows(path: impl AsRef<Path>) -> Result<Vec<Vec<String>>> {
    RecordReader::open(path)?
        .map(|rec| rec.map(|r| r.iter().map(str::to_string).collect()))
        .collect()
}
