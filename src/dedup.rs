//! Key-based deduplication between two files.
//!
//! Subtracts the smaller file from the bigger one by key: any record of the
//! bigger file whose key column also appears in the smaller file is dropped.
//! Matching is on the extracted key only, never full-row equality, so two
//! rows that differ outside the key column still count as duplicates of each
//! other.

use crate::io::{RecordReader, RecordWriter, key_field};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Counters reported by [`dedup_by_key`].
///
/// `output_rows + duplicates` equals the bigger file's row count.
#[derive(Debug, Clone, Serialize)]
pub struct DedupReport {
    /// Records of the bigger file excluded because their key was present in
    /// the smaller file.
    pub duplicates: u64,
    /// Records written to the output.
    pub output_rows: u64,
    /// The output path.
    pub output: PathBuf,
}

/// Write `bigger` minus `smaller` (by the `key` column) to `out`.
///
/// The smaller file's keys are held in memory; the bigger file is streamed
/// once, so only one side is ever materialized.
///
/// # Errors
/// Returns an error on unreadable input, unwritable output, or a record
/// missing the key column.
pub fn dedup_by_key(
    bigger: impl AsRef<Path>,
    smaller: impl AsRef<Path>,
    key: usize,
    out: impl AsRef<Path>,
) -> Result<DedupReport> {
    let smaller = smaller.as_ref();
    let mut seen = HashSet::<String>::new();
    for (row, rec) in RecordReader::open(smaller)?.enumerate() {
        let rec = rec?;
        let k = key_field(&rec, key)
            .with_context(|| format!("record #{} in {}", row + 1, smaller.display()))?;
        seen.insert(k.to_string());
    }

    let bigger = bigger.as_ref();
    let mut writer = RecordWriter::create(out)?;
    let mut duplicates: u64 = 0;
    for (row, rec) in RecordReader::open(bigger)?.enumerate() {
        let rec = rec?;
        let k = key_field(&rec, key)
            .with_context(|| format!("record #{} in {}", row + 1, bigger.display()))?;
        if seen.contains(k) {
            duplicates += 1;
        } else {
            writer.write(&rec)?;
        }
    }
    let output_rows = writer.rows_written();
    writer.close()?;
    Ok(DedupReport {
        duplicates,
        output_rows,
        output: writer.path().to_path_buf(),
    })
}
