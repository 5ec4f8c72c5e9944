//! Anti-join filtering across two or many files, in three size regimes.
//!
//! Every strategy here computes the same subtraction — records of a
//! designated *source* whose key is absent from a designated *filter* —
//! keyed on a caller-chosen column, with last-record-wins on duplicate keys
//! within a single file. The strategies differ only in which side is
//! materialized in memory:
//!
//! - [`subtract_small_source`]: source fits in memory, filter is streamed
//! - [`subtract_small_filter`]: filter fits in memory, source is streamed
//! - [`subtract_many_filters`]: source in memory, several filters streamed in
//!   turn (the result subtracts their union)
//! - [`subtract_sharded`]: source too large to materialize even once; the
//!   splitter caps each shard at a configured row count, the small-source
//!   strategy runs per shard, and the per-shard results are concatenated
//!
//! # Design notes
//! - This is a subtraction, not an intersection: an empty filter leaves the
//!   source unchanged.
//! - Map-based strategies emit surviving records in first-seen key order, so
//!   output is deterministic; the seen-key order is tracked beside the
//!   key→record map rather than inside it.

use crate::io::{RecordReader, RecordWriter, key_field};
use crate::split::{concat, split_by_size};
use anyhow::{Context, Result};
use csv::StringRecord;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Row cap per shard when subtracting a source too large to materialize.
pub const DEFAULT_SHARD_ROWS: u64 = 5_000_000;

/// Counters reported by every subtraction strategy.
#[derive(Debug, Clone, Serialize)]
pub struct SubtractReport {
    /// Physical records read from the source file.
    pub input_rows: u64,
    /// Matches removed by the filter side. Map-based strategies count
    /// distinct keys removed; streaming strategies count rows dropped.
    pub removed: u64,
    /// Records written to the output.
    pub output_rows: u64,
    /// The output path.
    pub output: PathBuf,
}

/// Materialize `source` into a key→record map, then stream `filter` once,
/// deleting every key it mentions; survivors are written to `out`.
///
/// Duplicate source keys collapse to the last record seen. Survivors are
/// emitted in the order their key first appeared in the source.
///
/// # Errors
/// Returns an error on unreadable input, unwritable output, or a record
/// missing the key column.
pub fn subtract_small_source(
    source: impl AsRef<Path>,
    filter: impl AsRef<Path>,
    key: usize,
    out: impl AsRef<Path>,
) -> Result<SubtractReport> {
    let (mut by_key, order, input_rows) = load_keyed(source.as_ref(), key)?;
    let removed = drain_matches(filter.as_ref(), key, &mut by_key)?;
    write_survivors(&by_key, &order, input_rows, removed, out)
}

/// Materialize the `filter` file's keys into a set, then stream `source`
/// once, writing every record whose key is absent from the set to `out`.
///
/// Output order is source order; duplicate source keys are all emitted or all
/// dropped together, since membership is decided per row.
///
/// # Errors
/// Returns an error on unreadable input, unwritable output, or a record
/// missing the key column.
pub fn subtract_small_filter(
    source: impl AsRef<Path>,
    filter: impl AsRef<Path>,
    key: usize,
    out: impl AsRef<Path>,
) -> Result<SubtractReport> {
    let filter = filter.as_ref();
    let mut filter_keys = HashSet::<String>::new();
    for (row, rec) in RecordReader::open(filter)?.enumerate() {
        let rec = rec?;
        let k = field_at(&rec, key, row, filter)?;
        filter_keys.insert(k.to_string());
    }

    let source = source.as_ref();
    let mut writer = RecordWriter::create(out)?;
    let mut input_rows: u64 = 0;
    let mut removed: u64 = 0;
    for (row, rec) in RecordReader::open(source)?.enumerate() {
        let rec = rec?;
        input_rows += 1;
        if filter_keys.contains(field_at(&rec, key, row, source)?) {
            removed += 1;
        } else {
            writer.write(&rec)?;
        }
    }
    let output_rows = writer.rows_written();
    writer.close()?;
    Ok(SubtractReport {
        input_rows,
        removed,
        output_rows,
        output: writer.path().to_path_buf(),
    })
}

/// Materialize `source` into a key→record map, then stream each filter file
/// in turn, cumulatively deleting matched keys; survivors of the union of all
/// filters are written to `out` after the last one.
///
/// # Errors
/// Returns an error on unreadable input, unwritable output, or a record
/// missing the key column.
pub fn subtract_many_filters<P: AsRef<Path>>(
    source: impl AsRef<Path>,
    filters: &[P],
    key: usize,
    out: impl AsRef<Path>,
) -> Result<SubtractReport> {
    let (mut by_key, order, input_rows) = load_keyed(source.as_ref(), key)?;
    let mut removed: u64 = 0;
    for filter in filters {
        removed += drain_matches(filter.as_ref(), key, &mut by_key)?;
    }
    write_survivors(&by_key, &order, input_rows, removed, out)
}

/// Subtract `filter` from a source too large to materialize even once.
///
/// The source is first split into shards of at most `rows_per_shard` records
/// under `work_dir`, the small-source strategy runs per shard, and the
/// per-shard results are concatenated into `out`. Every intermediate file is
/// deleted on success; on failure they are left behind for inspection, since
/// partial outputs are not resumable anyway.
///
/// # Errors
/// Returns an error if splitting, any per-shard subtraction, concatenation,
/// or intermediate cleanup fails.
pub fn subtract_sharded(
    source: impl AsRef<Path>,
    filter: impl AsRef<Path>,
    key: usize,
    out: impl AsRef<Path>,
    rows_per_shard: u64,
    work_dir: impl AsRef<Path>,
) -> Result<SubtractReport> {
    let work_dir = work_dir.as_ref();
    fs::create_dir_all(work_dir).with_context(|| format!("mkdir -p {}", work_dir.display()))?;

    let split = split_by_size(
        source,
        work_dir.join("part"),
        rows_per_shard,
        "csv",
        crate::pool::DEFAULT_WINDOW,
    )?;

    let filter = filter.as_ref();
    let mut removed: u64 = 0;
    let mut pieces = Vec::with_capacity(split.shards.len());
    for (i, shard) in split.shards.iter().enumerate() {
        let piece = work_dir.join(format!("part-sub-{i}.csv"));
        let report = subtract_small_source(shard, filter, key, &piece)?;
        removed += report.removed;
        pieces.push(piece);
    }

    let output_rows = concat(&pieces, out.as_ref())?;

    for path in split.shards.iter().chain(pieces.iter()) {
        fs::remove_file(path).with_context(|| format!("remove {}", path.display()))?;
    }

    Ok(SubtractReport {
        input_rows: split.rows,
        removed,
        output_rows,
        output: out.as_ref().to_path_buf(),
    })
}

/// Key lookup with row/path context for error messages.
fn field_at<'r>(rec: &'r StringRecord, key: usize, row: usize, path: &Path) -> Result<&'r str> {
    key_field(rec, key).with_context(|| format!("record #{} in {}", row + 1, path.display()))
}

/// Read `source` into a key→record map (last record wins per key) plus the
/// first-seen key order used for deterministic emission.
fn load_keyed(
    source: &Path,
    key: usize,
) -> Result<(HashMap<String, StringRecord>, Vec<String>, u64)> {
    let mut by_key = HashMap::<String, StringRecord>::new();
    let mut order = Vec::<String>::new();
    let mut input_rows: u64 = 0;
    for (row, rec) in RecordReader::open(source)?.enumerate() {
        let rec = rec?;
        input_rows += 1;
        let k = field_at(&rec, key, row, source)?.to_string();
        if by_key.insert(k.clone(), rec).is_none() {
            order.push(k);
        }
    }
    Ok((by_key, order, input_rows))
}

/// Stream one filter file, removing every key it mentions from `by_key`.
/// Returns the number of distinct keys removed.
fn drain_matches(
    filter: &Path,
    key: usize,
    by_key: &mut HashMap<String, StringRecord>,
) -> Result<u64> {
    let mut removed: u64 = 0;
    for (row, rec) in RecordReader::open(filter)?.enumerate() {
        let rec = rec?;
        if by_key.remove(field_at(&rec, key, row, filter)?).is_some() {
            removed += 1;
        }
    }
    Ok(removed)
}

/// Emit the surviving entries of a keyed map in first-seen key order.
fn write_survivors(
    by_key: &HashMap<String, StringRecord>,
    order: &[String],
    input_rows: u64,
    removed: u64,
    out: impl AsRef<Path>,
) -> Result<SubtractReport> {
    let mut writer = RecordWriter::create(out)?;
    for k in order {
        if let Some(rec) = by_key.get(k) {
            writer.write(rec)?;
        }
    }
    let output_rows = writer.rows_written();
    writer.close()?;
    Ok(SubtractReport {
        input_rows,
        removed,
        output_rows,
        output: writer.path().to_path_buf(),
    })
}
