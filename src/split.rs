//! Row-count splitting and list-order concatenation.
//!
//! [`split_by_size`] partitions one stream into fixed-row-count shards through
//! the [`ShardWriterPool`], so no more than a small window of shard files is
//! ever open while scanning. [`concat`] is its inverse: written in list order,
//! flushed after each source, so concatenating the shards of a split
//! reproduces the source exactly.

use crate::io::{RecordReader, RecordWriter};
use crate::pool::ShardWriterPool;
use anyhow::{Result, bail};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Outcome of a [`split_by_size`] call.
#[derive(Debug, Clone, Serialize)]
pub struct SplitReport {
    /// Produced shard paths, in index order.
    pub shards: Vec<PathBuf>,
    /// Total records read from the source.
    pub rows: u64,
}

/// Split `source` into shards of `rows_per_shard` records each.
///
/// Shard `index = rows_seen / rows_per_shard`, so every shard except possibly
/// the last holds exactly `rows_per_shard` records, and concatenating the
/// shards in index order reproduces the source. Shards are named
/// `{prefix}-{index}.{ext}`; at most `window` shard files are open at once.
///
/// # Errors
/// Returns an error if `rows_per_shard` is zero, or on any read/write
/// failure.
pub fn split_by_size(
    source: impl AsRef<Path>,
    prefix: impl AsRef<Path>,
    rows_per_shard: u64,
    ext: &str,
    window: usize,
) -> Result<SplitReport> {
    if rows_per_shard == 0 {
        bail!("rows_per_shard must be at least 1");
    }
    let mut pool = ShardWriterPool::new(prefix, ext, window);
    let mut rows: u64 = 0;
    for rec in RecordReader::open(source)? {
        let rec = rec?;
        pool.write(rows / rows_per_shard, &rec)?;
        rows += 1;
    }
    Ok(SplitReport {
        shards: pool.finish(),
        rows,
    })
}

/// Write every record of `sources`, in list order, to `target`.
///
/// The output is flushed after each source completes, so a failure while
/// reading file `k + 1` leaves a valid, consistent prefix covering files
/// `0..=k`.
///
/// # Returns
/// The total number of records written.
///
/// # Errors
/// Returns an error if any source cannot be read or the target cannot be
/// written.
pub fn concat<P: AsRef<Path>>(sources: &[P], target: impl AsRef<Path>) -> Result<u64> {
    let mut out = RecordWriter::create(target)?;
    for path in sources {
        for rec in RecordReader::open(path)? {
            out.write(&rec?)?;
        }
        out.flush()?;
    }
    let total = out.rows_written();
    out.close()?;
    Ok(total)
}
