//! Randomized reshuffling, in memory or via disk-backed bucketing.
//!
//! Two regimes:
//! - [`shuffle_in_memory`]: materialize every record, apply a uniform
//!   Fisher–Yates permutation, write back out. Valid only when the file fits
//!   in memory. An optional seed makes the permutation reproducible.
//! - [`shuffle_bucketed`]: route each record to one of a small, fixed set of
//!   bucket files keyed by a fixed-length prefix of a hash-valued key column.
//!   Assignment depends only on the prefix, never on arrival order, so
//!   records sharing a prefix co-locate regardless of scan order; that
//!   bounded partitioning is what lets the technique scale past memory.
//!
//! Bucketing guarantees prefix partitioning only. True global randomness
//! needs a second pass: randomize the bucket concatenation order, or shuffle
//! each bucket in memory (they are small enough by construction).

use crate::io::{RecordReader, RecordWriter};
use anyhow::{Result, bail};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Expected key-field length; anything else is treated as malformed.
pub const HASH_KEY_LEN: usize = 32;

/// Key-prefix length used for bucket assignment.
pub const BUCKET_PREFIX_LEN: usize = 2;

/// Counters and paths reported by [`shuffle_bucketed`].
#[derive(Debug, Clone, Serialize)]
pub struct BucketReport {
    /// Records read from the source.
    pub input_rows: u64,
    /// Records routed to a bucket.
    pub bucketed_rows: u64,
    /// Records dropped because their key field was missing or malformed.
    pub skipped: u64,
    /// Bucket file paths, sorted for deterministic reporting.
    pub buckets: Vec<PathBuf>,
}

/// Materialize `source`, permute it uniformly at random, and write the
/// permuted order to `out`.
///
/// With `Some(seed)` the permutation is reproducible; with `None` the RNG is
/// seeded from entropy. Every permutation is equally likely either way.
///
/// # Returns
/// The number of records written.
///
/// # Errors
/// Returns an error on unreadable input or unwritable output.
pub fn shuffle_in_memory(
    source: impl AsRef<Path>,
    out: impl AsRef<Path>,
    seed: Option<u64>,
) -> Result<u64> {
    let mut rows = RecordReader::open(source)?.collect::<Result<Vec<_>>>()?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    rows.shuffle(&mut rng);

    let mut writer = RecordWriter::create(out)?;
    for rec in &rows {
        writer.write(rec)?;
    }
    writer.close()?;
    Ok(rows.len() as u64)
}

/// Partition `source` into `{dir}/group/{prefix}.csv` bucket files keyed by
/// the first `prefix_len` characters of the `key` column.
///
/// A record whose key field is missing or whose length differs from
/// `key_len` is skipped and counted, never bucketed. One writer is held per
/// distinct bucket; the bucket alphabet is fixed and small, so no eviction
/// window is needed here.
///
/// # Errors
/// Fails before touching any file when `prefix_len` is zero or exceeds
/// `key_len`; otherwise returns an error on unreadable input or unwritable
/// output.
pub fn shuffle_bucketed(
    source: impl AsRef<Path>,
    dir: impl AsRef<Path>,
    key: usize,
    key_len: usize,
    prefix_len: usize,
) -> Result<BucketReport> {
    if prefix_len == 0 || prefix_len > key_len {
        bail!("prefix_len must be in 1..={key_len}");
    }

    let group = dir.as_ref().join("group");
    let mut writers = HashMap::<String, RecordWriter>::new();
    let mut input_rows: u64 = 0;
    let mut skipped: u64 = 0;
    for rec in RecordReader::open(source)? {
        let rec = rec?;
        input_rows += 1;
        let prefix = match rec.get(key) {
            Some(k) if k.len() == key_len && k.is_char_boundary(prefix_len) => &k[..prefix_len],
            _ => {
                skipped += 1;
                continue;
            }
        };
        if !writers.contains_key(prefix) {
            let writer = RecordWriter::create(group.join(format!("{prefix}.csv")))?;
            writers.insert(prefix.to_string(), writer);
        }
        writers
            .get_mut(prefix)
            .expect("bucket writer just ensured")
            .write(&rec)?;
    }

    let mut buckets = Vec::with_capacity(writers.len());
    for (_, mut writer) in writers.drain() {
        writer.close()?;
        buckets.push(writer.path().to_path_buf());
    }
    buckets.sort();

    Ok(BucketReport {
        input_rows,
        bucketed_rows: input_rows - skipped,
        skipped,
        buckets,
    })
}
