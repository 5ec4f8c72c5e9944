//! Deterministic stride-based merge of two record streams.
//!
//! One stream must be at least as long as the other. Both lengths are counted
//! in a linear pre-pass each, then the merge walks the bigger stream and
//! plants one littler record immediately before every `step`-th bigger
//! record, where `step = bigger_rows / littler_rows + 1`. Whatever remains of
//! the littler stream once the bigger one is exhausted is appended at the
//! tail, so every littler record appears exactly once, in its original
//! relative order.

use crate::io::{RecordReader, RecordWriter, count_rows};
use anyhow::{Result, bail};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Counters reported by [`interleave`].
#[derive(Debug, Clone, Serialize)]
pub struct InterleaveReport {
    /// Rows counted in the bigger stream.
    pub bigger_rows: u64,
    /// Rows counted in the littler stream.
    pub littler_rows: u64,
    /// Interval at which littler records were planted.
    pub step: u64,
    /// Records written (`bigger_rows + littler_rows`).
    pub output_rows: u64,
    /// The output path.
    pub output: PathBuf,
}

/// Merge `littler` into `bigger` at a fixed stride, writing to `out`.
///
/// Fails before producing any output if the bigger stream turns out to be
/// shorter than the littler one.
///
/// # Errors
/// Returns an error on the size precondition, unreadable input, or
/// unwritable output.
pub fn interleave(
    bigger: impl AsRef<Path>,
    littler: impl AsRef<Path>,
    out: impl AsRef<Path>,
) -> Result<InterleaveReport> {
    let bigger = bigger.as_ref();
    let littler = littler.as_ref();

    let bigger_rows = count_rows(bigger)?;
    let littler_rows = count_rows(littler)?;
    if bigger_rows < littler_rows {
        bail!(
            "cannot interleave: {} has {} rows but {} has {}",
            bigger.display(),
            bigger_rows,
            littler.display(),
            littler_rows
        );
    }
    let step = bigger_rows / littler_rows.max(1) + 1;

    let mut little = RecordReader::open(littler)?;
    let mut writer = RecordWriter::create(out)?;
    let mut consumed: u64 = 0;
    for rec in RecordReader::open(bigger)? {
        let rec = rec?;
        if consumed % step == 0
            && let Some(planted) = little.next()
        {
            writer.write(&planted?)?;
        }
        writer.write(&rec)?;
        consumed += 1;
    }
    // Littler records the stride never reached go to the tail.
    for rest in little {
        writer.write(&rest?)?;
    }

    let output_rows = writer.rows_written();
    writer.close()?;
    Ok(InterleaveReport {
        bigger_rows,
        littler_rows,
        step,
        output_rows,
        output: writer.path().to_path_buf(),
    })
}
