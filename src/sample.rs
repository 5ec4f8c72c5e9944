//! Deterministic stride sampling with residual capture.
//!
//! Every `step`-th arriving record is routed to the target file until
//! `total_count` records have been fetched; every other record, and every
//! record after the cap, lands in a residual file next to the source. The
//! residual is renamed once the scan completes so its filename carries its
//! final row count, `{base}_residual_{count}{ext}`.

use crate::io::{RecordReader, RecordWriter};
use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Counters reported by [`sample_stride`].
#[derive(Debug, Clone, Serialize)]
pub struct SampleReport {
    /// Records routed to the target (at most `total_count`).
    pub sampled: u64,
    /// Records routed to the residual file.
    pub residual_rows: u64,
    /// The target path.
    pub target: PathBuf,
    /// The residual path, with the row count embedded.
    pub residual: PathBuf,
}

/// Sample every `step`-th record of `source` into `target`, capped at
/// `total_count`; everything else is preserved in a residual file derived
/// from the source path.
///
/// The arrival counter only advances while the cap has not been reached, so
/// the sample is exactly "every `step`-th arrival, up to `total_count`";
/// records arriving after the cap all go to the residual.
///
/// # Errors
/// Fails before touching any file when `total_count` or `step` is zero;
/// otherwise returns an error on unreadable input or unwritable output.
pub fn sample_stride(
    source: impl AsRef<Path>,
    target: impl AsRef<Path>,
    total_count: u64,
    step: u64,
) -> Result<SampleReport> {
    if total_count == 0 {
        bail!("total_count must be at least 1");
    }
    if step == 0 {
        bail!("step must be at least 1");
    }

    let source = source.as_ref();
    let (base, ext) = base_and_ext(source);
    let pending = PathBuf::from(format!("{base}_residual{ext}"));

    let mut target_w = RecordWriter::create(target)?;
    let mut residual_w = RecordWriter::create(&pending)?;
    let mut arrivals: u64 = 0;
    let mut fetched: u64 = 0;
    for rec in RecordReader::open(source)? {
        let rec = rec?;
        if fetched >= total_count {
            residual_w.write(&rec)?;
            continue;
        }
        arrivals += 1;
        if arrivals % step == 0 {
            target_w.write(&rec)?;
            fetched += 1;
        } else {
            residual_w.write(&rec)?;
        }
    }

    let sampled = target_w.rows_written();
    let residual_rows = residual_w.rows_written();
    target_w.close()?;
    residual_w.close()?;

    let residual = PathBuf::from(format!("{base}_residual_{residual_rows}{ext}"));
    fs::rename(&pending, &residual).with_context(|| {
        format!(
            "rename {} to {}",
            pending.display(),
            residual.display()
        )
    })?;

    Ok(SampleReport {
        sampled,
        residual_rows,
        target: target_w.path().to_path_buf(),
        residual,
    })
}

/// Split a path into everything before the extension and the dotted
/// extension (empty when the path has none).
fn base_and_ext(path: &Path) -> (String, String) {
    let full = path.to_string_lossy().into_owned();
    match path.extension() {
        Some(ext) => {
            let ext = format!(".{}", ext.to_string_lossy());
            let base = full
                .strip_suffix(ext.as_str())
                .unwrap_or(full.as_str())
                .to_string();
            (base, ext)
        }
        None => (full, String::new()),
    }
}
