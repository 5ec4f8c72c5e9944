//! Record stream reader/writer over comma-delimited files.
//!
//! This module provides:
//! - **Lazy sequential reading**: [`RecordReader`] iterates records one at a
//!   time without materializing the file
//! - **Scoped buffered writing**: [`RecordWriter`] flushes and releases its
//!   handle exactly once, on every exit path
//! - **Row counting**: [`count_rows`] performs the single linear pre-pass the
//!   stride-merge operations need
//!
//! # Design notes
//! - Everything speaks the default CSV dialect with no header row; header
//!   handling belongs to the spreadsheet collaborators, not this layer.
//! - Readers are forward-only and finite; restarting a scan means reopening.
//! - Record parse errors are annotated with row numbers for easier debugging.

use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, WriterBuilder};
use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

/// Write-side buffer capacity in bytes when none is given.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8192;

/// Lazy, forward-only reader over one delimited file.
///
/// Iterating yields `Result<StringRecord>`; the stream is finite and cannot
/// be rewound. Rows may have differing field counts.
pub struct RecordReader {
    path: PathBuf,
    rows: u64,
    inner: StringRecordsIntoIter<File>,
}

impl std::fmt::Debug for RecordReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordReader")
            .field("path", &self.path)
            .field("rows", &self.rows)
            .finish()
    }
}

impl RecordReader {
    /// Open `path` for sequential record reading.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let f = File::open(&path).with_context(|| format!("open {}", path.display()))?;
        let inner = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(f)
            .into_records();
        Ok(Self {
            path,
            rows: 0,
            inner,
        })
    }

    /// The path this reader was opened on.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Iterator for RecordReader {
    type Item = Result<StringRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let rec = self.inner.next()?;
        self.rows += 1;
        Some(rec.with_context(|| {
            format!("parse CSV record #{} in {}", self.rows, self.path.display())
        }))
    }
}

/// Buffered writer for one delimited output file.
///
/// The writer is a scoped resource: [`close`](RecordWriter::close) flushes and
/// releases the handle exactly once, and `Drop` performs the same flush as a
/// backstop if the caller never closed explicitly. Writing after close is an
/// error rather than a silent reopen.
pub struct RecordWriter {
    path: PathBuf,
    rows: u64,
    inner: Option<csv::Writer<File>>,
}

impl RecordWriter {
    /// Create (truncating) `path` with the default buffer capacity.
    ///
    /// Parent directories are created if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the file or its parent directories cannot be
    /// created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::create_with_capacity(path, DEFAULT_BUFFER_CAPACITY)
    }

    /// Create (truncating) `path` with an explicit buffer capacity in bytes.
    ///
    /// # Errors
    /// See [`create`](RecordWriter::create).
    pub fn create_with_capacity(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
        }
        let f = File::create(&path).with_context(|| format!("create {}", path.display()))?;
        let inner = WriterBuilder::new()
            .has_headers(false)
            .buffer_capacity(capacity)
            .from_writer(f);
        Ok(Self {
            path,
            rows: 0,
            inner: Some(inner),
        })
    }

    /// Append one record.
    ///
    /// # Errors
    /// Returns an error on I/O failure or if the writer was already closed.
    pub fn write(&mut self, record: &StringRecord) -> Result<()> {
        let Some(w) = self.inner.as_mut() else {
            bail!("write to closed writer {}", self.path.display());
        };
        w.write_record(record)
            .with_context(|| format!("write record to {}", self.path.display()))?;
        self.rows += 1;
        Ok(())
    }

    /// Force buffered records to durable storage.
    ///
    /// # Errors
    /// Returns an error on I/O failure or if the writer was already closed.
    pub fn flush(&mut self) -> Result<()> {
        let Some(w) = self.inner.as_mut() else {
            bail!("flush of closed writer {}", self.path.display());
        };
        w.flush()
            .with_context(|| format!("flush {}", self.path.display()))
    }

    /// Flush and release the handle. Idempotent: a second close is a no-op.
    ///
    /// # Errors
    /// Returns an error if the final flush fails.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut w) = self.inner.take() {
            w.flush()
                .with_context(|| format!("flush {} on close", self.path.display()))?;
        }
        Ok(())
    }

    /// Number of records written so far.
    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    /// The path this writer was created on.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RecordWriter {
    fn drop(&mut self) {
        // Prior rows are already durable once flushed; a failure here only
        // warns.
        if let Some(mut w) = self.inner.take()
            && let Err(e) = w.flush()
        {
            eprintln!("ironsift: flush {} on drop: {e}", self.path.display());
        }
    }
}

/// Extract the 0-based `key` column from `record`.
///
/// # Errors
/// Returns an error when the record has fewer than `key + 1` fields; callers
/// annotate with row number and path.
pub fn key_field(record: &StringRecord, key: usize) -> Result<&str> {
    record.get(key).ok_or_else(|| {
        anyhow::anyhow!(
            "key column {} missing (record has {} fields)",
            key,
            record.len()
        )
    })
}

/// Count the records in `path` with one linear pass.
///
/// # Errors
/// Returns an error if the file cannot be opened or a record fails to parse.
pub fn count_rows(path: impl AsRef<Path>) -> Result<u64> {
    let mut n: u64 = 0;
    for rec in RecordReader::open(path)? {
        rec?;
        n += 1;
    }
    Ok(n)
}
