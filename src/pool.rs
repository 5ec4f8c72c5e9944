//! Bounded pool of shard writers with index-based eviction.
//!
//! A [`ShardWriterPool`] keeps at most `window` output files open at once
//! while a scan produces shards with monotonically increasing indices. When
//! shard `i` is first opened, shard `i - window` (if still open) is closed
//! first. Eviction is index-based, not recency-based: it relies on shards
//! being produced in strictly increasing order, which is exactly what a
//! sequential split produces.
//!
//! Writing to a shard that has already been evicted fails fast rather than
//! silently reopening the file, since a reopen would truncate rows that are
//! already durable.

use crate::io::RecordWriter;
use anyhow::{Result, bail};
use csv::StringRecord;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Simultaneously open shard writers when no window is given.
pub const DEFAULT_WINDOW: usize = 3;

/// Bounded set of open shard writers keyed by increasing shard index.
///
/// Shard files are named `{prefix}-{index}.{ext}`, index from 0, and are
/// created lazily on first write. Call [`finish`](ShardWriterPool::finish) to
/// close the trailing window and obtain the produced paths in index order.
pub struct ShardWriterPool {
    prefix: PathBuf,
    ext: String,
    window: u64,
    open: HashMap<u64, RecordWriter>,
    paths: Vec<PathBuf>,
    next_unopened: u64,
}

impl ShardWriterPool {
    /// Create a pool producing `{prefix}-{index}.{ext}` files, keeping at
    /// most `window` writers open. A zero window is treated as 1.
    pub fn new(prefix: impl AsRef<Path>, ext: &str, window: usize) -> Self {
        Self {
            prefix: prefix.as_ref().to_path_buf(),
            ext: ext.to_string(),
            window: window.max(1) as u64,
            open: HashMap::new(),
            paths: Vec::new(),
            next_unopened: 0,
        }
    }

    /// The file path for shard `index`.
    pub fn shard_path(&self, index: u64) -> PathBuf {
        PathBuf::from(format!("{}-{}.{}", self.prefix.display(), index, self.ext))
    }

    /// Paths of every shard created so far, in index order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Append `record` to shard `index`, opening the shard on first use.
    ///
    /// Opening shard `index` first closes shard `index - window` when that
    /// shard is still open, so at most `window` handles exist at any moment.
    ///
    /// # Errors
    /// Returns an error if `index` was already evicted (indices must increase
    /// monotonically as the source is scanned) or on I/O failure.
    pub fn write(&mut self, index: u64, record: &StringRecord) -> Result<()> {
        if !self.open.contains_key(&index) {
            if index < self.next_unopened {
                bail!(
                    "shard {} was already closed (window {}); shard indices must be monotonically increasing",
                    index,
                    self.window
                );
            }
            if let Some(old) = index.checked_sub(self.window) {
                self.close_shard(old);
            }
            let writer = RecordWriter::create(self.shard_path(index))?;
            self.paths.push(writer.path().to_path_buf());
            self.open.insert(index, writer);
            self.next_unopened = index + 1;
        }
        // Entry is guaranteed present here.
        self.open
            .get_mut(&index)
            .expect("shard writer just ensured")
            .write(record)
    }

    /// Close shard `index` if it is open. Closing a never-opened shard is a
    /// no-op; a failed close is reported on stderr and is non-fatal, since
    /// prior flushed rows are already durable.
    pub fn close_shard(&mut self, index: u64) {
        if let Some(mut w) = self.open.remove(&index)
            && let Err(e) = w.close()
        {
            eprintln!("ironsift: close shard {}: {e:#}", w.path().display());
        }
    }

    /// Close every remaining writer and return the produced shard paths in
    /// index order.
    pub fn finish(mut self) -> Vec<PathBuf> {
        let mut open: Vec<u64> = self.open.keys().copied().collect();
        open.sort_unstable();
        for index in open {
            self.close_shard(index);
        }
        std::mem::take(&mut self.paths)
    }

    /// Whether shard `index` currently holds an open writer.
    pub fn is_open(&self, index: u64) -> bool {
        self.open.contains_key(&index)
    }
}
