//! # Ironsift
//!
//! An **external-memory transformation toolkit** for comma-delimited record
//! files too large to fit in memory: splitting by row count, merging,
//! set-difference filtering, key-based deduplication, stride sampling,
//! deterministic interleave-merging, and randomized reshuffling via
//! disk-backed bucketing.
//!
//! Every operation bounds both memory and open-file-handle usage while
//! producing exact, reproducible output over unbounded input size. Execution
//! is strictly sequential: one scan at a time, blocking I/O, no worker
//! threads.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ironsift::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! // Split a huge file into 5M-row shards, at most 3 open at once.
//! let split = split_by_size("events.csv", "shards/events", 5_000_000, "csv", DEFAULT_WINDOW)?;
//! println!("{} rows over {} shards", split.rows, split.shards.len());
//!
//! // Remove every record whose key (column 0) appears in a filter file.
//! let report = subtract_small_filter("events.csv", "blocklist.csv", 0, "kept.csv")?;
//! println!("dropped {} of {}", report.removed, report.input_rows);
//!
//! // Stitch the shards back together.
//! concat(&split.shards, "events-roundtrip.csv")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Records and streams
//!
//! A record is an ordered, immutable sequence of field strings from one row
//! ([`csv::StringRecord`]). [`RecordReader`] yields records lazily and
//! forward-only; [`RecordWriter`] is a scoped resource that flushes and
//! releases its handle exactly once on every exit path.
//!
//! ### Keys
//!
//! Subtraction, deduplication, and bucketing extract a join/bucket key from a
//! caller-chosen 0-based column. In-memory membership maps hold at most one
//! entry per key; a later record with a duplicate key overwrites the earlier
//! one.
//!
//! ### Bounded handles
//!
//! The [`ShardWriterPool`] caps simultaneously open shard writers at a window
//! (default 3), closing shard `i - window` when shard `i` first opens. The
//! bucketed shuffle instead holds one writer per distinct 2-character key
//! prefix; that alphabet is fixed and small, so no window applies.
//!
//! ## Module Overview
//!
//! - [`io`] - record stream reader/writer and row counting
//! - [`pool`] - bounded shard-writer pool with index-based eviction
//! - [`split`] - fixed-row-count splitting and list-order concatenation
//! - [`setops`] - anti-join subtraction in three size regimes
//! - [`dedup`] - key-based subtraction between two files
//! - [`interleave`] - deterministic stride merge of two streams
//! - [`sample`] - stride sampling with residual capture
//! - [`shuffle`] - in-memory permutation and hash-prefix bucketing
//! - [`report`] - JSON persistence for operation reports
//! - [`testing`] - fixtures for building small files in tests

pub mod dedup;
pub mod interleave;
pub mod io;
pub mod pool;
pub mod report;
pub mod sample;
pub mod setops;
pub mod shuffle;
pub mod split;
pub mod testing;

pub use dedup::{DedupReport, dedup_by_key};
pub use interleave::{InterleaveReport, interleave};
pub use io::{DEFAULT_BUFFER_CAPACITY, RecordReader, RecordWriter, count_rows};
pub use pool::{DEFAULT_WINDOW, ShardWriterPool};
pub use report::{print_report, save_report};
pub use sample::{SampleReport, sample_stride};
pub use setops::{
    DEFAULT_SHARD_ROWS, SubtractReport, subtract_many_filters, subtract_sharded,
    subtract_small_filter, subtract_small_source,
};
pub use shuffle::{
    BUCKET_PREFIX_LEN, BucketReport, HASH_KEY_LEN, shuffle_bucketed, shuffle_in_memory,
};
pub use split::{SplitReport, concat, split_by_size};
