//! Persistence for operation reports.
//!
//! Every operation in this crate returns a small `Serialize` report struct
//! with its counters and produced paths. Drivers that want a durable record
//! of a run can dump any of them here as pretty-printed JSON.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Save `report` to `path` as pretty-printed JSON.
///
/// # Errors
/// Returns an error if serialization or the file write fails.
pub fn save_report<T: Serialize>(report: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(report).context("serialize report")?;
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    f.write_all(json.as_bytes())?;
    f.write_all(b"\n")?;
    Ok(())
}

/// Print `report` to stdout as pretty-printed JSON.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn print_report<T: Serialize>(report: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report).context("serialize report")?);
    Ok(())
}
