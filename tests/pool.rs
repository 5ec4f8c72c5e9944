use anyhow::Result;
use csv::StringRecord;
use ironsift::ShardWriterPool;
use ironsift::testing::read_rows;

fn rec(fields: &[&str]) -> StringRecord {
    fields.iter().copied().collect()
}

#[test]
fn window_evicts_by_index_not_recency() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let mut pool = ShardWriterPool::new(tmp.path().join("part"), "csv", 3);

    for i in 0..=5u64 {
        let id = i.to_string();
        pool.write(i, &rec(&[id.as_str(), "x"]))?;
    }
    // Once shard 5 is open, everything at index <= 2 must already be closed.
    for closed in 0..=2 {
        assert!(!pool.is_open(closed), "shard {closed} should be closed");
    }
    for open in 3..=5 {
        assert!(pool.is_open(open), "shard {open} should be open");
    }
    Ok(())
}

#[test]
fn writing_to_an_evicted_shard_fails_fast() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let mut pool = ShardWriterPool::new(tmp.path().join("part"), "csv", 2);

    for i in 0..4u64 {
        pool.write(i, &rec(&["row"]))?;
    }
    // Shards 0 and 1 were evicted by the window of 2.
    let err = pool.write(0, &rec(&["late"]));
    assert!(err.is_err());
    // The evicted file was not reopened or truncated.
    let rows = read_rows(tmp.path().join("part-0.csv"))?;
    assert_eq!(rows, vec![vec!["row".to_string()]]);
    Ok(())
}

#[test]
fn closing_a_never_opened_shard_is_a_noop() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let mut pool = ShardWriterPool::new(tmp.path().join("part"), "csv", 3);
    pool.close_shard(42);
    pool.write(0, &rec(&["only"]))?;
    pool.close_shard(42);
    assert_eq!(pool.finish().len(), 1);
    Ok(())
}

#[test]
fn finish_returns_paths_in_index_order() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let mut pool = ShardWriterPool::new(tmp.path().join("part"), "csv", 2);

    for i in 0..5u64 {
        let row = format!("row-{i}");
        pool.write(i, &rec(&[row.as_str()]))?;
    }
    let paths = pool.finish();
    let expected: Vec<_> = (0..5)
        .map(|i| format!("{}-{}.csv", tmp.path().join("part").display(), i))
        .collect();
    let got: Vec<_> = paths.iter().map(|p| p.display().to_string()).collect();
    assert_eq!(got, expected);

    // Every shard holds its one row, including those closed by eviction.
    for (i, path) in paths.iter().enumerate() {
        assert_eq!(read_rows(path)?, vec![vec![format!("row-{i}")]]);
    }
    Ok(())
}

#[test]
fn multiple_rows_per_shard_stay_contiguous() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let mut pool = ShardWriterPool::new(tmp.path().join("part"), "csv", 3);

    for i in 0..6u64 {
        let id = i.to_string();
        pool.write(i / 2, &rec(&[id.as_str()]))?;
    }
    let paths = pool.finish();
    assert_eq!(paths.len(), 3);
    assert_eq!(
        read_rows(&paths[1])?,
        vec![vec!["2".to_string()], vec!["3".to_string()]]
    );
    Ok(())
}
