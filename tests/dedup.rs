use anyhow::Result;
use ironsift::dedup_by_key;
use ironsift::testing::{read_rows, write_numbered, write_rows};

#[test]
fn result_contains_no_key_from_smaller_file() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let bigger = tmp.path().join("bigger.csv");
    let smaller = tmp.path().join("smaller.csv");
    write_numbered(&bigger, 20)?;
    write_rows(&smaller, &[&["4"], &["8"], &["15"], &["16"]])?;

    let out = tmp.path().join("out.csv");
    let report = dedup_by_key(&bigger, &smaller, 0, &out)?;
    assert_eq!(report.duplicates, 4);
    assert_eq!(report.output_rows, 16);
    // output + duplicates accounts for every bigger-file row
    assert_eq!(report.output_rows + report.duplicates, 20);

    let keys: Vec<String> = read_rows(&out)?.into_iter().map(|r| r[0].clone()).collect();
    for dropped in ["4", "8", "15", "16"] {
        assert!(!keys.contains(&dropped.to_string()));
    }
    Ok(())
}

#[test]
fn matching_is_by_key_not_full_row() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let bigger = tmp.path().join("bigger.csv");
    let smaller = tmp.path().join("smaller.csv");
    write_rows(
        &bigger,
        &[&["a", "payload-1"], &["b", "payload-2"], &["c", "payload-3"]],
    )?;
    // Same key, completely different payload: still a duplicate.
    write_rows(&smaller, &[&["b", "unrelated"]])?;

    let out = tmp.path().join("out.csv");
    let report = dedup_by_key(&bigger, &smaller, 0, &out)?;
    assert_eq!(report.duplicates, 1);
    assert_eq!(
        read_rows(&out)?,
        vec![
            vec!["a".to_string(), "payload-1".to_string()],
            vec!["c".to_string(), "payload-3".to_string()],
        ]
    );
    Ok(())
}

#[test]
fn repeated_bigger_keys_are_each_excluded() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let bigger = tmp.path().join("bigger.csv");
    let smaller = tmp.path().join("smaller.csv");
    write_rows(&bigger, &[&["x", "1"], &["x", "2"], &["y", "3"]])?;
    write_rows(&smaller, &[&["x", ""]])?;

    let out = tmp.path().join("out.csv");
    let report = dedup_by_key(&bigger, &smaller, 0, &out)?;
    assert_eq!(report.duplicates, 2);
    assert_eq!(report.output_rows, 1);
    assert_eq!(report.output_rows + report.duplicates, 3);
    Ok(())
}
