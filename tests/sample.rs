use anyhow::Result;
use ironsift::sample_stride;
use ironsift::testing::{read_rows, write_numbered};

#[test]
fn fifty_rows_cap_ten_step_three() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let src = tmp.path().join("events.csv");
    write_numbered(&src, 50)?;

    let target = tmp.path().join("sample.csv");
    let report = sample_stride(&src, &target, 10, 3)?;
    assert_eq!(report.sampled, 10);
    assert_eq!(report.residual_rows, 40);

    // Every 3rd arrival up to the cap: ids 2, 5, 8, ... 29.
    let sampled: Vec<String> = read_rows(&target)?.into_iter().map(|r| r[0].clone()).collect();
    let expected: Vec<String> = (0..10).map(|i| (i * 3 + 2).to_string()).collect();
    assert_eq!(sampled, expected);

    // Target + residual account for every source row.
    let residual = read_rows(&report.residual)?;
    assert_eq!(sampled.len() + residual.len(), 50);
    Ok(())
}

#[test]
fn residual_name_embeds_final_row_count() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let src = tmp.path().join("events.csv");
    write_numbered(&src, 50)?;

    let target = tmp.path().join("sample.csv");
    let report = sample_stride(&src, &target, 10, 3)?;
    assert_eq!(
        report.residual,
        tmp.path().join("events_residual_40.csv")
    );
    assert!(report.residual.exists());
    Ok(())
}

#[test]
fn post_cap_records_all_go_to_residual_in_order() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let src = tmp.path().join("events.csv");
    write_numbered(&src, 10)?;

    let target = tmp.path().join("sample.csv");
    // Cap of 2 with step 2: arrivals 2 and 4 sampled, everything else residual.
    let report = sample_stride(&src, &target, 2, 2)?;
    assert_eq!(report.sampled, 2);
    let sampled: Vec<String> = read_rows(&target)?.into_iter().map(|r| r[0].clone()).collect();
    assert_eq!(sampled, vec!["1", "3"]);

    let residual: Vec<String> = read_rows(&report.residual)?
        .into_iter()
        .map(|r| r[0].clone())
        .collect();
    assert_eq!(residual, vec!["0", "2", "4", "5", "6", "7", "8", "9"]);
    Ok(())
}

#[test]
fn source_smaller_than_cap_samples_what_exists() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let src = tmp.path().join("events.csv");
    write_numbered(&src, 5)?;

    let target = tmp.path().join("sample.csv");
    let report = sample_stride(&src, &target, 100, 2)?;
    assert_eq!(report.sampled, 2);
    assert_eq!(report.residual_rows, 3);
    Ok(())
}

#[test]
fn zero_count_or_step_fails_before_processing() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let src = tmp.path().join("events.csv");
    write_numbered(&src, 5)?;

    let target = tmp.path().join("sample.csv");
    assert!(sample_stride(&src, &target, 0, 3).is_err());
    assert!(sample_stride(&src, &target, 10, 0).is_err());
    assert!(!target.exists());
    Ok(())
}
