use anyhow::Result;
use ironsift::testing::{write_numbered, write_rows};
use ironsift::{save_report, subtract_small_filter};
use serde_json::Value;
use std::fs;

#[test]
fn reports_serialize_to_json() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let src = tmp.path().join("src.csv");
    let filter = tmp.path().join("filter.csv");
    write_numbered(&src, 10)?;
    write_rows(&filter, &[&["3"]])?;

    let out = tmp.path().join("out.csv");
    let report = subtract_small_filter(&src, &filter, 0, &out)?;

    let report_path = tmp.path().join("report.json");
    save_report(&report, &report_path)?;

    let json: Value = serde_json::from_str(&fs::read_to_string(&report_path)?)?;
    assert_eq!(json["input_rows"], 10);
    assert_eq!(json["removed"], 1);
    assert_eq!(json["output_rows"], 9);
    assert!(json["output"].as_str().unwrap().ends_with("out.csv"));
    Ok(())
}
