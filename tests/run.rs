mod common;

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;

use common::{Fixture, TestWorkspace, quarterly_rows, sales_rows};

fn run_in(workspace: &TestWorkspace) -> assert_cmd::assert::Assert {
    cargo_bin_cmd!("sheet-ingest")
        .env("RUST_LOG", "info")
        .args(["run", "--base-dir", workspace.path().to_str().unwrap()])
        .assert()
}

#[test]
fn run_writes_one_typed_csv_per_sheet() {
    let workspace = TestWorkspace::new();
    workspace.write_workbook(
        "report.xlsx",
        &[("Summary", sales_rows()), ("Quarterly", quarterly_rows())],
    );

    run_in(&workspace).success();

    assert_eq!(
        workspace.output("report_Summary.csv"),
        "name,amount,date\n\
         Alice,10.0,2023-01-01 00:00:00\n\
         Bob,20.5,2023-01-02 00:00:00\n"
    );
    assert_eq!(
        workspace.output("report_Quarterly.csv"),
        "sales_q1,sales_q2\n100,200\n150,250\n"
    );
}

#[test]
fn run_archives_inputs_and_writes_a_log_file() {
    let workspace = TestWorkspace::new();
    let input = workspace.write_workbook("book.xlsx", &[("Sheet1", sales_rows())]);

    run_in(&workspace)
        .success()
        .stderr(contains("Starting pipeline execution"))
        .stderr(contains("Processing file: book.xlsx"))
        .stderr(contains("Processing sheet: Sheet1"));

    let archived = workspace.processed_dir().join("book.xlsx");
    assert_eq!(fs::read(&archived).unwrap(), fs::read(&input).unwrap());

    let logs = fs::read_dir(workspace.path().join("logs"))
        .expect("logs dir")
        .map(|entry| entry.expect("log entry").path())
        .collect::<Vec<_>>();
    assert_eq!(logs.len(), 1);
    let name = logs[0].file_name().unwrap().to_str().unwrap().to_string();
    assert!(name.starts_with("pipeline_") && name.ends_with(".log"), "{name}");
    let contents = fs::read_to_string(&logs[0]).unwrap();
    assert!(contents.contains(" - INFO - Pipeline execution completed"));
}

#[test]
fn run_skips_broken_files_and_still_succeeds() {
    let workspace = TestWorkspace::new();
    workspace.write_input("broken.xlsx", b"this is not a workbook");
    workspace.write_workbook("good.xlsx", &[("Data", sales_rows())]);

    run_in(&workspace)
        .success()
        .stderr(contains("Failed to process broken.xlsx"));

    assert!(workspace.output_dir().join("good_Data.csv").is_file());
    assert!(!workspace.output_dir().join("broken_Data.csv").exists());
}

#[test]
fn run_without_inputs_warns_and_succeeds() {
    let workspace = TestWorkspace::new();
    run_in(&workspace)
        .success()
        .stderr(contains("No spreadsheet files found"));
}

#[test]
fn run_keeps_mixed_columns_as_text() {
    use Fixture::{Blank, Number, Text};
    let workspace = TestWorkspace::new();
    workspace.write_workbook(
        "mixed.xlsx",
        &[(
            "Sheet1",
            vec![
                vec![Text("Code"), Text("Qty"), Text("Price"), Text("Notes")],
                vec![Text("A-1"), Number(1.0), Number(2.5), Text("not-a-date")],
                vec![Number(7.0), Blank, Number(3.0), Text("also-not")],
            ],
        )],
    );

    run_in(&workspace).success();

    assert_eq!(
        workspace.output("mixed_Sheet1.csv"),
        "code,qty,price,notes\nA-1,1,2.5,not-a-date\n7,,3.0,also-not\n"
    );
}

#[test]
fn run_finds_the_header_below_blank_rows_and_reads_placeholders_as_missing() {
    use Fixture::{Blank, Number, Text};
    let workspace = TestWorkspace::new();
    workspace.write_workbook(
        "offset.xlsx",
        &[(
            "Sheet1",
            vec![
                vec![Blank, Blank, Blank],
                vec![Text("Id"), Text("Account"), Text("Score")],
                vec![Number(1.0), Text("9007199254740993"), Text("N/A")],
                vec![Number(2.0), Text("12345678901234567"), Number(7.0)],
            ],
        )],
    );

    run_in(&workspace).success();

    assert_eq!(
        workspace.output("offset_Sheet1.csv"),
        "id,account,score\n1,9007199254740993,\n2,12345678901234567,7\n"
    );
}

#[test]
fn custom_directories_and_pattern_are_honoured() {
    let workspace = TestWorkspace::new();
    let inbox = workspace.path().join("inbox");
    let out = workspace.path().join("out");
    fs::create_dir_all(&inbox).unwrap();
    common::write_workbook(&inbox.join("a.xlsm"), &[("S", sales_rows())]);
    common::write_workbook(&inbox.join("b.xlsx"), &[("S", sales_rows())]);

    cargo_bin_cmd!("sheet-ingest")
        .args([
            "run",
            "--base-dir",
            workspace.path().to_str().unwrap(),
            "--input-dir",
            inbox.to_str().unwrap(),
            "--output-dir",
            out.to_str().unwrap(),
            "--pattern",
            "*.xlsm",
            "--no-archive",
            "--no-log-file",
        ])
        .assert()
        .success();

    assert!(out.join("a_S.csv").is_file());
    assert!(!out.join("b_S.csv").exists());
    assert!(!workspace.processed_dir().join("a.xlsm").exists());
    assert!(!workspace.path().join("logs").exists());
}
