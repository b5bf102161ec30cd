#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use tempfile::{TempDir, tempdir};

/// A cell to place in a generated workbook.
#[derive(Debug, Clone, Copy)]
pub enum Fixture<'a> {
    Text(&'a str),
    Number(f64),
    Date(u16, u8, u8),
    Blank,
}

/// Scratch base directory laid out the way the `run` command expects.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh base directory with an empty `data/input`.
    pub fn new() -> Self {
        let temp_dir = tempdir().expect("temp dir");
        fs::create_dir_all(temp_dir.path().join("data").join("input")).expect("input dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn input_dir(&self) -> PathBuf {
        self.path().join("data").join("input")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.path().join("data").join("output")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.path().join("data").join("processed")
    }

    pub fn output(&self, name: &str) -> String {
        fs::read_to_string(self.output_dir().join(name)).expect("read output csv")
    }

    /// Writes raw bytes into the input directory.
    pub fn write_input(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.input_dir().join(name);
        fs::write(&path, contents).expect("write input file");
        path
    }

    /// Writes an `.xlsx` with one worksheet per `(name, rows)` entry into the
    /// input directory.
    pub fn write_workbook(&self, name: &str, sheets: &[(&str, Vec<Vec<Fixture<'_>>>)]) -> PathBuf {
        let path = self.input_dir().join(name);
        write_workbook(&path, sheets);
        path
    }
}

pub fn write_workbook(path: &Path, sheets: &[(&str, Vec<Vec<Fixture<'_>>>)]) {
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let mut workbook = Workbook::new();
    for (sheet_name, rows) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*sheet_name).expect("sheet name");
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match *cell {
                    Fixture::Text(text) => {
                        sheet.write_string(r, c, text).expect("write text");
                    }
                    Fixture::Number(value) => {
                        sheet.write_number(r, c, value).expect("write number");
                    }
                    Fixture::Date(y, m, d) => {
                        let date = ExcelDateTime::from_ymd(y, m, d).expect("valid date");
                        sheet
                            .write_datetime_with_format(r, c, &date, &date_format)
                            .expect("write date");
                    }
                    Fixture::Blank => {}
                }
            }
        }
    }
    workbook.save(path).expect("save workbook");
}

/// The sheet used throughout: a plain header over names, amounts and dates.
pub fn sales_rows() -> Vec<Vec<Fixture<'static>>> {
    use Fixture::{Date, Number, Text};
    vec![
        vec![Text("Name"), Text("Amount"), Text("Date")],
        vec![Text("Alice"), Number(10.0), Date(2023, 1, 1)],
        vec![Text("Bob"), Number(20.5), Date(2023, 1, 2)],
    ]
}

/// Two header rows over quarterly figures.
pub fn quarterly_rows() -> Vec<Vec<Fixture<'static>>> {
    use Fixture::{Number, Text};
    vec![
        vec![Text("Sales"), Text("Sales")],
        vec![Text("Q1"), Text("Q2")],
        vec![Number(100.0), Number(200.0)],
        vec![Number(150.0), Number(250.0)],
    ]
}
