#![allow(dead_code)]

use std::path::Path;

use payroll_recon::model::{CellMatrix, LedgerRecord, Scalar};
use rust_xlsxwriter::Workbook;
use serde_json::Value;

/// Writes JSON rows into the first sheet of a new workbook. Strings and
/// numbers become cells; nulls leave the cell empty.
pub fn write_sheet(path: &Path, rows: &[Value]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (row_idx, row) in rows.iter().enumerate() {
        let cells = row.as_array().expect("row is an array");
        for (col_idx, cell) in cells.iter().enumerate() {
            let (row_idx, col_idx) = (row_idx as u32, col_idx as u16);
            match cell {
                Value::String(text) => {
                    worksheet
                        .write_string(row_idx, col_idx, text)
                        .expect("string written");
                }
                Value::Number(number) => {
                    worksheet
                        .write_number(row_idx, col_idx, number.as_f64().expect("finite number"))
                        .expect("number written");
                }
                _ => {}
            }
        }
    }
    workbook.save(path).expect("workbook saved");
}

/// Builds a cell matrix from JSON rows without touching the filesystem.
pub fn matrix(rows: &[Value]) -> CellMatrix {
    rows.iter()
        .map(|row| {
            row.as_array()
                .expect("row is an array")
                .iter()
                .map(|cell| match cell {
                    Value::String(text) => Some(Scalar::Text(text.clone())),
                    Value::Number(number) => number.as_f64().map(Scalar::Number),
                    _ => None,
                })
                .collect()
        })
        .collect()
}

pub fn record(company: &str, period: &str, name: &str, values: &[(&str, f64)]) -> LedgerRecord {
    LedgerRecord {
        id: None,
        external_id: None,
        company_name: company.to_string(),
        period: period.parse().expect("period parsed"),
        employee_number: None,
        name: name.to_string(),
        status: Some("active".to_string()),
        updated_at: None,
        values: values
            .iter()
            .map(|(key, value)| (key.to_string(), Scalar::Number(*value)))
            .collect(),
    }
}
