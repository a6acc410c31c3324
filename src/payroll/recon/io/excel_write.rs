use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::payroll::recon::error::Result;
use crate::payroll::recon::model::{ReconciliationReport, Scalar};

/// Sheet listing one row per check item.
pub const CHECKS_SHEET: &str = "照合結果";
/// Sheet listing employees present on only one side.
pub const DIFFERENCES_SHEET: &str = "差異";

const CHECK_COLUMNS: &[&str] = &[
    "氏名",
    "社員番号",
    "項目",
    "Excel",
    "アプリ",
    "前月",
    "判定",
    "メッセージ",
];

/// Writes the report as a workbook reviewers can filter and annotate.
pub fn write_report(path: &Path, report: &ReconciliationReport) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let checks = workbook.add_worksheet();
    checks.set_name(CHECKS_SHEET)?;
    for (col_idx, title) in CHECK_COLUMNS.iter().enumerate() {
        checks.write_string_with_format(0, col_idx as u16, *title, &header)?;
    }

    let mut row_idx: u32 = 1;
    for result in &report.results {
        for check in &result.checks {
            checks.write_string(row_idx, 0, &result.name)?;
            checks.write_string(row_idx, 1, &result.employee_number)?;
            checks.write_string(row_idx, 2, &check.label)?;
            write_scalar(checks, row_idx, 3, check.excel_value.as_ref())?;
            write_scalar(checks, row_idx, 4, check.app_value.as_ref())?;
            write_scalar(checks, row_idx, 5, check.prev_month_value.as_ref())?;
            checks.write_string(row_idx, 6, &check.status.to_string())?;
            checks.write_string(row_idx, 7, &check.message)?;
            row_idx += 1;
        }
    }
    checks.autofilter(0, 0, row_idx - 1, (CHECK_COLUMNS.len() - 1) as u16)?;

    let differences = workbook.add_worksheet();
    differences.set_name(DIFFERENCES_SHEET)?;
    differences.write_string_with_format(0, 0, "区分", &header)?;
    differences.write_string_with_format(0, 1, "氏名", &header)?;

    let rows = report
        .missing_from_spreadsheet
        .iter()
        .map(|name| ("Excel未記載", name))
        .chain(
            report
                .new_in_spreadsheet
                .iter()
                .map(|name| ("アプリ未登録", name)),
        );
    for (offset, (kind, name)) in rows.enumerate() {
        let row = offset as u32 + 1;
        differences.write_string(row, 0, kind)?;
        differences.write_string(row, 1, name)?;
    }

    workbook.save(path)?;
    Ok(())
}

fn write_scalar(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: Option<&Scalar>,
) -> std::result::Result<(), XlsxError> {
    match value {
        Some(Scalar::Number(number)) => {
            worksheet.write_number(row, col, *number)?;
        }
        Some(Scalar::Text(text)) => {
            worksheet.write_string(row, col, text)?;
        }
        None => {}
    }
    Ok(())
}
