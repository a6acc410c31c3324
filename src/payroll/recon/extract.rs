use std::collections::BTreeMap;

use crate::payroll::recon::fields::{EMPLOYEE_NUMBER, NAME};
use crate::payroll::recon::header::NAME_ALIASES;
use crate::payroll::recon::matcher::normalize_name;
use crate::payroll::recon::model::{
    CellMatrix, ColumnMapping, FieldDefinition, FieldKind, Scalar, SpreadsheetEmployee,
    parse_number,
};

/// Rows inspected when looking for the end of the header block.
const HEADER_SCAN_ROWS: usize = 5;

/// Counts the header rows by walking down the name column until the first
/// cell that looks like an employee. Always at least one.
pub fn header_row_count(matrix: &CellMatrix, mapping: &ColumnMapping) -> usize {
    let Some(name_col) = mapping.column(NAME) else {
        return 1;
    };

    let mut count = 0;
    for row in matrix.iter().take(HEADER_SCAN_ROWS) {
        let text = cell_text(row, Some(name_col));
        if text.is_empty() || looks_like_name_header(&text) {
            count += 1;
        } else {
            break;
        }
    }
    count.max(1)
}

/// Converts every data row with a non-empty name into a spreadsheet employee.
/// Cell problems never fail the run: unparseable numbers read as zero.
pub fn extract_employees(
    matrix: &CellMatrix,
    mapping: &ColumnMapping,
    fields: &[FieldDefinition],
) -> Vec<SpreadsheetEmployee> {
    let header_rows = header_row_count(matrix, mapping);
    let name_col = mapping.column(NAME);
    let number_col = mapping.column(EMPLOYEE_NUMBER);

    matrix
        .iter()
        .skip(header_rows)
        .filter_map(|row| {
            let name = cell_text(row, name_col);
            if name.is_empty() {
                return None;
            }

            let values: BTreeMap<String, Option<Scalar>> = fields
                .iter()
                .map(|field| {
                    let cell = cell(row, mapping.column(&field.key));
                    (field.key.clone(), cell.map(|value| coerce(value, field.kind)))
                })
                .collect();

            Some(SpreadsheetEmployee {
                name,
                employee_number: cell_text(row, number_col),
                values,
            })
        })
        .collect()
}

/// A name-column cell is a header label when it contains one of the name
/// aliases, ignoring whitespace and case ("氏　名", "NAME").
fn looks_like_name_header(text: &str) -> bool {
    let cell = normalize_name(text).to_lowercase();
    NAME_ALIASES
        .iter()
        .any(|alias| cell.contains(&normalize_name(alias).to_lowercase()))
}

fn cell(row: &[Option<Scalar>], col: Option<usize>) -> Option<&Scalar> {
    col.and_then(|idx| row.get(idx)).and_then(Option::as_ref)
}

fn cell_text(row: &[Option<Scalar>], col: Option<usize>) -> String {
    cell(row, col).map(Scalar::to_text).unwrap_or_default()
}

fn coerce(value: &Scalar, kind: FieldKind) -> Scalar {
    match kind {
        FieldKind::Numeric => match value {
            Scalar::Number(number) => Scalar::Number(*number),
            Scalar::Text(text) => Scalar::Number(parse_number(text).unwrap_or(0.0)),
        },
        FieldKind::Text => Scalar::Text(value.to_text()),
    }
}
