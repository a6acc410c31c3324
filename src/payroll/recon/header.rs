//! Column resolution for spreadsheets whose layout is not known in advance.
//!
//! Real payroll exports put their labels anywhere in the first few rows, often
//! split over a merged two-row header ("通勤" above "手当"). Every column gets
//! one searchable string built from the header block, and each field is then
//! located by trying a chain of candidate labels in priority order.

use std::collections::BTreeMap;

use tracing::debug;

use crate::payroll::recon::error::{ReconError, Result};
use crate::payroll::recon::fields::{EMPLOYEE_NUMBER, EMPLOYEE_NUMBER_LABEL, NAME, NAME_LABEL};
use crate::payroll::recon::model::{CellMatrix, ColumnMapping, FieldDefinition, FieldKind};

/// Number of leading rows concatenated into each column's header string.
pub const HEADER_BLOCK_ROWS: usize = 3;

/// Labels that identify the name column.
pub(crate) const NAME_ALIASES: &[&str] = &["氏名", "名前", "従業員名", "社員名", "氏　名", "Name"];
const EMPLOYEE_NUMBER_ALIASES: &[&str] = &[
    "社員番号",
    "従業員番号",
    "社員No",
    "社員NO",
    "社員ID",
    "従業員コード",
    "社員コード",
    "No.",
];

/// One step of the resolution chain: yields the candidate labels it would try
/// for a field, in order.
type Strategy = fn(&FieldDefinition, &BTreeMap<String, String>) -> Vec<String>;

const STRATEGIES: &[Strategy] = &[saved_hint, default_label, common_aliases];

/// Builds one searchable string per column by concatenating the trimmed cell
/// text of the first [`HEADER_BLOCK_ROWS`] rows.
pub fn header_strings(matrix: &CellMatrix) -> Vec<String> {
    let block = &matrix[..matrix.len().min(HEADER_BLOCK_ROWS)];
    let width = block.iter().map(Vec::len).max().unwrap_or(0);

    (0..width)
        .map(|col| {
            block
                .iter()
                .filter_map(|row| row.get(col).and_then(Option::as_ref))
                .map(|cell| cell.to_text())
                .collect::<String>()
        })
        .collect()
}

/// Resolves the column index of `name`, `employeeNumber` and every active
/// field. Fails when the name column cannot be located.
pub fn resolve_columns(
    matrix: &CellMatrix,
    fields: &[FieldDefinition],
    hints: &BTreeMap<String, String>,
) -> Result<ColumnMapping> {
    let headers = header_strings(matrix);
    debug!(?headers, "header strings");

    let name_field = FieldDefinition::new(NAME, NAME_LABEL, FieldKind::Text);
    let number_field =
        FieldDefinition::new(EMPLOYEE_NUMBER, EMPLOYEE_NUMBER_LABEL, FieldKind::Text);

    let mut mapping = ColumnMapping::default();
    for field in [&name_field, &number_field].into_iter().chain(fields) {
        mapping.insert(field.key.clone(), resolve_field(&headers, field, hints));
    }

    if mapping.column(NAME).is_none() {
        return Err(ReconError::MissingRequiredColumn {
            field: NAME.to_string(),
            label: NAME_LABEL.to_string(),
        });
    }

    Ok(mapping)
}

/// Runs the strategy chain for a single field; the first candidate that
/// matches a header wins.
pub fn resolve_field(
    headers: &[String],
    field: &FieldDefinition,
    hints: &BTreeMap<String, String>,
) -> Option<usize> {
    STRATEGIES
        .iter()
        .flat_map(|strategy| strategy(field, hints))
        .find_map(|candidate| find_column(headers, &candidate))
}

/// Finds the column whose header equals `label`, falling back to the first
/// column where either string contains the other.
pub fn find_column(headers: &[String], label: &str) -> Option<usize> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }

    headers
        .iter()
        .position(|header| !header.is_empty() && header == label)
        .or_else(|| {
            headers.iter().position(|header| {
                !header.is_empty() && (header.contains(label) || label.contains(header.as_str()))
            })
        })
}

fn saved_hint(field: &FieldDefinition, hints: &BTreeMap<String, String>) -> Vec<String> {
    hints.get(&field.key).cloned().into_iter().collect()
}

fn default_label(field: &FieldDefinition, _hints: &BTreeMap<String, String>) -> Vec<String> {
    vec![field.label.clone()]
}

fn common_aliases(field: &FieldDefinition, _hints: &BTreeMap<String, String>) -> Vec<String> {
    let aliases: &[&str] = match field.key.as_str() {
        NAME => NAME_ALIASES,
        EMPLOYEE_NUMBER => EMPLOYEE_NUMBER_ALIASES,
        _ => &[],
    };
    aliases.iter().map(|alias| alias.to_string()).collect()
}
