use std::io::Cursor;
use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook_auto};
use tracing::debug;

use crate::payroll::recon::error::{ReconError, Result};
use crate::payroll::recon::model::{CellMatrix, Scalar};

/// Fewest rows a reconcilable sheet can have: one header and one employee.
pub const MIN_ROWS: usize = 2;

/// Reads the first sheet of a workbook on disk into a cell matrix. The format
/// is sniffed from the file, so xlsx, xlsm, xls and ods uploads all work.
pub fn load_matrix(path: &Path) -> Result<CellMatrix> {
    if !path.exists() {
        return Err(ReconError::MissingInput(path.to_path_buf()));
    }

    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ReconError::InvalidInput("workbook contains no sheets".into()))??;
    range_to_matrix(&range)
}

/// Reads the first sheet of an in-memory xlsx upload into a cell matrix.
pub fn load_matrix_from_bytes(bytes: &[u8]) -> Result<CellMatrix> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ReconError::InvalidInput("workbook contains no sheets".into()))??;
    range_to_matrix(&range)
}

fn range_to_matrix(range: &Range<DataType>) -> Result<CellMatrix> {
    // Used ranges that begin past column A are padded so indexes match the sheet.
    let column_offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);

    let matrix: CellMatrix = range
        .rows()
        .map(|row| {
            std::iter::repeat_n(None, column_offset)
                .chain(row.iter().map(cell_to_scalar))
                .collect()
        })
        .collect();

    debug!(
        rows = matrix.len(),
        columns = matrix.first().map(Vec::len).unwrap_or(0),
        "loaded cell matrix"
    );

    if matrix.len() < MIN_ROWS {
        return Err(ReconError::InvalidInput(format!(
            "spreadsheet needs a header row and at least one data row, found {} row(s)",
            matrix.len()
        )));
    }

    Ok(matrix)
}

fn cell_to_scalar(cell: &DataType) -> Option<Scalar> {
    match cell {
        DataType::Empty | DataType::Error(_) => None,
        DataType::String(value) if value.trim().is_empty() => None,
        DataType::String(value) => Some(Scalar::Text(value.clone())),
        DataType::Float(value) => Some(Scalar::Number(*value)),
        DataType::Int(value) => Some(Scalar::Number(*value as f64)),
        DataType::Bool(value) => Some(Scalar::Text(value.to_string())),
        other => Some(Scalar::Text(other.to_string())),
    }
}
