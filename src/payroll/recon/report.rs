use crate::payroll::recon::model::{ColumnMapping, EmployeeResult, Period, ReconciliationReport};

/// Collates per-employee results, in spreadsheet order, with the unmatched
/// identity lists and the column mapping used for the run.
pub fn assemble(
    period: Period,
    column_mapping: ColumnMapping,
    results: Vec<EmployeeResult>,
    missing_from_spreadsheet: Vec<String>,
    new_in_spreadsheet: Vec<String>,
) -> ReconciliationReport {
    ReconciliationReport {
        period,
        column_mapping,
        results,
        missing_from_spreadsheet,
        new_in_spreadsheet,
    }
}
