use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::payroll::recon::compare::compare_employee;
use crate::payroll::recon::error::{ReconError, Result};
use crate::payroll::recon::extract::extract_employees;
use crate::payroll::recon::fields::active_fields;
use crate::payroll::recon::header::resolve_columns;
use crate::payroll::recon::io::settings::{AliasTable, CompanySettings};
use crate::payroll::recon::io::store::LedgerStore;
use crate::payroll::recon::io::workbook;
use crate::payroll::recon::matcher::{MatchPolicy, match_employees};
use crate::payroll::recon::model::{CellMatrix, ColumnMapping, Period, ReconciliationReport};
use crate::payroll::recon::report::assemble;
use crate::payroll::recon::snapshot::build_snapshots;

/// Everything one reconciliation run needs besides the spreadsheet and the
/// ledger itself.
#[derive(Debug, Clone)]
pub struct ReconcileRequest {
    /// Display name of the company being reconciled.
    pub company: String,
    pub period: Period,
    pub settings: CompanySettings,
    pub match_policy: MatchPolicy,
}

impl ReconcileRequest {
    pub fn new(company: impl Into<String>, period: Period) -> Self {
        Self {
            company: company.into(),
            period,
            settings: CompanySettings::default(),
            match_policy: MatchPolicy::default(),
        }
    }

    pub fn with_settings(mut self, settings: CompanySettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_match_policy(mut self, policy: MatchPolicy) -> Self {
        self.match_policy = policy;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.company.trim().is_empty() {
            return Err(ReconError::InvalidInput("company name is required".into()));
        }
        Ok(())
    }
}

/// Loads the uploaded workbook and reconciles it against the ledger.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), company = %request.company, period = %request.period)
)]
pub fn reconcile_file(
    input: &Path,
    request: &ReconcileRequest,
    store: &dyn LedgerStore,
    aliases: &AliasTable,
) -> Result<ReconciliationReport> {
    request.validate()?;
    let matrix = workbook::load_matrix(input)?;
    info!(row_count = matrix.len(), "read spreadsheet");
    reconcile(&matrix, request, store, aliases)
}

/// Cross-checks an already loaded cell matrix against the ledger and builds
/// the report. The ledger is only read.
#[instrument(
    level = "debug",
    skip_all,
    fields(company = %request.company, period = %request.period)
)]
pub fn reconcile(
    matrix: &CellMatrix,
    request: &ReconcileRequest,
    store: &dyn LedgerStore,
    aliases: &AliasTable,
) -> Result<ReconciliationReport> {
    request.validate()?;
    if matrix.len() < workbook::MIN_ROWS {
        return Err(ReconError::InvalidInput(format!(
            "spreadsheet needs a header row and at least one data row, found {} row(s)",
            matrix.len()
        )));
    }

    let settings = &request.settings;
    let fields = active_fields(&settings.allowance_names, &settings.column_hints);
    let mapping = resolve_columns(matrix, &fields, &settings.column_hints)?;
    debug!(field_count = fields.len(), ?mapping, "columns resolved");

    let employees = extract_employees(matrix, &mapping, &fields);
    info!(employee_count = employees.len(), "extracted spreadsheet employees");

    let snapshots = build_snapshots(
        store,
        &request.company,
        request.period,
        aliases,
        settings.standard_working_hours,
    )?;
    info!(snapshot_count = snapshots.len(), "built ledger snapshots");
    if snapshots.is_empty() {
        warn!(company = %request.company, "no ledger records found for company");
    }

    let outcome = match_employees(&employees, &snapshots, request.match_policy);
    let results = employees
        .iter()
        .zip(&outcome.pairs)
        .map(|(employee, pair)| {
            compare_employee(employee, pair.map(|index| &snapshots[index]), &fields)
        })
        .collect();

    let report = assemble(
        request.period,
        mapping,
        results,
        outcome.missing_from_spreadsheet,
        outcome.new_in_spreadsheet,
    );

    let summary = report.summary();
    info!(
        employees = summary.employees,
        missing = summary.missing_from_spreadsheet,
        new = summary.new_in_spreadsheet,
        "reconciliation finished"
    );
    Ok(report)
}

/// Resolves the column mapping of a workbook without touching the ledger,
/// for diagnosing uploads that reconcile badly.
#[instrument(level = "info", skip_all, fields(input = %input.display()))]
pub fn inspect_columns(input: &Path, settings: &CompanySettings) -> Result<ColumnMapping> {
    let matrix = workbook::load_matrix(input)?;
    let fields = active_fields(&settings.allowance_names, &settings.column_hints);
    resolve_columns(&matrix, &fields, &settings.column_hints)
}
