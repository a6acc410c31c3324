use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod period;

pub use period::Period;

/// A non-empty scalar read from a spreadsheet cell or a ledger document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Numeric literal.
    Number(f64),
    /// Plain string literal.
    Text(String),
}

impl Scalar {
    /// Text form used for identifiers and text comparisons.
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Number(value) => format_number(*value),
            Scalar::Text(value) => value.trim().to_string(),
        }
    }

    /// Numeric form. Text that does not parse as a number counts as zero.
    pub fn to_number(&self) -> f64 {
        match self {
            Scalar::Number(value) => *value,
            Scalar::Text(value) => parse_number(value).unwrap_or(0.0),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Scalar::Text(value) if value.trim().is_empty())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Formats a number the way the report shows it: integral values carry no
/// fractional part.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

/// Parses a payroll amount that may carry thousands separators, a currency
/// sign, a `円` suffix or stray spaces.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|ch| !matches!(ch, ',' | '，' | '¥' | '￥' | '円') && !ch.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// First sheet of a workbook, one entry per row. `None` marks an empty cell so
/// column positions stay stable.
pub type CellMatrix = Vec<Vec<Option<Scalar>>>;

/// Field key → stored value for one ledger period.
pub type FieldMap = BTreeMap<String, Scalar>;

/// How a field is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Numeric,
    Text,
}

/// A comparable payroll field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
}

impl FieldDefinition {
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
        }
    }
}

/// Field key → resolved column index. Built once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping(BTreeMap<String, Option<usize>>);

impl ColumnMapping {
    pub fn insert(&mut self, key: impl Into<String>, column: Option<usize>) {
        self.0.insert(key.into(), column);
    }

    /// Column index for the field, `None` when unmapped or unknown.
    pub fn column(&self, key: &str) -> Option<usize> {
        self.0.get(key).copied().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Option<usize>)> {
        self.0.iter()
    }
}

/// One employee row read from the uploaded spreadsheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadsheetEmployee {
    pub name: String,
    pub employee_number: String,
    pub values: BTreeMap<String, Option<Scalar>>,
}

impl SpreadsheetEmployee {
    pub fn value(&self, key: &str) -> Option<&Scalar> {
        self.values.get(key).and_then(Option::as_ref)
    }
}

/// A persisted monthly payroll document as the ledger store returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecord {
    #[serde(default)]
    pub id: Option<String>,
    /// Identifier assigned by the upstream HR system.
    #[serde(default)]
    pub external_id: Option<String>,
    pub company_name: String,
    pub period: Period,
    #[serde(default)]
    pub employee_number: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub values: FieldMap,
}

/// The ledger's view of one employee across the target and preceding period.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSnapshot {
    pub identity_key: String,
    pub name: String,
    pub employee_number: String,
    pub status: String,
    pub current: Option<FieldMap>,
    pub previous: Option<FieldMap>,
}

impl LedgerSnapshot {
    pub fn current_value(&self, key: &str) -> Option<&Scalar> {
        self.current.as_ref().and_then(|values| values.get(key))
    }

    pub fn previous_value(&self, key: &str) -> Option<&Scalar> {
        self.previous.as_ref().and_then(|values| values.get(key))
    }
}

/// Outcome of a single field comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Ok,
    Mismatch,
    Changed,
    Warning,
    NoData,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStatus::Ok => write!(f, "ok"),
            CheckStatus::Mismatch => write!(f, "mismatch"),
            CheckStatus::Changed => write!(f, "changed"),
            CheckStatus::Warning => write!(f, "warning"),
            CheckStatus::NoData => write!(f, "no_data"),
        }
    }
}

/// One field-level comparison for one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckItem {
    pub field: String,
    pub label: String,
    pub excel_value: Option<Scalar>,
    pub app_value: Option<Scalar>,
    pub prev_month_value: Option<Scalar>,
    pub status: CheckStatus,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeResult {
    pub name: String,
    pub employee_number: String,
    pub checks: Vec<CheckItem>,
}

/// Final output of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub period: Period,
    pub column_mapping: ColumnMapping,
    pub results: Vec<EmployeeResult>,
    pub missing_from_spreadsheet: Vec<String>,
    pub new_in_spreadsheet: Vec<String>,
}

/// Check counts per status, for logging and the CLI summary line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub employees: usize,
    pub status_counts: BTreeMap<CheckStatus, usize>,
    pub missing_from_spreadsheet: usize,
    pub new_in_spreadsheet: usize,
}

impl ReportSummary {
    pub fn count(&self, status: CheckStatus) -> usize {
        self.status_counts.get(&status).copied().unwrap_or(0)
    }
}

impl ReconciliationReport {
    pub fn summary(&self) -> ReportSummary {
        let mut status_counts = BTreeMap::new();
        for check in self.results.iter().flat_map(|result| &result.checks) {
            *status_counts.entry(check.status).or_insert(0) += 1;
        }
        ReportSummary {
            employees: self.results.len(),
            status_counts,
            missing_from_spreadsheet: self.missing_from_spreadsheet.len(),
            new_in_spreadsheet: self.new_in_spreadsheet.len(),
        }
    }
}
