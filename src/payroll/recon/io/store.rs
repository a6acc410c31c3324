use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::payroll::recon::error::{ReconError, Result};
use crate::payroll::recon::io::settings::AliasTable;
use crate::payroll::recon::model::{LedgerRecord, Period};

/// Equality filter over ledger documents: one company (under any of its raw
/// names) and a set of periods.
#[derive(Debug, Clone)]
pub struct RecordFilter {
    pub display_name: String,
    pub raw_names: BTreeSet<String>,
    pub aliases: AliasTable,
    pub periods: Vec<Period>,
}

impl RecordFilter {
    pub fn new(display_name: &str, aliases: &AliasTable, periods: Vec<Period>) -> Self {
        Self {
            display_name: display_name.trim().to_string(),
            raw_names: aliases.raw_variants(display_name),
            aliases: aliases.clone(),
            periods,
        }
    }

    pub fn matches(&self, record: &LedgerRecord) -> bool {
        let company = record.company_name.trim();
        let same_company = self.raw_names.contains(company)
            || self.aliases.display_name(company) == self.display_name;
        same_company && self.periods.contains(&record.period)
    }
}

/// Read-only access to persisted payroll documents.
pub trait LedgerStore {
    /// Returns every record the filter accepts, in store order.
    fn find_records(&self, filter: &RecordFilter) -> Result<Vec<LedgerRecord>>;
}

/// Ledger held in memory, for embedding callers and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<LedgerRecord>,
}

impl MemoryStore {
    pub fn new(records: Vec<LedgerRecord>) -> Self {
        Self { records }
    }
}

impl LedgerStore for MemoryStore {
    fn find_records(&self, filter: &RecordFilter) -> Result<Vec<LedgerRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }
}

/// Ledger exported as a JSON array of records. The file is read on every
/// query, so opening never touches the disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<Vec<LedgerRecord>> {
        let unavailable = |err: &dyn std::fmt::Display| {
            ReconError::Store(format!("{}: {err}", self.path.display()))
        };
        let source = fs::read_to_string(&self.path).map_err(|err| unavailable(&err))?;
        let records: Vec<LedgerRecord> =
            serde_json::from_str(&source).map_err(|err| unavailable(&err))?;
        debug!(record_count = records.len(), path = %self.path.display(), "read ledger file");
        Ok(records)
    }
}

impl LedgerStore for JsonFileStore {
    fn find_records(&self, filter: &RecordFilter) -> Result<Vec<LedgerRecord>> {
        MemoryStore::new(self.load()?).find_records(filter)
    }
}
