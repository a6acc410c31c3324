use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::payroll::recon::error::Result;

/// Per-company configuration maintained outside the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanySettings {
    /// Monthly standard working hours used to derive the hourly unit price.
    pub standard_working_hours: Option<f64>,
    /// Allowance slot key → the company's own name for that allowance.
    pub allowance_names: BTreeMap<String, String>,
    /// Field key → spreadsheet column label saved from earlier runs.
    pub column_hints: BTreeMap<String, String>,
}

/// Settings file shared by every company the tool reconciles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Raw company name as stored in the ledger → display name.
    pub company_aliases: BTreeMap<String, String>,
    /// Display name → company settings.
    pub companies: BTreeMap<String, CompanySettings>,
}

impl Settings {
    /// Reads settings from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Settings for the company, or defaults when it has none.
    pub fn company(&self, display_name: &str) -> CompanySettings {
        self.companies
            .get(display_name.trim())
            .cloned()
            .unwrap_or_default()
    }

    pub fn alias_table(&self) -> AliasTable {
        AliasTable::new(self.company_aliases.clone())
    }
}

/// Maps the raw company names found in ledger documents to display names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    raw_to_display: BTreeMap<String, String>,
}

impl AliasTable {
    pub fn new(raw_to_display: BTreeMap<String, String>) -> Self {
        Self { raw_to_display }
    }

    /// Display name for a raw company name. Unaliased names display as-is.
    pub fn display_name<'a>(&'a self, raw: &'a str) -> &'a str {
        self.raw_to_display
            .get(raw.trim())
            .map(String::as_str)
            .unwrap_or_else(|| raw.trim())
    }

    /// Every raw name that displays as `display`, including `display` itself.
    pub fn raw_variants(&self, display: &str) -> BTreeSet<String> {
        let display = display.trim();
        let mut variants: BTreeSet<String> = self
            .raw_to_display
            .iter()
            .filter(|(_, target)| target.trim() == display)
            .map(|(raw, _)| raw.trim().to_string())
            .collect();
        variants.insert(display.to_string());
        variants
    }
}
