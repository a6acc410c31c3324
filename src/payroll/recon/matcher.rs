use std::collections::HashSet;

use crate::payroll::recon::model::{LedgerSnapshot, SpreadsheetEmployee};

/// Ledger statuses that mean the employee is no longer on payroll.
const INACTIVE_STATUSES: &[&str] = &[
    "retired",
    "退職",
    "退職済",
    "休職",
    "inactive",
    "resigned",
    "terminated",
];

/// Whether an already matched ledger identity may be matched again by a later
/// spreadsheet row, e.g. a correction row appended below the original.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Every row may match any identity; duplicates both pair with the same
    /// ledger employee.
    #[default]
    Shared,
    /// An identity pairs with the first row that reaches it; later rows fall
    /// through to the next candidate or stay unmatched.
    Exclusive,
}

/// Pairing of spreadsheet rows with ledger snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    /// Index into the snapshot slice for each spreadsheet row, in row order.
    pub pairs: Vec<Option<usize>>,
    /// Active ledger employees with a current record that no row matched.
    pub missing_from_spreadsheet: Vec<String>,
    /// Spreadsheet employees that matched no ledger identity.
    pub new_in_spreadsheet: Vec<String>,
}

/// Removes every whitespace variant, including the full-width U+3000 space
/// common in Japanese names.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '\u{3000}')
        .collect()
}

pub fn is_active(status: &str) -> bool {
    let status = status.trim().to_lowercase();
    !INACTIVE_STATUSES.contains(&status.as_str())
}

/// Pairs each spreadsheet employee with a ledger snapshot: employee number
/// first, then whitespace-insensitive name. The first candidate wins.
pub fn match_employees(
    employees: &[SpreadsheetEmployee],
    snapshots: &[LedgerSnapshot],
    policy: MatchPolicy,
) -> MatchOutcome {
    let mut matched: HashSet<&str> = HashSet::new();
    let mut pairs = Vec::with_capacity(employees.len());
    let mut new_in_spreadsheet = Vec::new();

    for employee in employees {
        let number = employee.employee_number.trim();
        let wanted_name = normalize_name(&employee.name);
        let available = |snapshot: &LedgerSnapshot| {
            policy == MatchPolicy::Shared || !matched.contains(snapshot.identity_key.as_str())
        };

        let by_number = if number.is_empty() {
            None
        } else {
            snapshots.iter().position(|snapshot| {
                available(snapshot) && snapshot.employee_number.trim() == number
            })
        };
        let found = by_number.or_else(|| {
            snapshots.iter().position(|snapshot| {
                available(snapshot) && normalize_name(&snapshot.name) == wanted_name
            })
        });

        match found {
            Some(index) => {
                matched.insert(snapshots[index].identity_key.as_str());
            }
            None => new_in_spreadsheet.push(employee.name.clone()),
        }
        pairs.push(found);
    }

    let missing_from_spreadsheet = snapshots
        .iter()
        .filter(|snapshot| {
            snapshot.current.is_some()
                && is_active(&snapshot.status)
                && !matched.contains(snapshot.identity_key.as_str())
        })
        .map(|snapshot| snapshot.name.clone())
        .collect();

    MatchOutcome {
        pairs,
        missing_from_spreadsheet,
        new_in_spreadsheet,
    }
}
