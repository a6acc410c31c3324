use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::payroll::recon::error::Result;
use crate::payroll::recon::fields::{BASE_SALARY, UNIT_PRICE, allowance_keys};
use crate::payroll::recon::io::settings::AliasTable;
use crate::payroll::recon::io::store::{LedgerStore, RecordFilter};
use crate::payroll::recon::model::{FieldMap, LedgerRecord, LedgerSnapshot, Period, Scalar};

/// Reads the company's ledger records for `period` and the month before it
/// and folds them into one snapshot per employee identity, in the order the
/// store first returned each identity.
#[instrument(level = "debug", skip(store, aliases, period), fields(%period))]
pub fn build_snapshots(
    store: &dyn LedgerStore,
    company: &str,
    period: Period,
    aliases: &AliasTable,
    standard_working_hours: Option<f64>,
) -> Result<Vec<LedgerSnapshot>> {
    let filter = RecordFilter::new(company, aliases, vec![period, period.previous()]);
    let records = store.find_records(&filter)?;
    debug!(
        record_count = records.len(),
        raw_names = ?filter.raw_names,
        "ledger records fetched"
    );

    let mut snapshots: Vec<LedgerSnapshot> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for record in &records {
        let Some(key) = identity_key(record) else {
            continue;
        };
        positions.entry(key.clone()).or_insert_with(|| {
            snapshots.push(LedgerSnapshot {
                identity_key: key,
                name: String::new(),
                employee_number: String::new(),
                status: String::new(),
                current: None,
                previous: None,
            });
            snapshots.len() - 1
        });
    }

    // Older documents first so later edits win; undated documents count as oldest.
    let mut chronological: Vec<&LedgerRecord> = records.iter().collect();
    chronological.sort_by_key(|record| record.updated_at);

    for record in chronological {
        let Some(position) = identity_key(record).and_then(|key| positions.get(&key).copied())
        else {
            continue;
        };
        apply_record(&mut snapshots[position], record, period);
    }

    for snapshot in &mut snapshots {
        for bucket in [&mut snapshot.current, &mut snapshot.previous]
            .into_iter()
            .flatten()
        {
            derive_unit_price(bucket, standard_working_hours);
        }
    }

    Ok(snapshots)
}

/// External system id, else employee number, else name.
pub fn identity_key(record: &LedgerRecord) -> Option<String> {
    [
        record.external_id.as_deref(),
        record.employee_number.as_deref(),
        Some(record.name.as_str()),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .find(|candidate| !candidate.is_empty())
    .map(str::to_string)
}

fn apply_record(snapshot: &mut LedgerSnapshot, record: &LedgerRecord, period: Period) {
    overwrite_if_present(&mut snapshot.name, Some(record.name.as_str()));
    overwrite_if_present(&mut snapshot.employee_number, record.employee_number.as_deref());
    overwrite_if_present(&mut snapshot.status, record.status.as_deref());

    let bucket = if record.period == period {
        &mut snapshot.current
    } else {
        &mut snapshot.previous
    };
    let values = bucket.get_or_insert_with(FieldMap::new);
    for (key, value) in &record.values {
        if !value.is_blank() {
            values.insert(key.clone(), value.clone());
        }
    }
}

fn overwrite_if_present(target: &mut String, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) {
        *target = value.to_string();
    }
}

/// Fills in the hourly unit price from base salary and allowances when the
/// ledger holds none. Non-positive working hours leave it untouched.
pub fn derive_unit_price(values: &mut FieldMap, standard_working_hours: Option<f64>) {
    let stored = values.get(UNIT_PRICE).map(Scalar::to_number).unwrap_or(0.0);
    if stored != 0.0 {
        return;
    }
    let Some(hours) = standard_working_hours.filter(|hours| *hours > 0.0) else {
        return;
    };

    let components: Vec<f64> = std::iter::once(BASE_SALARY.to_string())
        .chain(allowance_keys())
        .filter_map(|key| values.get(&key).map(Scalar::to_number))
        .collect();
    if components.is_empty() {
        return;
    }

    let total: f64 = components.iter().sum();
    values.insert(UNIT_PRICE.to_string(), Scalar::Number(round2(total / hours)));
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
