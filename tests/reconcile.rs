mod common;

use std::collections::BTreeMap;
use std::fs;

use payroll_recon::io::excel_write;
use payroll_recon::io::settings::{AliasTable, CompanySettings, Settings};
use payroll_recon::io::store::{JsonFileStore, MemoryStore};
use payroll_recon::io::workbook;
use payroll_recon::model::{CheckStatus, LedgerRecord, ReconciliationReport, Scalar};
use payroll_recon::reconcile::{self, ReconcileRequest};
use payroll_recon::{ErrorKind, ReconError};
use serde_json::json;
use tempfile::tempdir;

use common::{record, write_sheet};

const COMPANY: &str = "Acme";

fn run_with(rows: &[serde_json::Value], ledger: Vec<LedgerRecord>) -> ReconciliationReport {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("payroll.xlsx");
    write_sheet(&xlsx_path, rows);

    let request = ReconcileRequest::new(COMPANY, "2024-05".parse().expect("period"));
    let store = MemoryStore::new(ledger);
    reconcile::reconcile_file(&xlsx_path, &request, &store, &AliasTable::default())
        .expect("reconciliation succeeded")
}

fn single_row() -> Vec<serde_json::Value> {
    vec![json!(["氏名", "基本給"]), json!(["山田太郎", 250000])]
}

#[test]
fn matching_value_without_history_is_ok() {
    let ledger = vec![record(COMPANY, "2024-05", "山田太郎", &[("baseSalary", 250000.0)])];
    let report = run_with(&single_row(), ledger);

    assert_eq!(report.results.len(), 1);
    let result = &report.results[0];
    assert_eq!(result.name, "山田太郎");
    assert_eq!(result.checks.len(), 1);
    assert_eq!(result.checks[0].field, "baseSalary");
    assert_eq!(result.checks[0].status, CheckStatus::Ok);
    assert!(report.missing_from_spreadsheet.is_empty());
    assert!(report.new_in_spreadsheet.is_empty());
}

#[test]
fn differing_value_is_a_mismatch_naming_both_values() {
    let ledger = vec![record(COMPANY, "2024-05", "山田太郎", &[("baseSalary", 240000.0)])];
    let report = run_with(&single_row(), ledger);

    let check = &report.results[0].checks[0];
    assert_eq!(check.status, CheckStatus::Mismatch);
    assert!(check.message.contains("250000"));
    assert!(check.message.contains("240000"));
    assert_eq!(check.excel_value, Some(Scalar::Number(250000.0)));
    assert_eq!(check.app_value, Some(Scalar::Number(240000.0)));
}

#[test]
fn raise_since_last_month_is_flagged_as_changed() {
    let ledger = vec![
        record(COMPANY, "2024-05", "山田太郎", &[("baseSalary", 250000.0)]),
        record(COMPANY, "2024-04", "山田太郎", &[("baseSalary", 200000.0)]),
    ];
    let report = run_with(&single_row(), ledger);

    let check = &report.results[0].checks[0];
    assert_eq!(check.status, CheckStatus::Changed);
    assert_eq!(check.message, "200000 → 250000 (+50000)");
    assert_eq!(check.prev_month_value, Some(Scalar::Number(200000.0)));
}

#[test]
fn unmatched_people_on_either_side_are_listed() {
    let rows = vec![
        json!(["氏名", "基本給"]),
        json!(["山田太郎", 250000]),
        json!(["佐藤花子", 220000]),
    ];
    let ledger = vec![
        record(COMPANY, "2024-05", "山田太郎", &[("baseSalary", 250000.0)]),
        record(COMPANY, "2024-05", "鈴木一郎", &[("baseSalary", 300000.0)]),
    ];
    let report = run_with(&rows, ledger);

    assert_eq!(report.new_in_spreadsheet, vec!["佐藤花子".to_string()]);
    assert_eq!(report.missing_from_spreadsheet, vec!["鈴木一郎".to_string()]);

    let newcomer = &report.results[1];
    assert_eq!(newcomer.name, "佐藤花子");
    assert_eq!(newcomer.checks[0].status, CheckStatus::NoData);
    assert_eq!(newcomer.checks[0].message, "not present in ledger");
}

#[test]
fn retired_employees_are_never_missing() {
    let mut retired = record(COMPANY, "2024-05", "鈴木一郎", &[("baseSalary", 300000.0)]);
    retired.status = Some("retired".to_string());
    let ledger = vec![
        record(COMPANY, "2024-05", "山田太郎", &[("baseSalary", 250000.0)]),
        retired,
    ];
    let report = run_with(&single_row(), ledger);

    assert!(report.missing_from_spreadsheet.is_empty());
}

#[test]
fn single_row_sheet_is_invalid_input() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("header-only.xlsx");
    write_sheet(&xlsx_path, &[json!(["氏名", "基本給"])]);

    let request = ReconcileRequest::new(COMPANY, "2024-05".parse().expect("period"));
    let error = reconcile::reconcile_file(
        &xlsx_path,
        &request,
        &MemoryStore::default(),
        &AliasTable::default(),
    )
    .expect_err("one row cannot be reconciled");

    assert_eq!(error.kind(), ErrorKind::InvalidInput);
}

#[test]
fn unresolvable_name_column_is_reported() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("no-name.xlsx");
    write_sheet(&xlsx_path, &[json!(["コード", "支給額"]), json!(["A001", 250000])]);

    let request = ReconcileRequest::new(COMPANY, "2024-05".parse().expect("period"));
    let error = reconcile::reconcile_file(
        &xlsx_path,
        &request,
        &MemoryStore::default(),
        &AliasTable::default(),
    )
    .expect_err("name column is mandatory");

    assert_eq!(error.kind(), ErrorKind::MissingRequiredColumn);
    assert!(matches!(error, ReconError::MissingRequiredColumn { .. }));
}

#[test]
fn blank_company_is_rejected_before_loading() {
    let request = ReconcileRequest::new("  ", "2024-05".parse().expect("period"));
    let error = reconcile::reconcile_file(
        std::path::Path::new("does-not-matter.xlsx"),
        &request,
        &MemoryStore::default(),
        &AliasTable::default(),
    )
    .expect_err("company is required");

    assert!(matches!(error, ReconError::InvalidInput(_)));
}

#[test]
fn unreachable_ledger_is_an_unexpected_failure() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("payroll.xlsx");
    write_sheet(&xlsx_path, &single_row());
    let store = JsonFileStore::open(temp_dir.path().join("missing-ledger.json"));

    let request = ReconcileRequest::new(COMPANY, "2024-05".parse().expect("period"));
    let error = reconcile::reconcile_file(&xlsx_path, &request, &store, &AliasTable::default())
        .expect_err("ledger file does not exist");

    assert!(matches!(error, ReconError::Store(_)));
    assert_eq!(error.kind(), ErrorKind::UnexpectedFailure);
}

#[test]
fn malformed_ledger_is_an_unexpected_failure() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("payroll.xlsx");
    write_sheet(&xlsx_path, &single_row());
    let ledger_path = temp_dir.path().join("ledger.json");
    fs::write(&ledger_path, "{ not json").expect("ledger written");

    let request = ReconcileRequest::new(COMPANY, "2024-05".parse().expect("period"));
    let error = reconcile::reconcile_file(
        &xlsx_path,
        &request,
        &JsonFileStore::open(&ledger_path),
        &AliasTable::default(),
    )
    .expect_err("ledger cannot be parsed");

    assert_eq!(error.kind(), ErrorKind::UnexpectedFailure);
}

#[test]
fn invalid_sheet_is_reported_before_the_ledger_is_read() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("header-only.xlsx");
    write_sheet(&xlsx_path, &[json!(["氏名", "基本給"])]);
    let store = JsonFileStore::open(temp_dir.path().join("missing-ledger.json"));

    let request = ReconcileRequest::new(COMPANY, "2024-05".parse().expect("period"));
    let error = reconcile::reconcile_file(&xlsx_path, &request, &store, &AliasTable::default())
        .expect_err("one row cannot be reconciled");

    assert_eq!(error.kind(), ErrorKind::InvalidInput);
}

#[test]
fn missing_workbook_is_invalid_input() {
    let error = workbook::load_matrix(std::path::Path::new("no/such/file.xlsx"))
        .expect_err("file does not exist");
    assert_eq!(error.kind(), ErrorKind::InvalidInput);
}

#[test]
fn settings_file_drives_aliases_hints_and_allowances() {
    let temp_dir = tempdir().expect("temporary directory");

    let xlsx_path = temp_dir.path().join("payroll.xlsx");
    write_sheet(
        &xlsx_path,
        &[
            json!(["従業員", "社員番号", "月給", "資格手当"]),
            json!(["山田 太郎", "1001", "250,000", 5000]),
        ],
    );

    let settings_path = temp_dir.path().join("settings.json");
    fs::write(
        &settings_path,
        serde_json::to_string_pretty(&json!({
            "companyAliases": { "株式会社アクメ": "Acme" },
            "companies": {
                "Acme": {
                    "standardWorkingHours": 160,
                    "allowanceNames": { "allowance1": "資格手当" },
                    "columnHints": { "name": "従業員", "baseSalary": "月給" }
                }
            }
        }))
        .expect("settings serialised"),
    )
    .expect("settings written");

    let ledger_path = temp_dir.path().join("ledger.json");
    let mut current = record(
        "株式会社アクメ",
        "2024-05",
        "山田太郎",
        &[("baseSalary", 250000.0), ("allowance1", 5000.0)],
    );
    current.employee_number = Some("1001".to_string());
    fs::write(
        &ledger_path,
        serde_json::to_string_pretty(&vec![current]).expect("ledger serialised"),
    )
    .expect("ledger written");

    let settings = Settings::from_file(&settings_path).expect("settings loaded");
    let store = JsonFileStore::open(&ledger_path);
    let request = ReconcileRequest::new(COMPANY, "2024-05".parse().expect("period"))
        .with_settings(settings.company(COMPANY));

    let report = reconcile::reconcile_file(&xlsx_path, &request, &store, &settings.alias_table())
        .expect("reconciliation succeeded");

    assert_eq!(report.column_mapping.column("name"), Some(0));
    assert_eq!(report.column_mapping.column("baseSalary"), Some(2));
    assert_eq!(report.column_mapping.column("allowance1"), Some(3));
    assert!(report.new_in_spreadsheet.is_empty());

    let statuses: BTreeMap<&str, CheckStatus> = report.results[0]
        .checks
        .iter()
        .map(|check| (check.field.as_str(), check.status))
        .collect();
    assert_eq!(statuses.get("baseSalary"), Some(&CheckStatus::Ok));
    assert_eq!(statuses.get("allowance1"), Some(&CheckStatus::Ok));
    // 255000 / 160, derived because the ledger stores no unit price.
    let unit_price = report.results[0]
        .checks
        .iter()
        .find(|check| check.field == "unitPrice")
        .expect("derived unit price is checked");
    assert_eq!(unit_price.app_value, Some(Scalar::Number(1593.75)));
    assert_eq!(unit_price.status, CheckStatus::NoData);
    assert_eq!(unit_price.message, "not present in spreadsheet");
}

#[test]
fn report_serialises_with_camel_case_keys() {
    let ledger = vec![record(COMPANY, "2024-05", "鈴木一郎", &[("baseSalary", 300000.0)])];
    let report = run_with(&single_row(), ledger);

    let json = serde_json::to_value(&report).expect("report serialised");
    assert_eq!(json["period"], json!("2024-05"));
    assert_eq!(json["columnMapping"]["name"], json!(0));
    assert_eq!(json["columnMapping"]["department"], json!(null));
    assert_eq!(json["missingFromSpreadsheet"], json!(["鈴木一郎"]));
    assert_eq!(json["newInSpreadsheet"], json!(["山田太郎"]));
    assert_eq!(json["results"][0]["employeeNumber"], json!(""));
    assert_eq!(json["results"][0]["checks"][0]["status"], json!("no_data"));
    assert_eq!(json["results"][0]["checks"][0]["excelValue"], json!(250000.0));
    assert_eq!(json["results"][0]["checks"][0]["appValue"], json!(null));

    let restored: ReconciliationReport =
        serde_json::from_value(json).expect("report deserialised");
    assert_eq!(restored, report);
}

#[test]
fn report_exports_to_a_workbook() {
    let ledger = vec![
        record(COMPANY, "2024-05", "山田太郎", &[("baseSalary", 240000.0)]),
        record(COMPANY, "2024-05", "鈴木一郎", &[("baseSalary", 300000.0)]),
    ];
    let report = run_with(&single_row(), ledger);

    let temp_dir = tempdir().expect("temporary directory");
    let export_path = temp_dir.path().join("report.xlsx");
    excel_write::write_report(&export_path, &report).expect("report exported");

    let exported = workbook::load_matrix(&export_path).expect("export readable");
    assert_eq!(exported[0][0], Some(Scalar::Text("氏名".to_string())));
    assert_eq!(exported[1][0], Some(Scalar::Text("山田太郎".to_string())));
    assert_eq!(exported[1][2], Some(Scalar::Text("基本給".to_string())));
    assert_eq!(exported[1][3], Some(Scalar::Number(250000.0)));
    assert_eq!(exported[1][4], Some(Scalar::Number(240000.0)));
    assert_eq!(exported[1][6], Some(Scalar::Text("mismatch".to_string())));
}

#[test]
fn company_settings_default_when_unconfigured() {
    let settings = Settings::default();
    assert_eq!(settings.company("Unknown"), CompanySettings::default());
}
