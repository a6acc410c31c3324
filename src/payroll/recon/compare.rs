use crate::payroll::recon::fields::DEPARTMENT;
use crate::payroll::recon::model::{
    CheckItem, CheckStatus, EmployeeResult, FieldDefinition, FieldKind, LedgerSnapshot, Scalar,
    SpreadsheetEmployee, format_number,
};

pub const MSG_NOT_IN_LEDGER: &str = "not present in ledger";
pub const MSG_NOT_IN_SPREADSHEET: &str = "not present in spreadsheet";
pub const MSG_MATCH: &str = "matches ledger";

const EPSILON: f64 = 1e-9;

/// Checks every active field of one spreadsheet employee against its ledger
/// snapshot. Unmatched employees are compared against an empty ledger.
pub fn compare_employee(
    employee: &SpreadsheetEmployee,
    snapshot: Option<&LedgerSnapshot>,
    fields: &[FieldDefinition],
) -> EmployeeResult {
    let checks = fields
        .iter()
        .filter_map(|field| {
            classify(
                field,
                employee.value(&field.key),
                snapshot.and_then(|snapshot| snapshot.current_value(&field.key)),
                snapshot.and_then(|snapshot| snapshot.previous_value(&field.key)),
            )
        })
        .collect();

    let employee_number = match snapshot {
        Some(snapshot) if employee.employee_number.is_empty() => snapshot.employee_number.clone(),
        _ => employee.employee_number.clone(),
    };

    EmployeeResult {
        name: employee.name.clone(),
        employee_number,
        checks,
    }
}

/// Classifies one value pair. Returns `None` when neither side holds a value.
pub fn classify(
    field: &FieldDefinition,
    excel: Option<&Scalar>,
    app: Option<&Scalar>,
    previous: Option<&Scalar>,
) -> Option<CheckItem> {
    let excel = excel.filter(|value| !value.is_blank());
    let app = app.filter(|value| !value.is_blank());
    let previous = previous.filter(|value| !value.is_blank());

    let item = |status: CheckStatus, message: String| CheckItem {
        field: field.key.clone(),
        label: field.label.clone(),
        excel_value: excel.cloned(),
        app_value: app.cloned(),
        prev_month_value: previous.cloned(),
        status,
        message,
    };

    let Some(app_value) = app else {
        return excel.map(|_| item(CheckStatus::NoData, MSG_NOT_IN_LEDGER.to_string()));
    };
    if excel.is_none() && !is_zero(field.kind, app_value) {
        return Some(item(CheckStatus::NoData, MSG_NOT_IN_SPREADSHEET.to_string()));
    }

    let (status, message) = if field.key == DEPARTMENT {
        compare_department(excel, app_value)
    } else {
        match field.kind {
            FieldKind::Text => compare_text(excel, app_value),
            FieldKind::Numeric => compare_numeric(excel, app_value, previous),
        }
    };
    Some(item(status, message))
}

/// Partial overlap between organisation names is accepted ("営業" vs "営業部").
fn compare_department(excel: Option<&Scalar>, app: &Scalar) -> (CheckStatus, String) {
    let excel_text = excel.map(Scalar::to_text).unwrap_or_default();
    let app_text = app.to_text();
    if excel_text.contains(&app_text) || app_text.contains(&excel_text) {
        (CheckStatus::Ok, MSG_MATCH.to_string())
    } else {
        (CheckStatus::Mismatch, mismatch_message(&excel_text, &app_text))
    }
}

fn compare_text(excel: Option<&Scalar>, app: &Scalar) -> (CheckStatus, String) {
    let excel_text = excel.map(Scalar::to_text).unwrap_or_default();
    let app_text = app.to_text();
    if excel_text == app_text {
        (CheckStatus::Ok, MSG_MATCH.to_string())
    } else {
        (CheckStatus::Mismatch, mismatch_message(&excel_text, &app_text))
    }
}

fn compare_numeric(
    excel: Option<&Scalar>,
    app: &Scalar,
    previous: Option<&Scalar>,
) -> (CheckStatus, String) {
    let excel_number = excel.map(Scalar::to_number).unwrap_or(0.0);
    let app_number = app.to_number();

    if !same_number(excel_number, app_number) {
        return (
            CheckStatus::Mismatch,
            mismatch_message(&format_number(excel_number), &format_number(app_number)),
        );
    }

    match previous.map(Scalar::to_number) {
        Some(prev) if prev > 0.0 && !same_number(prev, app_number) => {
            let delta = app_number - prev;
            (
                CheckStatus::Changed,
                format!(
                    "{} → {} ({})",
                    format_number(prev),
                    format_number(app_number),
                    signed(delta)
                ),
            )
        }
        _ => (CheckStatus::Ok, MSG_MATCH.to_string()),
    }
}

fn mismatch_message(excel: &str, app: &str) -> String {
    format!("spreadsheet {excel} / ledger {app}")
}

fn signed(delta: f64) -> String {
    let rounded = (delta * 100.0).round() / 100.0;
    let sign = if rounded < 0.0 { "-" } else { "+" };
    format!("{sign}{}", format_number(rounded.abs()))
}

fn same_number(lhs: f64, rhs: f64) -> bool {
    (lhs - rhs).abs() < EPSILON
}

/// Numeric fields read text such as "0" or "¥0" as a number first.
fn is_zero(kind: FieldKind, value: &Scalar) -> bool {
    match (kind, value) {
        (FieldKind::Numeric, value) => value.to_number() == 0.0,
        (FieldKind::Text, Scalar::Number(number)) => *number == 0.0,
        (FieldKind::Text, Scalar::Text(text)) => text.trim().is_empty(),
    }
}
