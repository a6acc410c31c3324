use std::collections::BTreeMap;

use crate::payroll::recon::model::{FieldDefinition, FieldKind};

/// Key of the mandatory employee name column.
pub const NAME: &str = "name";
/// Key of the optional employee number column.
pub const EMPLOYEE_NUMBER: &str = "employeeNumber";

pub const DEPARTMENT: &str = "department";
pub const BASE_SALARY: &str = "baseSalary";
pub const UNIT_PRICE: &str = "unitPrice";

/// Default label for the name column.
pub const NAME_LABEL: &str = "氏名";
/// Default label for the employee number column.
pub const EMPLOYEE_NUMBER_LABEL: &str = "社員番号";

/// Number of configurable allowance slots.
pub const ALLOWANCE_SLOTS: usize = 6;

const BASE_FIELDS: &[(&str, &str, FieldKind)] = &[
    (DEPARTMENT, "部署", FieldKind::Text),
    (BASE_SALARY, "基本給", FieldKind::Numeric),
    ("commutingAllowance", "通勤手当", FieldKind::Numeric),
    ("commutingUnitPrice", "通勤単価", FieldKind::Numeric),
    ("deemedOvertimePay", "みなし残業手当", FieldKind::Numeric),
    ("residentTax", "住民税", FieldKind::Numeric),
    (UNIT_PRICE, "時間単価", FieldKind::Numeric),
    ("socialInsuranceGrade", "社保等級", FieldKind::Text),
    ("bonus", "賞与", FieldKind::Numeric),
];

/// Keys of the allowance slots, `allowance1` through `allowance6`.
pub fn allowance_keys() -> impl Iterator<Item = String> {
    (1..=ALLOWANCE_SLOTS).map(|slot| format!("allowance{slot}"))
}

/// Builds the fields compared in this run: the fixed base set followed by
/// each allowance slot the company has named or saved a column hint for.
pub fn active_fields(
    allowance_names: &BTreeMap<String, String>,
    column_hints: &BTreeMap<String, String>,
) -> Vec<FieldDefinition> {
    let mut fields: Vec<FieldDefinition> = BASE_FIELDS
        .iter()
        .map(|(key, label, kind)| FieldDefinition::new(*key, *label, *kind))
        .collect();

    for key in allowance_keys() {
        let configured = non_blank(allowance_names.get(&key));
        let hinted = non_blank(column_hints.get(&key));
        let label = match (configured, hinted) {
            (Some(name), _) => name.to_string(),
            (None, Some(hint)) => hint.to_string(),
            (None, None) => continue,
        };
        fields.push(FieldDefinition::new(key, label, FieldKind::Numeric));
    }

    fields
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|text| text.trim()).filter(|text| !text.is_empty())
}
