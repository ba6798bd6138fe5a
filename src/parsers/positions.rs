//! Legacy `identity/profiles/{id}/positions` parser.

use std::cmp::Ordering;
use std::sync::LazyLock;

use serde_json::Value;

use crate::graph::{path, GraphResponse, ProjectionMap, Record};

pub static POSITION_FIELDS: LazyLock<ProjectionMap> = LazyLock::new(|| {
    ProjectionMap::from_pairs(&[
        ("id", "entityUrn"),
        ("title", "title"),
        ("companyName", "company.miniCompany.name"),
        ("companyUrn", "companyUrn"),
        ("companyEmployeeCount", "company.employeeCountRange"),
        ("companyIndustries", "company.miniCompany.industries"),
        ("description", "description"),
        ("location", "locationName"),
        ("geoLocation", "geoLocationName"),
        ("timePeriod", "timePeriod"),
        ("startDate", "timePeriod.startDate"),
        ("endDate", "timePeriod.endDate"),
    ])
});

/// Included fields merged into positions by company URN.
const EXTRA_FIELDS: &[&str] = &["universalName"];

/// `{entityUrn, <field>...}` for every included item that carries at least
/// one of `fields`.
pub fn fields_from_included(included: &[Value], fields: &[&str]) -> Vec<Record> {
    included
        .iter()
        .filter(|item| fields.iter().any(|f| item.get(*f).is_some()))
        .map(|item| {
            let mut record = Record::new();
            if let Some(urn) = item.get("entityUrn") {
                record.insert("entityUrn".to_string(), urn.clone());
            }
            for field in fields {
                if let Some(value) = item.get(*field) {
                    record.insert(field.to_string(), value.clone());
                }
            }
            record
        })
        .collect()
}

/// Copy each extra's fields (except `entityUrn`) onto the records whose
/// `match_key` equals the extra's `entityUrn`.
pub fn merge_extra_fields(records: &mut [Record], extras: &[Record], match_key: &str) {
    for record in records.iter_mut() {
        let Some(key) = record.get(match_key).filter(|v| !v.is_null()).cloned() else {
            continue;
        };
        let Some(extra) = extras.iter().find(|e| e.get("entityUrn") == Some(&key)) else {
            continue;
        };
        for (field, value) in extra {
            if field != "entityUrn" {
                record.insert(field.clone(), value.clone());
            }
        }
    }
}

fn end_date(record: &Record) -> Option<&Value> {
    record.get("endDate").filter(|v| !v.is_null())
}

fn date_part(date: &Value, part: &str) -> i64 {
    path::get(date, part).and_then(Value::as_i64).unwrap_or(0)
}

/// Current positions first, then most recent end date first.
pub fn compare_positions(a: &Record, b: &Record) -> Ordering {
    match (end_date(a), end_date(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => date_part(b, "year")
            .cmp(&date_part(a, "year"))
            .then_with(|| date_part(b, "month").cmp(&date_part(a, "month"))),
    }
}

/// Resolve, project, enrich and sort positions.
pub fn parse_positions(response: &GraphResponse) -> Vec<Record> {
    let mut records: Vec<Record> = response
        .extract("*elements", Some(&*POSITION_FIELDS))
        .into_iter()
        .filter_map(|value| match value {
            Value::Object(record) => Some(record),
            _ => None,
        })
        .collect();

    let extras = fields_from_included(&response.included, EXTRA_FIELDS);
    merge_extra_fields(&mut records, &extras, "companyUrn");

    records.sort_by(compare_positions);
    records
}
