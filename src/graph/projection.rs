//! Declarative field projection.
//!
//! A [`ProjectionMap`] names output fields and the source path each one is
//! read from. Projecting a record produces a flat object that only carries
//! the fields whose path resolved; unresolved fields are left out rather
//! than written as `null`.

use serde_json::{Map, Value};

use super::path::FieldPath;

/// Output of projecting one record.
pub type Record = Map<String, Value>;

/// Ordered mapping of output field name to source path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionMap {
    fields: Vec<(String, FieldPath)>,
}

impl ProjectionMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from `(output, path)` pairs.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        pairs.iter().copied().collect()
    }

    /// Add or replace a field. A replaced field keeps its original position.
    pub fn with(mut self, output: &str, path: &str) -> Self {
        self.insert(output, path);
        self
    }

    /// Add or replace a field in place.
    pub fn insert(&mut self, output: &str, path: &str) {
        let path = FieldPath::parse(path);
        match self.fields.iter_mut().find(|(name, _)| name == output) {
            Some(entry) => entry.1 = path,
            None => self.fields.push((output.to_string(), path)),
        }
    }

    /// Merge another map into this one; its fields win on conflict.
    pub fn extend(&mut self, other: &ProjectionMap) {
        for (name, path) in &other.fields {
            match self.fields.iter_mut().find(|(n, _)| n == name) {
                Some(entry) => entry.1 = path.clone(),
                None => self.fields.push((name.clone(), path.clone())),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate `(output, path)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldPath)> {
        self.fields.iter().map(|(name, path)| (name.as_str(), path))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for ProjectionMap {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut map = ProjectionMap::new();
        for (output, path) in iter {
            map.insert(output, path);
        }
        map
    }
}

/// Project a single record.
pub fn project_one(record: &Value, map: &ProjectionMap) -> Record {
    let mut out = Record::new();
    for (output, path) in map.iter() {
        if let Some(value) = path.resolve(record) {
            out.insert(output.to_string(), value.clone());
        }
    }
    out
}

/// Project every record. Output has the same length and order as the input.
pub fn project(records: &[Value], map: &ProjectionMap) -> Vec<Record> {
    records.iter().map(|record| project_one(record, map)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_keys_are_omitted_not_null() {
        let records = vec![json!({"x": 1}), json!({})];
        let map = ProjectionMap::from_pairs(&[("y", "x")]);

        let out = project(&records, &map);
        assert_eq!(out.len(), 2);
        assert_eq!(Value::Object(out[0].clone()), json!({"y": 1}));
        assert!(out[1].is_empty());
    }

    #[test]
    fn explicit_null_is_kept() {
        let records = vec![json!({"phone": null})];
        let map = ProjectionMap::from_pairs(&[("phone", "phone"), ("fax", "fax")]);

        let out = project(&records, &map);
        assert_eq!(Value::Object(out[0].clone()), json!({"phone": null}));
    }

    #[test]
    fn count_and_order_preserved_when_nothing_matches() {
        let records = vec![json!({"a": 1}), json!("scalar"), json!(null)];
        let map = ProjectionMap::from_pairs(&[("z", "missing.path")]);

        let out = project(&records, &map);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(Record::is_empty));
    }

    #[test]
    fn nested_paths() {
        let record = json!({
            "entityUrn": "urn:li:fs_position:1",
            "company": {"miniCompany": {"name": "Acme"}},
            "timePeriod": {"endDate": {"year": 2020}}
        });
        let map = ProjectionMap::from_pairs(&[
            ("id", "entityUrn"),
            ("companyName", "company.miniCompany.name"),
            ("endYear", "timePeriod.endDate.year"),
        ]);

        let out = project_one(&record, &map);
        assert_eq!(out["id"], "urn:li:fs_position:1");
        assert_eq!(out["companyName"], "Acme");
        assert_eq!(out["endYear"], 2020);
    }

    #[test]
    fn with_replaces_in_place() {
        let map = ProjectionMap::from_pairs(&[("a", "x"), ("b", "y")]).with("a", "z");
        let names: Vec<_> = map.iter().map(|(n, p)| (n, p.as_str())).collect();
        assert_eq!(names, vec![("a", "z"), ("b", "y")]);
    }

    #[test]
    fn extend_overrides_and_appends() {
        let mut base = ProjectionMap::from_pairs(&[("urn", "metadata.backendUrn")]);
        base.extend(&ProjectionMap::from_pairs(&[("actor", "actor"), ("urn", "urn")]));

        assert_eq!(base.len(), 2);
        let record = json!({"urn": "u", "actor": {"name": "n"}});
        let out = project_one(&record, &base);
        assert_eq!(out["urn"], "u");
        assert_eq!(out["actor"]["name"], "n");
    }
}
