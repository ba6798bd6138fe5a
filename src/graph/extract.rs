//! Root selection, resolution and projection for normalized responses.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::path;
use super::projection::{project_one, ProjectionMap};
use super::resolver::{ResolutionTable, ENTITY_URN_FIELD};

/// A normalized API response: `{ data: {...}, included: [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphResponse {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub included: Vec<Value>,
}

impl GraphResponse {
    /// Split a raw payload into `data` and `included`.
    ///
    /// Missing or non-array `included` becomes an empty list.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            return Self::default();
        };
        let data = map.remove("data").unwrap_or(Value::Null);
        let included = match map.remove("included") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        Self { data, included }
    }

    /// Whether the payload carried an `included` list with anything in it.
    pub fn has_included(&self) -> bool {
        !self.included.is_empty()
    }

    /// URNs named by a `*`-collection field inside `data`.
    ///
    /// `path` is a path relative to `data`, e.g. `*elements` or
    /// `data.feedDashProfileUpdatesByMemberShareFeed.*elements`. A single URN
    /// string yields one element; anything else yields nothing.
    pub fn root_urns(&self, path: &str) -> Vec<String> {
        match path::get(&self.data, path) {
            Some(Value::String(urn)) => vec![urn.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// First included entity with the given URN.
    pub fn entity(&self, urn: &str) -> Option<&Value> {
        self.included
            .iter()
            .find(|item| item.get(ENTITY_URN_FIELD).and_then(Value::as_str) == Some(urn))
    }

    /// Included entities whose `$type` equals `type_name`, in order.
    pub fn included_of_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a Value> {
        self.included
            .iter()
            .filter(move |item| item.get("$type").and_then(Value::as_str) == Some(type_name))
    }

    /// Resolution table over this response's included entities.
    pub fn table(&self) -> ResolutionTable<'_> {
        ResolutionTable::build(&self.included)
    }

    /// Extract the entities named at `root_path` inside `data`.
    pub fn extract(&self, root_path: &str, fields: Option<&ProjectionMap>) -> Vec<Value> {
        extract(&self.root_urns(root_path), &self.included, fields)
    }
}

/// Select the included entities named by `root_urns`, resolve their
/// references and optionally project them.
///
/// Output follows the order of `included`, not of `root_urns`.
pub fn extract<S: AsRef<str>>(
    root_urns: &[S],
    included: &[Value],
    fields: Option<&ProjectionMap>,
) -> Vec<Value> {
    let table = ResolutionTable::build(included);
    let wanted: HashSet<&str> = root_urns.iter().map(AsRef::as_ref).collect();

    included
        .iter()
        .filter(|item| {
            item.get(ENTITY_URN_FIELD)
                .and_then(Value::as_str)
                .is_some_and(|urn| wanted.contains(urn))
        })
        .map(|item| {
            let resolved = table.resolve(item);
            match fields {
                Some(map) => Value::Object(project_one(&resolved, map)),
                None => resolved,
            }
        })
        .collect()
}
