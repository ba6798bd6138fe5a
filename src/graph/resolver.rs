//! Reference resolution over normalized API payloads.
//!
//! Normalized responses keep every entity once in a side `included` list and
//! link entities by URN. Two link shapes exist:
//!
//! - **single pointer**: a key prefixed with `*` whose value is one URN
//!   (`"*company": "urn:li:fs_company:1"`). The resolved entity is stored
//!   under the key without the sigil (`company`).
//! - **collection pointer**: any key whose value is a non-empty array of
//!   strings, the first of which is URN-shaped. The key is kept verbatim
//!   (`*companyIndustries` stays `*companyIndustries`) and each URN is
//!   replaced by its resolved entity.
//!
//! Miss policy is deliberately asymmetric:
//!
//! - a single pointer whose URN is not in the table is kept as-is
//!   (`"*company": "urn:..."` survives unchanged);
//! - a collection element whose URN is not in the table is dropped, so the
//!   resulting array only ever holds resolved objects.
//!
//! Resolution recurses into resolved targets. A URN that is already being
//! expanded further up the current branch is inlined as its raw, unresolved
//! entity instead of being expanded again, so resolution terminates on
//! cyclic input. Shared (non-cyclic) references are fully expanded at every
//! place they appear.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::debug;

use super::urn::is_urn;

/// Prefix marking a key whose value is a reference.
pub const POINTER_SIGIL: char = '*';

/// Field every included entity is keyed by.
pub const ENTITY_URN_FIELD: &str = "entityUrn";

/// URN to entity lookup for one response.
#[derive(Debug, Clone, Default)]
pub struct ResolutionTable<'a> {
    entities: HashMap<&'a str, &'a Value>,
}

impl<'a> ResolutionTable<'a> {
    /// Index every included entity by its own `entityUrn`.
    ///
    /// On duplicate URNs the last occurrence wins. Items without a string
    /// `entityUrn` are not indexed.
    pub fn build(included: &'a [Value]) -> Self {
        let mut entities = HashMap::with_capacity(included.len());
        for item in included {
            if let Some(urn) = item.get(ENTITY_URN_FIELD).and_then(Value::as_str) {
                entities.insert(urn, item);
            }
        }
        Self { entities }
    }

    pub fn get(&self, urn: &str) -> Option<&'a Value> {
        self.entities.get(urn).copied()
    }

    pub fn contains(&self, urn: &str) -> bool {
        self.entities.contains_key(urn)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Resolve every reference reachable from `value`.
    pub fn resolve(&self, value: &Value) -> Value {
        Resolver {
            table: self,
            expanding: Vec::new(),
        }
        .resolve_value(value)
    }

    fn get_key_value(&self, urn: &str) -> Option<(&'a str, &'a Value)> {
        self.entities
            .get_key_value(urn)
            .map(|(key, value)| (*key, *value))
    }
}

/// How one object field takes part in resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind<'k> {
    /// Ordinary field: nested values are resolved, scalars copied.
    Plain,
    /// `*`-prefixed key holding one URN; resolves under `name`.
    SinglePointer { name: &'k str, urn: &'k str },
    /// Array of URN strings; resolves element-wise under the same key.
    CollectionPointer { urns: &'k [Value] },
}

/// Classify a field by its key and value shape.
pub fn classify<'k>(key: &'k str, value: &'k Value) -> KeyKind<'k> {
    if let (Some(name), Value::String(urn)) = (key.strip_prefix(POINTER_SIGIL), value) {
        return KeyKind::SinglePointer { name, urn };
    }

    if let Value::Array(items) = value {
        let starts_with_urn = items
            .first()
            .and_then(Value::as_str)
            .is_some_and(is_urn);
        if starts_with_urn && items.iter().all(Value::is_string) {
            return KeyKind::CollectionPointer { urns: items };
        }
    }

    KeyKind::Plain
}

struct Resolver<'t, 'a> {
    table: &'t ResolutionTable<'a>,
    /// URNs whose expansion is in progress on the current branch.
    expanding: Vec<&'a str>,
}

impl<'a> Resolver<'_, 'a> {
    fn resolve_value(&mut self, value: &Value) -> Value {
        match value {
            Value::Array(items) => {
                Value::Array(items.iter().map(|item| self.resolve_value(item)).collect())
            }
            Value::Object(map) => Value::Object(self.resolve_object(map)),
            scalar => scalar.clone(),
        }
    }

    fn resolve_object(&mut self, map: &Map<String, Value>) -> Map<String, Value> {
        let mut out = Map::new();

        for (key, value) in map {
            match classify(key, value) {
                KeyKind::SinglePointer { name, urn } => match self.follow(urn) {
                    Some(resolved) => {
                        out.insert(name.to_string(), resolved);
                    }
                    None => {
                        debug!("Unresolved reference {} -> {}", key, urn);
                        out.insert(key.clone(), value.clone());
                    }
                },
                KeyKind::CollectionPointer { urns } => {
                    let resolved: Vec<Value> = urns
                        .iter()
                        .filter_map(Value::as_str)
                        .filter_map(|urn| self.follow(urn))
                        .collect();
                    if resolved.len() < urns.len() {
                        debug!(
                            "Dropped {} unresolved URNs from {}",
                            urns.len() - resolved.len(),
                            key
                        );
                    }
                    out.insert(key.clone(), Value::Array(resolved));
                }
                KeyKind::Plain => {
                    out.insert(key.clone(), self.resolve_value(value));
                }
            }
        }

        out
    }

    /// Look up and expand one URN. `None` means the URN is not in the table.
    fn follow(&mut self, urn: &str) -> Option<Value> {
        let (key, target) = self.table.get_key_value(urn)?;

        if self.expanding.contains(&key) {
            debug!("Cyclic reference to {}, inlining unresolved entity", key);
            return Some(target.clone());
        }

        self.expanding.push(key);
        let resolved = self.resolve_value(target);
        self.expanding.pop();

        Some(resolved)
    }
}

/// Resolve `value` against a table built from `included`.
pub fn resolve_references(value: &Value, included: &[Value]) -> Value {
    ResolutionTable::build(included).resolve(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_pointer_hit() {
        let included = vec![json!({"entityUrn": "urn:li:c:1", "name": "Acme"})];
        let entity = json!({"*company": "urn:li:c:1"});

        assert_eq!(
            resolve_references(&entity, &included),
            json!({"company": {"entityUrn": "urn:li:c:1", "name": "Acme"}})
        );
    }

    #[test]
    fn single_pointer_miss_is_kept() {
        let included = vec![json!({"entityUrn": "urn:li:c:1"})];
        let entity = json!({"*company": "urn:li:c:404"});

        assert_eq!(resolve_references(&entity, &included), entity);
    }

    #[test]
    fn collection_miss_is_dropped() {
        let included = vec![json!({"entityUrn": "urn:li:t:1"})];
        let entity = json!({"tags": ["urn:li:t:1", "urn:li:t:2"]});

        let resolved = resolve_references(&entity, &included);
        assert_eq!(resolved, json!({"tags": [{"entityUrn": "urn:li:t:1"}]}));
    }

    #[test]
    fn collection_key_keeps_sigil() {
        let included = vec![json!({"entityUrn": "urn:li:industry:4", "localizedName": "Software"})];
        let entity = json!({"*companyIndustries": ["urn:li:industry:4"]});

        let resolved = resolve_references(&entity, &included);
        assert_eq!(
            resolved["*companyIndustries"][0]["localizedName"],
            "Software"
        );
    }

    #[test]
    fn mixed_arrays_are_plain() {
        let included = vec![json!({"entityUrn": "urn:li:t:1"})];
        let entity = json!({
            "mixed": ["urn:li:t:1", 3],
            "words": ["hello", "urn:li:t:1"]
        });

        assert_eq!(resolve_references(&entity, &included), entity);
    }

    #[test]
    fn resolves_transitively_and_in_nested_objects() {
        let included = vec![
            json!({"entityUrn": "urn:li:p:1", "*miniCompany": "urn:li:m:1"}),
            json!({"entityUrn": "urn:li:m:1", "name": "Acme"}),
        ];
        let entity = json!({"outer": {"list": [{"*position": "urn:li:p:1"}]}});

        let resolved = resolve_references(&entity, &included);
        assert_eq!(
            resolved["outer"]["list"][0]["position"]["miniCompany"]["name"],
            "Acme"
        );
    }

    #[test]
    fn last_duplicate_wins() {
        let included = vec![
            json!({"entityUrn": "urn:li:c:1", "name": "first"}),
            json!({"entityUrn": "urn:li:c:1", "name": "second"}),
        ];
        let resolved = resolve_references(&json!({"*c": "urn:li:c:1"}), &included);
        assert_eq!(resolved["c"]["name"], "second");
    }

    #[test]
    fn resolving_resolved_entity_is_identity() {
        let included = vec![json!({"entityUrn": "urn:li:c:1", "name": "Acme"})];
        let once = resolve_references(&json!({"*company": "urn:li:c:1", "n": 1}), &included);
        let twice = resolve_references(&once, &included);
        assert_eq!(once, twice);
    }

    #[test]
    fn self_reference_terminates() {
        let included = vec![json!({"entityUrn": "urn:li:a:1", "*self": "urn:li:a:1"})];
        let resolved = resolve_references(&json!({"*root": "urn:li:a:1"}), &included);

        assert_eq!(resolved["root"]["entityUrn"], "urn:li:a:1");
        // Second visit is inlined raw, its pointer left untouched.
        assert_eq!(resolved["root"]["self"]["*self"], "urn:li:a:1");
    }

    #[test]
    fn mutual_cycle_through_collection_terminates() {
        let included = vec![
            json!({"entityUrn": "urn:li:a:1", "peers": ["urn:li:b:1"]}),
            json!({"entityUrn": "urn:li:b:1", "peers": ["urn:li:a:1"]}),
        ];
        let resolved = resolve_references(&json!({"*a": "urn:li:a:1"}), &included);

        assert_eq!(resolved["a"]["peers"][0]["entityUrn"], "urn:li:b:1");
        assert_eq!(
            resolved["a"]["peers"][0]["peers"][0],
            json!({"entityUrn": "urn:li:a:1", "peers": ["urn:li:b:1"]})
        );
    }

    #[test]
    fn shared_reference_expands_everywhere() {
        let included = vec![
            json!({"entityUrn": "urn:li:x:1", "*y": "urn:li:y:1"}),
            json!({"entityUrn": "urn:li:y:1", "v": 1}),
        ];
        let entity = json!({"*a": "urn:li:x:1", "*b": "urn:li:x:1"});
        let resolved = resolve_references(&entity, &included);

        assert_eq!(resolved["a"]["y"]["v"], 1);
        assert_eq!(resolved["b"]["y"]["v"], 1);
    }

    #[test]
    fn classify_keys() {
        let single = json!("urn:li:c:1");
        assert_eq!(
            classify("*company", &single),
            KeyKind::SinglePointer {
                name: "company",
                urn: "urn:li:c:1"
            }
        );
        assert_eq!(classify("company", &single), KeyKind::Plain);
        assert_eq!(classify("*company", &json!(null)), KeyKind::Plain);
        assert_eq!(classify("list", &json!([])), KeyKind::Plain);
        assert!(matches!(
            classify("*elements", &json!(["urn:li:a:1"])),
            KeyKind::CollectionPointer { .. }
        ));
    }

    #[test]
    fn inputs_are_not_mutated() {
        let included = vec![json!({"entityUrn": "urn:li:c:1", "*next": "urn:li:c:2"})];
        let snapshot = included.clone();
        let entity = json!({"*c": "urn:li:c:1"});
        let _ = resolve_references(&entity, &included);
        assert_eq!(included, snapshot);
    }
}
