//! Work-experience extraction from the profile-components payload.
//!
//! The experience section is not a plain entity list. It is a tree of UI
//! components: an anchor list component whose elements are either a single
//! role, or a company "group" block whose roles live in a separate paged list
//! component referenced by URN.
//!
//! Extraction runs in two passes. The first indexes every included item by
//! its URN. The second finds the anchor list and walks its elements, following
//! nested list URNs through the same index.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::path;
use super::resolver::ENTITY_URN_FIELD;
use super::urn::numeric_suffix_from_url;

/// Marker substring of the experience anchor URN.
pub const EXPERIENCE_ANCHOR_MARKER: &str = "EXPERIENCE_VIEW_DETAILS";

/// Profile namespace the anchor must belong to.
pub const PROFILE_NAMESPACE_MARKER: &str = "fsd_profile:";

/// Separator between the date range and the duration in a caption.
const CAPTION_SEPARATOR: char = '·';

/// One extracted experience entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub role: String,
    #[serde(rename = "idCompany")]
    pub company_id: Option<String>,
    pub company: Option<String>,
    /// Raw caption text, e.g. `Jan 2020 - Present · 4 yrs`.
    pub time_duration: String,
    pub location: String,
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// Why one anchor element could not be interpreted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExperienceError {
    #[error("Element {index} is not an object")]
    NotAnObject { index: usize },

    #[error("Element {index} has an entityComponent that is not an object")]
    InvalidEntity { index: usize },

    #[error("Nested list {urn} has a non-array elements field")]
    MalformedList { urn: String },
}

/// URN-indexed view of the included components, keeping first-seen order.
#[derive(Debug, Default)]
pub struct ComponentMap<'a> {
    by_urn: HashMap<&'a str, &'a Value>,
    order: Vec<&'a str>,
}

impl<'a> ComponentMap<'a> {
    /// Index every included item carrying an `entityUrn`. A repeated URN keeps
    /// its first position but maps to the last item seen.
    pub fn build(included: &'a [Value]) -> Self {
        let mut map = Self::default();
        for item in included {
            let Some(urn) = item.get(ENTITY_URN_FIELD).and_then(Value::as_str) else {
                continue;
            };
            if map.by_urn.insert(urn, item).is_none() {
                map.order.push(urn);
            }
        }
        map
    }

    pub fn get(&self, urn: &str) -> Option<&'a Value> {
        self.by_urn.get(urn).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// URNs in the order they first appeared in `included`.
    pub fn urns(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.order.iter().copied()
    }

    /// First URN naming the experience details list of a profile.
    pub fn find_anchor(&self) -> Option<&'a str> {
        self.urns().find(|urn| {
            urn.contains(EXPERIENCE_ANCHOR_MARKER) && urn.contains(PROFILE_NAMESPACE_MARKER)
        })
    }
}

/// How to find a nested list reference among a block's sub-component keys.
///
/// This is a heuristic over an undocumented payload: if the provider renames
/// the field, neither strategy matches and grouped blocks are silently
/// treated as single entries.
#[derive(Debug, Clone, Copy)]
enum NestedListStrategy {
    ExactKeys(&'static [&'static str]),
    KeyContains(&'static str),
}

const NESTED_LIST_STRATEGIES: &[NestedListStrategy] = &[
    NestedListStrategy::ExactKeys(&["*pagedListComponent", "pagedListComponent"]),
    NestedListStrategy::KeyContains("pagedlistcomponent"),
];

impl NestedListStrategy {
    fn find<'v>(&self, components: &'v Map<String, Value>) -> Option<&'v str> {
        match self {
            Self::ExactKeys(keys) => keys
                .iter()
                .filter_map(|key| components.get(*key))
                .find_map(nested_list_urn),
            Self::KeyContains(needle) => components
                .iter()
                .filter(|(key, _)| key.to_lowercase().contains(needle))
                .find_map(|(_, value)| nested_list_urn(value)),
        }
    }
}

/// A nested list reference is either the URN itself or an object carrying it.
fn nested_list_urn(value: &Value) -> Option<&str> {
    match value {
        Value::String(urn) if !urn.is_empty() => Some(urn.as_str()),
        Value::Object(obj) => obj
            .get(ENTITY_URN_FIELD)
            .and_then(Value::as_str)
            .filter(|urn| !urn.is_empty()),
        _ => None,
    }
}

/// Elements of a list component: `elements`, else `components.elements`.
fn list_elements(list: &Value) -> Option<&Value> {
    path::get_present(list, "elements").or_else(|| path::get_present(list, "components.elements"))
}

/// Text of a `{text: "..."}` or `{text: {text: "..."}}` node.
fn text_of(node: Option<&Value>) -> Option<&str> {
    match node?.get("text")? {
        Value::String(text) => Some(text.as_str()),
        Value::Object(inner) => inner.get("text").and_then(Value::as_str),
        _ => None,
    }
}

/// Extract every experience entry from a profile-components response.
///
/// A missing anchor or an empty anchor list is a normal outcome and yields an
/// empty list. Elements that cannot be interpreted are logged and skipped.
pub fn extract_experiences(response: &Value) -> Vec<Experience> {
    let included = path::get_array(response, "included").unwrap_or_default();
    extract_experiences_from(included)
}

/// Same as [`extract_experiences`], over an already split `included` list.
pub fn extract_experiences_from(included: &[Value]) -> Vec<Experience> {
    if included.is_empty() {
        warn!("No included items in experience response");
        return Vec::new();
    }

    let components = ComponentMap::build(included);
    debug!("Indexed {} components by URN", components.len());

    let Some(anchor_urn) = components.find_anchor() else {
        warn!("No experience anchor found");
        return Vec::new();
    };
    info!("Experience anchor: {}", anchor_urn);

    let Some(anchor) = components.get(anchor_urn) else {
        return Vec::new();
    };

    if let Some(paging) =
        path::get_present(anchor, "paging").or_else(|| path::get_present(anchor, "components.paging"))
    {
        warn!(
            "Experience list is paged: {} of {} (start {})",
            paging.get("count").unwrap_or(&serde_json::Value::Null),
            paging.get("total").unwrap_or(&serde_json::Value::Null),
            paging.get("start").and_then(serde_json::Value::as_u64).unwrap_or(0)
        );
    }

    let elements = list_elements(anchor)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    if elements.is_empty() {
        warn!("Experience anchor has no elements");
        return Vec::new();
    }
    debug!("Found {} experience blocks", elements.len());

    let mut experiences = Vec::new();
    for (index, element) in elements.iter().enumerate() {
        match extract_block(&components, index, element) {
            Ok(records) => experiences.extend(records),
            Err(e) => warn!("Skipping experience block: {}", e),
        }
    }

    info!("Extracted {} experiences", experiences.len());
    experiences
}

fn extract_block(
    components: &ComponentMap<'_>,
    index: usize,
    element: &Value,
) -> Result<Vec<Experience>, ExperienceError> {
    if !element.is_object() {
        return Err(ExperienceError::NotAnObject { index });
    }

    let entity = match path::get_present(element, "components.entityComponent") {
        None => {
            debug!("Element {} has no entityComponent", index);
            return Ok(Vec::new());
        }
        Some(entity) if !entity.is_object() => {
            return Err(ExperienceError::InvalidEntity { index });
        }
        Some(entity) => entity,
    };

    if let Some(nested_urn) = find_nested_list(entity) {
        return extract_group(components, index, entity, nested_urn);
    }

    // A title without a caption is a group header, not a role.
    if path::get_present(entity, "titleV2").is_some()
        && path::get_present(entity, "caption").is_none()
    {
        debug!("Element {}: skipping header block without caption", index);
        return Ok(Vec::new());
    }

    Ok(extract_one(entity, None).into_iter().collect())
}

fn find_nested_list(entity: &Value) -> Option<&str> {
    let sub = path::get(entity, "subComponents.components[0].components")?.as_object()?;
    NESTED_LIST_STRATEGIES
        .iter()
        .find_map(|strategy| strategy.find(sub))
}

fn extract_group(
    components: &ComponentMap<'_>,
    index: usize,
    entity: &Value,
    nested_urn: &str,
) -> Result<Vec<Experience>, ExperienceError> {
    let company = text_of(entity.get("titleV2")).unwrap_or_default();
    let total = text_of(entity.get("subtitle")).unwrap_or_default();
    info!("Element {}: grouped company '{}' ({})", index, company, total);

    let Some(nested) = components.get(nested_urn) else {
        warn!("Nested list {} not found in components", nested_urn);
        return Ok(Vec::new());
    };

    let roles = match list_elements(nested) {
        None => return Ok(Vec::new()),
        Some(Value::Array(roles)) => roles,
        Some(_) => {
            return Err(ExperienceError::MalformedList {
                urn: nested_urn.to_string(),
            })
        }
    };
    debug!("Found {} roles for '{}'", roles.len(), company);

    let company = (!company.is_empty()).then_some(company);
    Ok(roles
        .iter()
        .filter_map(|role| path::get(role, "components.entityComponent"))
        .filter(|role| role.is_object())
        .filter_map(|role| extract_one(role, Some(company)))
        .collect())
}

/// Build one record from an entity component.
///
/// `company_override` is `Some` inside a group: the group's company name is
/// used for every role, never the role's own subtitle.
fn extract_one(entity: &Value, company_override: Option<Option<&str>>) -> Option<Experience> {
    let role = path::get_str(entity, "titleV2.text.text").filter(|t| !t.is_empty())?;

    let company_id = path::get_str(entity, "textActionTarget")
        .and_then(numeric_suffix_from_url)
        .map(str::to_string);

    let company = match company_override {
        Some(name) => name,
        None => text_of(entity.get("subtitle")).filter(|s| !s.is_empty()),
    };

    let dates = text_of(entity.get("caption")).unwrap_or_default();
    let location = text_of(entity.get("metadata")).unwrap_or_default();

    let mut experience = Experience {
        role: role.to_string(),
        company_id,
        company: company.map(str::to_string),
        time_duration: dates.to_string(),
        location: location.to_string(),
        description: find_description(entity).map(str::to_string),
        ..Default::default()
    };

    if dates.contains(CAPTION_SEPARATOR) {
        let mut parts = dates.split(CAPTION_SEPARATOR);
        experience.time_period = parts.next().map(|p| p.trim().to_string());
        experience.duration = parts
            .next()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);
    }

    debug!("Extracted '{}' at {:?}", experience.role, experience.company);
    Some(experience)
}

fn find_description(entity: &Value) -> Option<&str> {
    path::get_array(entity, "subComponents.components")?
        .iter()
        .filter_map(|sub| path::get_array(sub, "components.fixedListComponent.components"))
        .flatten()
        .find_map(|fixed| {
            path::get_str(fixed, "components.textComponent.text.text").filter(|t| !t.is_empty())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ANCHOR: &str =
        "urn:li:fsd_profileCard:(ACoAAA,EXPERIENCE_VIEW_DETAILS,urn:li:fsd_profile:ACoAAA)";

    fn role(title: &str, caption: Option<&str>) -> Value {
        let mut entity = json!({
            "titleV2": {"text": {"text": title}},
            "subtitle": {"text": "Own Subtitle"},
            "metadata": {"text": "Remote"},
            "textActionTarget": "https://www.linkedin.com/company/1441/"
        });
        if let Some(caption) = caption {
            entity["caption"] = json!({"text": caption});
        }
        json!({"components": {"entityComponent": entity}})
    }

    fn response(elements: Vec<Value>, extra: Vec<Value>) -> Value {
        let mut included = vec![json!({
            "entityUrn": ANCHOR,
            "components": {"elements": elements}
        })];
        included.extend(extra);
        json!({"data": {}, "included": included})
    }

    #[test]
    fn single_entry_fields() {
        let resp = response(vec![role("Engineer", Some("Jan 2020 - Present · 4 yrs"))], vec![]);
        let out = extract_experiences(&resp);

        assert_eq!(out.len(), 1);
        let exp = &out[0];
        assert_eq!(exp.role, "Engineer");
        assert_eq!(exp.company.as_deref(), Some("Own Subtitle"));
        assert_eq!(exp.company_id.as_deref(), Some("1441"));
        assert_eq!(exp.location, "Remote");
        assert_eq!(exp.time_period.as_deref(), Some("Jan 2020 - Present"));
        assert_eq!(exp.duration.as_deref(), Some("4 yrs"));
        assert_eq!(exp.description, None);
    }

    #[test]
    fn grouped_roles_take_parent_company() {
        let nested_urn = "urn:li:fsd_profilePositionGroup:(1,2)";
        let parent = json!({"components": {"entityComponent": {
            "titleV2": {"text": {"text": "Acme"}},
            "subtitle": {"text": "5 yrs"},
            "subComponents": {"components": [
                {"components": {"*pagedListComponent": nested_urn}}
            ]}
        }}});
        let nested = json!({
            "entityUrn": nested_urn,
            "components": {"elements": [
                role("Senior Engineer", Some("2022 - Present")),
                role("Engineer", Some("2019 - 2022"))
            ]}
        });

        let out = extract_experiences(&response(vec![parent], vec![nested]));
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|e| e.company.as_deref() == Some("Acme")));
        assert_eq!(out[0].role, "Senior Engineer");
        assert_eq!(out[1].role, "Engineer");
    }

    #[test]
    fn nested_list_found_by_key_substring() {
        let nested_urn = "urn:li:fsd_profilePositionGroup:(3,4)";
        let parent = json!({"components": {"entityComponent": {
            "titleV2": {"text": "Globex"},
            "subComponents": {"components": [
                {"components": {"profilePagedListComponentV2": {"entityUrn": nested_urn}}}
            ]}
        }}});
        let nested = json!({
            "entityUrn": nested_urn,
            "elements": [role("Analyst", Some("2018 - 2019"))]
        });

        let out = extract_experiences(&response(vec![parent], vec![nested]));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].company.as_deref(), Some("Globex"));
    }

    #[test]
    fn header_without_caption_is_skipped() {
        let out = extract_experiences(&response(vec![role("Acme", None)], vec![]));
        assert!(out.is_empty());
    }

    #[test]
    fn failing_block_does_not_stop_the_rest() {
        let elements = vec![
            role("R0", Some("2020")),
            role("R1", Some("2020")),
            json!("not an object"),
            role("R3", Some("2020")),
            role("R4", Some("2020")),
        ];
        let out = extract_experiences(&response(elements, vec![]));
        let roles: Vec<_> = out.iter().map(|e| e.role.as_str()).collect();
        assert_eq!(roles, vec!["R0", "R1", "R3", "R4"]);
    }

    #[test]
    fn block_errors() {
        let components = ComponentMap::default();
        assert_eq!(
            extract_block(&components, 2, &json!(7)),
            Err(ExperienceError::NotAnObject { index: 2 })
        );
        assert_eq!(
            extract_block(&components, 3, &json!({"components": {"entityComponent": "x"}})),
            Err(ExperienceError::InvalidEntity { index: 3 })
        );
    }

    #[test]
    fn malformed_nested_list_is_an_error() {
        let nested_urn = "urn:li:fsd_profilePositionGroup:(5,6)";
        let included = vec![json!({"entityUrn": nested_urn, "elements": "oops"})];
        let components = ComponentMap::build(&included);
        let parent = json!({"components": {"entityComponent": {
            "titleV2": {"text": {"text": "Initech"}},
            "subComponents": {"components": [
                {"components": {"*pagedListComponent": nested_urn}}
            ]}
        }}});

        assert_eq!(
            extract_block(&components, 0, &parent),
            Err(ExperienceError::MalformedList {
                urn: nested_urn.to_string()
            })
        );
    }

    #[test]
    fn missing_anchor_yields_nothing() {
        let resp = json!({"included": [{"entityUrn": "urn:li:fsd_profile:ACoAAA"}]});
        assert!(extract_experiences(&resp).is_empty());
        assert!(extract_experiences(&json!({})).is_empty());
    }

    #[test]
    fn description_from_fixed_list() {
        let mut block = role("Engineer", Some("2020"));
        block["components"]["entityComponent"]["subComponents"] = json!({"components": [
            {"components": {"fixedListComponent": {"components": [
                {"components": {"textComponent": {"text": {"text": ""}}}},
                {"components": {"textComponent": {"text": {"text": "Built things"}}}}
            ]}}}
        ]});

        let out = extract_experiences(&response(vec![block], vec![]));
        assert_eq!(out[0].description.as_deref(), Some("Built things"));
        assert_eq!(out[0].time_period, None);
    }

    #[test]
    fn anchor_is_first_match_in_included_order() {
        let included = vec![
            json!({"entityUrn": "urn:li:fsd_profileCard:(X,EXPERIENCE_VIEW_DETAILS,urn:li:fsd_profile:X)"}),
            json!({"entityUrn": ANCHOR}),
        ];
        let map = ComponentMap::build(&included);
        assert_eq!(
            map.find_anchor(),
            Some("urn:li:fsd_profileCard:(X,EXPERIENCE_VIEW_DETAILS,urn:li:fsd_profile:X)")
        );
    }

    #[test]
    fn serializes_company_id_as_id_company() {
        let exp = Experience {
            role: "Engineer".into(),
            company_id: Some("1".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&exp).unwrap();
        assert_eq!(value["idCompany"], "1");
        assert!(value.get("time_period").is_none());
    }
}
