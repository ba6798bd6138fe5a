//! Profile component sections: skills, education, certifications.
//!
//! These come back as `PagedListComponent` items whose elements each wrap an
//! `entityComponent`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::graph::{path, GraphResponse};

pub const PAGED_LIST_COMPONENT_TYPE: &str =
    "com.linkedin.voyager.dash.identity.profile.tetris.PagedListComponent";

const YEAR_RANGE_SEPARATOR: &str = " - ";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub school_name: Option<String>,
    pub linkedin_url_school: Option<String>,
    pub degree_name: Option<String>,
    pub start_date: Option<i32>,
    pub end_date: Option<i32>,
    pub is_studying: bool,
    pub skills: Option<String>,
}

fn paged_lists(response: &GraphResponse) -> impl Iterator<Item = &Value> {
    response.included_of_type(PAGED_LIST_COMPONENT_TYPE)
}

/// Entity components of one paged list, in element order.
fn entity_components(list: &Value) -> impl Iterator<Item = &Value> {
    path::get_array(list, "components.elements")
        .unwrap_or_default()
        .iter()
        .filter_map(|element| path::get_present(element, "components.entityComponent"))
}

fn non_empty_str(value: &Value, path: &str) -> Option<String> {
    path::get_str(value, path)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Skill names across every paged list in the response.
pub fn parse_skills(response: &GraphResponse) -> Vec<String> {
    paged_lists(response)
        .flat_map(entity_components)
        .filter_map(|entity| non_empty_str(entity, "titleV2.text.text"))
        .collect()
}

fn parse_year(caption: &str, index: usize) -> Option<i32> {
    caption
        .split(YEAR_RANGE_SEPARATOR)
        .nth(index)
        .and_then(|part| part.trim().parse().ok())
}

fn parse_education_entry(entity: &Value) -> Education {
    let caption = path::get_str(entity, "caption.text");
    let is_studying = path::get_present(entity, "caption").is_none();

    // The skills line is the sub-component without an insight.
    let skills = path::get_array(entity, "subComponents.components")
        .unwrap_or_default()
        .iter()
        .find(|sub| path::get(sub, "components.insightComponent") == Some(&Value::Null))
        .and_then(|sub| {
            non_empty_str(
                sub,
                "components.fixedListComponent.components[0].components.textComponent.text.text",
            )
        });

    Education {
        school_name: non_empty_str(entity, "titleV2.text.text"),
        linkedin_url_school: non_empty_str(entity, "textActionTarget"),
        degree_name: non_empty_str(entity, "subtitle.text"),
        start_date: caption.and_then(|c| parse_year(c, 0)),
        end_date: caption.and_then(|c| parse_year(c, 1)),
        is_studying,
        skills,
    }
}

/// Education entries from the first paged list.
pub fn parse_education(response: &GraphResponse) -> Vec<Education> {
    paged_lists(response)
        .next()
        .map(|list| entity_components(list).map(parse_education_entry).collect())
        .unwrap_or_default()
}

/// Raw certification entity components from the first paged list.
pub fn parse_certifications(response: &GraphResponse) -> Vec<Value> {
    paged_lists(response)
        .next()
        .map(|list| entity_components(list).cloned().collect())
        .unwrap_or_default()
}
