//! Company lookup by universal name.

use std::sync::LazyLock;

use crate::graph::{GraphResponse, ProjectionMap, Record};

use super::ParseError;

pub static COMPANY_FIELDS: LazyLock<ProjectionMap> = LazyLock::new(|| {
    ProjectionMap::from_pairs(&[
        ("id", "entityUrn"),
        ("name", "name"),
        ("description", "description"),
        ("username", "universalName"),
        ("companyPageUrl", "companyPageUrl"),
        ("staffCount", "staffCount"),
        ("url", "url"),
        ("companyIndustries", "*companyIndustries[0].localizedName"),
        ("location", "locationName"),
        ("jobSearchPageUrl", "jobSearchPageUrl"),
        ("phone", "phone"),
        ("followerCount", "followingInfo.followerCount"),
        ("backgroundCoverImage", "backgroundCoverImage.image"),
        ("logo", "logo.image"),
        ("permissions", "permissions"),
    ])
});

/// First company named by `data.*elements`, resolved and projected.
pub fn parse_company(response: &GraphResponse) -> Result<Record, ParseError> {
    response
        .extract("*elements", Some(&*COMPANY_FIELDS))
        .into_iter()
        .find_map(|value| match value {
            serde_json::Value::Object(record) => Some(record),
            _ => None,
        })
        .ok_or(ParseError::NotFound("Company"))
}
