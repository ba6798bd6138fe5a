//! Profile parsers: legacy profile view, dash mini profile, about, contact info.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::graph::image::last_artifact_url;
use crate::graph::path;
use crate::graph::urn::{strip_urn_prefix, FSD_PROFILE_PREFIX};
use crate::graph::GraphResponse;

use super::ParseError;

static PROFILE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"linkedin\.com/in/([a-zA-Z0-9-]+)").unwrap());

const PROFILE_PICTURE_PATH: &str =
    "profilePicture.displayImageReferenceResolutionResult.vectorImage";
const BACKGROUND_PICTURE_PATH: &str =
    "backgroundPicture.displayImageReferenceResolutionResult.vectorImage";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthDate {
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl BirthDate {
    fn from_value(value: Option<&Value>) -> Option<Self> {
        let value = value.filter(|v| v.is_object())?;
        Some(Self {
            month: value.get("month").and_then(Value::as_u64).map(|m| m as u32),
            day: value.get("day").and_then(Value::as_u64).map(|d| d as u32),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileLocation {
    pub country: Option<String>,
    pub city: Option<String>,
}

/// Profile assembled from the legacy `profileView` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub public_identifier: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: String,
    pub birth_date: Option<BirthDate>,
    pub profile_picture: Option<String>,
    pub background_picture: Option<String>,
    pub location: ProfileLocation,
    pub address: Option<String>,
    pub industry: Option<String>,
    pub headline: Option<String>,
    pub summary: Option<String>,
}

/// Profile assembled from the dash profiles GraphQL query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniProfile {
    #[serde(rename = "id_urn")]
    pub id_urn: Option<String>,
    pub public_identifier: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: String,
    pub headline: Option<String>,
    pub about: String,
    pub birth_date: BirthDate,
    pub profile_picture: Option<String>,
    pub background_picture: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Website {
    pub label: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub address: Option<String>,
    pub we_chat_contact_info: Option<Value>,
    pub phone_numbers: Option<Vec<String>>,
    pub email_address: Option<String>,
    pub websites: Option<Vec<Website>>,
}

fn non_empty_str(value: &Value, path: &str) -> Option<String> {
    path::get_str(value, path)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn full_name(first: Option<&str>, last: Option<&str>) -> String {
    format!("{} {}", first.unwrap_or_default(), last.unwrap_or_default())
}

/// Public identifier from a profile URL, or the input unchanged.
pub fn identifier_from_url(url: &str) -> &str {
    PROFILE_URL
        .captures(url)
        .and_then(|c| c.get(1))
        .map_or(url, |m| m.as_str())
}

/// Parse the legacy `identity/profiles/{id}/profileView` response.
pub fn parse_profile_view(response: &GraphResponse) -> Result<Profile, ParseError> {
    let key_profile = path::get_str(&response.data, "*profile")
        .and_then(|urn| response.entity(urn))
        .ok_or(ParseError::NotFound("Key profile"))?;

    let mini_profile = path::get_str(key_profile, "*miniProfile")
        .and_then(|urn| response.entity(urn))
        .ok_or(ParseError::NotFound("Mini profile"))?;

    let first_name = non_empty_str(key_profile, "firstName");
    let last_name = non_empty_str(key_profile, "lastName");

    Ok(Profile {
        public_identifier: non_empty_str(mini_profile, "publicIdentifier"),
        full_name: full_name(first_name.as_deref(), last_name.as_deref()),
        first_name,
        last_name,
        birth_date: BirthDate::from_value(key_profile.get("birthDate")),
        profile_picture: path::get_present(mini_profile, "picture").and_then(last_artifact_url),
        background_picture: path::get_present(mini_profile, "backgroundImage")
            .and_then(last_artifact_url),
        location: ProfileLocation {
            country: non_empty_str(key_profile, "locationName"),
            city: non_empty_str(key_profile, "geoLocationName"),
        },
        address: non_empty_str(key_profile, "address"),
        industry: non_empty_str(key_profile, "industryName"),
        headline: non_empty_str(key_profile, "headline"),
        summary: non_empty_str(key_profile, "summary"),
    })
}

/// Included profile entity whose `publicIdentifier` equals `identifier`.
fn find_profile<'a>(response: &'a GraphResponse, identifier: &str) -> Option<&'a Value> {
    response
        .included
        .iter()
        .find(|item| path::get_str(item, "publicIdentifier") == Some(identifier))
}

/// Profile id (the dash profile URN without its prefix) for `identifier`.
pub fn profile_id_from_response(response: &GraphResponse, identifier: &str) -> Option<String> {
    let urn = path::get_str(find_profile(response, identifier)?, "entityUrn")?;
    Some(strip_urn_prefix(urn, FSD_PROFILE_PREFIX).to_string())
}

/// Parse the dash profiles response for `identifier`.
///
/// `about` comes from a separate profile cards request; `None` renders as `N/A`.
pub fn parse_mini_profile(
    response: &GraphResponse,
    identifier: &str,
    about: Option<String>,
) -> Result<MiniProfile, ParseError> {
    let profile = find_profile(response, identifier).ok_or(ParseError::NotFound("Profile"))?;

    let first_name = non_empty_str(profile, "firstName");
    let last_name = non_empty_str(profile, "lastName");

    Ok(MiniProfile {
        id_urn: path::get_str(profile, "entityUrn")
            .map(|urn| strip_urn_prefix(urn, FSD_PROFILE_PREFIX).to_string()),
        public_identifier: identifier.to_string(),
        full_name: full_name(first_name.as_deref(), last_name.as_deref()),
        first_name,
        last_name,
        headline: non_empty_str(profile, "headline"),
        about: about.unwrap_or_else(|| "N/A".to_string()),
        birth_date: BirthDate::from_value(profile.get("birthDateOn")).unwrap_or_default(),
        profile_picture: path::get_present(profile, PROFILE_PICTURE_PATH)
            .and_then(last_artifact_url),
        background_picture: path::get_present(profile, BACKGROUND_PICTURE_PATH)
            .and_then(last_artifact_url),
    })
}

/// About text from the profile cards response.
pub fn parse_about(response: &GraphResponse) -> Option<String> {
    let card = response.included.iter().find(|item| {
        path::get_str(item, "entityUrn").is_some_and(|urn| urn.to_lowercase().contains("about"))
    })?;

    path::get_array(card, "topComponents")?
        .iter()
        .find(|item| path::get_present(item, "components.textComponent").is_some())
        .and_then(|item| non_empty_str(item, "components.textComponent.text.text"))
}

/// Contact details of the profile `urn:li:fsd_profile:{profile_id}`.
pub fn parse_contact_info(response: &GraphResponse, profile_id: &str) -> ContactInfo {
    if !response.has_included() {
        warn!("No included items in contact info response");
        return ContactInfo::default();
    }

    let urn = format!("{}{}", FSD_PROFILE_PREFIX, profile_id);
    let Some(profile) = response.entity(&urn) else {
        warn!("Profile {} not in contact info response", urn);
        return ContactInfo::default();
    };

    ContactInfo {
        address: non_empty_str(profile, "address"),
        we_chat_contact_info: path::get_present(profile, "weChatContactInfo").cloned(),
        phone_numbers: path::get_array(profile, "phoneNumbers").map(|phones| {
            phones
                .iter()
                .filter_map(|p| path::get_str(p, "phoneNumber.number"))
                .map(str::to_string)
                .collect()
        }),
        email_address: non_empty_str(profile, "emailAddress.emailAddress"),
        websites: path::get_array(profile, "websites").map(|sites| {
            sites
                .iter()
                .map(|site| Website {
                    label: non_empty_str(site, "label"),
                    url: non_empty_str(site, "url"),
                })
                .collect()
        }),
    }
}
