//! Offline extraction over a saved response.

use std::path::Path;

use anyhow::{bail, Context};
use clap::ValueEnum;
use serde_json::Value;

use voyager_scrape::graph::experience::extract_experiences_from;
use voyager_scrape::graph::{GraphResponse, ProjectionMap};
use voyager_scrape::parsers::company::parse_company;
use voyager_scrape::parsers::positions::parse_positions;
use voyager_scrape::parsers::posts::{
    parse_comments, parse_post_detail, parse_posts, PROFILE_UPDATES_KEY,
};
use voyager_scrape::parsers::profile::{
    parse_about, parse_contact_info, parse_mini_profile, parse_profile_view,
};
use voyager_scrape::parsers::search::{parse_people, parse_search_clusters};
use voyager_scrape::parsers::sections::{parse_certifications, parse_education, parse_skills};

use crate::cli::helpers::print_json;

/// Domain parser applied to a saved response.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OfflineParser {
    Experiences,
    Company,
    Positions,
    ProfileView,
    MiniProfile,
    About,
    Contact,
    Skills,
    Education,
    Certifications,
    Posts,
    PostDetail,
    Comments,
    Search,
    People,
}

/// Parse `output=path` projection entries.
fn parse_fields(fields: &[String]) -> anyhow::Result<ProjectionMap> {
    let mut map = ProjectionMap::new();
    for field in fields {
        let Some((output, path)) = field.split_once('=') else {
            bail!("Invalid field '{}', expected OUTPUT=PATH", field);
        };
        map.insert(output.trim(), path.trim());
    }
    Ok(map)
}

fn require<'a>(identifier: Option<&'a str>, parser: OfflineParser) -> anyhow::Result<&'a str> {
    identifier.with_context(|| format!("--identifier is required for the {:?} parser", parser))
}

pub fn cmd_resolve(
    file: &Path,
    root: &str,
    fields: &[String],
    parser: Option<OfflineParser>,
    identifier: Option<&str>,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    let response = GraphResponse::from_value(value);

    let Some(parser) = parser else {
        let map = parse_fields(fields)?;
        let projection = (!map.is_empty()).then_some(&map);
        return print_json(&response.extract(root, projection));
    };

    match parser {
        OfflineParser::Experiences => print_json(&extract_experiences_from(&response.included)),
        OfflineParser::Company => print_json(&parse_company(&response)?),
        OfflineParser::Positions => print_json(&parse_positions(&response)),
        OfflineParser::ProfileView => print_json(&parse_profile_view(&response)?),
        OfflineParser::MiniProfile => {
            let identifier = require(identifier, parser)?;
            let about = parse_about(&response);
            print_json(&parse_mini_profile(&response, identifier, about)?)
        }
        OfflineParser::About => print_json(&parse_about(&response)),
        OfflineParser::Contact => {
            let profile_id = require(identifier, parser)?;
            print_json(&parse_contact_info(&response, profile_id))
        }
        OfflineParser::Skills => print_json(&parse_skills(&response)),
        OfflineParser::Education => print_json(&parse_education(&response)),
        OfflineParser::Certifications => print_json(&parse_certifications(&response)),
        OfflineParser::Posts => print_json(&parse_posts(&response, PROFILE_UPDATES_KEY, None)),
        OfflineParser::PostDetail => print_json(&parse_post_detail(&response)),
        OfflineParser::Comments => print_json(&parse_comments(&response).comments),
        OfflineParser::Search => print_json(&parse_search_clusters(&response, 0)),
        OfflineParser::People => {
            let results = parse_search_clusters(&response, 0);
            print_json(&parse_people(&results, true)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fields() {
        let map = parse_fields(&["name=title.text".to_string(), " id = entityUrn".to_string()])
            .unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_parse_fields_rejects_missing_separator() {
        assert!(parse_fields(&["title.text".to_string()]).is_err());
    }

    #[test]
    fn test_require_identifier() {
        assert!(require(None, OfflineParser::Contact).is_err());
        assert_eq!(require(Some("abc"), OfflineParser::Contact).unwrap(), "abc");
    }
}
