//! Search clusters and people search.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::graph::image::profile_picture_url;
use crate::graph::urn::{id_from_urn, urn_from_raw_update};
use crate::graph::{path, GraphResponse};

use super::ParseError;

/// The API refuses larger pages.
pub const MAX_SEARCH_COUNT: u32 = 25;

const COLLECTION_RESPONSE_TYPE: &str = "com.linkedin.restli.common.CollectionResponse";
const SEARCH_CLUSTER_TYPE: &str = "com.linkedin.voyager.dash.search.SearchClusterViewModel";
const SEARCH_ITEM_TYPE: &str = "com.linkedin.voyager.dash.search.SearchItem";
const ENTITY_RESULT_TYPE: &str = "com.linkedin.voyager.dash.search.EntityResultViewModel";

const OUT_OF_NETWORK: &str = "OUT_OF_NETWORK";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub offset: u32,
    pub count: i64,
    /// `-1` until a response reported it.
    pub total: i64,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            offset: 0,
            count: 0,
            total: -1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub paging: Paging,
    pub results: Vec<Value>,
}

/// Parameters of a generic cluster search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub query: Option<String>,
    /// Rest.li `List(...)` filter expression.
    pub filters: String,
    pub origin: String,
    pub offset: u32,
    pub limit: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            query: None,
            filters: "List()".to_string(),
            origin: "GLOBAL_SEARCH_HEADER".to_string(),
            offset: 0,
            limit: MAX_SEARCH_COUNT,
        }
    }
}

impl SearchParams {
    /// Page size actually requested.
    pub fn count(&self) -> u32 {
        self.limit.min(MAX_SEARCH_COUNT)
    }
}

/// People search filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PeopleSearchParams {
    pub query: Option<String>,
    pub connection_of: Option<String>,
    pub network_depth: Option<String>,
    pub network_depths: Vec<String>,
    pub regions: Vec<String>,
    pub industries: Vec<String>,
    pub current_company: Vec<String>,
    pub past_companies: Vec<String>,
    pub profile_languages: Vec<String>,
    pub nonprofit_interests: Vec<String>,
    pub schools: Vec<String>,
    pub service_categories: Vec<String>,
    pub keyword_first_name: Option<String>,
    pub keyword_last_name: Option<String>,
    pub keyword_title: Option<String>,
    pub title: Option<String>,
    pub keyword_company: Option<String>,
    pub keyword_school: Option<String>,
    pub include_private_profiles: bool,
    pub offset: u32,
    pub limit: u32,
}

impl Default for PeopleSearchParams {
    fn default() -> Self {
        Self {
            query: None,
            connection_of: None,
            network_depth: None,
            network_depths: Vec::new(),
            regions: Vec::new(),
            industries: Vec::new(),
            current_company: Vec::new(),
            past_companies: Vec::new(),
            profile_languages: Vec::new(),
            nonprofit_interests: Vec::new(),
            schools: Vec::new(),
            service_categories: Vec::new(),
            keyword_first_name: None,
            keyword_last_name: None,
            keyword_title: None,
            title: None,
            keyword_company: None,
            keyword_school: None,
            include_private_profiles: true,
            offset: 0,
            limit: MAX_SEARCH_COUNT,
        }
    }
}

fn filter(key: &str, value: &str) -> String {
    format!("(key:{},value:List({}))", key, value)
}

fn push_list(filters: &mut Vec<String>, key: &str, values: &[String]) {
    if !values.is_empty() {
        filters.push(filter(key, &values.join(" | ")));
    }
}

fn push_one(filters: &mut Vec<String>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        filters.push(filter(key, value));
    }
}

impl PeopleSearchParams {
    pub fn with_query(query: &str) -> Self {
        Self {
            query: Some(query.to_string()),
            ..Default::default()
        }
    }

    /// The `List(...)` filter expression for these parameters.
    pub fn filters(&self) -> String {
        let mut filters = vec![filter("resultType", "PEOPLE")];

        push_one(&mut filters, "connectionOf", self.connection_of.as_deref());
        if !self.network_depths.is_empty() {
            push_list(&mut filters, "network", &self.network_depths);
        } else {
            push_one(&mut filters, "network", self.network_depth.as_deref());
        }
        push_list(&mut filters, "geoUrn", &self.regions);
        push_list(&mut filters, "industry", &self.industries);
        push_list(&mut filters, "currentCompany", &self.current_company);
        push_list(&mut filters, "pastCompany", &self.past_companies);
        push_list(&mut filters, "profileLanguage", &self.profile_languages);
        push_list(&mut filters, "nonprofitInterest", &self.nonprofit_interests);
        push_list(&mut filters, "schools", &self.schools);
        push_list(&mut filters, "serviceCategory", &self.service_categories);

        push_one(&mut filters, "firstName", self.keyword_first_name.as_deref());
        push_one(&mut filters, "lastName", self.keyword_last_name.as_deref());
        push_one(
            &mut filters,
            "title",
            self.keyword_title.as_deref().or(self.title.as_deref()),
        );
        push_one(&mut filters, "company", self.keyword_company.as_deref());
        push_one(&mut filters, "school", self.keyword_school.as_deref());

        format!("List({})", filters.join(","))
    }

    /// Generic search parameters carrying these filters.
    pub fn search_params(&self) -> SearchParams {
        SearchParams {
            query: self.query.clone(),
            filters: self.filters(),
            offset: self.offset,
            limit: self.limit,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonResult {
    pub urn_id: String,
    pub name: String,
    pub url: String,
    pub distance: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub summary: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeopleResults {
    pub paging: Paging,
    pub results: Vec<PersonResult>,
}

fn has_type(value: &Value, type_name: &str) -> bool {
    path::get_str(value, "$type") == Some(type_name)
}

/// Entity result of a search item: inline, or linked through `*entityResult`.
fn entity_result<'a>(response: &'a GraphResponse, item: &'a Value) -> Option<&'a Value> {
    if let Some(entity) = path::get_present(item, "entityResult") {
        return Some(entity);
    }
    let urn = path::get_str(item, "*entityResult")?;
    response.entity(urn)
}

/// Entity results of a `searchDashClustersByAll` response.
pub fn parse_search_clusters(response: &GraphResponse, offset: u32) -> SearchResults {
    let mut out = SearchResults {
        paging: Paging {
            offset,
            ..Default::default()
        },
        results: Vec::new(),
    };

    let Some(clusters) = path::get_present(&response.data, "data.searchDashClustersByAll") else {
        debug!("No search clusters in response");
        return out;
    };
    if !has_type(clusters, COLLECTION_RESPONSE_TYPE) {
        debug!("Unexpected search cluster type");
        return out;
    }

    out.paging.count = path::get(clusters, "paging.count")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    out.paging.total = path::get(clusters, "paging.total")
        .and_then(Value::as_i64)
        .unwrap_or(-1);

    let clusters = path::get_array(clusters, "elements").unwrap_or_default();
    for cluster in clusters.iter().filter(|c| has_type(c, SEARCH_CLUSTER_TYPE)) {
        let items = path::get_array(cluster, "items").unwrap_or_default();
        for item in items.iter().filter(|i| has_type(i, SEARCH_ITEM_TYPE)) {
            let Some(inner) = path::get_present(item, "item") else {
                continue;
            };
            let Some(entity) = entity_result(response, inner) else {
                continue;
            };
            if has_type(entity, ENTITY_RESULT_TYPE) {
                out.results.push(entity.clone());
            }
        }
    }

    out
}

fn text(value: &Value, path: &str) -> Option<String> {
    path::get_str(value, path).map(str::to_string)
}

fn parse_person(result: &Value) -> Result<PersonResult, ParseError> {
    let urn_id = path::get_str(result, "entityUrn")
        .and_then(urn_from_raw_update)
        .and_then(id_from_urn)
        .ok_or(ParseError::IncompleteResult("urn id"))?;
    let name = text(result, "title.text").ok_or(ParseError::IncompleteResult("name"))?;
    let url = path::get_str(result, "navigationUrl")
        .and_then(|url| url.split('?').next())
        .filter(|url| !url.is_empty())
        .ok_or(ParseError::IncompleteResult("navigation url"))?;

    Ok(PersonResult {
        urn_id: urn_id.to_string(),
        name,
        url: url.to_string(),
        distance: text(result, "entityCustomTrackingInfo.memberDistance"),
        headline: text(result, "primarySubtitle.text"),
        location: text(result, "secondarySubtitle.text"),
        summary: text(result, "summary.text").filter(|s| !s.is_empty()),
        image: path::get_present(result, "image").and_then(profile_picture_url),
    })
}

/// People from entity results, optionally dropping out-of-network members.
pub fn parse_people(
    results: &SearchResults,
    include_private: bool,
) -> Result<PeopleResults, ParseError> {
    let mut people = Vec::with_capacity(results.results.len());
    for result in &results.results {
        let distance = path::get_str(result, "entityCustomTrackingInfo.memberDistance");
        if !include_private && distance == Some(OUT_OF_NETWORK) {
            continue;
        }
        people.push(parse_person(result)?);
    }

    Ok(PeopleResults {
        paging: results.paging,
        results: people,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entity(id: &str, distance: &str) -> Value {
        json!({
            "$type": ENTITY_RESULT_TYPE,
            "entityUrn": format!("urn:li:fsd_entityResultViewModel:(urn:li:fsd_profile:{},SEARCH_SRP,DEFAULT)", id),
            "title": {"text": format!("Person {}", id)},
            "navigationUrl": format!("https://www.linkedin.com/in/{}?miniProfileUrn=x", id),
            "primarySubtitle": {"text": "Engineer"},
            "summary": {"text": ""},
            "entityCustomTrackingInfo": {"memberDistance": distance}
        })
    }

    fn clusters_response() -> GraphResponse {
        GraphResponse::from_value(json!({
            "data": {"data": {"searchDashClustersByAll": {
                "$type": COLLECTION_RESPONSE_TYPE,
                "paging": {"count": 10, "total": 2},
                "elements": [
                    {"$type": "other.Cluster", "items": [{"$type": SEARCH_ITEM_TYPE, "item": {"entityResult": entity("X", "DISTANCE_1")}}]},
                    {"$type": SEARCH_CLUSTER_TYPE, "items": [
                        {"$type": SEARCH_ITEM_TYPE, "item": {"entityResult": entity("A", "DISTANCE_2")}},
                        {"$type": SEARCH_ITEM_TYPE, "item": {"*entityResult": "urn:li:linked:B"}},
                        {"$type": SEARCH_ITEM_TYPE, "item": {"*entityResult": "urn:li:linked:missing"}},
                        {"$type": "other.Item", "item": {"entityResult": entity("Y", "DISTANCE_1")}}
                    ]}
                ]
            }}},
            "included": [
                {"entityUrn": "urn:li:linked:B", "$type": ENTITY_RESULT_TYPE,
                 "title": {"text": "Person B"},
                 "navigationUrl": "https://www.linkedin.com/in/B",
                 "entityCustomTrackingInfo": {"memberDistance": OUT_OF_NETWORK}}
            ]
        }))
    }

    #[test]
    fn clusters_filter_types_and_follow_links() {
        let results = parse_search_clusters(&clusters_response(), 0);
        assert_eq!(results.paging.count, 10);
        assert_eq!(results.paging.total, 2);
        assert_eq!(results.results.len(), 2);
        assert_eq!(results.results[1]["entityUrn"], "urn:li:linked:B");
    }

    #[test]
    fn unexpected_cluster_type_is_empty() {
        let resp = GraphResponse::from_value(json!({
            "data": {"data": {"searchDashClustersByAll": {"$type": "nope"}}}
        }));
        let results = parse_search_clusters(&resp, 5);
        assert!(results.results.is_empty());
        assert_eq!(results.paging.offset, 5);
        assert_eq!(results.paging.total, -1);
    }

    #[test]
    fn people_from_entity_results() {
        let mut results = parse_search_clusters(&clusters_response(), 0);
        // The linked result has no raw-update URN; keep only the inline one.
        results.results.truncate(1);

        let people = parse_people(&results, true).unwrap();
        let person = &people.results[0];
        assert_eq!(person.urn_id, "A");
        assert_eq!(person.name, "Person A");
        assert_eq!(person.url, "https://www.linkedin.com/in/A");
        assert_eq!(person.headline.as_deref(), Some("Engineer"));
        assert_eq!(person.summary, None);
    }

    #[test]
    fn private_profiles_can_be_excluded() {
        let results = parse_search_clusters(&clusters_response(), 0);
        let people = parse_people(&results, false).unwrap();
        assert_eq!(people.results.len(), 1);

        assert_eq!(
            parse_people(&results, true),
            Err(ParseError::IncompleteResult("urn id"))
        );
    }

    #[test]
    fn people_filters() {
        let params = PeopleSearchParams {
            network_depths: vec!["F".into(), "S".into()],
            network_depth: Some("O".into()),
            current_company: vec!["1441".into()],
            title: Some("CTO".into()),
            ..Default::default()
        };
        assert_eq!(
            params.filters(),
            "List((key:resultType,value:List(PEOPLE)),\
             (key:network,value:List(F | S)),\
             (key:currentCompany,value:List(1441)),\
             (key:title,value:List(CTO)))"
        );
    }

    #[test]
    fn count_is_capped() {
        let params = SearchParams {
            limit: 100,
            ..Default::default()
        };
        assert_eq!(params.count(), MAX_SEARCH_COUNT);
        assert_eq!(PeopleSearchParams::with_query("rust").search_params().count(), 25);
    }
}
