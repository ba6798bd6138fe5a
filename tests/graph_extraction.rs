//! Offline extraction over recorded response shapes.

use serde_json::Value;

use voyager_scrape::graph::{extract_experiences, path, GraphResponse, ProjectionMap};
use voyager_scrape::parsers::company::parse_company;
use voyager_scrape::parsers::search::{parse_people, parse_search_clusters};

fn fixture(name: &str) -> Value {
    let content = match name {
        "experience" => include_str!("fixtures/experience.json"),
        "company" => include_str!("fixtures/company.json"),
        "search_people" => include_str!("fixtures/search_people.json"),
        other => panic!("unknown fixture {}", other),
    };
    serde_json::from_str(content).unwrap()
}

#[test]
fn experience_section_flattens_groups() {
    let experiences = extract_experiences(&fixture("experience"));
    assert_eq!(experiences.len(), 3);

    let staff = &experiences[0];
    assert_eq!(staff.role, "Staff Engineer");
    assert_eq!(staff.company.as_deref(), Some("Acme Corp"));
    assert_eq!(staff.company_id.as_deref(), Some("1441"));
    assert_eq!(staff.location, "Remote");
    assert_eq!(staff.time_period.as_deref(), Some("Jan 2022 - Present"));
    assert_eq!(staff.duration.as_deref(), Some("2 yrs 10 mos"));

    let senior = &experiences[1];
    assert_eq!(senior.role, "Senior Engineer");
    assert_eq!(senior.company.as_deref(), Some("Acme Corp"));
    assert_eq!(senior.company_id, None);
    assert_eq!(senior.time_duration, "Mar 2018 - Dec 2021");
    assert_eq!(senior.time_period, None);

    let intern = &experiences[2];
    assert_eq!(intern.role, "Software Intern");
    assert_eq!(intern.company.as_deref(), Some("Initech · Internship"));
    assert_eq!(intern.company_id.as_deref(), Some("9001"));
    assert_eq!(intern.description.as_deref(), Some("Built internal tooling."));
    assert_eq!(intern.duration.as_deref(), Some("3 mos"));
}

#[test]
fn experience_serializes_company_id_key() {
    let experiences = extract_experiences(&fixture("experience"));
    let json = serde_json::to_value(&experiences[0]).unwrap();
    assert_eq!(json["idCompany"], "1441");
}

#[test]
fn generic_extraction_resolves_nested_pointers() {
    let response = GraphResponse::from_value(fixture("experience"));
    let records = response.extract(
        "data.identityDashProfileComponentsBySectionType.*elements",
        None,
    );
    assert_eq!(records.len(), 1);

    let nested = path::get(
        &records[0],
        "components.elements.0.components.entityComponent.subComponents.components.0.components.pagedListComponent",
    )
    .unwrap();
    assert_eq!(
        path::get_array(nested, "components.elements").map(|e| e.len()),
        Some(2)
    );
}

#[test]
fn generic_extraction_with_projection() {
    let response = GraphResponse::from_value(fixture("company"));
    let fields = ProjectionMap::new()
        .with("name", "name")
        .with("industry", "*companyIndustries[0].localizedName")
        .with("followers", "followingInfo.followerCount")
        .with("missing", "does.not.exist");

    let records = response.extract("*elements", Some(&fields));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["name"], "Acme Corp");
    assert_eq!(records[0]["industry"], "Software Development");
    assert_eq!(records[0]["followers"], 52000);
    assert!(records[0].get("missing").is_none());
}

#[test]
fn company_drops_unresolved_industries() {
    let response = GraphResponse::from_value(fixture("company"));
    let company = parse_company(&response).unwrap();

    assert_eq!(company["id"], "urn:li:fs_normalized_company:1441");
    assert_eq!(company["username"], "acme");
    assert_eq!(company["staffCount"], 1200);
    assert_eq!(company["companyIndustries"], "Software Development");
    assert!(company["logo"].is_object());
    assert!(!company.contains_key("phone"));
}

#[test]
fn people_search_respects_private_filter() {
    let response = GraphResponse::from_value(fixture("search_people"));
    let results = parse_search_clusters(&response, 10);
    assert_eq!(results.results.len(), 3);
    assert_eq!(results.paging.offset, 10);
    assert_eq!(results.paging.total, 312);

    let everyone = parse_people(&results, true).unwrap();
    assert_eq!(everyone.results.len(), 3);
    assert_eq!(everyone.results[0].urn_id, "ACoAAB1111");
    assert_eq!(everyone.results[0].url, "https://www.linkedin.com/in/janedoe");
    assert_eq!(everyone.results[0].location.as_deref(), Some("Springfield"));

    let in_network = parse_people(&results, false).unwrap();
    let names: Vec<_> = in_network.results.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Jane Doe", "John Roe"]);
}
