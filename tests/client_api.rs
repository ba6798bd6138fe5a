//! Client behavior against a mock Voyager server.

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use voyager_scrape::client::{Api, ClientError, ClientOptions, VoyagerClient};
use voyager_scrape::session::{ApiCookies, CookieFileAuthenticator};

fn fixture(content: &str) -> Value {
    serde_json::from_str(content).unwrap()
}

fn options(server: &MockServer) -> ClientOptions {
    ClientOptions {
        base_url: server.uri(),
        ..Default::default()
    }
}

fn write_cookie_file(dir: &Path, li_at: &str, jsession: &str) -> std::path::PathBuf {
    let file = dir.join("cookies.json");
    let cookies = json!([
        {"name": "li_at", "value": li_at, "domain": ".linkedin.com"},
        {"name": "JSESSIONID", "value": format!("\"ajax:{}\"", jsession), "domain": ".www.linkedin.com"}
    ]);
    std::fs::write(&file, cookies.to_string()).unwrap();
    file
}

fn comments_page(ids: &[u32]) -> Value {
    let urns: Vec<String> = ids.iter().map(|id| format!("urn:li:comment:{}", id)).collect();
    let included: Vec<Value> = ids
        .iter()
        .map(|id| {
            json!({
                "entityUrn": format!("urn:li:comment:{}", id),
                "commentary": {"text": format!("comment {}", id)},
                "commenter": {"title": {"text": "Bob"}}
            })
        })
        .collect();
    json!({
        "data": {"data": {"socialDashCommentsBySocialDetail": {"*elements": urns}}},
        "included": included
    })
}

const POST_URL: &str = "https://www.linkedin.com/posts/jane_hello-activity-7123456789-abcd";

#[tokio::test]
async fn sends_session_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/organization/companies"))
        .and(query_param("universalName", "acme"))
        .and(header("csrf-token", "ajax:123"))
        .and(header("accept", "application/vnd.linkedin.normalized+json+2.1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(fixture(include_str!("fixtures/company.json"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = VoyagerClient::new(options(&server), Some(ApiCookies::new("AQE", "123"))).unwrap();
    let company = Api::new(client).company("acme").await.unwrap();
    assert_eq!(company["name"], "Acme Corp");
}

#[tokio::test]
async fn reauthenticates_after_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/organization/companies"))
        .and(header("csrf-token", "ajax:stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/organization/companies"))
        .and(header("csrf-token", "ajax:fresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(fixture(include_str!("fixtures/company.json"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let cookie_file = write_cookie_file(dir.path(), "AQF", "fresh");

    let client = VoyagerClient::new(options(&server), Some(ApiCookies::new("AQE", "stale")))
        .unwrap()
        .with_authenticator(Arc::new(CookieFileAuthenticator::new(cookie_file)));
    let company = Api::new(client).company("acme").await.unwrap();
    assert_eq!(company["username"], "acme");
}

#[tokio::test]
async fn authenticates_lazily_without_cookies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/organization/companies"))
        .and(header("csrf-token", "ajax:fresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(fixture(include_str!("fixtures/company.json"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let cookie_file = write_cookie_file(dir.path(), "AQF", "fresh");

    let client = VoyagerClient::new(options(&server), None)
        .unwrap()
        .with_authenticator(Arc::new(CookieFileAuthenticator::new(cookie_file)));
    assert!(client.get_json("/organization/companies").await.is_ok());
}

#[tokio::test]
async fn gives_up_after_max_auth_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .expect(3)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let cookie_file = write_cookie_file(dir.path(), "AQF", "still-bad");

    let client = VoyagerClient::new(options(&server), Some(ApiCookies::new("AQE", "stale")))
        .unwrap()
        .with_authenticator(Arc::new(CookieFileAuthenticator::new(cookie_file)));
    let err = client.get_json("/me").await.unwrap_err();
    assert!(matches!(err, ClientError::AuthExhausted(2)));
}

#[tokio::test]
async fn rejection_without_authenticator() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = VoyagerClient::new(options(&server), Some(ApiCookies::new("AQE", "1"))).unwrap();
    let err = client.get_json("/me").await.unwrap_err();
    assert!(matches!(err, ClientError::NotAuthenticated));
}

#[tokio::test]
async fn other_statuses_are_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = VoyagerClient::new(options(&server), Some(ApiCookies::new("AQE", "1"))).unwrap();
    let err = client.get_json("/me").await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 500, .. }));
}

#[tokio::test]
async fn comments_stop_at_empty_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(comments_page(&[1, 2])))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(comments_page(&[])))
        .expect(1)
        .mount(&server)
        .await;

    let client = VoyagerClient::new(options(&server), Some(ApiCookies::new("AQE", "1"))).unwrap();
    let comments = Api::new(client).comments(POST_URL, 2).await.unwrap();

    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["comment"], "comment 1");
    assert_eq!(comments[1]["name"], "Bob");
}

#[tokio::test]
async fn comments_stop_at_max_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(comments_page(&[7])))
        .expect(3)
        .mount(&server)
        .await;

    let client = VoyagerClient::new(options(&server), Some(ApiCookies::new("AQE", "1"))).unwrap();
    let comments = Api::new(client)
        .with_max_pages(3)
        .comments(POST_URL, 1)
        .await
        .unwrap();
    assert_eq!(comments.len(), 3);
}

#[tokio::test]
async fn experiences_join_company_details_once() {
    let server = MockServer::start().await;
    let profile = json!({
        "data": {"data": {"identityDashProfilesByMemberIdentity": {
            "*elements": ["urn:li:fsd_profile:ACoAAB1234"]
        }}},
        "included": [{
            "entityUrn": "urn:li:fsd_profile:ACoAAB1234",
            "publicIdentifier": "janedoe",
            "firstName": "Jane",
            "lastName": "Doe"
        }]
    });

    Mock::given(method("GET"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/graphql"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(fixture(include_str!("fixtures/experience.json"))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/organization/companies"))
        .and(query_param("universalName", "1441"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(fixture(include_str!("fixtures/company.json"))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/organization/companies"))
        .and(query_param("universalName", "9001"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = VoyagerClient::new(options(&server), Some(ApiCookies::new("AQE", "1"))).unwrap();
    let experiences = Api::new(client)
        .experiences("https://www.linkedin.com/in/janedoe/")
        .await
        .unwrap();

    assert_eq!(experiences.len(), 3);
    let details = experiences[0].company_details.as_ref().unwrap();
    assert_eq!(details["name"], "Acme Corp");
    assert!(experiences[1].company_details.is_none());
    assert!(experiences[2].company_details.is_none());

    let json = serde_json::to_value(&experiences[0]).unwrap();
    assert_eq!(json["role"], "Staff Engineer");
    assert_eq!(json["companyDetails"]["username"], "acme");
}

#[tokio::test]
async fn verification_code_polling_retries() {
    use std::time::Duration;
    use voyager_scrape::session::verification::poll_verification_code;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"output": {}})))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"output": {"code": 482913}})))
        .expect(1)
        .mount(&server)
        .await;

    let webhook = format!("{}/pin", server.uri());
    let code = poll_verification_code(&reqwest::Client::new(), &webhook, 3, Duration::ZERO)
        .await
        .unwrap();
    assert_eq!(code, "482913");
}
