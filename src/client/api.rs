//! Domain operations: one request (or a sequential run of pages) per call,
//! parsed into typed records.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::endpoints::{self, ProfileSection};
use super::{ClientError, VoyagerClient};
use crate::graph::{extract_experiences, Experience, GraphResponse, Record};
use crate::parsers::company::parse_company;
use crate::parsers::positions::parse_positions;
use crate::parsers::posts::{
    activity_id_from_url, parse_comments, parse_post_detail, parse_posts, post_slug_from_url,
    PROFILE_UPDATES_KEY,
};
use crate::parsers::profile::{
    identifier_from_url, parse_about, parse_contact_info, parse_mini_profile, parse_profile_view,
    profile_id_from_response, ContactInfo, MiniProfile, Profile,
};
use crate::parsers::search::{
    parse_people, parse_search_clusters, PeopleResults, PeopleSearchParams, SearchParams,
    SearchResults,
};
use crate::parsers::sections::{
    parse_certifications, parse_education, parse_skills, Education,
};
use crate::parsers::ParseError;

pub const DEFAULT_COMMENTS_PAGE_SIZE: u32 = 50;
pub const DEFAULT_POSTS_PAGE_SIZE: u32 = 50;
pub const DEFAULT_POST_COMMENTS_COUNT: u32 = 10;
pub const DEFAULT_POST_LIKES_COUNT: u32 = 10;
pub const DEFAULT_MAX_PAGES: u32 = 20;

/// An experience entry with the company page it points at, when found.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedExperience {
    #[serde(flatten)]
    pub experience: Experience,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_details: Option<Record>,
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Voyager operations over an authenticated client.
pub struct Api {
    client: VoyagerClient,
    max_pages: u32,
}

impl Api {
    pub fn new(client: VoyagerClient) -> Self {
        Self {
            client,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Cap on pages fetched by paginated operations.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn client(&self) -> &VoyagerClient {
        &self.client
    }

    async fn fetch(&self, endpoint: &str) -> Result<GraphResponse> {
        let value = self.client.get_json(endpoint).await?;
        Ok(GraphResponse::from_value(value))
    }

    /// Legacy full profile. Accepts a public id or a profile URL.
    pub async fn profile(&self, identifier: &str) -> Result<Profile> {
        let identifier = identifier_from_url(identifier);
        let response = self.fetch(&endpoints::profile_view(identifier)).await?;
        Ok(parse_profile_view(&response)?)
    }

    /// Dash profile id (`ACoAA...`) for a public id or profile URL.
    pub async fn profile_id(&self, identifier: &str) -> Result<String> {
        let identifier = identifier_from_url(identifier);
        let response = self.fetch(&endpoints::mini_profile(identifier)).await?;
        profile_id_from_response(&response, identifier)
            .ok_or(ClientError::Parse(ParseError::NotFound("Profile")))
    }

    async fn about_by_profile_id(&self, profile_id: &str) -> Result<Option<String>> {
        let response = self.fetch(&endpoints::about(profile_id)).await?;
        Ok(parse_about(&response))
    }

    pub async fn about(&self, identifier: &str) -> Result<Option<String>> {
        let profile_id = self.profile_id(identifier).await?;
        self.about_by_profile_id(&profile_id).await
    }

    /// Dash profile, with the about section filled in.
    pub async fn mini_profile(&self, identifier: &str) -> Result<MiniProfile> {
        let identifier = identifier_from_url(identifier);
        let response = self.fetch(&endpoints::mini_profile(identifier)).await?;

        let about = match profile_id_from_response(&response, identifier) {
            Some(profile_id) => self.about_by_profile_id(&profile_id).await?,
            None => None,
        };
        Ok(parse_mini_profile(&response, identifier, about)?)
    }

    /// Experience section, each entry joined with its company page.
    pub async fn experiences(&self, identifier: &str) -> Result<Vec<DetailedExperience>> {
        let profile_id = self.profile_id(identifier).await?;
        let response = self
            .client
            .get_json(&endpoints::profile_section(
                &profile_id,
                ProfileSection::Experience,
            ))
            .await?;

        let mut companies: HashMap<String, Option<Record>> = HashMap::new();
        let mut detailed = Vec::new();
        for experience in extract_experiences(&response) {
            let company_details = match experience.company_id.as_deref() {
                Some(company_id) => {
                    if !companies.contains_key(company_id) {
                        let details = match self.company(company_id).await {
                            Ok(company) => Some(company),
                            Err(e) => {
                                warn!("Company {} lookup failed: {}", company_id, e);
                                None
                            }
                        };
                        companies.insert(company_id.to_string(), details);
                    }
                    companies.get(company_id).cloned().flatten()
                }
                None => None,
            };
            detailed.push(DetailedExperience {
                experience,
                company_details,
            });
        }
        Ok(detailed)
    }

    /// Legacy positions list, most recent first.
    pub async fn positions(&self, identifier: &str) -> Result<Vec<Record>> {
        let identifier = identifier_from_url(identifier);
        let response = self.fetch(&endpoints::positions(identifier)).await?;
        Ok(parse_positions(&response))
    }

    pub async fn contact_info(&self, identifier: &str) -> Result<ContactInfo> {
        let identifier = identifier_from_url(identifier);
        let profile_id = self.profile_id(identifier).await?;
        let response = self.fetch(&endpoints::contact_info(identifier)).await?;
        Ok(parse_contact_info(&response, &profile_id))
    }

    async fn section(&self, identifier: &str, section: ProfileSection) -> Result<GraphResponse> {
        let profile_id = self.profile_id(identifier).await?;
        self.fetch(&endpoints::profile_section(&profile_id, section))
            .await
    }

    pub async fn skills(&self, identifier: &str) -> Result<Vec<String>> {
        let response = self.section(identifier, ProfileSection::Skills).await?;
        Ok(parse_skills(&response))
    }

    pub async fn education(&self, identifier: &str) -> Result<Vec<Education>> {
        let response = self.section(identifier, ProfileSection::Education).await?;
        Ok(parse_education(&response))
    }

    pub async fn certifications(&self, identifier: &str) -> Result<Vec<Value>> {
        let response = self
            .section(identifier, ProfileSection::Certifications)
            .await?;
        Ok(parse_certifications(&response))
    }

    pub async fn company(&self, universal_name: &str) -> Result<Record> {
        let response = self.fetch(&endpoints::company(universal_name)).await?;
        Ok(parse_company(&response)?)
    }

    /// A single post by URL, with its author.
    pub async fn post(
        &self,
        url: &str,
        comments_count: u32,
        likes_count: u32,
    ) -> Result<Option<Record>> {
        let slug = post_slug_from_url(url).ok_or(ParseError::NotFound("Post slug"))?;
        let response = self
            .fetch(&endpoints::post(slug, comments_count, likes_count))
            .await?;
        Ok(parse_post_detail(&response))
    }

    /// Every comment on a post, fetched page by page.
    pub async fn comments(&self, url: &str, page_size: u32) -> Result<Vec<Record>> {
        let activity_id = activity_id_from_url(url).ok_or(ParseError::NotFound("Activity id"))?;

        let mut comments = Vec::new();
        let mut start = 0;
        for page in 1..=self.max_pages {
            let response = self
                .fetch(&endpoints::comments(activity_id, start, page_size))
                .await?;
            let parsed = parse_comments(&response);
            debug!(
                "Comments page {}: {} elements",
                page, parsed.element_count
            );
            if parsed.element_count == 0 {
                return Ok(comments);
            }

            start += parsed.element_count as u32;
            comments.extend(parsed.comments);
        }

        info!("Stopped after {} comment pages", self.max_pages);
        Ok(comments)
    }

    /// A member's posts, fetched page by page.
    pub async fn user_posts(&self, identifier: &str, page_size: u32) -> Result<Vec<Record>> {
        let profile_id = self.profile_id(identifier).await?;

        let mut posts = Vec::new();
        let mut start = 0;
        for page in 1..=self.max_pages {
            let response = self
                .fetch(&endpoints::user_posts(&profile_id, start, page_size))
                .await?;
            let parsed = parse_posts(&response, PROFILE_UPDATES_KEY, None);
            debug!("Posts page {}: {} posts", page, parsed.len());
            if parsed.is_empty() {
                return Ok(posts);
            }

            start += page_size;
            posts.extend(parsed);
        }

        info!("Stopped after {} post pages", self.max_pages);
        Ok(posts)
    }

    /// One page of search results.
    pub async fn search(&self, params: &SearchParams) -> Result<SearchResults> {
        let response = self.fetch(&endpoints::search(params)).await?;
        let mut results = parse_search_clusters(&response, params.offset);
        results.results.truncate(params.count() as usize);
        Ok(results)
    }

    /// One page of people search results.
    pub async fn search_people(&self, params: &PeopleSearchParams) -> Result<PeopleResults> {
        let results = self.search(&params.search_params()).await?;
        Ok(parse_people(&results, params.include_private_profiles)?)
    }
}
