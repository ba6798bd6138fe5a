//! Endpoint paths, relative to the Voyager API base URL.
//!
//! GraphQL endpoints take Rest.li-encoded `variables` and a pinned `queryId`;
//! the query ids change when LinkedIn redeploys, so they live here together.

use crate::parsers::search::SearchParams;

const PROFILE_COMPONENTS_QUERY: &str =
    "voyagerIdentityDashProfileComponents.c5d4db426a0f8247b8ab7bc1d660775a";
const PROFILES_QUERY: &str = "voyagerIdentityDashProfiles.34ead06db82a2cc9a778fac97f69ad6a";
const PROFILE_CARDS_QUERY: &str = "voyagerIdentityDashProfileCards.55af784c21dc8640b500ab5b45937064";
const CONTACT_INFO_QUERY: &str = "voyagerIdentityDashProfiles.c7452e58fa37646d09dae4920fc5b4b9";
const COMMENTS_QUERY: &str = "voyagerSocialDashComments.95ed44bc87596acce7c460c70934d0ff";
const POST_QUERY: &str = "voyagerFeedDashUpdates.5cf9b25c46b9d86c224647752f7d6bfd";
const PROFILE_UPDATES_QUERY: &str = "voyagerFeedDashProfileUpdates.4af00b28d60ed0f1488018948daad822";
const SEARCH_CLUSTERS_QUERY: &str = "voyagerSearchDashClusters.bb967969ef89137e6dec45d038310505";

const COMPANY_DECORATION: &str =
    "com.linkedin.voyager.deco.organization.web.WebFullCompanyMain-12";

/// `urn:li:fsd_profile:{id}`, percent-encoded for a `variables` value.
fn encoded_profile_urn(profile_id: &str) -> String {
    format!("urn%3Ali%3Afsd_profile%3A{}", profile_id)
}

/// Profile sections served by the profile components query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSection {
    Experience,
    Skills,
    Education,
    Certifications,
}

impl ProfileSection {
    fn section_type(self) -> &'static str {
        match self {
            ProfileSection::Experience => "experience",
            ProfileSection::Skills => "skills",
            ProfileSection::Education => "education",
            ProfileSection::Certifications => "certifications",
        }
    }
}

/// Legacy full profile.
pub fn profile_view(public_id: &str) -> String {
    format!("/identity/profiles/{}/profileView", public_id)
}

/// Legacy positions list.
pub fn positions(public_id: &str) -> String {
    format!("/identity/profiles/{}/positions", public_id)
}

/// Dash profile looked up by vanity name.
pub fn mini_profile(public_id: &str) -> String {
    format!(
        "/graphql?variables=(vanityName:{})&queryId={}",
        public_id, PROFILES_QUERY
    )
}

pub fn about(profile_id: &str) -> String {
    format!(
        "/graphql?variables=(profileUrn:{})&queryId={}",
        encoded_profile_urn(profile_id),
        PROFILE_CARDS_QUERY
    )
}

pub fn profile_section(profile_id: &str, section: ProfileSection) -> String {
    match section {
        ProfileSection::Experience => format!(
            "/graphql?variables=(profileUrn:{},sectionType:experience,locale:en_US)&queryId={}",
            encoded_profile_urn(profile_id),
            PROFILE_COMPONENTS_QUERY
        ),
        other => format!(
            "/graphql?includeWebMetadata=true&variables=(profileUrn:{},sectionType:{},locale:pt_BR)&queryId={}",
            encoded_profile_urn(profile_id),
            other.section_type(),
            PROFILE_COMPONENTS_QUERY
        ),
    }
}

pub fn contact_info(public_id: &str) -> String {
    format!(
        "/graphql?includeWebMetadata=true&variables=(memberIdentity:{})&queryId={}",
        public_id, CONTACT_INFO_QUERY
    )
}

pub fn company(universal_name: &str) -> String {
    format!(
        "/organization/companies?decorationId={}&q=universalName&universalName={}",
        COMPANY_DECORATION,
        urlencoding::encode(universal_name)
    )
}

/// One page of comments on an activity.
pub fn comments(activity_id: &str, start: u32, count: u32) -> String {
    let activity = format!("urn%3Ali%3Aactivity%3A{}", activity_id);
    format!(
        "/graphql?includeWebMetadata=false&queryId={}&variables=(count:{},start:{},numReplies:1,socialDetailUrn:urn%3Ali%3Afsd_socialDetail%3A%28{}%2C{}%2Curn%3Ali%3AhighlightedReply%3A-%29,sortOrder:RELEVANCE)",
        COMMENTS_QUERY, count, start, activity, activity
    )
}

/// A single post by its URL slug.
pub fn post(slug: &str, comments_count: u32, likes_count: u32) -> String {
    format!(
        "/graphql?includeWebMetadata=false&queryId={}&variables=(commentsCount:{},likesCount:{},includeCommentsFirstReply:true,includeReactions:false,moduleKey:feed-item%3Adesktop,slug:{})",
        POST_QUERY, comments_count, likes_count, slug
    )
}

/// One page of a member's posts.
pub fn user_posts(profile_id: &str, start: u32, count: u32) -> String {
    format!(
        "/graphql?variables=(profileUrn:{},count:{},start:{})&queryId={}",
        encoded_profile_urn(profile_id),
        count,
        start,
        PROFILE_UPDATES_QUERY
    )
}

pub fn search(params: &SearchParams) -> String {
    let keywords = params
        .query
        .as_deref()
        .map(|q| format!("keywords:{},", urlencoding::encode(q)))
        .unwrap_or_default();
    format!(
        "/graphql?variables=(start:{},origin:{},query:({}flagshipSearchIntent:SEARCH_SRP,queryParameters:{},includeFiltersInResponse:false))&queryId={}",
        params.offset, params.origin, keywords, params.filters, SEARCH_CLUSTERS_QUERY
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_use_profile_urn() {
        let url = profile_section("ACoAAA", ProfileSection::Experience);
        assert!(url.contains("profileUrn:urn%3Ali%3Afsd_profile%3AACoAAA"));
        assert!(url.contains("sectionType:experience,locale:en_US"));
        assert!(!url.contains("includeWebMetadata"));

        let url = profile_section("ACoAAA", ProfileSection::Skills);
        assert!(url.starts_with("/graphql?includeWebMetadata=true&"));
        assert!(url.contains("sectionType:skills,locale:pt_BR"));
    }

    #[test]
    fn test_search_keywords_are_optional() {
        let params = SearchParams::default();
        assert!(search(&params).contains("query:(flagshipSearchIntent:SEARCH_SRP"));

        let params = SearchParams {
            query: Some("rust dev".into()),
            offset: 25,
            ..Default::default()
        };
        let url = search(&params);
        assert!(url.contains("start:25,origin:GLOBAL_SEARCH_HEADER"));
        assert!(url.contains("keywords:rust%20dev,flagshipSearchIntent"));
        assert!(url.contains("queryParameters:List()"));
    }

    #[test]
    fn test_comments_wrap_activity_twice() {
        let url = comments("7100", 50, 50);
        assert!(url.contains("count:50,start:50"));
        assert_eq!(url.matches("urn%3Ali%3Aactivity%3A7100").count(), 2);
    }

    #[test]
    fn test_company_decoration() {
        assert_eq!(
            company("acme"),
            "/organization/companies?decorationId=com.linkedin.voyager.deco.organization.web.WebFullCompanyMain-12&q=universalName&universalName=acme"
        );
    }
}
