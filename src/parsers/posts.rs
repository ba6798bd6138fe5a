//! Feed updates, single posts and comments.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::graph::image::{attribute_vector_image, largest_artifact_url, last_artifact_url};
use crate::graph::{path, project, GraphResponse, ProjectionMap, Record};

pub const SOCIAL_ACTIVITY_COUNTS_TYPE: &str = "com.linkedin.voyager.dash.feed.SocialActivityCounts";

/// Root key of a profile's share feed.
pub const PROFILE_UPDATES_KEY: &str = "feedDashProfileUpdatesByMemberShareFeed";
/// Root key of a single update fetched by slug.
pub const POST_BY_SLUG_KEY: &str = "feedDashUpdatesByPostSlug";
/// Root key of a comments page.
pub const COMMENTS_KEY: &str = "socialDashCommentsBySocialDetail";

static POST_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/posts/([^/?]+)").unwrap());
static ACTIVITY_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"activity-(\d+)").unwrap());

pub static POST_FIELDS: LazyLock<ProjectionMap> = LazyLock::new(|| {
    ProjectionMap::from_pairs(&[
        ("urn", "metadata.backendUrn"),
        ("postUrl", "socialContent.shareUrl"),
        ("contentText", "commentary.text.text"),
        ("tags", "commentary.text.attributesV2"),
        ("media", "content"),
        ("dateDescription", "actor.subDescription.text"),
    ])
});

pub static SOCIAL_COUNT_FIELDS: LazyLock<ProjectionMap> = LazyLock::new(|| {
    ProjectionMap::from_pairs(&[
        ("numLikes", "numLikes"),
        ("numComments", "numComments"),
        ("reactionCounts", "reactionTypeCounts"),
        ("numShares", "numShares"),
        ("urn", "urn"),
    ])
});

pub static COMMENT_FIELDS: LazyLock<ProjectionMap> = LazyLock::new(|| {
    ProjectionMap::from_pairs(&[
        ("id", "entityUrn"),
        ("createdAt", "createdAt"),
        ("isAuthor", "commenter.author"),
        ("name", "commenter.title.text"),
        ("headline", "commenter.subtitle"),
        ("profileUrl", "commenter.navigationUrl"),
        ("comment", "commentary.text"),
        ("permalink", "permalink"),
        ("image", "commenter.image.attributes.0.detailData.nonEntityProfilePicture.vectorImage"),
    ])
});

/// Author block attached to a single post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
}

/// One page of comments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentPage {
    pub comments: Vec<Record>,
    /// Number of root URNs in the page; zero means the listing is exhausted.
    pub element_count: usize,
}

/// Post slug from a `/posts/<slug>` URL.
pub fn post_slug_from_url(url: &str) -> Option<&str> {
    POST_SLUG.captures(url).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Activity id from an `activity-<id>` URL.
pub fn activity_id_from_url(url: &str) -> Option<&str> {
    ACTIVITY_ID.captures(url).and_then(|c| c.get(1)).map(|m| m.as_str())
}

fn into_records(values: Vec<Value>) -> Vec<Record> {
    values
        .into_iter()
        .filter_map(|value| match value {
            Value::Object(record) => Some(record),
            _ => None,
        })
        .collect()
}

/// Root path of the `*elements` list under a GraphQL `data.data.<key>`.
fn elements_path(key: &str) -> String {
    format!("data.{}.*elements", key)
}

/// Image URLs of an image component: widest rendition of each image.
fn image_urls(image_component: &Value) -> Vec<Value> {
    path::get_array(image_component, "images")
        .unwrap_or_default()
        .iter()
        .map(|image| {
            attribute_vector_image(image)
                .and_then(largest_artifact_url)
                .map_or(Value::Null, Value::String)
        })
        .collect()
}

/// Video metadata of a video component.
///
/// The `*videoPlayMetadata` pointer is normally resolved already; when it
/// missed, fall back to a direct lookup (which then also finds nothing).
fn video_metadata(response: &GraphResponse, video_component: &Value) -> Vec<Value> {
    if let Some(resolved) = path::get_present(video_component, "videoPlayMetadata") {
        return vec![resolved.clone()];
    }
    path::get_str(video_component, "*videoPlayMetadata")
        .and_then(|urn| response.entity(urn))
        .cloned()
        .into_iter()
        .collect()
}

fn build_media(response: &GraphResponse, content: Option<&Value>) -> Value {
    let mut media = Map::new();
    let Some(content) = content.and_then(Value::as_object) else {
        return Value::Object(media);
    };

    if let Some(images) = content.get("imageComponent").filter(|v| !v.is_null()) {
        media.insert("images".to_string(), Value::Array(image_urls(images)));
    }
    if let Some(video) = content.get("linkedInVideoComponent").filter(|v| !v.is_null()) {
        media.insert(
            "videoActivityData".to_string(),
            Value::Array(video_metadata(response, video)),
        );
    }

    Value::Object(media)
}

/// Parse feed updates listed under `data.data.<key>.*elements`.
///
/// Each post is joined with its social activity counts on `urn`; `extra`
/// adds or overrides projected fields.
pub fn parse_posts(
    response: &GraphResponse,
    key: &str,
    extra: Option<&ProjectionMap>,
) -> Vec<Record> {
    let mut fields = POST_FIELDS.clone();
    if let Some(extra) = extra {
        fields.extend(extra);
    }

    let posts = into_records(response.extract(&elements_path(key), Some(&fields)));

    let counts: Vec<Value> = response
        .included_of_type(SOCIAL_ACTIVITY_COUNTS_TYPE)
        .cloned()
        .collect();
    let counts = project(&counts, &SOCIAL_COUNT_FIELDS);

    posts
        .into_iter()
        .map(|mut post| {
            let media = build_media(response, post.get("media"));
            post.insert("media".to_string(), media);

            if let Some(social) = counts
                .iter()
                .find(|c| c.get("urn").is_some() && c.get("urn") == post.get("urn"))
            {
                for (field, value) in social {
                    post.insert(field.clone(), value.clone());
                }
            }
            post
        })
        .collect()
}

fn parse_actor(actor: &Value) -> Actor {
    Actor {
        name: path::get_str(actor, "name.text").map(str::to_string),
        headline: path::get_str(actor, "description.text").map(str::to_string),
        profile_url: attribute_vector_image(path::get(actor, "image").unwrap_or(&Value::Null))
            .and_then(last_artifact_url),
    }
}

/// Single post fetched by slug, with its author block.
pub fn parse_post_detail(response: &GraphResponse) -> Option<Record> {
    let extra = ProjectionMap::new().with("actor", "actor");
    let mut post = parse_posts(response, POST_BY_SLUG_KEY, Some(&extra))
        .into_iter()
        .next()?;

    let actor = parse_actor(post.get("actor").unwrap_or(&Value::Null));
    post.insert(
        "actor".to_string(),
        serde_json::to_value(actor).unwrap_or(Value::Null),
    );
    Some(post)
}

/// One page of comments with the commenter picture flattened to a URL.
pub fn parse_comments(response: &GraphResponse) -> CommentPage {
    let root = elements_path(COMMENTS_KEY);
    let element_count = response.root_urns(&root).len();

    let comments = into_records(response.extract(&root, Some(&*COMMENT_FIELDS)))
        .into_iter()
        .map(|mut comment| {
            if let Some(url) = comment.remove("image").as_ref().and_then(last_artifact_url) {
                comment.insert("image".to_string(), Value::String(url));
            }
            comment
        })
        .collect();

    CommentPage {
        comments,
        element_count,
    }
}
