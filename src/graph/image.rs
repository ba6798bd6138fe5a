//! Vector image URL assembly.
//!
//! A vector image is `{ rootUrl, artifacts: [{ width, fileIdentifyingUrlPathSegment }] }`;
//! a concrete URL is the root followed by one artifact's path segment.

use serde_json::Value;

use super::path;

fn artifact_url(image: &Value, artifact: &Value) -> Option<String> {
    let root = path::get_str(image, "rootUrl")?;
    let segment = path::get_str(artifact, "fileIdentifyingUrlPathSegment")?;
    Some(format!("{}{}", root, segment))
}

/// URL of the widest artifact. The first artifact wins ties.
pub fn largest_artifact_url(image: &Value) -> Option<String> {
    let artifacts = path::get_array(image, "artifacts")?;
    let width = |a: &Value| a.get("width").and_then(Value::as_u64).unwrap_or(0);

    let mut largest = artifacts.first()?;
    for artifact in &artifacts[1..] {
        if width(artifact) > width(largest) {
            largest = artifact;
        }
    }
    artifact_url(image, largest)
}

/// URL of the last artifact (the providers list them smallest first).
pub fn last_artifact_url(image: &Value) -> Option<String> {
    let artifact = path::get_array(image, "artifacts")?.last()?;
    artifact_url(image, artifact)
}

/// Vector image of an image view model's first attribute.
///
/// Profile pictures carry it under `nonEntityProfilePicture.vectorImage`,
/// everything else directly under `vectorImage`.
pub fn attribute_vector_image(image_view: &Value) -> Option<&Value> {
    path::get_present(
        image_view,
        "attributes[0].detailData.nonEntityProfilePicture.vectorImage",
    )
    .or_else(|| path::get_present(image_view, "attributes[0].detailData.vectorImage"))
}

/// Largest rendition of an image view model.
pub fn profile_picture_url(image_view: &Value) -> Option<String> {
    attribute_vector_image(image_view).and_then(largest_artifact_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn image() -> Value {
        json!({
            "rootUrl": "https://media.example/",
            "artifacts": [
                {"width": 100, "fileIdentifyingUrlPathSegment": "100.jpg"},
                {"width": 800, "fileIdentifyingUrlPathSegment": "800.jpg"},
                {"width": 800, "fileIdentifyingUrlPathSegment": "800b.jpg"},
                {"width": 400, "fileIdentifyingUrlPathSegment": "400.jpg"}
            ]
        })
    }

    #[test]
    fn largest_picks_first_widest() {
        assert_eq!(
            largest_artifact_url(&image()).as_deref(),
            Some("https://media.example/800.jpg")
        );
    }

    #[test]
    fn last_picks_last() {
        assert_eq!(
            last_artifact_url(&image()).as_deref(),
            Some("https://media.example/400.jpg")
        );
    }

    #[test]
    fn incomplete_images() {
        assert_eq!(largest_artifact_url(&json!({"rootUrl": "x", "artifacts": []})), None);
        assert_eq!(largest_artifact_url(&json!({"artifacts": [{"width": 1}]})), None);
        assert_eq!(last_artifact_url(&json!({"rootUrl": "x"})), None);
    }

    #[test]
    fn profile_picture_prefers_non_entity_picture() {
        let view = json!({"attributes": [{"detailData": {
            "nonEntityProfilePicture": {"vectorImage": image()}
        }}]});
        assert_eq!(
            profile_picture_url(&view).as_deref(),
            Some("https://media.example/800.jpg")
        );

        let view = json!({"attributes": [{"detailData": {"vectorImage": image()}}]});
        assert!(profile_picture_url(&view).is_some());
        assert_eq!(profile_picture_url(&json!({})), None);
    }
}
