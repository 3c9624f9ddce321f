//! Typed tool arguments, decoded from the MCP `arguments` object.
//!
//! Each struct doubles as the source of its tool's JSON input schema via
//! `JsonSchema`, so field names, enum values and required fields live in
//! one place.

use schemars::JsonSchema;
use serde::de::{self, Deserializer};
use serde::Deserialize;

const PUBLICATION_DESCRIPTION: &str =
    "Publication name (e.g., 'ny', 'la'). Required if multiple publications are configured.";
const URL_SLUG_DESCRIPTION: &str =
    "The URL slug of the post (from list_posts results or the post URL).";

/// Accept any JSON number without a fractional part, so `5` and `5.0` both
/// decode to `5`.
fn whole_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Some(n) = number.as_i64() {
        return Ok(Some(n));
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(Some(f as i64))
        }
        _ => Err(de::Error::custom(format!(
            "expected an integer, got {}",
            number
        ))),
    }
}

/// `list_publications` takes no arguments.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListPublicationsParams {}

/// `list_posts` sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Newest,
    Oldest,
}

impl SortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Newest => "newest",
            SortBy::Oldest => "oldest",
        }
    }
}

/// `list_posts` post type filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Newsletter,
    Podcast,
    Video,
}

impl PostType {
    pub fn as_str(self) -> &'static str {
        match self {
            PostType::Newsletter => "newsletter",
            PostType::Podcast => "podcast",
            PostType::Video => "video",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsParams {
    #[schemars(description = PUBLICATION_DESCRIPTION)]
    pub publication: Option<String>,

    #[schemars(description = "Filter posts published on or after this date (YYYY-MM-DD).")]
    pub start_date: Option<String>,

    #[schemars(description = "Filter posts published on or before this date (YYYY-MM-DD).")]
    pub end_date: Option<String>,

    #[schemars(description = "Sort order. Defaults to newest.")]
    pub sort_by: Option<SortBy>,

    #[serde(rename = "type")]
    #[schemars(description = "Filter by post type.")]
    pub post_type: Option<PostType>,

    #[serde(default, deserialize_with = "whole_number")]
    #[schemars(description = "Maximum number of posts to return. Default 100.")]
    pub max_results: Option<i64>,

    /// Opaque pagination cursor, passed through unchanged.
    #[schemars(
        description = "Pagination cursor from a previous list_posts response. Pass this to get the next page of results."
    )]
    pub next: Option<String>,
}

impl ListPostsParams {
    /// Query parameters for `/posts`; unset ones are filtered by the gateway.
    pub fn query(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("startDate", self.start_date.clone()),
            ("endDate", self.end_date.clone()),
            ("sortBy", self.sort_by.map(|s| s.as_str().to_string())),
            ("type", self.post_type.map(|t| t.as_str().to_string())),
            ("maxResults", self.max_results.map(|n| n.to_string())),
            ("next", self.next.clone()),
        ]
    }
}

/// Arguments for `get_post` and `get_post_stats`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostSlugParams {
    #[schemars(description = PUBLICATION_DESCRIPTION)]
    pub publication: Option<String>,

    #[schemars(description = URL_SLUG_DESCRIPTION)]
    pub url_slug: String,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberCountsParams {
    #[schemars(description = PUBLICATION_DESCRIPTION)]
    pub publication: Option<String>,

    #[schemars(description = "Start of date range (YYYY-MM-DD).")]
    pub start_date: Option<String>,

    #[schemars(description = "End of date range (YYYY-MM-DD).")]
    pub end_date: Option<String>,
}

impl SubscriberCountsParams {
    pub fn query(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("startDate", self.start_date.clone()),
            ("endDate", self.end_date.clone()),
        ]
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberParams {
    #[schemars(description = PUBLICATION_DESCRIPTION)]
    pub publication: Option<String>,

    #[schemars(description = "The subscriber's email address.")]
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_posts_decodes_camel_case() {
        let params: ListPostsParams = serde_json::from_value(json!({
            "publication": "ny",
            "startDate": "2024-01-01",
            "sortBy": "oldest",
            "type": "podcast",
            "maxResults": 10,
            "next": "cursor-1"
        }))
        .unwrap();
        assert_eq!(params.publication.as_deref(), Some("ny"));
        assert_eq!(params.sort_by, Some(SortBy::Oldest));
        assert_eq!(params.post_type, Some(PostType::Podcast));
        assert_eq!(params.max_results, Some(10));
    }

    #[test]
    fn test_list_posts_query_order_and_values() {
        let params = ListPostsParams {
            start_date: Some("2024-01-01".to_string()),
            max_results: Some(25),
            sort_by: Some(SortBy::Newest),
            ..Default::default()
        };
        let query = params.query();
        assert_eq!(query[0], ("startDate", Some("2024-01-01".to_string())));
        assert_eq!(query[1], ("endDate", None));
        assert_eq!(query[2], ("sortBy", Some("newest".to_string())));
        assert_eq!(query[4], ("maxResults", Some("25".to_string())));
    }

    #[test]
    fn test_invalid_sort_rejected() {
        let result: Result<ListPostsParams, _> =
            serde_json::from_value(json!({ "sortBy": "random" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_slug_required() {
        let result: Result<PostSlugParams, _> = serde_json::from_value(json!({}));
        assert!(result.is_err());
        let params: PostSlugParams =
            serde_json::from_value(json!({ "urlSlug": "hello-world" })).unwrap();
        assert_eq!(params.url_slug, "hello-world");
        assert!(params.publication.is_none());
    }

    #[test]
    fn test_fractional_max_results_rejected() {
        let result: Result<ListPostsParams, _> =
            serde_json::from_value(json!({ "maxResults": 2.5 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_whole_float_max_results_accepted() {
        let params: ListPostsParams =
            serde_json::from_value(json!({ "maxResults": 5.0 })).unwrap();
        assert_eq!(params.max_results, Some(5));
        assert_eq!(params.query()[4], ("maxResults", Some("5".to_string())));
    }

    #[test]
    fn test_max_results_null_or_missing_is_none() {
        let params: ListPostsParams =
            serde_json::from_value(json!({ "maxResults": null })).unwrap();
        assert!(params.max_results.is_none());
        let params: ListPostsParams = serde_json::from_value(json!({})).unwrap();
        assert!(params.max_results.is_none());
    }

    #[test]
    fn test_non_numeric_max_results_rejected() {
        let result: Result<ListPostsParams, _> =
            serde_json::from_value(json!({ "maxResults": "ten" }));
        assert!(result.is_err());
    }
}
