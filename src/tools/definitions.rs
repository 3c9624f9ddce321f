//! MCP tool definitions: names, descriptions and input schemas.
//!
//! Input schemas are generated from the parameter types in `params`.

use std::sync::Arc;

use rmcp::handler::server::tool::schema_for_type;
use rmcp::model::{JsonObject, Tool};

use super::params::{
    ListPostsParams, ListPublicationsParams, PostSlugParams, SubscriberCountsParams,
    SubscriberParams,
};

pub const LIST_PUBLICATIONS: &str = "list_publications";
pub const LIST_POSTS: &str = "list_posts";
pub const GET_POST: &str = "get_post";
pub const GET_POST_STATS: &str = "get_post_stats";
pub const GET_SUBSCRIBER_COUNTS: &str = "get_subscriber_counts";
pub const GET_SUBSCRIBER: &str = "get_subscriber";

fn make_tool(name: &str, description: &str, input_schema: Arc<JsonObject>) -> Tool {
    Tool {
        name: name.to_string().into(),
        title: None,
        description: Some(description.to_string().into()),
        input_schema,
        output_schema: None,
        annotations: None,
        icons: None,
        meta: None,
    }
}

/// All six publisher tools, in a stable order.
pub fn tool_definitions() -> Vec<Tool> {
    vec![
        make_tool(
            LIST_PUBLICATIONS,
            "List all configured Substack publications and their names. Use these names as the 'publication' parameter in other tools.",
            schema_for_type::<ListPublicationsParams>(),
        ),
        make_tool(
            LIST_POSTS,
            "List posts published by a Substack publication. Returns post metadata including title, URL slug, audience, publish date, and type. Use the urlSlug from results with get_post or get_post_stats for details.",
            schema_for_type::<ListPostsParams>(),
        ),
        make_tool(
            GET_POST,
            "Get detailed information about a specific post by its URL slug. Returns full post metadata including title, subtitle, audience, publish date, and content details.",
            schema_for_type::<PostSlugParams>(),
        ),
        make_tool(
            GET_POST_STATS,
            "Get engagement statistics for a specific post by its URL slug. Returns metrics like opens, clicks, and other engagement data.",
            schema_for_type::<PostSlugParams>(),
        ),
        make_tool(
            GET_SUBSCRIBER_COUNTS,
            "Get daily subscriber counts broken down by subscription type (free, paid, etc.). Useful for tracking growth and churn over time.",
            schema_for_type::<SubscriberCountsParams>(),
        ),
        make_tool(
            GET_SUBSCRIBER,
            "Look up a specific subscriber by email address. Returns their subscription details including type, status, and social handles.",
            schema_for_type::<SubscriberParams>(),
        ),
    ]
}
