//! Publisher tool surface: the six read-only MCP tools.
//!
//! `PublisherTools` owns the account registry and the API gateway. Each call
//! decodes its arguments, resolves the target publication, performs one
//! gateway request and converts the outcome into a `CallToolResult`.
//! Publisher failures never escape as protocol errors: they come back as a
//! JSON error payload with `is_error` set.

pub mod definitions;
pub mod params;

use std::time::Instant;

use rmcp::ErrorData as McpError;
use rmcp::model::{CallToolResult, Content, Tool};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::error::PublisherError;
use crate::gateway::{ApiGateway, path_segment};
use crate::registry::AccountRegistry;

pub use definitions::{
    GET_POST, GET_POST_STATS, GET_SUBSCRIBER, GET_SUBSCRIBER_COUNTS, LIST_POSTS,
    LIST_PUBLICATIONS, tool_definitions,
};
pub use params::{
    ListPostsParams, ListPublicationsParams, PostSlugParams, PostType, SortBy,
    SubscriberCountsParams, SubscriberParams,
};

/// Render a successful payload as pretty-printed JSON text.
pub fn success_result(value: &Value) -> CallToolResult {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    CallToolResult {
        content: vec![Content::text(text)],
        is_error: Some(false),
        structured_content: None,
        meta: None,
    }
}

/// Render a publisher failure as a JSON error payload with `is_error` set.
pub fn error_result(err: &PublisherError) -> CallToolResult {
    let mut payload = json!({
        "error": err.to_string(),
        "kind": err.kind(),
    });
    if let Some(status) = err.status() {
        payload["status"] = json!(status);
    }
    let text = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string());
    CallToolResult {
        content: vec![Content::text(text)],
        is_error: Some(true),
        structured_content: None,
        meta: None,
    }
}

/// Decode tool arguments into a typed parameter struct.
fn decode<T: DeserializeOwned>(
    tool: &str,
    arguments: Option<Map<String, Value>>,
) -> Result<T, McpError> {
    serde_json::from_value(Value::Object(arguments.unwrap_or_default())).map_err(|e| {
        McpError::invalid_params(format!("invalid arguments for '{}': {}", tool, e), None)
    })
}

/// Registry + gateway pair backing every tool call.
#[derive(Debug)]
pub struct PublisherTools {
    registry: AccountRegistry,
    gateway: ApiGateway,
}

impl PublisherTools {
    pub fn new(registry: AccountRegistry, gateway: ApiGateway) -> Self {
        Self { registry, gateway }
    }

    pub fn registry(&self) -> &AccountRegistry {
        &self.registry
    }

    /// Tool definitions advertised to MCP clients.
    pub fn tools(&self) -> Vec<Tool> {
        tool_definitions()
    }

    /// Call a tool by name.
    ///
    /// Returns `Err` only for unknown tools or malformed arguments. Every
    /// publisher failure is folded into an error `CallToolResult`.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<Map<String, Value>>,
    ) -> Result<CallToolResult, McpError> {
        let start = Instant::now();
        let publication = arguments
            .as_ref()
            .and_then(|a| a.get("publication"))
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        let outcome = match name {
            LIST_PUBLICATIONS => self.list_publications(),
            LIST_POSTS => self.list_posts(&decode(name, arguments)?).await,
            GET_POST => self.get_post(&decode(name, arguments)?).await,
            GET_POST_STATS => self.get_post_stats(&decode(name, arguments)?).await,
            GET_SUBSCRIBER_COUNTS => {
                self.get_subscriber_counts(&decode(name, arguments)?)
                    .await
            }
            GET_SUBSCRIBER => self.get_subscriber(&decode(name, arguments)?).await,
            other => {
                return Err(McpError::invalid_params(
                    format!("unknown tool '{}'", other),
                    None,
                ));
            }
        };

        let elapsed = start.elapsed().as_millis();
        match outcome {
            Ok(value) => {
                tracing::info!(
                    tool = %name,
                    publication = %publication,
                    duration_ms = %elapsed,
                    "tool call succeeded"
                );
                Ok(success_result(&value))
            }
            Err(e) => {
                tracing::warn!(
                    tool = %name,
                    publication = %publication,
                    kind = %e.kind(),
                    duration_ms = %elapsed,
                    "tool call failed"
                );
                Ok(error_result(&e))
            }
        }
    }

    /// Configured publication names plus a usage hint.
    pub fn list_publications(&self) -> crate::Result<Value> {
        if self.registry.is_empty() {
            return Err(PublisherError::Configuration);
        }
        let hint = if self.registry.len() == 1 {
            "Single publication configured. The 'publication' parameter is optional."
        } else {
            "Multiple publications configured. Use the 'publication' parameter to specify which one."
        };
        Ok(json!({
            "publications": self.registry.names(),
            "count": self.registry.len(),
            "hint": hint,
        }))
    }

    pub async fn list_posts(&self, params: &ListPostsParams) -> crate::Result<Value> {
        let account = self.registry.resolve(params.publication.as_deref())?;
        self.gateway
            .request("/posts", account.credential(), &params.query())
            .await
    }

    pub async fn get_post(&self, params: &PostSlugParams) -> crate::Result<Value> {
        let account = self.registry.resolve(params.publication.as_deref())?;
        let path = format!("/posts/{}", path_segment(&params.url_slug));
        self.gateway.request(&path, account.credential(), &[]).await
    }

    pub async fn get_post_stats(&self, params: &PostSlugParams) -> crate::Result<Value> {
        let account = self.registry.resolve(params.publication.as_deref())?;
        let path = format!("/posts/{}/stats", path_segment(&params.url_slug));
        self.gateway.request(&path, account.credential(), &[]).await
    }

    pub async fn get_subscriber_counts(
        &self,
        params: &SubscriberCountsParams,
    ) -> crate::Result<Value> {
        let account = self.registry.resolve(params.publication.as_deref())?;
        self.gateway
            .request("/subscribers/counts", account.credential(), &params.query())
            .await
    }

    pub async fn get_subscriber(&self, params: &SubscriberParams) -> crate::Result<Value> {
        let account = self.registry.resolve(params.publication.as_deref())?;
        let path = format!("/subscribers/{}", path_segment(&params.email));
        self.gateway.request(&path, account.credential(), &[]).await
    }
}
