//! Substack publisher MCP server.
//! Exposes read-only Substack Publisher API operations as MCP tools, resolving
//! the target publication from one or many configured API keys and turning
//! upstream failures into structured tool errors.

pub mod config;
pub mod error;
pub mod gateway;
pub mod registry;
pub mod server;
pub mod tools;

pub use config::{parse_env_ref, CredentialSource, FileConfig, PublisherConfig};
pub use error::{PublisherError, Result};
pub use gateway::ApiGateway;
pub use registry::{resolve, Account, AccountRegistry};
pub use server::PublisherMcpServer;
pub use tools::PublisherTools;
