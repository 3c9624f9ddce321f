//! substack-publisher-mcp: MCP server for the Substack Publisher API.
//!
//! Two subcommands:
//! - `stdio` (default): STDIO transport for Claude Desktop and other STDIO-based MCP clients
//! - `serve`: Streamable HTTP MCP server at `/mcp`

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use clap::{Parser, Subcommand};
use rmcp::ServiceExt;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use substack_publisher_mcp::{FileConfig, PublisherConfig, PublisherMcpServer};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Local config file name checked in the working directory.
const LOCAL_CONFIG: &str = "substack-publisher.toml";

/// MCP server exposing read-only Substack Publisher API tools.
#[derive(Parser)]
#[command(
    name = "substack-publisher-mcp",
    version,
    about = "MCP server exposing read-only Substack Publisher API tools"
)]
struct Cli {
    /// Path to a TOML config file [default: ./substack-publisher.toml or ~/.config/substack-publisher-mcp/config.toml, if present]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the tools over STDIO (default)
    Stdio,
    /// Start a Streamable HTTP MCP server
    Serve {
        /// HTTP port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
        /// Bind address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity; stdout is reserved for the MCP transport
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cancel = CancellationToken::new();

    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutting down substack-publisher-mcp...");
        cancel_for_signal.cancel();
    });

    let config = load_config(resolve_config(cli.config)?)?;
    let server = PublisherMcpServer::from_config(&config)
        .map_err(|e| anyhow::anyhow!("Failed to build publication registry: {}", e))?;

    match cli.command.unwrap_or(Commands::Stdio) {
        Commands::Stdio => run_stdio(server, cancel).await?,
        Commands::Serve { port, host } => run_serve(server, host, port, cancel).await?,
    }

    Ok(())
}

/// Serve over stdin/stdout using rmcp's serve_with_ct.
async fn run_stdio(server: PublisherMcpServer, cancel: CancellationToken) -> Result<()> {
    let publications = server.publication_count();
    let transport = (tokio::io::stdin(), tokio::io::stdout());
    let running = server
        .serve_with_ct(transport, cancel.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize stdio transport: {:?}", e))?;

    tracing::info!(
        publications = publications,
        "substack-publisher-mcp running ({} publication(s) configured)",
        publications
    );

    tokio::select! {
        result = running.waiting() => {
            match result {
                Ok(reason) => {
                    tracing::info!(?reason, "stdio transport completed");
                }
                Err(e) => {
                    tracing::error!(error = %e, "stdio transport error");
                    return Err(anyhow::anyhow!("stdio transport error: {}", e));
                }
            }
        }
        _ = cancel.cancelled() => {
            tracing::info!("stdio transport cancelled");
        }
    }

    Ok(())
}

/// Serve via StreamableHttpService mounted at `/mcp` on an axum router.
async fn run_serve(
    server: PublisherMcpServer,
    host: String,
    port: u16,
    cancel: CancellationToken,
) -> Result<()> {
    let publications = server.publication_count();
    let session_manager = Arc::new(LocalSessionManager::default());
    let http_config = StreamableHttpServerConfig {
        cancellation_token: cancel.clone(),
        ..Default::default()
    };
    let mcp_service = StreamableHttpService::new(
        move || Ok(server.clone()),
        session_manager,
        http_config,
    );

    let app = Router::new().nest_service("/mcp", mcp_service);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", addr, e))?;

    tracing::info!(
        host = %host,
        port = %port,
        publications = publications,
        "substack-publisher-mcp running ({} publication(s) configured)",
        publications
    );
    tracing::info!("Connect your MCP client to http://{}:{}/mcp", host, port);

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Resolve config file path: explicit flag → ./substack-publisher.toml →
/// ~/.config/substack-publisher-mcp/config.toml → none.
///
/// An explicit path must exist; the fallbacks are optional since keys
/// normally come from the environment.
fn resolve_config(explicit: Option<PathBuf>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file {:?} does not exist", path));
        }
        return Ok(Some(path));
    }

    let local = Path::new(LOCAL_CONFIG);
    if local.exists() {
        return Ok(Some(local.to_path_buf()));
    }

    if let Some(config_dir) = dirs::config_dir() {
        let xdg = config_dir
            .join("substack-publisher-mcp")
            .join("config.toml");
        if xdg.exists() {
            return Ok(Some(xdg));
        }
    }

    Ok(None)
}

/// Keep environment entries whose key and value are valid UTF-8, in order.
///
/// `std::env::vars()` panics on the first non-UTF-8 entry, even an unrelated
/// one, so the raw `OsString` pairs are filtered here instead.
fn utf8_env_vars(vars: impl IntoIterator<Item = (OsString, OsString)>) -> Vec<(String, String)> {
    vars.into_iter()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (key, _) => {
                let key = match key {
                    Ok(key) => key,
                    Err(raw) => raw.to_string_lossy().into_owned(),
                };
                tracing::debug!(key = %key, "skipping non-UTF-8 environment variable");
                None
            }
        })
        .collect()
}

/// Build config from the environment, merging in the config file if any.
fn load_config(path: Option<PathBuf>) -> Result<PublisherConfig> {
    let vars = utf8_env_vars(std::env::vars_os());
    let env: HashMap<String, String> = vars.iter().cloned().collect();
    let config = PublisherConfig::from_env_vars(vars);

    let Some(path) = path else {
        return Ok(config);
    };

    tracing::debug!(path = ?path, "loading config file");
    let file = FileConfig::load(&path)
        .map_err(|e| anyhow::anyhow!("Failed to load config file {:?}: {}", path, e))?;
    config
        .with_file(file, &env)
        .map_err(|e| anyhow::anyhow!("Invalid config file {:?}: {}", path, e))
}
