//! Publisher configuration: environment discovery, optional TOML file and validation.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::PublisherError;

/// Upstream API base address.
pub const DEFAULT_API_BASE_URL: &str = "https://publisher-api.substack.com/v1";

/// Single-publication key variable; the account is named `default`.
pub const SINGLE_KEY_VAR: &str = "SUBSTACK_API_KEY";

/// Multi-publication key prefix: `SUBSTACK_API_KEY_<NAME>`.
pub const KEY_PREFIX: &str = "SUBSTACK_API_KEY_";

/// Overrides the upstream base address (tests, proxies).
pub const BASE_URL_VAR: &str = "SUBSTACK_API_BASE_URL";

/// Name given to the publication configured through `SUBSTACK_API_KEY`.
pub const DEFAULT_PUBLICATION: &str = "default";

/// Strip an env var reference to its variable name.
///
/// Accepts `${VAR_NAME}` syntax only. Returns `None` if the value is not a
/// valid env-var reference.
pub fn parse_env_ref(value: &str) -> Option<&str> {
    value.strip_prefix("${").and_then(|s| s.strip_suffix('}'))
}

/// Optional on-disk configuration, parsed from TOML.
///
/// ```toml
/// api_base_url = "https://publisher-api.substack.com/v1"
///
/// [[publications]]
/// name = "ny"
/// api_key = "${NY_SUBSTACK_KEY}"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub publications: Vec<FilePublication>,
}

/// One `[[publications]]` entry of the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct FilePublication {
    pub name: String,
    /// Must be a `${VAR}` reference; literal keys are rejected.
    pub api_key: String,
}

impl FileConfig {
    /// Parse a config file from TOML text.
    pub fn parse(content: &str) -> crate::Result<Self> {
        toml::from_str(content)
            .map_err(|e| PublisherError::InvalidConfig(format!("failed to parse config: {}", e)))
    }

    /// Read and parse a config file from disk.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PublisherError::InvalidConfig(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }
}

/// One discovered credential, before it becomes a registry account.
#[derive(Clone)]
pub struct CredentialSource {
    /// Publication name as configured (not yet lowercased).
    pub name: String,
    pub api_key: String,
    /// Where the credential came from, e.g. `SUBSTACK_API_KEY_NY`.
    pub origin: String,
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSource")
            .field("name", &self.name)
            .field("api_key", &"<redacted>")
            .field("origin", &self.origin)
            .finish()
    }
}

/// Top-level configuration, constructed once at startup and handed to the
/// registry and gateway.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    pub api_base_url: String,
    /// Credentials in discovery order: file entries, `SUBSTACK_API_KEY`,
    /// then `SUBSTACK_API_KEY_<NAME>` in enumeration order.
    pub credentials: Vec<CredentialSource>,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            credentials: Vec::new(),
        }
    }
}

impl PublisherConfig {
    /// Build config from an explicit set of environment variables.
    ///
    /// Enumeration order of prefixed keys is kept, but callers should not
    /// rely on it when several `SUBSTACK_API_KEY_<NAME>` keys exist.
    pub fn from_env_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars.into_iter().collect();
        let mut config = Self::default();

        if let Some((_, url)) = vars
            .iter()
            .find(|(k, v)| k == BASE_URL_VAR && !v.is_empty())
        {
            config.api_base_url = url.clone();
        }

        if let Some((_, key)) = vars
            .iter()
            .find(|(k, v)| k == SINGLE_KEY_VAR && !v.is_empty())
        {
            config.credentials.push(CredentialSource {
                name: DEFAULT_PUBLICATION.to_string(),
                api_key: key.clone(),
                origin: SINGLE_KEY_VAR.to_string(),
            });
        }

        for (key, value) in &vars {
            let Some(suffix) = key.strip_prefix(KEY_PREFIX) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            if suffix.is_empty() {
                tracing::warn!(var = %key, "ignoring key variable with empty publication name");
                continue;
            }
            config.credentials.push(CredentialSource {
                name: suffix.to_string(),
                api_key: value.clone(),
                origin: key.clone(),
            });
        }

        config
    }

    /// Merge a config file in front of the environment-derived settings.
    ///
    /// File publications come first in discovery order. `${VAR}` references
    /// resolve against `env`. The environment's base URL override wins over
    /// the file's `api_base_url`.
    pub fn with_file(
        mut self,
        file: FileConfig,
        env: &HashMap<String, String>,
    ) -> crate::Result<Self> {
        let mut from_file = Vec::with_capacity(file.publications.len());
        for (i, entry) in file.publications.into_iter().enumerate() {
            let origin = format!("config publications[{}]", i);
            let var_name = parse_env_ref(&entry.api_key).ok_or_else(|| {
                PublisherError::InvalidConfig(format!(
                    "api_key for publication '{}' must be a ${{VAR}} reference",
                    entry.name
                ))
            })?;
            let api_key = env
                .get(var_name)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| {
                    PublisherError::InvalidConfig(format!(
                        "api_key for publication '{}' references unset variable '{}'",
                        entry.name, var_name
                    ))
                })?;
            from_file.push(CredentialSource {
                name: entry.name,
                api_key,
                origin,
            });
        }

        let env_overrides_url = env.get(BASE_URL_VAR).is_some_and(|v| !v.is_empty());
        if let Some(url) = file.api_base_url {
            if !env_overrides_url {
                self.api_base_url = url;
            }
        }

        from_file.append(&mut self.credentials);
        self.credentials = from_file;
        Ok(self)
    }

    /// Validate the config, failing fast before anything is served.
    pub fn validate(&self) -> crate::Result<()> {
        let url = reqwest::Url::parse(&self.api_base_url).map_err(|e| {
            PublisherError::InvalidConfig(format!(
                "api base url '{}' is not a valid URL: {}",
                self.api_base_url, e
            ))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(PublisherError::InvalidConfig(format!(
                "api base url '{}' must use http or https",
                self.api_base_url
            )));
        }

        for source in &self.credentials {
            if source.name.trim().is_empty() {
                return Err(PublisherError::InvalidConfig(format!(
                    "publication from {} has an empty name",
                    source.origin
                )));
            }
        }

        Ok(())
    }
}
