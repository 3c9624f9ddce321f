//! AccountRegistry: the immutable set of configured publications.
//!
//! Built once from `PublisherConfig` at startup and shared read-only for the
//! life of the process. Every tool call resolves its target publication here
//! before the gateway is touched.

use crate::config::PublisherConfig;
use crate::error::PublisherError;

/// One configured publication: a lowercase name and its API key.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    name: String,
    credential: String,
}

impl Account {
    /// Create an account, lowercasing the name.
    pub fn new(name: impl AsRef<str>, credential: impl Into<String>) -> Self {
        Self {
            name: name.as_ref().to_lowercase(),
            credential: credential.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The API key sent upstream. Never log this.
    pub fn credential(&self) -> &str {
        &self.credential
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("name", &self.name)
            .field("credential", &"<redacted>")
            .finish()
    }
}

/// Resolve the target account for a request.
///
/// - Empty registry → `Configuration`.
/// - No name (or an empty one) → the only account, or `AmbiguousTarget`
///   listing every name when several exist.
/// - A name → case-insensitive match, or `NotFound` listing every name.
pub fn resolve<'a>(accounts: &'a [Account], requested: Option<&str>) -> crate::Result<&'a Account> {
    if accounts.is_empty() {
        return Err(PublisherError::Configuration);
    }

    let all_names = || accounts.iter().map(|a| a.name.clone()).collect::<Vec<_>>();

    match requested.filter(|r| !r.is_empty()) {
        None => match accounts {
            [only] => Ok(only),
            _ => Err(PublisherError::AmbiguousTarget(all_names())),
        },
        Some(requested) => {
            let wanted = requested.to_lowercase();
            accounts
                .iter()
                .find(|a| a.name == wanted)
                .ok_or_else(|| PublisherError::unknown_publication(requested, &all_names()))
        }
    }
}

/// The process-wide, read-only list of configured publications.
#[derive(Debug, Clone, Default)]
pub struct AccountRegistry {
    accounts: Vec<Account>,
}

impl AccountRegistry {
    /// Build a registry from validated config.
    ///
    /// Calls `config.validate()` first. Names are lowercased; two sources that
    /// normalize to the same name are rejected rather than silently shadowed.
    pub fn from_config(config: &PublisherConfig) -> crate::Result<Self> {
        config.validate()?;

        let mut accounts: Vec<Account> = Vec::with_capacity(config.credentials.len());
        let mut origins: Vec<&str> = Vec::with_capacity(config.credentials.len());

        for source in &config.credentials {
            let account = Account::new(&source.name, source.api_key.clone());
            if let Some(pos) = accounts.iter().position(|a| a.name == account.name) {
                return Err(PublisherError::DuplicatePublication {
                    name: account.name,
                    first: origins[pos].to_string(),
                    second: source.origin.clone(),
                });
            }
            tracing::debug!(
                publication = %account.name,
                origin = %source.origin,
                "registered publication"
            );
            origins.push(&source.origin);
            accounts.push(account);
        }

        Ok(Self { accounts })
    }

    /// Build a registry directly from accounts (no duplicate check).
    #[cfg(test)]
    pub(crate) fn from_accounts(accounts: Vec<Account>) -> Self {
        Self { accounts }
    }

    /// Resolve the target publication; see [`resolve`].
    pub fn resolve(&self, requested: Option<&str>) -> crate::Result<&Account> {
        resolve(&self.accounts, requested)
    }

    /// Publication names in configured order.
    pub fn names(&self) -> Vec<String> {
        self.accounts.iter().map(|a| a.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
