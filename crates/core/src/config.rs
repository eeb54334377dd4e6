//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services. Core
//! code never reads process-wide environment variables itself; binaries hand a lookup function to
//! [`CoreConfig::from_lookup`] (usually backed by `std::env::var` after `dotenvy` has loaded any
//! `.env` file), which keeps tests free of global state.

use std::time::Duration;

use url::Url;

use crate::constants::{
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_SEARCH_LIMIT, DEFAULT_SEARCH_URL, DEFAULT_WIKI_API_URL,
    MAX_SEARCH_LIMIT,
};
use crate::navigator::BackPolicy;
use crate::{NavError, NavResult};

pub const ENV_SEARCH_URL: &str = "WIKINAV_SEARCH_URL";
pub const ENV_WIKI_API_URL: &str = "WIKINAV_WIKI_API_URL";
pub const ENV_BACK_POLICY: &str = "WIKINAV_BACK_POLICY";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "WIKINAV_HTTP_TIMEOUT_SECS";
pub const ENV_SEARCH_LIMIT: &str = "WIKINAV_SEARCH_LIMIT";

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    search_url: Url,
    wiki_api_url: Url,
    back_policy: BackPolicy,
    http_timeout: Duration,
    search_limit: u32,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// The search base URL is normalised to end with `/` so that `search` is appended to it
    /// rather than replacing its last path segment.
    ///
    /// # Returns
    /// * `Ok(CoreConfig)` - All values valid
    /// * `Err(NavError::Config)` - Non-http(s) URL, zero timeout, or search limit out of range
    pub fn new(
        mut search_url: Url,
        wiki_api_url: Url,
        back_policy: BackPolicy,
        http_timeout: Duration,
        search_limit: u32,
    ) -> NavResult<Self> {
        for (name, url) in [(ENV_SEARCH_URL, &search_url), (ENV_WIKI_API_URL, &wiki_api_url)] {
            if !matches!(url.scheme(), "http" | "https") {
                return Err(NavError::Config(format!(
                    "{name} must be an http(s) URL, got {url}"
                )));
            }
        }
        if http_timeout.is_zero() {
            return Err(NavError::Config(format!(
                "{ENV_HTTP_TIMEOUT_SECS} must be greater than zero"
            )));
        }
        if search_limit == 0 || search_limit > MAX_SEARCH_LIMIT {
            return Err(NavError::Config(format!(
                "{ENV_SEARCH_LIMIT} must be between 1 and {MAX_SEARCH_LIMIT}"
            )));
        }

        if !search_url.path().ends_with('/') {
            let path = format!("{}/", search_url.path());
            search_url.set_path(&path);
        }

        Ok(Self {
            search_url,
            wiki_api_url,
            back_policy,
            http_timeout,
            search_limit,
        })
    }

    /// Resolve every setting through `lookup`, falling back to the defaults in
    /// [`crate::constants`] for unset or blank values.
    pub fn from_lookup<F>(lookup: F) -> NavResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let search_url =
            url_from_env_value(ENV_SEARCH_URL, lookup(ENV_SEARCH_URL), DEFAULT_SEARCH_URL)?;
        let wiki_api_url =
            url_from_env_value(ENV_WIKI_API_URL, lookup(ENV_WIKI_API_URL), DEFAULT_WIKI_API_URL)?;
        let back_policy = back_policy_from_env_value(lookup(ENV_BACK_POLICY))?;
        let http_timeout = timeout_from_env_value(lookup(ENV_HTTP_TIMEOUT_SECS))?;
        let search_limit = search_limit_from_env_value(lookup(ENV_SEARCH_LIMIT))?;

        Self::new(search_url, wiki_api_url, back_policy, http_timeout, search_limit)
    }

    pub fn search_url(&self) -> &Url {
        &self.search_url
    }

    pub fn wiki_api_url(&self) -> &Url {
        &self.wiki_api_url
    }

    pub fn back_policy(&self) -> BackPolicy {
        self.back_policy
    }

    pub fn http_timeout(&self) -> Duration {
        self.http_timeout
    }

    pub fn search_limit(&self) -> u32 {
        self.search_limit
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a URL setting, using `default` when `value` is `None` or blank.
pub fn url_from_env_value(name: &str, value: Option<String>, default: &str) -> NavResult<Url> {
    let raw = non_blank(value).unwrap_or_else(|| default.to_string());
    Url::parse(&raw).map_err(|e| NavError::Config(format!("{name}: {e} ({raw})")))
}

/// Parse the back-at-empty-history policy. `None` or blank yields the default (`stay`).
pub fn back_policy_from_env_value(value: Option<String>) -> NavResult<BackPolicy> {
    non_blank(value)
        .map(|v| v.parse::<BackPolicy>())
        .transpose()
        .map(Option::unwrap_or_default)
}

/// Parse the per-request timeout in whole seconds.
pub fn timeout_from_env_value(value: Option<String>) -> NavResult<Duration> {
    let secs = match non_blank(value) {
        Some(v) => v.parse::<u64>().map_err(|e| {
            NavError::Config(format!("{ENV_HTTP_TIMEOUT_SECS}: {e} ({v})"))
        })?,
        None => DEFAULT_HTTP_TIMEOUT_SECS,
    };
    Ok(Duration::from_secs(secs))
}

/// Parse the number of results requested upstream.
pub fn search_limit_from_env_value(value: Option<String>) -> NavResult<u32> {
    match non_blank(value) {
        Some(v) => v
            .parse::<u32>()
            .map_err(|e| NavError::Config(format!("{ENV_SEARCH_LIMIT}: {e} ({v})"))),
        None => Ok(DEFAULT_SEARCH_LIMIT),
    }
}
