//! Constants used throughout the WikiNav core crate.
//!
//! Defaults for every configurable value live here so the binaries and the tests agree on them.

/// Default base URL of the search backend.
pub const DEFAULT_SEARCH_URL: &str = "http://localhost:8000";

/// Default MediaWiki action API endpoint.
pub const DEFAULT_WIKI_API_URL: &str = "https://en.wikipedia.org/w/api.php";

/// Default per-request timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Default number of results the search backend requests upstream.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Upper bound accepted for the upstream search limit.
pub const MAX_SEARCH_LIMIT: u32 = 50;

/// Path prefix of internal article links.
pub const WIKI_PATH_PREFIX: &str = "/wiki/";

/// User agent sent on every outbound request.
pub const USER_AGENT: &str = concat!("wikinav/", env!("CARGO_PKG_VERSION"));

/// Message shown when a search completed with zero hits.
pub const NO_RESULTS_MESSAGE: &str = "No results found.";
