//! Search state for the result list.
//!
//! Tracks whether a search has been attempted so the view can tell "no query yet" apart from
//! "the query found nothing", and keeps the result list and the failure message mutually
//! exclusive: a failed search always leaves an empty list.

use wikinav_types::{NonEmptyText, SearchResult};

use crate::client::SearchBackend;
use crate::NavResult;

/// What the result list should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus<'a> {
    NotAttempted,
    Results(&'a [SearchResult]),
    NoResults,
    Failed(&'a str),
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    attempted: bool,
    results: Vec<SearchResult>,
    error: Option<String>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one search against `backend`.
    ///
    /// A blank query is rejected before anything else happens. Otherwise the attempt is recorded,
    /// exactly one backend call is made, and on failure the list is emptied and a user-visible
    /// message stored. Returns the number of results on success.
    pub async fn submit(&mut self, backend: &dyn SearchBackend, query: &str) -> NavResult<usize> {
        let query = NonEmptyText::new(query)?;

        self.attempted = true;
        self.error = None;

        match backend.search(&query).await {
            Ok(results) => {
                tracing::debug!(%query, count = results.len(), "search completed");
                self.results = results;
                Ok(self.results.len())
            }
            Err(err) => {
                tracing::warn!(%query, error = %err, "search failed");
                self.results.clear();
                self.error = Some(format!("Search failed: {}", err.user_message()));
                Err(err)
            }
        }
    }

    pub fn attempted(&self) -> bool {
        self.attempted
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// What the result list shows. A failure takes precedence over an empty list.
    pub fn status(&self) -> SearchStatus<'_> {
        if !self.attempted {
            SearchStatus::NotAttempted
        } else if let Some(error) = &self.error {
            SearchStatus::Failed(error)
        } else if self.results.is_empty() {
            SearchStatus::NoResults
        } else {
            SearchStatus::Results(&self.results)
        }
    }
}
