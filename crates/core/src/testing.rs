//! In-memory fakes for the client traits, shared with the other workspace crates' tests through
//! the `test-helpers` feature.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use wikinav_types::{Article, NonEmptyText, PageRef, SearchResult};

use crate::client::{EncyclopediaApi, SearchBackend};
use crate::{NavError, NavResult};

fn injected_failure() -> NavError {
    NavError::UnexpectedShape("injected failure".into())
}

#[derive(Debug, Default)]
struct SearchInner {
    results: Vec<SearchResult>,
    fail_next: bool,
    calls: Vec<String>,
}

/// Search backend answering every query with a fixed result list.
#[derive(Debug, Default)]
pub struct FakeSearch {
    inner: Mutex<SearchInner>,
}

impl FakeSearch {
    pub fn returning(results: Vec<SearchResult>) -> Self {
        Self {
            inner: Mutex::new(SearchInner {
                results,
                ..SearchInner::default()
            }),
        }
    }

    /// Make the next call fail with a shape error.
    pub fn fail_next(&self) {
        self.inner.lock().unwrap().fail_next = true;
    }

    /// Queries received so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl SearchBackend for FakeSearch {
    async fn search(&self, query: &NonEmptyText) -> NavResult<Vec<SearchResult>> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(query.to_string());
        if std::mem::take(&mut inner.fail_next) {
            return Err(injected_failure());
        }
        Ok(inner.results.clone())
    }
}

#[derive(Debug, Default)]
struct EncyclopediaInner {
    by_id: HashMap<u64, Article>,
    by_title: HashMap<String, Article>,
    search_results: Vec<SearchResult>,
    fail_next: bool,
    parse_calls: Vec<PageRef>,
    search_calls: Vec<(String, u32)>,
}

/// Encyclopedia serving articles registered up front.
#[derive(Debug, Default)]
pub struct FakeEncyclopedia {
    inner: Mutex<EncyclopediaInner>,
}

impl FakeEncyclopedia {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an article reachable both by `page_id` and by its title.
    pub fn with_article(self, page_id: u64, article: Article) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.by_title.insert(article.title.clone(), article.clone());
            inner.by_id.insert(page_id, article);
        }
        self
    }

    /// Register an article reachable only by a link title such as `Albert_Einstein`.
    pub fn with_title(self, title: &str, article: Article) -> Self {
        self.inner
            .lock()
            .unwrap()
            .by_title
            .insert(title.to_owned(), article);
        self
    }

    pub fn with_search_results(self, results: Vec<SearchResult>) -> Self {
        self.inner.lock().unwrap().search_results = results;
        self
    }

    pub fn fail_next(&self) {
        self.inner.lock().unwrap().fail_next = true;
    }

    pub fn parse_calls(&self) -> Vec<PageRef> {
        self.inner.lock().unwrap().parse_calls.clone()
    }

    pub fn search_calls(&self) -> Vec<(String, u32)> {
        self.inner.lock().unwrap().search_calls.clone()
    }
}

#[async_trait]
impl EncyclopediaApi for FakeEncyclopedia {
    async fn parse(&self, page: &PageRef) -> NavResult<Article> {
        let mut inner = self.inner.lock().unwrap();
        inner.parse_calls.push(page.clone());
        if std::mem::take(&mut inner.fail_next) {
            return Err(injected_failure());
        }
        let found = match page {
            PageRef::Id(id) => inner.by_id.get(id),
            PageRef::Title(title) => inner.by_title.get(title.as_str()),
        };
        found.cloned().ok_or_else(|| NavError::Api {
            code: "missingtitle".into(),
            info: "The page you specified doesn't exist.".into(),
        })
    }

    async fn search(&self, query: &NonEmptyText, limit: u32) -> NavResult<Vec<SearchResult>> {
        let mut inner = self.inner.lock().unwrap();
        inner.search_calls.push((query.to_string(), limit));
        if std::mem::take(&mut inner.fail_next) {
            return Err(injected_failure());
        }
        Ok(inner
            .search_results
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
