//! The application state behind the UI.
//!
//! [`App`] is the one object a front end talks to: it owns the search state, the navigator and
//! the transient message slot, and turns user actions into state transitions. Every failure is
//! caught here, logged, and turned into a message; the returned `Err` is only informational.

use std::sync::Arc;

use wikinav_types::{Article, PageRef};

use crate::client::{EncyclopediaApi, SearchBackend};
use crate::config::CoreConfig;
use crate::navigator::{BackOutcome, Completion, Navigator, RequestToken};
use crate::render::{render_body, RenderOptions, RenderTree};
use crate::search::{SearchState, SearchStatus};
use crate::{NavError, NavResult};

/// What activating an in-article link does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAction {
    OpenTitle(String),
}

/// The current article, rewritten for display.
#[derive(Debug, Clone)]
pub struct ArticleView {
    pub title: String,
    pub body: RenderTree<LinkAction>,
}

/// Snapshot of everything a front end draws.
#[derive(Debug, Clone)]
pub struct View<'a> {
    pub search: SearchStatus<'a>,
    pub article: Option<ArticleView>,
    pub history_depth: usize,
    pub message: Option<&'a str>,
}

/// An article fetch that has been started but not yet applied.
///
/// Front ends that keep handling input while a fetch runs can move this into a task, await
/// [`PendingFetch::run`] there, and hand the output back to [`App::finish_open`].
pub struct PendingFetch {
    token: RequestToken,
    page: PageRef,
    api: Arc<dyn EncyclopediaApi>,
}

impl PendingFetch {
    /// Perform the fetch. The token is handed back so the result can be matched later.
    pub async fn run(self) -> (RequestToken, NavResult<Article>) {
        let fetched = self.api.parse(&self.page).await;
        (self.token, fetched)
    }
}

/// Search state, navigator and message slot behind one front end.
pub struct App {
    render_options: RenderOptions,
    search_backend: Arc<dyn SearchBackend>,
    encyclopedia: Arc<dyn EncyclopediaApi>,
    search: SearchState,
    navigator: Navigator,
    message: Option<String>,
}

impl App {
    /// Create an app with no search attempted and no article displayed.
    ///
    /// # Arguments
    /// * `cfg` - Resolved configuration (back policy, encyclopedia origin for image URLs)
    /// * `search_backend` - Where search queries go
    /// * `encyclopedia` - Where articles are fetched from
    pub fn new(
        cfg: &CoreConfig,
        search_backend: Arc<dyn SearchBackend>,
        encyclopedia: Arc<dyn EncyclopediaApi>,
    ) -> Self {
        Self {
            render_options: RenderOptions::from_config(cfg),
            search_backend,
            encyclopedia,
            search: SearchState::new(),
            navigator: Navigator::new(cfg.back_policy()),
            message: None,
        }
    }

    pub fn search_state(&self) -> &SearchState {
        &self.search
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Clear the transient message, if any.
    pub fn dismiss_message(&mut self) {
        self.message = None;
    }

    /// Submit the search form.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of results now listed
    /// * `Err(NavError)` - Blank query or failed search; the message slot says which
    pub async fn submit_search(&mut self, query: &str) -> NavResult<usize> {
        self.message = None;
        let outcome = self.search.submit(self.search_backend.as_ref(), query).await;
        if let Err(err) = &outcome {
            self.message = Some(match err {
                NavError::InvalidInput(_) => "Enter a search term.".to_string(),
                _ => self
                    .search
                    .error()
                    .map(str::to_owned)
                    .unwrap_or_else(|| err.user_message()),
            });
        }
        outcome
    }

    /// Open the `index`th entry of the result list (zero-based).
    pub async fn select_result(&mut self, index: usize) -> NavResult<Completion> {
        let page_id = match self.search.results().get(index) {
            Some(result) => result.page_id,
            None => {
                let err = NavError::InvalidInput(format!("no search result #{}", index + 1));
                self.message = Some(err.user_message());
                return Err(err);
            }
        };
        self.open(PageRef::Id(page_id)).await
    }

    /// Follow an in-article link.
    pub async fn activate(&mut self, action: &LinkAction) -> NavResult<Completion> {
        match action {
            LinkAction::OpenTitle(title) => self.activate_link(title).await,
        }
    }

    pub async fn activate_link(&mut self, title: &str) -> NavResult<Completion> {
        match PageRef::title(title) {
            Ok(page) => self.open(page).await,
            Err(err) => {
                let err = NavError::from(err);
                self.message = Some(err.user_message());
                Err(err)
            }
        }
    }

    /// Fetch `page` and make it current.
    pub async fn open(&mut self, page: PageRef) -> NavResult<Completion> {
        let pending = self.begin_open(page);
        let (token, fetched) = pending.run().await;
        self.finish_open(token, fetched)
    }

    /// Start a fetch; any fetch started earlier will be discarded when it completes.
    pub fn begin_open(&mut self, page: PageRef) -> PendingFetch {
        let token = self.navigator.begin_open(page.clone());
        PendingFetch {
            token,
            page,
            api: Arc::clone(&self.encyclopedia),
        }
    }

    /// Apply a finished fetch. Failures of the latest fetch become the message.
    pub fn finish_open(
        &mut self,
        token: RequestToken,
        fetched: NavResult<Article>,
    ) -> NavResult<Completion> {
        match self.navigator.complete_open(token, fetched) {
            Ok(Completion::Applied) => {
                self.message = None;
                Ok(Completion::Applied)
            }
            Ok(Completion::Stale) => Ok(Completion::Stale),
            Err(err) => {
                tracing::warn!(error = %err, "article fetch failed");
                self.message = Some(format!("Could not load article: {}", err.user_message()));
                Err(err)
            }
        }
    }

    /// Go back one article. When there is nothing to go back to the message says so.
    pub fn back(&mut self) -> BackOutcome {
        let outcome = self.navigator.back();
        match outcome {
            BackOutcome::Restored | BackOutcome::Cleared => self.message = None,
            BackOutcome::Unchanged => {
                self.message = Some("There is no previous article.".to_string())
            }
        }
        outcome
    }

    /// The current article with links and images rewritten.
    pub fn article_view(&self) -> Option<ArticleView> {
        self.navigator.current().map(|article| {
            let options = self.render_options.clone().with_fallback_alt(&article.title);
            ArticleView {
                title: article.title.clone(),
                body: render_body(&article.body_html, &options, |target| {
                    LinkAction::OpenTitle(target.to_owned())
                }),
            }
        })
    }

    /// Snapshot of the whole UI state for drawing.
    pub fn view(&self) -> View<'_> {
        View {
            search: self.search.status(),
            article: self.article_view(),
            history_depth: self.navigator.depth(),
            message: self.message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_BACK_POLICY;
    use crate::navigator::BackPolicy;
    use crate::testing::{FakeEncyclopedia, FakeSearch};
    use wikinav_types::SearchResult;

    fn cat() -> Article {
        Article::new(
            "Cat",
            r#"<p>The cat is related to <a href="/wiki/Albert_Einstein">Einstein</a>.</p><img src="//upload.wikimedia.org/x.png">"#,
        )
    }

    fn einstein() -> Article {
        Article::new("Albert Einstein", "<p>Physicist.</p>")
    }

    fn app_with(
        search: Vec<SearchResult>,
        encyclopedia: FakeEncyclopedia,
        policy: BackPolicy,
    ) -> (App, Arc<FakeSearch>, Arc<FakeEncyclopedia>) {
        let cfg = CoreConfig::from_lookup(|name| {
            (name == ENV_BACK_POLICY).then(|| policy.to_string())
        })
        .unwrap();
        let search = Arc::new(FakeSearch::returning(search));
        let encyclopedia = Arc::new(encyclopedia);
        let app = App::new(&cfg, search.clone(), encyclopedia.clone());
        (app, search, encyclopedia)
    }

    fn cat_hit() -> SearchResult {
        SearchResult {
            page_id: 42,
            title: "Cat".into(),
            snippet: "The <span>cat</span>".into(),
        }
    }

    #[tokio::test]
    async fn zero_results_shows_no_results_and_no_article() {
        let (mut app, _, _) = app_with(Vec::new(), FakeEncyclopedia::new(), BackPolicy::Stay);
        app.submit_search("cat").await.unwrap();

        let view = app.view();
        assert_eq!(view.search, SearchStatus::NoResults);
        assert!(view.article.is_none());
        assert!(view.message.is_none());
    }

    #[tokio::test]
    async fn selecting_a_result_fetches_its_pageid() {
        let (mut app, _, encyclopedia) = app_with(
            vec![cat_hit()],
            FakeEncyclopedia::new().with_article(42, cat()),
            BackPolicy::Stay,
        );
        app.submit_search("cat").await.unwrap();
        app.select_result(0).await.unwrap();

        assert_eq!(encyclopedia.parse_calls(), vec![PageRef::Id(42)]);
        let current = app.navigator().current().unwrap();
        assert_eq!(current, &cat());

        let article = app.view().article.unwrap();
        assert_eq!(article.title, "Cat");
        assert_eq!(
            article.body.images(),
            vec![("https://upload.wikimedia.org/x.png", "Cat")]
        );
    }

    #[tokio::test]
    async fn activating_internal_link_fetches_once_and_pushes_current() {
        let (mut app, _, encyclopedia) = app_with(
            vec![cat_hit()],
            FakeEncyclopedia::new()
                .with_article(42, cat())
                .with_title("Albert_Einstein", einstein()),
            BackPolicy::Stay,
        );
        app.open(PageRef::Id(42)).await.unwrap();

        let view = app.article_view().unwrap();
        let links = view.body.links();
        assert_eq!(links.len(), 1);
        let (target, action) = links[0];
        assert_eq!(target, "Albert_Einstein");

        app.activate(action).await.unwrap();

        assert_eq!(
            encyclopedia.parse_calls(),
            vec![PageRef::Id(42), PageRef::title("Albert_Einstein").unwrap()]
        );
        assert_eq!(app.navigator().history(), &[cat()]);
        assert_eq!(app.navigator().current(), Some(&einstein()));
        assert_eq!(app.view().history_depth, 1);

        assert_eq!(app.back(), BackOutcome::Restored);
        assert_eq!(app.navigator().current(), Some(&cat()));
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_article_and_sets_message() {
        let (mut app, _, encyclopedia) = app_with(
            Vec::new(),
            FakeEncyclopedia::new().with_article(42, cat()),
            BackPolicy::Stay,
        );
        app.open(PageRef::Id(42)).await.unwrap();

        encyclopedia.fail_next();
        assert!(app.activate_link("Dog").await.is_err());
        assert_eq!(app.navigator().current(), Some(&cat()));
        assert_eq!(app.navigator().depth(), 0);
        assert!(app.message().unwrap().starts_with("Could not load article"));
    }

    #[tokio::test]
    async fn missing_page_is_reported_not_pushed() {
        let (mut app, _, _) = app_with(
            Vec::new(),
            FakeEncyclopedia::new().with_article(42, cat()),
            BackPolicy::Stay,
        );
        app.open(PageRef::Id(42)).await.unwrap();
        assert!(app.open(PageRef::Id(7)).await.is_err());
        assert_eq!(app.navigator().depth(), 0);
        assert!(app.message().unwrap().contains("doesn't exist"));
    }

    #[tokio::test]
    async fn back_with_empty_history_keeps_title() {
        let (mut app, _, _) = app_with(
            Vec::new(),
            FakeEncyclopedia::new().with_article(42, cat()),
            BackPolicy::Stay,
        );
        assert_eq!(app.back(), BackOutcome::Unchanged);
        app.open(PageRef::Id(42)).await.unwrap();
        assert_eq!(app.back(), BackOutcome::Unchanged);
        assert_eq!(app.view().article.unwrap().title, "Cat");
        assert!(app.message().is_some());
    }

    #[tokio::test]
    async fn dismissing_clears_the_message_only() {
        let (mut app, _, _) = app_with(
            Vec::new(),
            FakeEncyclopedia::new().with_article(42, cat()),
            BackPolicy::Stay,
        );
        app.open(PageRef::Id(42)).await.unwrap();
        app.back();
        assert!(app.view().message.is_some());

        app.dismiss_message();
        let view = app.view();
        assert!(view.message.is_none());
        assert_eq!(view.article.unwrap().title, "Cat");
    }

    #[tokio::test]
    async fn back_with_empty_history_clears_under_clear_policy() {
        let (mut app, _, _) = app_with(
            Vec::new(),
            FakeEncyclopedia::new().with_article(42, cat()),
            BackPolicy::Clear,
        );
        app.open(PageRef::Id(42)).await.unwrap();
        assert_eq!(app.back(), BackOutcome::Cleared);
        assert!(app.view().article.is_none());
    }

    #[tokio::test]
    async fn overlapping_fetches_resolve_latest_wins() {
        let (mut app, _, _) = app_with(
            Vec::new(),
            FakeEncyclopedia::new()
                .with_article(1, cat())
                .with_article(2, einstein()),
            BackPolicy::Stay,
        );
        let first = app.begin_open(PageRef::Id(1));
        let second = app.begin_open(PageRef::Id(2));

        let ((first_token, first_result), (second_token, second_result)) =
            tokio::join!(first.run(), second.run());

        assert_eq!(
            app.finish_open(second_token, second_result).unwrap(),
            Completion::Applied
        );
        assert_eq!(
            app.finish_open(first_token, first_result).unwrap(),
            Completion::Stale
        );
        assert_eq!(app.navigator().current(), Some(&einstein()));
        assert_eq!(app.navigator().depth(), 0);
    }

    #[tokio::test]
    async fn search_failure_sets_message_and_empties_results() {
        let (mut app, search, _) =
            app_with(vec![cat_hit()], FakeEncyclopedia::new(), BackPolicy::Stay);
        search.fail_next();
        assert!(app.submit_search("cat").await.is_err());
        assert!(app.search_state().results().is_empty());
        assert!(app.message().unwrap().starts_with("Search failed"));
    }

    #[tokio::test]
    async fn selecting_out_of_range_result_is_reported() {
        let (mut app, _, encyclopedia) =
            app_with(vec![cat_hit()], FakeEncyclopedia::new(), BackPolicy::Stay);
        app.submit_search("cat").await.unwrap();
        assert!(app.select_result(5).await.is_err());
        assert!(encyclopedia.parse_calls().is_empty());
    }
}
