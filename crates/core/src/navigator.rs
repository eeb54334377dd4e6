//! Article navigation state.
//!
//! The navigator is a small explicit state machine:
//!
//! ```text
//! Idle ──open ok──▶ Viewing{history: 0}
//! Viewing{n} ──open ok──▶ Viewing{n + 1}      (current article pushed first)
//! Viewing{n} ──back──▶ Viewing{n - 1}         (n > 0, top of history becomes current)
//! Viewing{0} ──back──▶ Viewing{0} | Idle      (decided by BackPolicy)
//! ```
//!
//! Opening is split into [`Navigator::begin_open`], which issues a [`RequestToken`], and
//! [`Navigator::complete_open`], which applies the fetched article only if its token is still the
//! most recent one. Overlapping fetches therefore resolve as latest-wins no matter which response
//! arrives first, and a failed or stale fetch never touches the current article or the history.

use std::fmt;
use std::str::FromStr;

use wikinav_types::{Article, PageRef};

use crate::{NavError, NavResult};

/// What "back" does when the history stack is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackPolicy {
    /// Keep showing the current article.
    #[default]
    Stay,
    /// Clear the display and return to the idle state.
    Clear,
}

impl FromStr for BackPolicy {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stay" | "noop" | "no-op" => Ok(BackPolicy::Stay),
            "clear" => Ok(BackPolicy::Clear),
            other => Err(NavError::Config(format!(
                "unknown back policy '{other}' (expected 'stay' or 'clear')"
            ))),
        }
    }
}

impl fmt::Display for BackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackPolicy::Stay => f.write_str("stay"),
            BackPolicy::Clear => f.write_str("clear"),
        }
    }
}

/// Identifies one article fetch. Tokens increase monotonically per navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavState {
    Idle,
    Viewing {
        current: Article,
        /// Previously viewed articles, most recent last.
        history: Vec<Article>,
    },
}

/// Result of applying a finished fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The article is now current.
    Applied,
    /// A newer fetch (or a back navigation) superseded this one; nothing changed.
    Stale,
}

/// Result of a back navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    /// The top of the history stack is now current.
    Restored,
    /// History was empty and the policy cleared the display.
    Cleared,
    /// Nothing to go back to; state unchanged.
    Unchanged,
}

/// The article navigator. See the module docs for the transitions.
#[derive(Debug, Clone)]
pub struct Navigator {
    state: NavState,
    policy: BackPolicy,
    last_issued: u64,
    pending: Option<(RequestToken, PageRef)>,
}

impl Navigator {
    /// Create an idle navigator.
    ///
    /// # Arguments
    /// * `policy` - What back does when there is no history
    pub fn new(policy: BackPolicy) -> Self {
        Self {
            state: NavState::Idle,
            policy,
            last_issued: 0,
            pending: None,
        }
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    /// The displayed article, `None` while idle.
    pub fn current(&self) -> Option<&Article> {
        match &self.state {
            NavState::Idle => None,
            NavState::Viewing { current, .. } => Some(current),
        }
    }

    /// Previously viewed articles, oldest first.
    pub fn history(&self) -> &[Article] {
        match &self.state {
            NavState::Idle => &[],
            NavState::Viewing { history, .. } => history,
        }
    }

    /// Number of articles "back" can return to.
    pub fn depth(&self) -> usize {
        self.history().len()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, NavState::Idle)
    }

    /// Start opening `page`. Any fetch begun earlier becomes stale.
    pub fn begin_open(&mut self, page: PageRef) -> RequestToken {
        self.last_issued += 1;
        let token = RequestToken(self.last_issued);
        tracing::debug!(token = token.0, %page, "begin article fetch");
        self.pending = Some((token, page));
        token
    }

    /// Whether `token` belongs to the newest fetch and that fetch is still awaited.
    pub fn is_latest(&self, token: RequestToken) -> bool {
        self.pending.as_ref().is_some_and(|(pending, _)| *pending == token)
    }

    /// Apply the outcome of the fetch identified by `token`.
    ///
    /// A stale token is discarded whether the fetch succeeded or not. For the latest token a
    /// successful fetch pushes the current article (if any) onto history and replaces it; a failed
    /// fetch returns the error and leaves state untouched.
    pub fn complete_open(
        &mut self,
        token: RequestToken,
        fetched: NavResult<Article>,
    ) -> NavResult<Completion> {
        if !self.is_latest(token) {
            tracing::debug!(token = token.0, latest = self.last_issued, "discarding stale fetch");
            return Ok(Completion::Stale);
        }
        self.pending = None;

        let article = fetched?;
        tracing::debug!(token = token.0, title = %article.title, "article fetched");
        self.show(article);
        Ok(Completion::Applied)
    }

    /// Make `article` current, pushing the previous one onto history.
    fn show(&mut self, article: Article) {
        self.state = match std::mem::replace(&mut self.state, NavState::Idle) {
            NavState::Idle => NavState::Viewing {
                current: article,
                history: Vec::new(),
            },
            NavState::Viewing {
                current,
                mut history,
            } => {
                history.push(current);
                NavState::Viewing {
                    current: article,
                    history,
                }
            }
        };
    }

    /// Return to the previously viewed article.
    ///
    /// A back that changes the display invalidates any fetch still in flight. A back with
    /// nothing to return to leaves everything alone, including a pending open.
    ///
    /// # Returns
    /// * `BackOutcome::Restored` - The top of history is now current
    /// * `BackOutcome::Cleared` - History was empty and the policy cleared the display
    /// * `BackOutcome::Unchanged` - Nothing changed
    pub fn back(&mut self) -> BackOutcome {
        let restored = match &mut self.state {
            NavState::Idle => return BackOutcome::Unchanged,
            NavState::Viewing { current, history } => match history.pop() {
                Some(previous) => {
                    *current = previous;
                    true
                }
                None => false,
            },
        };
        if restored {
            self.invalidate_pending();
            return BackOutcome::Restored;
        }

        match self.policy {
            BackPolicy::Stay => BackOutcome::Unchanged,
            BackPolicy::Clear => {
                self.invalidate_pending();
                self.state = NavState::Idle;
                BackOutcome::Cleared
            }
        }
    }

    fn invalidate_pending(&mut self) {
        if let Some((token, page)) = self.pending.take() {
            tracing::debug!(token = token.0, %page, "abandoning in-flight fetch");
        }
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(BackPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(n: usize) -> Article {
        Article::new(format!("Title {n}"), format!("<p>Body {n}</p>"))
    }

    fn open(nav: &mut Navigator, a: Article) {
        let token = nav.begin_open(PageRef::title(&a.title).unwrap());
        assert_eq!(nav.complete_open(token, Ok(a)).unwrap(), Completion::Applied);
    }

    #[test]
    fn first_open_leaves_idle_with_empty_history() {
        let mut nav = Navigator::default();
        assert!(nav.is_idle());
        open(&mut nav, article(1));
        assert_eq!(nav.current(), Some(&article(1)));
        assert_eq!(nav.depth(), 0);
    }

    #[test]
    fn depth_after_n_opens_is_n_minus_one() {
        let mut nav = Navigator::default();
        for n in 1..=6 {
            open(&mut nav, article(n));
            assert_eq!(nav.depth(), n - 1);
        }
    }

    #[test]
    fn back_restores_previous_title_and_body_exactly() {
        let mut nav = Navigator::default();
        for n in 1..=3 {
            open(&mut nav, article(n));
        }
        assert_eq!(nav.back(), BackOutcome::Restored);
        assert_eq!(nav.current(), Some(&article(2)));
        assert_eq!(nav.back(), BackOutcome::Restored);
        assert_eq!(nav.current(), Some(&article(1)));
        assert_eq!(nav.depth(), 0);
    }

    #[test]
    fn back_on_empty_history_stays_by_default() {
        let mut nav = Navigator::default();
        assert_eq!(nav.back(), BackOutcome::Unchanged);
        assert!(nav.is_idle());

        open(&mut nav, article(1));
        assert_eq!(nav.back(), BackOutcome::Unchanged);
        assert_eq!(nav.current().map(|a| a.title.as_str()), Some("Title 1"));
    }

    #[test]
    fn back_on_empty_history_clears_under_clear_policy() {
        let mut nav = Navigator::new(BackPolicy::Clear);
        open(&mut nav, article(1));
        open(&mut nav, article(2));
        assert_eq!(nav.back(), BackOutcome::Restored);
        assert_eq!(nav.back(), BackOutcome::Cleared);
        assert!(nav.is_idle());
        assert_eq!(nav.back(), BackOutcome::Unchanged);
    }

    #[test]
    fn failed_fetch_changes_nothing() {
        let mut nav = Navigator::default();
        open(&mut nav, article(1));
        open(&mut nav, article(2));
        let before = nav.state().clone();

        let token = nav.begin_open(PageRef::Id(9));
        let err = nav
            .complete_open(
                token,
                Err(NavError::UnexpectedShape("missing parse".into())),
            )
            .unwrap_err();
        assert!(matches!(err, NavError::UnexpectedShape(_)));
        assert_eq!(nav.state(), &before);
        assert!(!nav.is_latest(token));
    }

    #[test]
    fn latest_request_wins_regardless_of_arrival_order() {
        let mut nav = Navigator::default();
        let slow = nav.begin_open(PageRef::Id(1));
        let fast = nav.begin_open(PageRef::Id(2));

        assert_eq!(nav.complete_open(fast, Ok(article(2))).unwrap(), Completion::Applied);
        assert_eq!(nav.complete_open(slow, Ok(article(1))).unwrap(), Completion::Stale);
        assert_eq!(nav.current(), Some(&article(2)));
        assert_eq!(nav.depth(), 0);
    }

    #[test]
    fn stale_failure_is_ignored() {
        let mut nav = Navigator::default();
        let old = nav.begin_open(PageRef::Id(1));
        let new = nav.begin_open(PageRef::Id(2));
        let outcome = nav.complete_open(old, Err(NavError::InvalidInput("boom".into())));
        assert_eq!(outcome.unwrap(), Completion::Stale);
        assert!(nav.is_latest(new));
    }

    #[test]
    fn back_invalidates_in_flight_fetch() {
        let mut nav = Navigator::default();
        open(&mut nav, article(1));
        open(&mut nav, article(2));
        let token = nav.begin_open(PageRef::Id(3));
        assert_eq!(nav.back(), BackOutcome::Restored);
        assert_eq!(nav.complete_open(token, Ok(article(3))).unwrap(), Completion::Stale);
        assert_eq!(nav.current(), Some(&article(1)));
    }

    #[test]
    fn back_with_nothing_to_return_to_keeps_in_flight_fetch() {
        let mut nav = Navigator::default();
        open(&mut nav, article(1));
        let token = nav.begin_open(PageRef::Id(2));
        assert_eq!(nav.back(), BackOutcome::Unchanged);
        assert!(nav.is_latest(token));
        assert_eq!(nav.complete_open(token, Ok(article(2))).unwrap(), Completion::Applied);
        assert_eq!(nav.current(), Some(&article(2)));
        assert_eq!(nav.depth(), 1);
    }

    #[test]
    fn back_while_idle_keeps_in_flight_fetch() {
        let mut nav = Navigator::default();
        let token = nav.begin_open(PageRef::Id(1));
        assert_eq!(nav.back(), BackOutcome::Unchanged);
        assert_eq!(nav.complete_open(token, Ok(article(1))).unwrap(), Completion::Applied);
        assert_eq!(nav.current(), Some(&article(1)));
    }

    #[test]
    fn clearing_back_invalidates_in_flight_fetch() {
        let mut nav = Navigator::new(BackPolicy::Clear);
        open(&mut nav, article(1));
        let token = nav.begin_open(PageRef::Id(2));
        assert_eq!(nav.back(), BackOutcome::Cleared);
        assert_eq!(nav.complete_open(token, Ok(article(2))).unwrap(), Completion::Stale);
        assert!(nav.is_idle());
    }

    #[test]
    fn duplicate_completion_is_stale() {
        let mut nav = Navigator::default();
        let token = nav.begin_open(PageRef::Id(1));
        assert_eq!(nav.complete_open(token, Ok(article(1))).unwrap(), Completion::Applied);
        assert_eq!(nav.complete_open(token, Ok(article(1))).unwrap(), Completion::Stale);
        assert_eq!(nav.depth(), 0);
    }

    #[test]
    fn tokens_increase() {
        let mut nav = Navigator::default();
        let a = nav.begin_open(PageRef::Id(1));
        let b = nav.begin_open(PageRef::Id(2));
        assert!(b > a);
    }

    #[test]
    fn back_policy_parses() {
        assert_eq!("clear".parse::<BackPolicy>().unwrap(), BackPolicy::Clear);
        assert_eq!("No-Op".parse::<BackPolicy>().unwrap(), BackPolicy::Stay);
        assert!("sideways".parse::<BackPolicy>().is_err());
    }
}
