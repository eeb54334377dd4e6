//! # WikiNav Core
//!
//! Core logic for browsing Wikipedia inside the app:
//! - search state and the search backend client
//! - the article navigator with back history and latest-wins fetches
//! - pure rewriting of article HTML into an in-app navigable render tree
//! - the encyclopedia API client
//!
//! **No front-end concerns**: terminal drawing lives in `wikinav-cli`, the HTTP search backend in
//! `api-rest`. Nothing here reads environment variables; see [`config::CoreConfig`].

pub mod app;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod navigator;
pub mod render;
pub mod search;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use app::{App, ArticleView, LinkAction, PendingFetch, View};
pub use client::{build_client, EncyclopediaApi, HttpSearchBackend, SearchBackend, WikipediaApi};
pub use config::CoreConfig;
pub use error::{NavError, NavResult};
pub use navigator::{BackOutcome, BackPolicy, Completion, NavState, Navigator, RequestToken};
pub use render::{render_body, snippet_text, RenderNode, RenderOptions, RenderTree};
pub use search::{SearchState, SearchStatus};
pub use wikinav_types::{Article, NonEmptyText, PageRef, SearchResult, TextError};
