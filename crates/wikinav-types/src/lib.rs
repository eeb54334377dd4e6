//! Shared domain types for WikiNav.
//!
//! These types cross crate boundaries: the core library, the search backend and the terminal
//! client all speak in terms of [`SearchResult`], [`Article`] and [`PageRef`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors that can occur when creating validated text types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction. Search queries
/// and page titles are carried as `NonEmptyText` so an empty query can never reach the network.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// Returns `Err(TextError::Empty)` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for NonEmptyText {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// One hit from the search backend.
///
/// Field names on the wire follow the backend contract: `pageid`, `title`, `snippet`.
/// The snippet is an HTML fragment (search matches are wrapped in `<span>` elements).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "pageid")]
    pub page_id: u64,
    pub title: String,
    #[serde(default)]
    pub snippet: String,
}

/// A fetched encyclopedia page: its display title and raw rendered HTML body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub body_html: String,
}

impl Article {
    pub fn new(title: impl Into<String>, body_html: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body_html: body_html.into(),
        }
    }
}

/// A reference to an encyclopedia page, either by numeric page id or by title.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PageRef {
    Id(u64),
    Title(NonEmptyText),
}

impl PageRef {
    /// Builds a title reference, rejecting blank titles.
    pub fn title(title: impl AsRef<str>) -> Result<Self, TextError> {
        NonEmptyText::new(title).map(PageRef::Title)
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageRef::Id(id) => write!(f, "pageid {}", id),
            PageRef::Title(title) => write!(f, "\"{}\"", title),
        }
    }
}

impl FromStr for PageRef {
    type Err = TextError;

    /// All-digit input is a page id; anything else is a title.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = NonEmptyText::new(s)?;
        match text.as_str().parse::<u64>() {
            Ok(id) => Ok(PageRef::Id(id)),
            Err(_) => Ok(PageRef::Title(text)),
        }
    }
}
