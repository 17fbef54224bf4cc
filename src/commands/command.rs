use anyhow::Result;
use thiserror::Error;

use crate::cache::{CachedItem, ListingCache};
use crate::commands::registry::Registry;
use crate::session::SessionManager;
use crate::state::AppContext;

/// A completion candidate: the text to insert and what it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub text: String,
    pub description: String,
}

impl Suggestion {
    pub fn new(text: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            description: description.into(),
        }
    }
}

impl From<CachedItem> for Suggestion {
    fn from(item: CachedItem) -> Self {
        Self::new(item.id, item.label)
    }
}

/// What completion may look at. Deliberately read-only and free of the
/// gateway: completing never talks to the server.
pub struct SuggestContext<'a> {
    pub registry: &'a Registry,
    pub current_folder: &'a str,
    pub listings: &'a ListingCache,
    pub sessions: &'a SessionManager,
}

impl SuggestContext<'_> {
    /// Children of the current folder seen by the last listing.
    pub fn nodes(&self, partial: &str) -> Vec<Suggestion> {
        self.cached(self.current_folder, partial)
    }

    pub fn cached(&self, key: &str, partial: &str) -> Vec<Suggestion> {
        self.listings
            .matching(key, partial)
            .into_iter()
            .map(Suggestion::from)
            .collect()
    }
}

pub fn static_options(options: &[(&str, &str)], partial: &str) -> Vec<Suggestion> {
    options
        .iter()
        .filter(|(text, _)| text.starts_with(partial))
        .map(|(text, description)| Suggestion::new(*text, *description))
        .collect()
}

#[derive(Debug, Error)]
#[error("usage: {usage}")]
pub struct UsageError {
    pub usage: String,
}

impl UsageError {
    pub fn new(usage: impl Into<String>) -> Self {
        Self {
            usage: usage.into(),
        }
    }
}

pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn usage(&self) -> &'static str {
        self.name()
    }

    fn execute(&self, ctx: &mut AppContext, args: &[String]) -> Result<()>;

    /// `args` are the tokens after the command name; the last one is the word
    /// being completed (empty right after a space).
    fn suggest(&self, _ctx: &SuggestContext<'_>, _args: &[&str]) -> Vec<Suggestion> {
        Vec::new()
    }

    fn usage_error(&self) -> UsageError {
        UsageError::new(self.usage())
    }
}
