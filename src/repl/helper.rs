use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::cache::ListingCache;
use crate::commands::command::{SuggestContext, Suggestion};
use crate::commands::registry::Registry;
use crate::constants::{DIM, RESET};
use crate::parser::last_word_start;
use crate::repl::dispatcher;
use crate::session::SessionManager;
use crate::state::AppContext;

/// Completion and hints for the main prompt.
///
/// Holds shared handles rather than the context itself; the current folder
/// is copied in before every prompt with [`ShellHelper::sync`].
pub struct ShellHelper {
    registry: Arc<Registry>,
    listings: Arc<ListingCache>,
    sessions: Arc<SessionManager>,
    current_folder: String,
    color: bool,
}

impl ShellHelper {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            registry: Arc::clone(&ctx.registry),
            listings: Arc::clone(&ctx.listings),
            sessions: Arc::clone(&ctx.sessions),
            current_folder: ctx.navigation.current_uuid().to_string(),
            color: ctx.config.display.color,
        }
    }

    pub fn sync(&mut self, ctx: &AppContext) {
        if self.current_folder != ctx.navigation.current_uuid() {
            self.current_folder = ctx.navigation.current_uuid().to_string();
        }
    }

    fn suggestions(&self, text: &str) -> Vec<Suggestion> {
        let ctx = SuggestContext {
            registry: &self.registry,
            current_folder: &self.current_folder,
            listings: &self.listings,
            sessions: &self.sessions,
        };
        dispatcher::suggest(&self.registry, text, &ctx)
    }
}

/// Byte length of the word under the cursor, opening quote included.
fn partial_len(text: &str) -> usize {
    text.len() - last_word_start(text)
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let text = &line[..pos];
        let start = pos - partial_len(text);
        let candidates = self
            .suggestions(text)
            .into_iter()
            .map(|suggestion| Pair {
                display: format!("{:<24} {}", suggestion.text, suggestion.description),
                replacement: suggestion.text,
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        let text = &line[..pos];
        if text.trim().is_empty() || text.contains(char::is_whitespace) {
            return None;
        }
        self.registry
            .list()
            .map(|command| command.name())
            .find(|name| name.starts_with(text) && name.len() > text.len())
            .map(|name| name[text.len()..].to_string())
    }
}

impl Highlighter for ShellHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        if self.color {
            Owned(format!("{DIM}{hint}{RESET}"))
        } else {
            Borrowed(hint)
        }
    }
}

impl Validator for ShellHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_word_is_the_last_token() {
        assert_eq!(partial_len("cd do"), 2);
        assert_eq!(partial_len("cd "), 0);
        assert_eq!(partial_len("ls"), 2);
        assert_eq!(partial_len(""), 0);
        assert_eq!(partial_len(r#"mv "Tax Re"#), 7);
    }
}
