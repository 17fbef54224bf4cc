use std::sync::Arc;

use tracing::debug;

use crate::api::ApiError;
use crate::commands::command::{SuggestContext, Suggestion, UsageError};
use crate::commands::registry::Registry;
use crate::parser::{split_command, split_partial};
use crate::state::AppContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Empty,
    Executed,
    Unknown(String),
    Malformed(String),
    Exit,
}

pub fn unknown_command_message(name: &str) -> String {
    format!("Unknown command: {name}")
}

/// Runs one input line. Whatever the command does, errors stop here.
pub fn dispatch(ctx: &mut AppContext, line: &str) -> Outcome {
    let line = line.trim();
    if line.is_empty() {
        return Outcome::Empty;
    }

    let tokens = match split_command(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            println!("❌ Could not parse input: {err}");
            return Outcome::Malformed(err.to_string());
        }
    };
    let Some((name, args)) = tokens.split_first() else {
        return Outcome::Empty;
    };

    let registry = Arc::clone(&ctx.registry);
    let Some(command) = registry.lookup(name) else {
        println!("{}", unknown_command_message(name));
        return Outcome::Unknown(name.clone());
    };

    debug!(command = %name, args = args.len(), "dispatching");
    if let Err(err) = command.execute(ctx, args) {
        report_error(&err);
    }
    ctx.record(line);

    if ctx.exit_requested() {
        Outcome::Exit
    } else {
        Outcome::Executed
    }
}

pub fn report_error(err: &anyhow::Error) {
    println!("{}", error_message(err));
}

pub fn error_message(err: &anyhow::Error) -> String {
    if let Some(usage) = err.downcast_ref::<UsageError>() {
        return format!("Usage: {}", usage.usage);
    }
    match err.downcast_ref::<ApiError>() {
        Some(api) if api.is_not_found() => format!("❌ Not found ({api})"),
        Some(api @ ApiError::Status { status, body }) if api.is_unauthorized() => format!(
            "❌ Error ({status}): {body}\n   Check the --api-key, --jwt or --root-passwd given at startup."
        ),
        Some(ApiError::Status { status, body }) => format!("❌ Error ({status}): {body}"),
        _ => format!("❌ Error: {err:#}"),
    }
}

/// Completion candidates for the text left of the cursor.
pub fn suggest(registry: &Registry, text: &str, ctx: &SuggestContext<'_>) -> Vec<Suggestion> {
    let text = text.trim_start();
    if text.is_empty() {
        return Vec::new();
    }

    let words = split_partial(text);
    let tokens: Vec<&str> = words.iter().map(String::as_str).collect();
    if tokens.is_empty() {
        return Vec::new();
    }

    if let [partial] = tokens.as_slice() {
        return registry
            .list()
            .filter(|command| command.name().starts_with(partial))
            .map(|command| Suggestion::new(command.name(), command.description()))
            .collect();
    }

    match registry.lookup(tokens[0]) {
        Some(command) => command.suggest(ctx, &tokens[1..]),
        None => Vec::new(),
    }
}
