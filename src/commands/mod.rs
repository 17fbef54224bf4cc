pub mod agents;
pub mod command;
pub mod features;
pub mod navigation;
pub mod nodes;
pub mod registry;
pub mod sessions;
pub mod shell;

use anyhow::Result;

use crate::commands::command::{Command, UsageError};
use crate::commands::registry::Registry;
use crate::state::AppContext;

pub fn builtin_registry() -> Registry {
    let mut registry = Registry::new();

    registry.register(Box::new(navigation::ListCommand));
    registry.register(Box::new(navigation::ChangeDirectoryCommand));
    registry.register(Box::new(navigation::PwdCommand));

    registry.register(Box::new(nodes::StatCommand));
    registry.register(Box::new(nodes::MkdirCommand));
    registry.register(Box::new(nodes::CopyCommand));
    registry.register(Box::new(nodes::MoveCommand));
    registry.register(Box::new(nodes::RenameCommand));
    registry.register(Box::new(nodes::RemoveCommand));
    registry.register(Box::new(nodes::FindCommand));
    registry.register(Box::new(nodes::DownloadCommand));

    registry.register(Box::new(features::ListActionsCommand));
    registry.register(Box::new(features::RunActionCommand));
    registry.register(Box::new(features::ListExtensionsCommand));
    registry.register(Box::new(features::RunExtensionCommand));

    registry.register(Box::new(agents::ListAgentsCommand));
    registry.register(Box::new(agents::AskCommand));
    registry.register(Box::new(agents::ChatCommand));
    registry.register(Box::new(agents::RagCommand));
    registry.register(Box::new(sessions::SessionsCommand));

    registry.register(Box::new(shell::HelpCommand));
    registry.register(Box::new(shell::StatusCommand));
    registry.register(Box::new(shell::AliasesCommand));
    registry.register(Box::new(shell::HistoryCommand));
    registry.register(Box::new(shell::SettingsCommand));
    registry.register(Box::new(shell::ClearCommand));
    registry.register(Box::new(shell::VersionCommand));
    registry.register(Box::new(shell::ExitCommand::new("exit")));
    registry.register(Box::new(shell::ExitCommand::new("quit")));

    registry
}

/// Fails with the command's usage unless `min..=max` arguments were given.
pub(crate) fn expect_args(
    command: &dyn Command,
    args: &[String],
    min: usize,
    max: Option<usize>,
) -> Result<(), UsageError> {
    let too_many = max.is_some_and(|max| args.len() > max);
    if args.len() < min || too_many {
        return Err(command.usage_error());
    }
    Ok(())
}

/// Resolves `.`, `..` and the root marker to a uuid.
pub(crate) fn resolve(ctx: &AppContext, token: &str) -> Result<String> {
    let uuid = ctx
        .navigation
        .resolve_alias(ctx.gateway.as_ref(), token)?;
    Ok(uuid)
}
