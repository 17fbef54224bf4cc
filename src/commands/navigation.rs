use anyhow::Result;

use crate::api::Node;
use crate::cache::CachedItem;
use crate::commands::command::{Command, SuggestContext, Suggestion, static_options};
use crate::commands::{expect_args, resolve};
use crate::navigation::Target;
use crate::state::AppContext;
use crate::ui::table::render_nodes;

pub(crate) const FOLDER_ALIASES: &[(&str, &str)] = &[
    (".", "current folder"),
    ("..", "parent folder"),
    ("--root--", "root folder"),
];

pub(crate) fn cache_items(nodes: &[Node]) -> Vec<CachedItem> {
    nodes
        .iter()
        .map(|node| {
            let label = if node.is_folder() {
                format!("{}/", node.title)
            } else {
                node.title.clone()
            };
            CachedItem::new(node.uuid.clone(), label)
        })
        .collect()
}

/// Fetches and prints the children of `uuid`, remembering them for completion.
pub fn list_folder(ctx: &AppContext, uuid: &str) -> Result<()> {
    let nodes = ctx.gateway.list_nodes(uuid)?;
    ctx.listings.insert(uuid, cache_items(&nodes));

    if nodes.is_empty() {
        println!("(empty folder)");
        return Ok(());
    }
    print!(
        "{}",
        render_nodes(&nodes, ctx.palette(), &ctx.config.display.date_format)
    );
    Ok(())
}

/// Folders from the last listing of the current folder, plus the aliases.
pub(crate) fn folder_suggestions(ctx: &SuggestContext<'_>, partial: &str) -> Vec<Suggestion> {
    let mut suggestions = static_options(FOLDER_ALIASES, partial);
    suggestions.extend(
        ctx.nodes(partial)
            .into_iter()
            .filter(|suggestion| suggestion.description.ends_with('/')),
    );
    suggestions
}

pub struct ListCommand;

impl Command for ListCommand {
    fn name(&self) -> &'static str {
        "ls"
    }

    fn description(&self) -> &'static str {
        "List the contents of a folder"
    }

    fn usage(&self) -> &'static str {
        "ls [folder]"
    }

    fn execute(&self, ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 0, Some(1))?;
        let target = match args.first() {
            Some(token) => resolve(ctx, token)?,
            None => ctx.navigation.current_uuid().to_string(),
        };
        list_folder(ctx, &target)
    }

    fn suggest(&self, ctx: &SuggestContext<'_>, args: &[&str]) -> Vec<Suggestion> {
        match args {
            [partial] => folder_suggestions(ctx, partial),
            _ => Vec::new(),
        }
    }
}

pub struct ChangeDirectoryCommand;

impl Command for ChangeDirectoryCommand {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn description(&self) -> &'static str {
        "Change the current folder"
    }

    fn usage(&self) -> &'static str {
        "cd [uuid | . | .. | --root--]"
    }

    fn execute(&self, ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 0, Some(1))?;
        let target = Target::parse(args.first().map(String::as_str));
        ctx.navigation
            .change_directory(ctx.gateway.as_ref(), target)?;

        let current = ctx.navigation.current_uuid().to_string();
        list_folder(ctx, &current)
    }

    fn suggest(&self, ctx: &SuggestContext<'_>, args: &[&str]) -> Vec<Suggestion> {
        match args {
            [partial] => folder_suggestions(ctx, partial),
            _ => Vec::new(),
        }
    }
}

pub struct PwdCommand;

impl Command for PwdCommand {
    fn name(&self) -> &'static str {
        "pwd"
    }

    fn description(&self) -> &'static str {
        "Show the current folder"
    }

    fn execute(&self, ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 0, Some(0))?;
        println!(
            "{} ({})",
            ctx.navigation.current_title(),
            ctx.navigation.current_uuid()
        );
        Ok(())
    }
}
