use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Value, json};

use crate::api::{Node, NodeFilter, NodePatch};
use crate::commands::command::{Command, SuggestContext, Suggestion};
use crate::commands::navigation::folder_suggestions;
use crate::commands::{expect_args, resolve};
use crate::constants::GREEN;
use crate::state::AppContext;
use crate::ui::table::{format_modified, human_size, render_nodes};

static FILTER_EXPR: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"^(?P<field>[A-Za-z][\w.]*)(?:\s*(?P<sym>==|!=|<=|>=|~=|<|>)\s*|\s+(?P<word>in|not-in|match|contains)\s+)(?P<value>.+)$",
    )
    .ok()
});

fn node_suggestions(ctx: &SuggestContext<'_>, partial: &str) -> Vec<Suggestion> {
    ctx.nodes(partial)
}

pub struct StatCommand;

impl Command for StatCommand {
    fn name(&self) -> &'static str {
        "stat"
    }

    fn description(&self) -> &'static str {
        "Show the metadata of a node"
    }

    fn usage(&self) -> &'static str {
        "stat <uuid>"
    }

    fn execute(&self, ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 1, Some(1))?;
        let uuid = resolve(ctx, &args[0])?;
        let node = ctx.gateway.get_node(&uuid)?;
        print_node(ctx, &node);
        Ok(())
    }

    fn suggest(&self, ctx: &SuggestContext<'_>, args: &[&str]) -> Vec<Suggestion> {
        match args {
            [partial] => node_suggestions(ctx, partial),
            _ => Vec::new(),
        }
    }
}

fn print_node(ctx: &AppContext, node: &Node) {
    let palette = ctx.palette();
    let date_format = &ctx.config.display.date_format;
    let row = |key: &str, value: &str| {
        println!("{:<12} {}", palette.paint(key, GREEN), value);
    };

    row("uuid", &node.uuid);
    if !node.fid.is_empty() {
        row("fid", &node.fid);
    }
    row("title", &node.title);
    row("mimetype", &node.mimetype);
    row("parent", &node.parent);
    if let Some(size) = node.size {
        row("size", &human_size(size));
    }
    if let Some(owner) = &node.owner {
        row("owner", owner);
    }
    if let Some(created) = node.created() {
        row(
            "created",
            &created
                .with_timezone(&chrono::Local)
                .format(date_format)
                .to_string(),
        );
    }
    row("modified", &format_modified(node, date_format));
    if !node.tags.is_empty() {
        row("tags", &node.tags.join(", "));
    }
    if let Some(description) = node.description.as_deref().filter(|d| !d.is_empty()) {
        row("description", description);
    }
}

pub struct MkdirCommand;

impl Command for MkdirCommand {
    fn name(&self) -> &'static str {
        "mkdir"
    }

    fn description(&self) -> &'static str {
        "Create a folder in the current folder"
    }

    fn usage(&self) -> &'static str {
        "mkdir <title>"
    }

    fn execute(&self, ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 1, None)?;
        let title = args.join(" ");
        let parent = ctx.navigation.current_uuid().to_string();
        let folder = ctx.gateway.create_folder(&parent, &title)?;
        ctx.listings.invalidate(&parent);
        println!("✅ Created folder {} ({})", folder.title, folder.uuid);
        Ok(())
    }
}

pub struct CopyCommand;

impl Command for CopyCommand {
    fn name(&self) -> &'static str {
        "cp"
    }

    fn description(&self) -> &'static str {
        "Copy a node into a folder"
    }

    fn usage(&self) -> &'static str {
        "cp <uuid> [folder] [title]"
    }

    fn execute(&self, ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 1, Some(3))?;
        let uuid = resolve(ctx, &args[0])?;
        let destination = resolve(ctx, args.get(1).map(String::as_str).unwrap_or("."))?;
        let title = args.get(2).map(String::as_str);

        let copy = ctx.gateway.copy_node(&uuid, &destination, title)?;
        ctx.listings.invalidate(&destination);
        println!("✅ Copied to {} ({})", copy.title, copy.uuid);
        Ok(())
    }

    fn suggest(&self, ctx: &SuggestContext<'_>, args: &[&str]) -> Vec<Suggestion> {
        match args {
            [partial] => node_suggestions(ctx, partial),
            [_, partial] => folder_suggestions(ctx, partial),
            _ => Vec::new(),
        }
    }
}

pub struct MoveCommand;

impl Command for MoveCommand {
    fn name(&self) -> &'static str {
        "mv"
    }

    fn description(&self) -> &'static str {
        "Move a node to another folder"
    }

    fn usage(&self) -> &'static str {
        "mv <uuid> <folder>"
    }

    fn execute(&self, ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 2, Some(2))?;
        let uuid = resolve(ctx, &args[0])?;
        let destination = resolve(ctx, &args[1])?;

        let patch = NodePatch {
            parent: Some(destination.clone()),
            ..NodePatch::default()
        };
        ctx.gateway.update_node(&uuid, &patch)?;
        ctx.listings.invalidate(ctx.navigation.current_uuid());
        ctx.listings.invalidate(&destination);
        println!("✅ Moved {uuid} to {destination}");
        Ok(())
    }

    fn suggest(&self, ctx: &SuggestContext<'_>, args: &[&str]) -> Vec<Suggestion> {
        match args {
            [partial] => node_suggestions(ctx, partial),
            [_, partial] => folder_suggestions(ctx, partial),
            _ => Vec::new(),
        }
    }
}

pub struct RenameCommand;

impl Command for RenameCommand {
    fn name(&self) -> &'static str {
        "rename"
    }

    fn description(&self) -> &'static str {
        "Change the title of a node"
    }

    fn usage(&self) -> &'static str {
        "rename <uuid> <title>"
    }

    fn execute(&self, ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 2, None)?;
        let uuid = resolve(ctx, &args[0])?;
        let title = args[1..].join(" ");

        let patch = NodePatch {
            title: Some(title.clone()),
            ..NodePatch::default()
        };
        ctx.gateway.update_node(&uuid, &patch)?;
        ctx.listings.invalidate(ctx.navigation.current_uuid());
        println!("✅ Renamed {uuid} to {title}");
        Ok(())
    }

    fn suggest(&self, ctx: &SuggestContext<'_>, args: &[&str]) -> Vec<Suggestion> {
        match args {
            [partial] => node_suggestions(ctx, partial),
            _ => Vec::new(),
        }
    }
}

pub struct RemoveCommand;

impl Command for RemoveCommand {
    fn name(&self) -> &'static str {
        "rm"
    }

    fn description(&self) -> &'static str {
        "Delete a node"
    }

    fn usage(&self) -> &'static str {
        "rm <uuid>"
    }

    fn execute(&self, ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 1, Some(1))?;
        let uuid = resolve(ctx, &args[0])?;
        ctx.gateway.delete_node(&uuid)?;
        ctx.listings.invalidate(ctx.navigation.current_uuid());
        println!("✅ Deleted {uuid}");
        Ok(())
    }

    fn suggest(&self, ctx: &SuggestContext<'_>, args: &[&str]) -> Vec<Suggestion> {
        match args {
            [partial] => node_suggestions(ctx, partial),
            _ => Vec::new(),
        }
    }
}

pub struct FindCommand;

/// Reads `field op value` expressions; anything else is a title search.
fn parse_filters(args: &[String]) -> Vec<NodeFilter> {
    let parsed: Option<Vec<NodeFilter>> = args.iter().map(|arg| parse_expression(arg)).collect();
    match parsed {
        Some(filters) if !filters.is_empty() => filters,
        _ => vec![NodeFilter::new("title", "match", json!(args.join(" ")))],
    }
}

fn parse_expression(expr: &str) -> Option<NodeFilter> {
    let caps = FILTER_EXPR.as_ref()?.captures(expr.trim())?;
    let field = caps.name("field")?.as_str();
    let operator = match caps.name("sym").or_else(|| caps.name("word"))?.as_str() {
        "~=" => "match",
        other => other,
    };
    let raw = caps.name("value")?.as_str().trim();

    let value = match operator {
        "in" | "not-in" => Value::Array(
            raw.split(',')
                .map(|item| json!(item.trim()))
                .collect(),
        ),
        "<" | "<=" | ">" | ">=" => raw
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| json!(raw)),
        _ => json!(raw),
    };
    Some(NodeFilter::new(field, operator, value))
}

impl Command for FindCommand {
    fn name(&self) -> &'static str {
        "find"
    }

    fn description(&self) -> &'static str {
        "Search nodes by title or by field filters"
    }

    fn usage(&self) -> &'static str {
        "find <text> | find \"<field> <op> <value>\"..."
    }

    fn execute(&self, ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 1, None)?;
        let filters = parse_filters(args);
        let nodes = ctx
            .gateway
            .find_nodes(&filters, ctx.config.search.page_size)?;

        if nodes.is_empty() {
            println!("No matching nodes found.");
            return Ok(());
        }
        print!(
            "{}",
            render_nodes(&nodes, ctx.palette(), &ctx.config.display.date_format)
        );
        println!("{} node(s)", nodes.len());
        Ok(())
    }
}

pub struct DownloadCommand;

impl Command for DownloadCommand {
    fn name(&self) -> &'static str {
        "download"
    }

    fn description(&self) -> &'static str {
        "Save a node's content to a local file"
    }

    fn usage(&self) -> &'static str {
        "download <uuid> [path]"
    }

    fn execute(&self, ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 1, Some(2))?;
        let uuid = resolve(ctx, &args[0])?;
        let path = match args.get(1) {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(ctx.gateway.get_node(&uuid)?.title),
        };

        let bytes = ctx.gateway.export_node(&uuid)?;
        fs::write(&path, &bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("✅ Saved {} to {}", human_size(bytes.len() as u64), path.display());
        Ok(())
    }

    fn suggest(&self, ctx: &SuggestContext<'_>, args: &[&str]) -> Vec<Suggestion> {
        match args {
            [partial] => node_suggestions(ctx, partial),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Gateway;
    use crate::api::fake::FakeGateway;
    use crate::cache::CachedItem;
    use crate::commands::navigation::ChangeDirectoryCommand;
    use crate::constants::ROOT_NODE_UUID;
    use crate::state::testing::context;
    use std::sync::Arc;

    fn gateway() -> Arc<FakeGateway> {
        let gateway = Arc::new(FakeGateway::new());
        gateway.add_folder("docs", "Documents", ROOT_NODE_UUID);
        gateway.add_folder("archive", "Archive", ROOT_NODE_UUID);
        gateway.add_file("memo", "memo.txt", "docs");
        gateway
    }

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn titles_under(gateway: &FakeGateway, parent: &str) -> Vec<String> {
        gateway
            .list_nodes(parent)
            .unwrap()
            .into_iter()
            .map(|node| node.title)
            .collect()
    }

    #[test]
    fn mkdir_creates_in_the_current_folder_and_drops_the_cached_listing() {
        let gateway = gateway();
        let mut ctx = context(Arc::clone(&gateway), &[]);
        ChangeDirectoryCommand.execute(&mut ctx, &args(&["docs"])).unwrap();
        assert!(ctx.listings.get("docs").is_some());

        MkdirCommand.execute(&mut ctx, &args(&["Q1", "Reports"])).unwrap();
        assert!(ctx.listings.get("docs").is_none());
        assert!(titles_under(&gateway, "docs").contains(&"Q1 Reports".to_string()));
    }

    #[test]
    fn cp_defaults_to_the_current_folder() {
        let gateway = gateway();
        let mut ctx = context(Arc::clone(&gateway), &[]);
        ChangeDirectoryCommand.execute(&mut ctx, &args(&["archive"])).unwrap();

        CopyCommand.execute(&mut ctx, &args(&["memo"])).unwrap();
        assert!(titles_under(&gateway, "archive").contains(&"memo.txt 2".to_string()));

        CopyCommand
            .execute(&mut ctx, &args(&["memo", "..", "top.txt"]))
            .unwrap();
        assert!(titles_under(&gateway, ROOT_NODE_UUID).contains(&"top.txt".to_string()));
    }

    #[test]
    fn mv_and_rename_patch_the_node() {
        let gateway = gateway();
        let mut ctx = context(Arc::clone(&gateway), &[]);

        MoveCommand.execute(&mut ctx, &args(&["memo", "archive"])).unwrap();
        assert_eq!(gateway.node("memo").unwrap().parent, "archive");

        RenameCommand
            .execute(&mut ctx, &args(&["memo", "final", "memo.txt"]))
            .unwrap();
        assert_eq!(gateway.node("memo").unwrap().title, "final memo.txt");

        assert!(MoveCommand.execute(&mut ctx, &args(&["memo"])).is_err());
    }

    #[test]
    fn rm_deletes_and_reports_missing_nodes() {
        let gateway = gateway();
        let mut ctx = context(Arc::clone(&gateway), &[]);
        ctx.listings
            .insert(ROOT_NODE_UUID, vec![CachedItem::new("memo", "memo.txt")]);

        RemoveCommand.execute(&mut ctx, &args(&["memo"])).unwrap();
        assert!(gateway.node("memo").is_none());
        assert!(ctx.listings.get(ROOT_NODE_UUID).is_none());

        let err = RemoveCommand.execute(&mut ctx, &args(&["memo"])).unwrap_err();
        assert_eq!(err.downcast_ref::<crate::api::ApiError>().and_then(|e| e.status()), Some(404));
    }

    #[test]
    fn plain_words_become_a_title_search() {
        assert_eq!(
            parse_filters(&args(&["annual", "report"])),
            vec![NodeFilter::new("title", "match", json!("annual report"))]
        );
    }

    #[test]
    fn expressions_become_field_filters() {
        assert_eq!(
            parse_filters(&args(&["mimetype == application/pdf", "size>1024"])),
            vec![
                NodeFilter::new("mimetype", "==", json!("application/pdf")),
                NodeFilter::new("size", ">", json!(1024)),
            ]
        );
        assert_eq!(
            parse_expression("title ~= budget"),
            Some(NodeFilter::new("title", "match", json!("budget")))
        );
        assert_eq!(
            parse_expression("tags in a, b"),
            Some(NodeFilter::new("tags", "in", json!(["a", "b"])))
        );
        assert_eq!(parse_expression("just words"), None);
    }

    #[test]
    fn mixed_arguments_fall_back_to_title_search() {
        let filters = parse_filters(&args(&["size>10", "budget"]));
        assert_eq!(
            filters,
            vec![NodeFilter::new("title", "match", json!("size>10 budget"))]
        );
    }

    #[test]
    fn find_runs_against_the_gateway() {
        let gateway = gateway();
        let mut ctx = context(Arc::clone(&gateway), &[]);
        let before = gateway.calls();
        FindCommand.execute(&mut ctx, &args(&["memo"])).unwrap();
        assert_eq!(gateway.calls(), before + 1);
        assert!(FindCommand.execute(&mut ctx, &[]).is_err());
    }

    #[test]
    fn download_writes_the_exported_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");
        let mut ctx = context(gateway(), &[]);

        DownloadCommand
            .execute(&mut ctx, &args(&["memo", target.to_str().unwrap()]))
            .unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "content of memo.txt");
    }
}
