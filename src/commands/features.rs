use anyhow::Result;

use crate::api::{Feature, FeatureKind};
use crate::cache::CachedItem;
use crate::commands::command::{Command, SuggestContext, Suggestion, UsageError};
use crate::commands::{expect_args, resolve};
use crate::state::AppContext;
use crate::ui::spinner::with_spinner;
use crate::ui::table::render_features;

fn list_features(ctx: &AppContext, kind: FeatureKind) -> Result<()> {
    let features = ctx.gateway.list_features(kind)?;
    ctx.listings.insert(kind.cache_key(), cache_items(&features));

    if features.is_empty() {
        println!("No {} available.", kind.path());
        return Ok(());
    }
    print!("{}", render_features(&features, ctx.palette()));
    Ok(())
}

fn cache_items(features: &[Feature]) -> Vec<CachedItem> {
    features
        .iter()
        .map(|feature| CachedItem::new(feature.uuid.clone(), feature.title.clone()))
        .collect()
}

pub struct ListActionsCommand;

impl Command for ListActionsCommand {
    fn name(&self) -> &'static str {
        "actions"
    }

    fn description(&self) -> &'static str {
        "List the actions available on the server"
    }

    fn execute(&self, ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 0, Some(0))?;
        list_features(ctx, FeatureKind::Action)
    }
}

pub struct RunActionCommand;

impl Command for RunActionCommand {
    fn name(&self) -> &'static str {
        "run-action"
    }

    fn description(&self) -> &'static str {
        "Run an action on one or more nodes"
    }

    fn usage(&self) -> &'static str {
        "run-action <action> <uuid>..."
    }

    fn execute(&self, ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 2, None)?;
        let action = &args[0];
        let uuids = args[1..]
            .iter()
            .map(|token| resolve(ctx, token))
            .collect::<Result<Vec<_>>>()?;

        with_spinner(&format!("Running {action}..."), ctx.config.quiet, || {
            ctx.gateway.run_action(action, &uuids)
        })?;
        ctx.listings.invalidate(ctx.navigation.current_uuid());
        println!("✅ Action {action} ran on {} node(s)", uuids.len());
        Ok(())
    }

    fn suggest(&self, ctx: &SuggestContext<'_>, args: &[&str]) -> Vec<Suggestion> {
        match args {
            [partial] => ctx.cached(FeatureKind::Action.cache_key(), partial),
            [_, .., partial] => ctx.nodes(partial),
            _ => Vec::new(),
        }
    }
}

pub struct ListExtensionsCommand;

impl Command for ListExtensionsCommand {
    fn name(&self) -> &'static str {
        "extensions"
    }

    fn description(&self) -> &'static str {
        "List the extensions available on the server"
    }

    fn execute(&self, ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 0, Some(0))?;
        list_features(ctx, FeatureKind::Extension)
    }
}

pub struct RunExtensionCommand;

impl RunExtensionCommand {
    fn parse_params(&self, args: &[String]) -> Result<Vec<(String, String)>, UsageError> {
        args.iter()
            .map(|arg| match arg.split_once('=') {
                Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
                _ => Err(self.usage_error()),
            })
            .collect()
    }
}

impl Command for RunExtensionCommand {
    fn name(&self) -> &'static str {
        "run-ext"
    }

    fn description(&self) -> &'static str {
        "Run an extension with key=value parameters"
    }

    fn usage(&self) -> &'static str {
        "run-ext <extension> [key=value]..."
    }

    fn execute(&self, ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 1, None)?;
        let extension = &args[0];
        let params = self.parse_params(&args[1..])?;

        let output = with_spinner(&format!("Running {extension}..."), ctx.config.quiet, || {
            ctx.gateway.run_extension(extension, &params)
        })?;
        if output.trim().is_empty() {
            println!("✅ Extension {extension} finished");
        } else {
            println!("{}", output.trim_end());
        }
        Ok(())
    }

    fn suggest(&self, ctx: &SuggestContext<'_>, args: &[&str]) -> Vec<Suggestion> {
        match args {
            [partial] => ctx.cached(FeatureKind::Extension.cache_key(), partial),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeGateway;
    use crate::state::testing::context;
    use std::sync::Arc;

    fn gateway() -> Arc<FakeGateway> {
        let gateway = Arc::new(FakeGateway::new());
        gateway.add_folder("docs", "Documents", crate::constants::ROOT_NODE_UUID);
        gateway.add_feature(FeatureKind::Action, "ocr", "OCR");
        gateway.add_feature(FeatureKind::Action, "move_up", "Move up");
        gateway.add_feature(FeatureKind::Extension, "report", "Report");
        gateway
    }

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn listing_actions_feeds_completion() {
        let mut ctx = context(gateway(), &[]);
        ListActionsCommand.execute(&mut ctx, &[]).unwrap();

        let texts: Vec<String> = RunActionCommand
            .suggest(&ctx.suggest_context(), &["o"])
            .into_iter()
            .map(|s| s.text)
            .collect();
        assert_eq!(texts, vec!["ocr"]);
    }

    #[test]
    fn run_action_resolves_every_node() {
        let gateway = gateway();
        let mut ctx = context(Arc::clone(&gateway), &[]);
        RunActionCommand
            .execute(&mut ctx, &args(&["ocr", "docs", "."]))
            .unwrap();

        assert_eq!(
            gateway.action_runs(),
            vec![(
                "ocr".to_string(),
                vec!["docs".to_string(), "--root--".to_string()]
            )]
        );
        assert!(RunActionCommand.execute(&mut ctx, &args(&["ocr"])).is_err());
    }

    #[test]
    fn run_ext_requires_key_value_pairs() {
        let mut ctx = context(gateway(), &[]);
        RunExtensionCommand
            .execute(&mut ctx, &args(&["report", "year=2024", "q=a=b"]))
            .unwrap();

        let err = RunExtensionCommand
            .execute(&mut ctx, &args(&["report", "year"]))
            .unwrap_err();
        assert!(err.downcast_ref::<UsageError>().is_some());
    }

    #[test]
    fn params_keep_everything_after_the_first_equals() {
        let params = RunExtensionCommand
            .parse_params(&args(&["q=a=b", "empty="]))
            .unwrap();
        assert_eq!(
            params,
            vec![
                ("q".to_string(), "a=b".to_string()),
                ("empty".to_string(), String::new()),
            ]
        );
        assert!(RunExtensionCommand.parse_params(&args(&["=x"])).is_err());
    }
}
