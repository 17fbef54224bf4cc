use anyhow::{Result, bail};

use crate::commands::command::{Command, SuggestContext, Suggestion, static_options};
use crate::commands::expect_args;
use crate::state::AppContext;

const SUBCOMMANDS: &[(&str, &str)] = &[
    ("clear", "forget the messages of a session"),
    ("rm", "remove a session"),
];

pub struct SessionsCommand;

impl SessionsCommand {
    fn list(&self, ctx: &AppContext) {
        let ids = ctx.sessions.list_ids();
        if ids.is_empty() {
            println!("No chat sessions.");
            return;
        }
        for id in ids {
            let session = ctx.sessions.get_or_create(&id);
            println!("{:<40} {} message(s)", session.id(), session.len());
        }
    }
}

impl Command for SessionsCommand {
    fn name(&self) -> &'static str {
        "sessions"
    }

    fn description(&self) -> &'static str {
        "List, clear or remove chat sessions"
    }

    fn usage(&self) -> &'static str {
        "sessions [clear <id> | rm <id>]"
    }

    fn execute(&self, ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 0, Some(2))?;
        match args {
            [] => self.list(ctx),
            [action, id] if action == "clear" => {
                if !ctx.sessions.contains(id) {
                    bail!("no session named '{id}'");
                }
                ctx.sessions.clear(id);
                println!("✅ Cleared {id}");
            }
            [action, id] if action == "rm" => {
                if !ctx.sessions.remove(id) {
                    bail!("no session named '{id}'");
                }
                println!("✅ Removed {id}");
            }
            _ => return Err(self.usage_error().into()),
        }
        Ok(())
    }

    fn suggest(&self, ctx: &SuggestContext<'_>, args: &[&str]) -> Vec<Suggestion> {
        match args {
            [partial] => static_options(SUBCOMMANDS, partial),
            [_, partial] => ctx
                .sessions
                .list_ids()
                .into_iter()
                .filter(|id| id.starts_with(*partial))
                .map(|id| Suggestion::new(id, "session"))
                .collect(),
            _ => Vec::new(),
        }
    }
}
