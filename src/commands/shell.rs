use std::io::stdout;

use anyhow::{Result, bail};
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};

use crate::commands::command::{Command, SuggestContext, Suggestion};
use crate::commands::expect_args;
use crate::commands::navigation::FOLDER_ALIASES;
use crate::config;
use crate::constants::{BOLD, GREEN};
use crate::help::{usage_text, version_line};
use crate::repl::dispatcher::unknown_command_message;
use crate::state::AppContext;

pub struct HelpCommand;

impl Command for HelpCommand {
    fn name(&self) -> &'static str {
        "help"
    }

    fn description(&self) -> &'static str {
        "Show the available commands, or details about one"
    }

    fn usage(&self) -> &'static str {
        "help [command]"
    }

    fn execute(&self, ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 0, Some(1))?;
        let palette = ctx.palette();

        if let Some(name) = args.first() {
            let Some(command) = ctx.registry.lookup(name) else {
                bail!("{}", unknown_command_message(name));
            };
            println!("{}", palette.paint(command.usage(), BOLD));
            println!("  {}", command.description());
            return Ok(());
        }

        println!("{}", usage_text());
        println!("# Commands");
        for command in ctx.registry.list() {
            println!(
                "  {} {}",
                palette.paint(&format!("{:<12}", command.name()), GREEN),
                command.description()
            );
        }
        Ok(())
    }

    fn suggest(&self, ctx: &SuggestContext<'_>, args: &[&str]) -> Vec<Suggestion> {
        match args {
            [partial] => ctx
                .registry
                .list()
                .filter(|command| command.name().starts_with(*partial))
                .map(|command| Suggestion::new(command.name(), command.description()))
                .collect(),
            _ => Vec::new(),
        }
    }
}

pub struct StatusCommand;

impl Command for StatusCommand {
    fn name(&self) -> &'static str {
        "status"
    }

    fn description(&self) -> &'static str {
        "Show the connection and shell state"
    }

    fn execute(&self, ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 0, Some(0))?;
        let palette = ctx.palette();
        let row = |key: &str, value: String| {
            println!("  {} {}", palette.paint(&format!("{key:<10}"), GREEN), value);
        };

        row("server", ctx.server_url.clone());
        row("auth", ctx.auth_mode.to_string());
        row(
            "folder",
            format!(
                "{} ({})",
                ctx.navigation.current_title(),
                ctx.navigation.current_uuid()
            ),
        );
        row("history", format!("{} command(s)", ctx.history.len()));
        row("sessions", format!("{} active", ctx.sessions.count()));
        if let Some(path) = ctx.state_path() {
            row("state", path.display().to_string());
        }
        Ok(())
    }
}

pub struct AliasesCommand;

impl Command for AliasesCommand {
    fn name(&self) -> &'static str {
        "aliases"
    }

    fn description(&self) -> &'static str {
        "Show the folder shortcuts accepted in place of a uuid"
    }

    fn execute(&self, ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 0, Some(0))?;
        let palette = ctx.palette();
        for (alias, meaning) in FOLDER_ALIASES {
            println!("  {} {meaning}", palette.paint(&format!("{alias:<10}"), GREEN));
        }
        Ok(())
    }
}

pub struct HistoryCommand;

impl Command for HistoryCommand {
    fn name(&self) -> &'static str {
        "history"
    }

    fn description(&self) -> &'static str {
        "Show the recent commands"
    }

    fn execute(&self, ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 0, Some(0))?;
        if ctx.history.is_empty() {
            println!("No commands recorded yet.");
            return Ok(());
        }
        for (idx, entry) in ctx.history.entries().enumerate() {
            println!("{:>4}  {entry}", idx + 1);
        }
        Ok(())
    }
}

pub struct SettingsCommand;

impl Command for SettingsCommand {
    fn name(&self) -> &'static str {
        "settings"
    }

    fn description(&self) -> &'static str {
        "Show the configuration file and its values"
    }

    fn execute(&self, _ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 0, Some(0))?;
        config::display_settings()
    }
}

pub struct ClearCommand;

impl Command for ClearCommand {
    fn name(&self) -> &'static str {
        "clear"
    }

    fn description(&self) -> &'static str {
        "Clear the screen"
    }

    fn execute(&self, _ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 0, Some(0))?;
        execute!(stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
        Ok(())
    }
}

pub struct VersionCommand;

impl Command for VersionCommand {
    fn name(&self) -> &'static str {
        "version"
    }

    fn description(&self) -> &'static str {
        "Print the shell version"
    }

    fn execute(&self, _ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 0, Some(0))?;
        println!("{}", version_line());
        Ok(())
    }
}

/// `exit` and `quit`; the loop stops once the command returns.
pub struct ExitCommand {
    name: &'static str,
}

impl ExitCommand {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl Command for ExitCommand {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        "Leave the shell"
    }

    fn execute(&self, ctx: &mut AppContext, _args: &[String]) -> Result<()> {
        ctx.request_exit();
        Ok(())
    }
}
