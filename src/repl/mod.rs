//! The interactive loop: read a line, dispatch it, repeat.

pub mod dispatcher;
pub mod helper;
pub mod input;

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Config, Editor};

use crate::banner::ascii_logo;
use crate::repl::dispatcher::{Outcome, dispatch};
use crate::repl::helper::ShellHelper;
use crate::state::AppContext;

pub fn run(ctx: &mut AppContext) -> Result<()> {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .build();
    let mut editor: Editor<ShellHelper, DefaultHistory> = Editor::with_config(config)?;
    editor.set_helper(Some(ShellHelper::new(ctx)));
    for entry in ctx.history.entries() {
        let _ = editor.add_history_entry(entry);
    }

    if !ctx.config.quiet {
        println!("{}", ascii_logo());
    }
    println!(
        "Connected to {} ({}). Type 'help' for commands, Ctrl+D to exit.\n",
        ctx.server_url, ctx.auth_mode
    );

    loop {
        if let Some(helper) = editor.helper_mut() {
            helper.sync(ctx);
        }

        match editor.readline(&prompt(ctx)) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                if dispatch(ctx, &line) == Outcome::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("(Interrupted - type 'exit' to quit)");
            }
            Err(ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(err) => {
                eprintln!("❌ Input error: {err}");
                break;
            }
        }
    }

    ctx.save_now();
    println!("Goodbye!");
    Ok(())
}

fn prompt(ctx: &AppContext) -> String {
    format!("antbox:{}> ", ctx.navigation.current_title())
}
