use anyhow::Result;
use serde_json::Value;

use crate::api::{Agent, ApiResult, ChatMessage, Gateway};
use crate::cache::CachedItem;
use crate::commands::command::{Command, SuggestContext, Suggestion};
use crate::commands::navigation::folder_suggestions;
use crate::commands::{expect_args, resolve};
use crate::constants::CHAT_EXIT_WORDS;
use crate::repl::dispatcher::report_error;
use crate::repl::input::ReadOutcome;
use crate::session::Message;
use crate::state::AppContext;
use crate::ui::spinner::with_spinner;
use crate::ui::table::render_agents;

const AGENTS_CACHE_KEY: &str = "@agents";
pub const RAG_SESSION_ID: &str = "rag";

pub fn agent_session_id(agent: &str) -> String {
    format!("agent:{agent}")
}

fn cache_items(agents: &[Agent]) -> Vec<CachedItem> {
    agents
        .iter()
        .map(|agent| CachedItem::new(agent.uuid.clone(), agent.title.clone()))
        .collect()
}

fn agent_suggestions(ctx: &SuggestContext<'_>, args: &[&str]) -> Vec<Suggestion> {
    match args {
        [partial] => ctx.cached(AGENTS_CACHE_KEY, partial),
        _ => Vec::new(),
    }
}

/// Reads questions until an exit word or end of input, sending each one with
/// the conversation so far. Both turns are kept under `session_id` once the
/// server has answered; a failed round-trip leaves the session unchanged.
fn chat_loop<F>(ctx: &mut AppContext, session_id: &str, prompt: &str, send: F)
where
    F: Fn(&dyn Gateway, &str, &[Message]) -> ApiResult<ChatMessage>,
{
    println!("Type 'exit' or 'quit' to return to the shell.");
    loop {
        let line = match ctx.input().read_line(prompt) {
            ReadOutcome::Line(line) => line,
            ReadOutcome::Interrupted | ReadOutcome::Eof => break,
        };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if CHAT_EXIT_WORDS.contains(&text) {
            break;
        }

        let history = ctx.sessions.get_history(session_id);
        let reply = with_spinner("Thinking...", ctx.config.quiet, || {
            send(ctx.gateway.as_ref(), text, &history)
        });
        match reply {
            Ok(reply) => {
                let question = ChatMessage::user(text);
                ctx.sessions
                    .add_message(session_id, &question.role, Value::Array(question.parts));
                ctx.sessions
                    .add_message(session_id, &reply.role, Value::Array(reply.parts.clone()));
                println!("{}\n", reply.text());
            }
            Err(err) => report_error(&err.into()),
        }
    }
}

pub struct ListAgentsCommand;

impl Command for ListAgentsCommand {
    fn name(&self) -> &'static str {
        "agents"
    }

    fn description(&self) -> &'static str {
        "List the AI agents available on the server"
    }

    fn execute(&self, ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 0, Some(0))?;
        let agents = ctx.gateway.list_agents()?;
        ctx.listings.insert(AGENTS_CACHE_KEY, cache_items(&agents));

        if agents.is_empty() {
            println!("No agents available.");
            return Ok(());
        }
        print!("{}", render_agents(&agents, ctx.palette()));
        Ok(())
    }
}

pub struct AskCommand;

impl Command for AskCommand {
    fn name(&self) -> &'static str {
        "ask"
    }

    fn description(&self) -> &'static str {
        "Ask an agent a single question"
    }

    fn usage(&self) -> &'static str {
        "ask <agent> <question>"
    }

    fn execute(&self, ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 2, None)?;
        let agent = &args[0];
        let question = args[1..].join(" ");

        let reply = with_spinner("Thinking...", ctx.config.quiet, || {
            ctx.gateway.answer(agent, &question)
        })?;
        println!("{}", reply.text());
        Ok(())
    }

    fn suggest(&self, ctx: &SuggestContext<'_>, args: &[&str]) -> Vec<Suggestion> {
        agent_suggestions(ctx, args)
    }
}

pub struct ChatCommand;

impl Command for ChatCommand {
    fn name(&self) -> &'static str {
        "chat"
    }

    fn description(&self) -> &'static str {
        "Start or resume a conversation with an agent"
    }

    fn usage(&self) -> &'static str {
        "chat <agent>"
    }

    fn execute(&self, ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 1, Some(1))?;
        let agent = args[0].clone();
        let session_id = agent_session_id(&agent);
        let prompt = format!("chat:{agent}> ");

        chat_loop(ctx, &session_id, &prompt, |gateway, text, history| {
            gateway.chat(&agent, text, history)
        });
        Ok(())
    }

    fn suggest(&self, ctx: &SuggestContext<'_>, args: &[&str]) -> Vec<Suggestion> {
        agent_suggestions(ctx, args)
    }
}

pub struct RagCommand;

impl Command for RagCommand {
    fn name(&self) -> &'static str {
        "rag"
    }

    fn description(&self) -> &'static str {
        "Chat with the content of a folder, or of the whole repository"
    }

    fn usage(&self) -> &'static str {
        "rag [folder]"
    }

    fn execute(&self, ctx: &mut AppContext, args: &[String]) -> Result<()> {
        expect_args(self, args, 0, Some(1))?;
        let parent = match args.first() {
            Some(token) => Some(resolve(ctx, token)?),
            None => None,
        };

        chat_loop(ctx, RAG_SESSION_ID, "rag> ", |gateway, text, history| {
            gateway.rag_chat(text, history, parent.as_deref())
        });
        Ok(())
    }

    fn suggest(&self, ctx: &SuggestContext<'_>, args: &[&str]) -> Vec<Suggestion> {
        match args {
            [partial] => folder_suggestions(ctx, partial),
            _ => Vec::new(),
        }
    }
}
