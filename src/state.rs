use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::api::Gateway;
use crate::cache::ListingCache;
#[cfg(test)]
use crate::commands::command::SuggestContext;
use crate::commands::registry::Registry;
use crate::config::Config;
use crate::history::{CommandHistory, is_unrecorded};
use crate::navigation::Navigation;
use crate::persist::PersistedState;
use crate::repl::input::{EditorInput, LineInput};
use crate::session::SessionManager;
use crate::ui::table::Palette;

/// Everything a command may touch, built once at startup and handed to the
/// dispatcher and to every command invocation.
pub struct AppContext {
    pub config: Config,
    pub gateway: Arc<dyn Gateway>,
    pub registry: Arc<Registry>,
    pub navigation: Navigation,
    pub history: CommandHistory,
    pub sessions: Arc<SessionManager>,
    pub listings: Arc<ListingCache>,
    pub server_url: String,
    pub auth_mode: &'static str,
    state_path: Option<PathBuf>,
    input: Box<dyn LineInput>,
    exit_requested: bool,
}

impl AppContext {
    pub fn new(config: Config, gateway: Arc<dyn Gateway>, registry: Arc<Registry>) -> Self {
        Self {
            config,
            gateway,
            registry,
            navigation: Navigation::root(),
            history: CommandHistory::new(),
            sessions: Arc::new(SessionManager::new()),
            listings: Arc::new(ListingCache::new()),
            server_url: String::new(),
            auth_mode: "anonymous",
            state_path: None,
            input: Box::new(EditorInput::new()),
            exit_requested: false,
        }
    }

    pub fn with_server(mut self, server_url: &str, auth_mode: &'static str) -> Self {
        self.server_url = server_url.to_string();
        self.auth_mode = auth_mode;
        self
    }

    pub fn with_state_path(mut self, path: PathBuf) -> Self {
        self.state_path = Some(path);
        self
    }

    #[cfg(test)]
    pub fn with_input(mut self, input: Box<dyn LineInput>) -> Self {
        self.input = input;
        self
    }

    pub fn state_path(&self) -> Option<&PathBuf> {
        self.state_path.as_ref()
    }

    /// Applies what a previous run saved.
    pub fn restore(&mut self, saved: PersistedState) {
        self.navigation = Navigation::restore(self.gateway.as_ref(), &saved.current_node_uuid);
        self.history = CommandHistory::from_entries(saved.history);
    }

    pub fn snapshot(&self) -> PersistedState {
        PersistedState::new(self.navigation.current_uuid(), self.history.to_vec())
    }

    /// Adds `line` to the history and saves the state without waiting for
    /// the write. A repeat of the newest entry is not stored again but still
    /// saves, since the command may have moved the current folder.
    pub fn record(&mut self, line: &str) -> bool {
        let stored = self.history.add(line);
        if line.trim().is_empty() || is_unrecorded(line) {
            return stored;
        }
        if let Some(path) = self.state_path.clone() {
            drop(self.snapshot().save_in_background(path));
        }
        stored
    }

    pub fn save_now(&self) {
        if let Some(path) = &self.state_path {
            if let Err(err) = self.snapshot().save(path) {
                debug!("ignoring state save failure: {err}");
            }
        }
    }

    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn input(&mut self) -> &mut dyn LineInput {
        self.input.as_mut()
    }

    pub fn palette(&self) -> Palette {
        Palette {
            color: self.config.display.color,
        }
    }

    #[cfg(test)]
    pub fn suggest_context(&self) -> SuggestContext<'_> {
        SuggestContext {
            registry: &self.registry,
            current_folder: self.navigation.current_uuid(),
            listings: &self.listings,
            sessions: &self.sessions,
        }
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use crate::api::fake::FakeGateway;
    use crate::commands::builtin_registry;
    use crate::repl::input::ScriptedInput;

    /// Context over `gateway` with the full command set and scripted input.
    pub fn context(gateway: Arc<FakeGateway>, input: &[&str]) -> AppContext {
        let mut config = Config::default();
        config.quiet = true;
        config.display.color = false;
        AppContext::new(config, gateway, Arc::new(builtin_registry()))
            .with_server("http://antbox.test", "anonymous")
            .with_input(Box::new(ScriptedInput::new(input)))
    }
}
