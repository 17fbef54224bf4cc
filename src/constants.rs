pub const GREEN: &str = "\x1b[32m";
pub const BLUE: &str = "\x1b[34m";
pub const DIM: &str = "\x1b[2m";
pub const BOLD: &str = "\x1b[1m";
pub const RESET: &str = "\x1b[0m";

/// Identifier the server uses for the top of the node tree.
pub const ROOT_NODE_UUID: &str = "--root--";
pub const ROOT_NODE_TITLE: &str = "root";

pub const FOLDER_MIMETYPE: &str = "application/vnd.antbox.folder";
pub const SMART_FOLDER_MIMETYPE: &str = "application/vnd.antbox.smartfolder";

pub const HISTORY_LIMIT: usize = 20;

/// Introspection commands that never reach the persisted history.
pub const UNRECORDED_COMMANDS: &[&str] = &["help", "status", "aliases", "exit", "quit", "history"];

pub const CHAT_EXIT_WORDS: &[&str] = &["exit", "quit"];
