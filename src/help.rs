use rustc_version_runtime::version;

use crate::version::VERSION;

pub fn version_line() -> String {
    format!("antbox-cli {VERSION} (built with Rust {})", version())
}

pub fn usage_text() -> String {
    format!(
        r#"
 **Antbox CLI {version}**

Browse and manage an Antbox server from an interactive shell.
Folders are addressed by uuid; `.` is the current folder, `..` its parent
and `--root--` the repository root.

Built with Rust {rust_version}

# Getting around
* `ls`, `cd <uuid>`, `pwd` to move through folders
* `find <text>` or `find "<field> <op> <value>"` to search
* Tab completes commands and the uuids seen by the last listing

# Agents
* `ask <agent> <question>` for a one-off answer
* `chat <agent>` and `rag [folder]` open a conversation; type `exit` to leave

# Files
* Settings: ~/.antbox-cli.yaml
* Last folder and recent commands: ~/.antbox-cli
"#,
        version = VERSION,
        rust_version = version(),
    )
}
