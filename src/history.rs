use std::collections::VecDeque;

use crate::constants::{HISTORY_LIMIT, UNRECORDED_COMMANDS};

/// Most-recent-last list of accepted command lines, capped at [`HISTORY_LIMIT`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandHistory {
    entries: VecDeque<String>,
    limit: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Keeps the newest `limit` entries of `entries`, oldest first.
    pub fn from_entries(entries: impl IntoIterator<Item = String>) -> Self {
        let mut history = Self::new();
        for entry in entries {
            let entry = entry.trim();
            if !entry.is_empty() {
                history.push(entry.to_string());
            }
        }
        history
    }

    /// Records `line` unless it is blank, an introspection command, or a
    /// repeat of the newest entry. Returns whether anything was stored.
    pub fn add(&mut self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() || is_unrecorded(line) {
            return false;
        }
        if self.entries.back().is_some_and(|last| last == line) {
            return false;
        }
        self.push(line.to_string());
        true
    }

    fn push(&mut self, line: String) {
        self.entries.push_back(line);
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Introspection commands leave both the history and the saved state alone.
pub(crate) fn is_unrecorded(line: &str) -> bool {
    let name = line.split_whitespace().next().unwrap_or("");
    UNRECORDED_COMMANDS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_beyond_the_limit() {
        let mut history = CommandHistory::new();
        for i in 0..21 {
            assert!(history.add(&format!("cd node-{i}")));
        }

        assert_eq!(history.len(), HISTORY_LIMIT);
        let entries = history.to_vec();
        assert_eq!(entries.first().map(String::as_str), Some("cd node-1"));
        assert_eq!(entries.last().map(String::as_str), Some("cd node-20"));
    }

    #[test]
    fn consecutive_duplicates_collapse() {
        let mut history = CommandHistory::new();
        assert!(history.add("ls"));
        assert!(!history.add("ls"));
        assert!(!history.add("  ls  "));
        assert_eq!(history.to_vec(), vec!["ls"]);

        assert!(history.add("pwd"));
        assert!(history.add("ls"));
        assert_eq!(history.to_vec(), vec!["ls", "pwd", "ls"]);
    }

    #[test]
    fn introspection_commands_are_not_recorded() {
        let mut history = CommandHistory::new();
        for line in ["help", "help cd", "status", "aliases", "exit", "quit", "history", "   "] {
            assert!(!history.add(line), "{line} should be skipped");
        }
        assert!(history.is_empty());
    }

    #[test]
    fn from_entries_applies_the_cap() {
        let lines = (0..30).map(|i| format!("ls {i}"));
        let history = CommandHistory::from_entries(lines);
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.entries().next(), Some("ls 10"));
    }
}
