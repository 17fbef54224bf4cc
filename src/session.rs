use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: Value,
}

impl Message {
    pub fn new(role: impl Into<String>, content: Value) -> Self {
        Self {
            role: role.into(),
            content,
        }
    }
}

#[derive(Debug)]
pub struct Session {
    id: String,
    history: RwLock<Vec<Message>>,
}

impl Session {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            history: RwLock::new(Vec::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn push(&self, message: Message) {
        self.history.write().push(message);
    }

    /// Snapshot of the conversation; later appends are not visible through it.
    pub fn history(&self) -> Vec<Message> {
        self.history.read().clone()
    }

    pub fn len(&self) -> usize {
        self.history.read().len()
    }

    pub fn clear(&self) {
        self.history.write().clear();
    }
}

/// Conversation histories for chat-style commands, keyed by session id.
///
/// Safe to share across threads: lookups take the shared lock, creation and
/// removal take the exclusive one, and each session serializes its own appends.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&self, id: &str) -> Arc<Session> {
        if let Some(session) = self.sessions.read().get(id) {
            return Arc::clone(session);
        }

        // Another writer may have inserted between the two locks; entry() re-checks.
        let mut sessions = self.sessions.write();
        Arc::clone(
            sessions
                .entry(id.to_string())
                .or_insert_with(|| Arc::new(Session::new(id))),
        )
    }

    pub fn add_message(&self, id: &str, role: &str, content: Value) {
        self.get_or_create(id).push(Message::new(role, content));
    }

    pub fn get_history(&self, id: &str) -> Vec<Message> {
        self.get_or_create(id).history()
    }

    pub fn clear(&self, id: &str) {
        self.get_or_create(id).clear();
    }

    pub fn remove(&self, id: &str) -> bool {
        self.sessions.write().remove(id).is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.read().contains_key(id)
    }

    pub fn list_ids(&self) -> BTreeSet<String> {
        self.sessions.read().keys().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread;

    #[test]
    fn history_keeps_call_order() {
        let manager = SessionManager::new();
        for i in 0..5 {
            manager.add_message("s1", "user", json!(format!("m{i}")));
        }

        let history = manager.get_history("s1");
        assert_eq!(history.len(), 5);
        let contents: Vec<_> = history.iter().map(|m| m.content.clone()).collect();
        assert_eq!(contents, vec![json!("m0"), json!("m1"), json!("m2"), json!("m3"), json!("m4")]);
    }

    #[test]
    fn returned_history_is_a_copy() {
        let manager = SessionManager::new();
        manager.add_message("s1", "user", json!("hello"));

        let mut copy = manager.get_history("s1");
        copy.push(Message::new("assistant", json!("injected")));
        copy[0].content = json!("changed");

        let fresh = manager.get_history("s1");
        assert_eq!(fresh, vec![Message::new("user", json!("hello"))]);
    }

    #[test]
    fn content_may_be_any_json_value() {
        let manager = SessionManager::new();
        manager.add_message("s", "user", json!({ "text": "a" }));
        manager.add_message("s", "model", json!([{ "text": "b" }]));
        let history = manager.get_history("s");
        assert_eq!(history[0].content["text"], "a");
        assert_eq!(history[1].role, "model");
    }

    #[test]
    fn concurrent_writers_on_one_session_lose_nothing() {
        let manager = Arc::new(SessionManager::new());
        let handles: Vec<_> = (0..2)
            .map(|writer| {
                let manager = Arc::clone(&manager);
                thread::spawn(move || {
                    for i in 0..10 {
                        manager.add_message("shared", "user", json!(format!("{writer}-{i}")));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(manager.get_history("shared").len(), 20);
        assert_eq!(manager.count(), 1);
    }

    #[test]
    fn concurrent_creation_yields_one_session() {
        let manager = Arc::new(SessionManager::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                thread::spawn(move || manager.get_or_create("race"))
            })
            .collect();
        let sessions: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(manager.count(), 1);
        assert!(sessions.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    }

    #[test]
    fn parallel_sessions_do_not_interfere() {
        let manager = Arc::new(SessionManager::new());
        let handles: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|id| {
                let manager = Arc::clone(&manager);
                thread::spawn(move || {
                    for _ in 0..25 {
                        manager.add_message(id, "user", json!(id));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for id in ["a", "b", "c"] {
            let history = manager.get_history(id);
            assert_eq!(history.len(), 25);
            assert!(history.iter().all(|m| m.content == json!(id)));
        }
    }

    #[test]
    fn clear_keeps_the_session_but_remove_drops_it() {
        let manager = SessionManager::new();
        manager.add_message("s", "user", json!("x"));

        manager.clear("s");
        assert!(manager.contains("s"));
        assert!(manager.get_history("s").is_empty());

        manager.add_message("s", "user", json!("y"));
        assert!(manager.remove("s"));
        assert!(!manager.contains("s"));
        assert!(!manager.remove("s"));
        assert!(manager.get_history("s").is_empty());
    }

    #[test]
    fn introspection_reports_ids_and_count() {
        let manager = SessionManager::new();
        manager.get_or_create("b");
        manager.get_or_create("a");
        manager.get_or_create("a");

        assert_eq!(manager.count(), 2);
        let ids: Vec<_> = manager.list_ids().into_iter().collect();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }
}
