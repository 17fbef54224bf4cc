//! In-memory [`Gateway`] used by unit tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde_json::json;

use crate::api::error::{ApiError, ApiResult};
use crate::api::types::{Agent, ChatMessage, Feature, FeatureKind, Node, NodeFilter, NodePatch};
use crate::api::Gateway;
use crate::constants::FOLDER_MIMETYPE;
use crate::session::Message;

#[derive(Default)]
pub struct FakeGateway {
    nodes: Mutex<BTreeMap<String, Node>>,
    actions: Mutex<Vec<Feature>>,
    extensions: Mutex<Vec<Feature>>,
    agents: Mutex<Vec<Agent>>,
    action_runs: Mutex<Vec<(String, Vec<String>)>>,
    calls: AtomicUsize,
    next_id: AtomicUsize,
}

fn not_found(uuid: &str) -> ApiError {
    ApiError::Status {
        status: 404,
        body: format!("node {uuid} not found"),
    }
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_folder(&self, uuid: &str, title: &str, parent: &str) {
        self.insert(uuid, title, parent, FOLDER_MIMETYPE);
    }

    pub fn add_file(&self, uuid: &str, title: &str, parent: &str) {
        self.insert(uuid, title, parent, "text/plain");
    }

    pub fn insert(&self, uuid: &str, title: &str, parent: &str, mimetype: &str) {
        let node = Node {
            uuid: uuid.to_string(),
            title: title.to_string(),
            parent: parent.to_string(),
            mimetype: mimetype.to_string(),
            size: Some(title.len() as u64),
            ..Node::default()
        };
        self.nodes.lock().insert(uuid.to_string(), node);
    }

    pub fn add_feature(&self, kind: FeatureKind, uuid: &str, title: &str) {
        let feature = Feature {
            uuid: uuid.to_string(),
            title: title.to_string(),
            description: None,
        };
        match kind {
            FeatureKind::Action => self.actions.lock().push(feature),
            FeatureKind::Extension => self.extensions.lock().push(feature),
        }
    }

    pub fn add_agent(&self, uuid: &str, title: &str) {
        self.agents.lock().push(Agent {
            uuid: uuid.to_string(),
            title: title.to_string(),
            ..Agent::default()
        });
    }

    pub fn node(&self, uuid: &str) -> Option<Node> {
        self.nodes.lock().get(uuid).cloned()
    }

    pub fn action_runs(&self) -> Vec<(String, Vec<String>)> {
        self.action_runs.lock().clone()
    }

    /// Number of gateway calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn fresh_uuid(&self) -> String {
        format!("gen-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn reply(text: String) -> ChatMessage {
        ChatMessage {
            role: "model".to_string(),
            parts: vec![json!({ "text": text })],
        }
    }
}

impl Gateway for FakeGateway {
    fn get_node(&self, uuid: &str) -> ApiResult<Node> {
        self.tick();
        self.node(uuid).ok_or_else(|| not_found(uuid))
    }

    fn list_nodes(&self, parent: &str) -> ApiResult<Vec<Node>> {
        self.tick();
        Ok(self
            .nodes
            .lock()
            .values()
            .filter(|node| node.parent == parent)
            .cloned()
            .collect())
    }

    fn find_nodes(&self, filters: &[NodeFilter], page_size: usize) -> ApiResult<Vec<Node>> {
        self.tick();
        let needle = filters
            .iter()
            .find(|f| f.0 == "title")
            .and_then(|f| f.2.as_str())
            .unwrap_or("")
            .to_lowercase();
        Ok(self
            .nodes
            .lock()
            .values()
            .filter(|node| node.title.to_lowercase().contains(&needle))
            .take(page_size)
            .cloned()
            .collect())
    }

    fn create_folder(&self, parent: &str, title: &str) -> ApiResult<Node> {
        self.tick();
        let uuid = self.fresh_uuid();
        self.add_folder(&uuid, title, parent);
        self.node(&uuid).ok_or_else(|| not_found(&uuid))
    }

    fn copy_node(&self, uuid: &str, to: &str, title: Option<&str>) -> ApiResult<Node> {
        self.tick();
        let source = self.node(uuid).ok_or_else(|| not_found(uuid))?;
        let copy_uuid = self.fresh_uuid();
        let title = title
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} 2", source.title));
        self.insert(&copy_uuid, &title, to, &source.mimetype);
        self.node(&copy_uuid).ok_or_else(|| not_found(&copy_uuid))
    }

    fn update_node(&self, uuid: &str, patch: &NodePatch) -> ApiResult<()> {
        self.tick();
        let mut nodes = self.nodes.lock();
        let node = nodes.get_mut(uuid).ok_or_else(|| not_found(uuid))?;
        if let Some(title) = &patch.title {
            node.title = title.clone();
        }
        if let Some(parent) = &patch.parent {
            node.parent = parent.clone();
        }
        Ok(())
    }

    fn delete_node(&self, uuid: &str) -> ApiResult<()> {
        self.tick();
        self.nodes
            .lock()
            .remove(uuid)
            .map(|_| ())
            .ok_or_else(|| not_found(uuid))
    }

    fn export_node(&self, uuid: &str) -> ApiResult<Vec<u8>> {
        self.tick();
        let node = self.node(uuid).ok_or_else(|| not_found(uuid))?;
        Ok(format!("content of {}", node.title).into_bytes())
    }

    fn list_features(&self, kind: FeatureKind) -> ApiResult<Vec<Feature>> {
        self.tick();
        Ok(match kind {
            FeatureKind::Action => self.actions.lock().clone(),
            FeatureKind::Extension => self.extensions.lock().clone(),
        })
    }

    fn run_action(&self, action: &str, uuids: &[String]) -> ApiResult<()> {
        self.tick();
        self.action_runs
            .lock()
            .push((action.to_string(), uuids.to_vec()));
        Ok(())
    }

    fn run_extension(&self, extension: &str, params: &[(String, String)]) -> ApiResult<String> {
        self.tick();
        let rendered: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        Ok(format!("{extension}({})", rendered.join(",")))
    }

    fn list_agents(&self) -> ApiResult<Vec<Agent>> {
        self.tick();
        Ok(self.agents.lock().clone())
    }

    fn chat(&self, agent: &str, text: &str, history: &[Message]) -> ApiResult<ChatMessage> {
        self.tick();
        if !self.agents.lock().iter().any(|a| a.uuid == agent) {
            return Err(not_found(agent));
        }
        Ok(Self::reply(format!("{text} ({} prior)", history.len())))
    }

    fn answer(&self, agent: &str, text: &str) -> ApiResult<ChatMessage> {
        self.chat(agent, text, &[])
    }

    fn rag_chat(
        &self,
        text: &str,
        history: &[Message],
        parent: Option<&str>,
    ) -> ApiResult<ChatMessage> {
        self.tick();
        Ok(Self::reply(format!(
            "{text} ({} prior, in {})",
            history.len(),
            parent.unwrap_or("everything")
        )))
    }
}
