//! Contract between the shell and the Antbox server.
//!
//! Commands only ever talk to [`Gateway`]; the HTTP implementation lives in
//! [`client`] and tests substitute the in-memory tree from `fake`.

pub mod client;
pub mod error;
#[cfg(test)]
pub mod fake;
pub mod types;

pub use client::{ApiClient, Auth};
pub use error::{ApiError, ApiResult};
pub use types::{Agent, ChatMessage, Feature, FeatureKind, Node, NodeFilter, NodePatch};

use crate::session::Message;

pub trait Gateway: Send + Sync {
    fn get_node(&self, uuid: &str) -> ApiResult<Node>;

    fn list_nodes(&self, parent: &str) -> ApiResult<Vec<Node>>;

    fn find_nodes(&self, filters: &[NodeFilter], page_size: usize) -> ApiResult<Vec<Node>>;

    fn create_folder(&self, parent: &str, title: &str) -> ApiResult<Node>;

    fn copy_node(&self, uuid: &str, to: &str, title: Option<&str>) -> ApiResult<Node>;

    /// Covers both move (`parent`) and rename (`title`).
    fn update_node(&self, uuid: &str, patch: &NodePatch) -> ApiResult<()>;

    fn delete_node(&self, uuid: &str) -> ApiResult<()>;

    fn export_node(&self, uuid: &str) -> ApiResult<Vec<u8>>;

    fn list_features(&self, kind: FeatureKind) -> ApiResult<Vec<Feature>>;

    fn run_action(&self, action: &str, uuids: &[String]) -> ApiResult<()>;

    fn run_extension(&self, extension: &str, params: &[(String, String)]) -> ApiResult<String>;

    fn list_agents(&self) -> ApiResult<Vec<Agent>>;

    fn chat(&self, agent: &str, text: &str, history: &[Message]) -> ApiResult<ChatMessage>;

    fn answer(&self, agent: &str, text: &str) -> ApiResult<ChatMessage>;

    fn rag_chat(
        &self,
        text: &str,
        history: &[Message],
        parent: Option<&str>,
    ) -> ApiResult<ChatMessage>;
}
