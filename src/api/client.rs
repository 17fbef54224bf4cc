use std::io::Read;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::api::error::{ApiError, ApiResult};
use crate::api::types::{
    Agent, ChatMessage, Feature, FeatureKind, FindResult, Node, NodeFilter, NodePatch,
};
use crate::api::Gateway;
use crate::constants::FOLDER_MIMETYPE;
use crate::session::Message;

const API_PREFIX: &str = "v2";
const MAX_EXPORT_SIZE: u64 = 512 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    Anonymous,
    ApiKey(String),
    Bearer(String),
}

impl Auth {
    fn header(&self) -> Option<String> {
        match self {
            Auth::Anonymous => None,
            Auth::ApiKey(key) => Some(format!("ApiKey {key}")),
            Auth::Bearer(jwt) => Some(format!("Bearer {jwt}")),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Auth::Anonymous => "anonymous",
            Auth::ApiKey(_) => "api key",
            Auth::Bearer(_) => "jwt",
        }
    }
}

pub struct ApiClient {
    agent: ureq::Agent,
    base_url: String,
    auth: Auth,
}

impl ApiClient {
    pub fn new(server_url: &str, auth: Auth, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: server_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchanges the root password for a JWT.
    pub fn login_root(&self, password: &str) -> ApiResult<String> {
        let digest = hex::encode(Sha256::digest(password.as_bytes()));
        let response = self
            .request("POST", "login/root")
            .set("Content-Type", "text/plain")
            .send_string(&digest)
            .map_err(ApiError::from)?;
        let body: Value = decode(response)?;
        body.get("jwt")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ApiError::Decode("login response carried no jwt".to_string()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, API_PREFIX, path)
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let url = self.url(path);
        debug!(method, url = %url, "api request");
        let request = self.agent.request(method, &url);
        match self.auth.header() {
            Some(header) => request.set("Authorization", &header),
            None => request,
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> ApiResult<T> {
        let mut request = self.request("GET", path);
        for (key, value) in query {
            request = request.query(key, value);
        }
        let response = request.call().map_err(log_failure)?;
        decode(response)
    }

    fn send_json<T: DeserializeOwned>(&self, method: &str, path: &str, body: Value) -> ApiResult<T> {
        let response = self
            .request(method, path)
            .send_json(body)
            .map_err(log_failure)?;
        decode(response)
    }

    fn send_ignoring_body(&self, method: &str, path: &str, body: Option<Value>) -> ApiResult<()> {
        let request = self.request(method, path);
        let result = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };
        let response = result.map_err(log_failure)?;
        debug!(status = response.status(), "api response");
        Ok(())
    }
}

/// Reads at most `limit` bytes; anything beyond that is an error rather than
/// a silently shortened download.
fn read_limited(reader: impl Read, limit: u64) -> ApiResult<Vec<u8>> {
    let mut buffer = Vec::new();
    reader.take(limit + 1).read_to_end(&mut buffer)?;
    if buffer.len() as u64 > limit {
        return Err(ApiError::Decode(format!(
            "export larger than {limit} bytes"
        )));
    }
    Ok(buffer)
}

fn log_failure(err: ureq::Error) -> ApiError {
    let err = ApiError::from(err);
    debug!(error = %err, "api request failed");
    err
}

fn decode<T: DeserializeOwned>(response: ureq::Response) -> ApiResult<T> {
    debug!(status = response.status(), "api response");
    let body = response.into_string()?;
    serde_json::from_str(&body).map_err(ApiError::from)
}

fn history_payload(history: &[Message]) -> Value {
    Value::Array(
        history
            .iter()
            .map(|message| json!({ "role": message.role, "parts": message.content }))
            .collect(),
    )
}

/// Chat endpoints answer with the full conversation; the reply is its last turn.
fn last_turn(body: Value) -> ApiResult<ChatMessage> {
    match body {
        Value::Array(mut turns) => {
            let last = turns
                .pop()
                .ok_or_else(|| ApiError::Decode("empty chat response".to_string()))?;
            serde_json::from_value(last).map_err(ApiError::from)
        }
        other => serde_json::from_value(other).map_err(ApiError::from),
    }
}

impl Gateway for ApiClient {
    fn get_node(&self, uuid: &str) -> ApiResult<Node> {
        self.get_json(&format!("nodes/{uuid}"), &[])
    }

    fn list_nodes(&self, parent: &str) -> ApiResult<Vec<Node>> {
        self.get_json("nodes", &[("parent", parent)])
    }

    fn find_nodes(&self, filters: &[NodeFilter], page_size: usize) -> ApiResult<Vec<Node>> {
        let body = json!({ "filters": filters, "pageSize": page_size, "pageToken": 1 });
        let result: FindResult = self.send_json("POST", "nodes/-/find", body)?;
        Ok(result.nodes)
    }

    fn create_folder(&self, parent: &str, title: &str) -> ApiResult<Node> {
        let body = json!({ "title": title, "parent": parent, "mimetype": FOLDER_MIMETYPE });
        self.send_json("POST", "nodes", body)
    }

    fn copy_node(&self, uuid: &str, to: &str, title: Option<&str>) -> ApiResult<Node> {
        let mut body = json!({ "to": to });
        if let Some(title) = title {
            body["title"] = json!(title);
        }
        self.send_json("POST", &format!("nodes/{uuid}/-/copy"), body)
    }

    fn update_node(&self, uuid: &str, patch: &NodePatch) -> ApiResult<()> {
        let body = serde_json::to_value(patch)?;
        self.send_ignoring_body("PATCH", &format!("nodes/{uuid}"), Some(body))
    }

    fn delete_node(&self, uuid: &str) -> ApiResult<()> {
        self.send_ignoring_body("DELETE", &format!("nodes/{uuid}"), None)
    }

    fn export_node(&self, uuid: &str) -> ApiResult<Vec<u8>> {
        let response = self
            .request("GET", &format!("nodes/{uuid}/-/export"))
            .call()
            .map_err(log_failure)?;
        read_limited(response.into_reader(), MAX_EXPORT_SIZE)
    }

    fn list_features(&self, kind: FeatureKind) -> ApiResult<Vec<Feature>> {
        self.get_json(kind.path(), &[])
    }

    fn run_action(&self, action: &str, uuids: &[String]) -> ApiResult<()> {
        let joined = uuids.join(",");
        let response = self
            .request("GET", &format!("actions/{action}/-/run"))
            .query("uuids", &joined)
            .call()
            .map_err(log_failure)?;
        debug!(status = response.status(), "api response");
        Ok(())
    }

    fn run_extension(&self, extension: &str, params: &[(String, String)]) -> ApiResult<String> {
        let mut request = self.request("GET", &format!("extensions/{extension}/-/exec"));
        for (key, value) in params {
            request = request.query(key, value);
        }
        let response = request.call().map_err(log_failure)?;
        Ok(response.into_string()?)
    }

    fn list_agents(&self) -> ApiResult<Vec<Agent>> {
        self.get_json("agents", &[])
    }

    fn chat(&self, agent: &str, text: &str, history: &[Message]) -> ApiResult<ChatMessage> {
        let body = json!({ "text": text, "options": { "history": history_payload(history) } });
        let response: Value = self.send_json("POST", &format!("agents/{agent}/-/chat"), body)?;
        last_turn(response)
    }

    fn answer(&self, agent: &str, text: &str) -> ApiResult<ChatMessage> {
        let response: Value =
            self.send_json("POST", &format!("agents/{agent}/-/answer"), json!({ "text": text }))?;
        last_turn(response)
    }

    fn rag_chat(
        &self,
        text: &str,
        history: &[Message],
        parent: Option<&str>,
    ) -> ApiResult<ChatMessage> {
        let mut options = json!({ "history": history_payload(history) });
        if let Some(parent) = parent {
            options["parent"] = json!(parent);
        }
        let body = json!({ "text": text, "options": options });
        let response: Value = self.send_json("POST", "agents/rag/-/chat", body)?;
        last_turn(response)
    }
}
