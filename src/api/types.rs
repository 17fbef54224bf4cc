use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{FOLDER_MIMETYPE, SMART_FOLDER_MIMETYPE};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub uuid: String,
    #[serde(default)]
    pub fid: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub mimetype: String,
    #[serde(default)]
    pub parent: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub modified_time: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Node {
    pub fn is_folder(&self) -> bool {
        is_folder_mimetype(&self.mimetype)
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        parse_time(self.modified_time.as_deref())
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        parse_time(self.created_time.as_deref())
    }
}

pub fn is_folder_mimetype(mimetype: &str) -> bool {
    mimetype == FOLDER_MIMETYPE || mimetype == SMART_FOLDER_MIMETYPE
}

fn parse_time(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|ts| ts.with_timezone(&Utc))
}

/// A `[field, operator, value]` triple understood by the find endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeFilter(pub String, pub String, pub Value);

impl NodeFilter {
    pub fn new(field: impl Into<String>, operator: impl Into<String>, value: Value) -> Self {
        Self(field.into(), operator.into(), value)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindResult {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub page_size: usize,
    #[serde(default)]
    pub page_token: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Action,
    Extension,
}

impl FeatureKind {
    pub fn path(self) -> &'static str {
        match self {
            FeatureKind::Action => "actions",
            FeatureKind::Extension => "extensions",
        }
    }

    pub fn cache_key(self) -> &'static str {
        match self {
            FeatureKind::Action => "@actions",
            FeatureKind::Extension => "@extensions",
        }
    }
}

/// Server-side action or extension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub uuid: String,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub uuid: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// One turn of an agent conversation as exchanged with the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub parts: Vec<Value>,
}

impl ChatMessage {
    pub fn user(text: &str) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![serde_json::json!({ "text": text })],
        }
    }

    /// Concatenated text parts; tool calls and other structured parts are skipped.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
