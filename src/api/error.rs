use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to reach server: {0}")]
    Transport(String),
    #[error("unexpected response from server: {0}")]
    Decode(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

impl From<ureq::Error> for ApiError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => {
                let body = response
                    .into_string()
                    .unwrap_or_else(|_| String::from("<unreadable body>"));
                ApiError::Status {
                    status,
                    body: error_message(&body),
                }
            }
            ureq::Error::Transport(transport) => ApiError::Transport(transport.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Servers answer errors with either plain text or `{"message": ...}`.
fn error_message(body: &str) -> String {
    let trimmed = body.trim();
    serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| trimmed.to_string())
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_message_from_json_bodies() {
        assert_eq!(
            error_message(r#"{"errorCode":"NodeNotFoundError","message":"Node not found"}"#),
            "Node not found"
        );
        assert_eq!(error_message("  plain failure \n"), "plain failure");
    }

    #[test]
    fn classifies_status_codes() {
        let err = ApiError::Status {
            status: 404,
            body: "missing".into(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_unauthorized());
        assert_eq!(ApiError::Transport("refused".into()).status(), None);
    }
}
