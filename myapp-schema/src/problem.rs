//! Problem-details error body (`application/problem+json`).

use serde::{Deserialize, Serialize};

pub const PROBLEM_JSON: &str = "application/problem+json";

/// `type` used for problems that carry a translatable message key.
pub const PROBLEM_WITH_MESSAGE: &str = "https://www.jhipster.tech/problem/problem-with-message";

/// Error envelope returned for every failed request.
///
/// Example:
/// `{ "type": "...", "title": "A new a cannot already have an ID", "status": 400,
///    "message": "error.idexists", "entityName": "a", "errorKey": "idexists", "params": "a" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemBody {
    pub r#type: String,
    pub title: String,
    pub status: u16,
    /// Translation key for clients, e.g. `error.idexists` or `error.http.404`.
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<String>,
}

impl ProblemBody {
    pub fn http(status: u16, title: impl Into<String>) -> Self {
        Self {
            r#type: "about:blank".to_string(),
            title: title.into(),
            status,
            message: format!("error.http.{status}"),
            entity_name: None,
            error_key: None,
            params: None,
        }
    }

    pub fn with_message(
        status: u16,
        title: impl Into<String>,
        entity_name: impl Into<String>,
        error_key: impl Into<String>,
    ) -> Self {
        let entity_name = entity_name.into();
        let error_key = error_key.into();
        Self {
            r#type: PROBLEM_WITH_MESSAGE.to_string(),
            title: title.into(),
            status,
            message: format!("error.{error_key}"),
            params: Some(entity_name.clone()),
            entity_name: Some(entity_name),
            error_key: Some(error_key),
        }
    }
}
