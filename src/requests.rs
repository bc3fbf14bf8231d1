//! Tool-facing request and response shapes.
//!
//! Every exposed operation has an explicit tagged request struct validated
//! at the boundary, before anything reaches the composer or the network.

use serde::{Deserialize, Serialize};

use crate::error::{MailError, Result};
use crate::gmail_api::content::HtmlWindow;

/// Parameters for sending a message. The identical shape drives draft
/// creation; only the destination API operation differs.
#[derive(Debug, Clone, Deserialize)]
pub struct SendEmailRequest {
    pub to: Vec<String>,
    #[serde(default)]
    pub cc: Vec<String>,
    #[serde(default)]
    pub bcc: Vec<String>,
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub in_reply_to: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
    /// Local file paths, attached in this order.
    #[serde(default)]
    pub attachments: Vec<String>,
}

impl SendEmailRequest {
    pub fn validate(&self) -> Result<()> {
        if self.to.is_empty() {
            return Err(MailError::InvalidRequest(
                "at least one recipient is required".to_string(),
            ));
        }
        if self.to.iter().any(|address| address.trim().is_empty()) {
            return Err(MailError::InvalidRequest(
                "recipient addresses must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub max_results: Option<u32>,
    #[serde(default)]
    pub page_token: Option<String>,
    /// When set, sent mail is excluded server-side by extending the query
    /// with `-in:sent`. Client-side post-filtering would be wrong under
    /// pagination, so it is never done here.
    #[serde(default)]
    pub exclude_sent: bool,
}

impl SearchRequest {
    pub const DEFAULT_MAX_RESULTS: u32 = 10;

    pub fn effective_query(&self) -> String {
        if self.exclude_sent {
            if self.query.is_empty() {
                "-in:sent".to_string()
            } else {
                format!("{} -in:sent", self.query)
            }
        } else {
            self.query.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let max_results = self.max_results.unwrap_or(Self::DEFAULT_MAX_RESULTS);
        if !(1..=100).contains(&max_results) {
            return Err(MailError::InvalidRequest(
                "max_results must be between 1 and 100".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadMessageRequest {
    pub message_id: String,
    #[serde(default)]
    pub html_offset: Option<usize>,
    #[serde(default)]
    pub html_limit: Option<usize>,
}

impl ReadMessageRequest {
    pub const DEFAULT_HTML_LIMIT: usize = 10_000;

    pub fn validate(&self) -> Result<()> {
        if self.message_id.trim().is_empty() {
            return Err(MailError::InvalidRequest(
                "message_id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteMessageRequest {
    pub message_id: String,
}

impl DeleteMessageRequest {
    pub fn validate(&self) -> Result<()> {
        if self.message_id.trim().is_empty() {
            return Err(MailError::InvalidRequest(
                "message_id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModifyLabelsRequest {
    pub message_id: String,
    #[serde(default)]
    pub add_label_ids: Vec<String>,
    #[serde(default)]
    pub remove_label_ids: Vec<String>,
}

impl ModifyLabelsRequest {
    pub fn validate(&self) -> Result<()> {
        if self.message_id.trim().is_empty() {
            return Err(MailError::InvalidRequest(
                "message_id must not be empty".to_string(),
            ));
        }
        if self.add_label_ids.is_empty() && self.remove_label_ids.is_empty() {
            return Err(MailError::InvalidRequest(
                "nothing to modify: no label ids given".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelRequest {
    pub name: String,
    #[serde(default = "default_message_list_visibility")]
    pub message_list_visibility: String,
    #[serde(default = "default_label_list_visibility")]
    pub label_list_visibility: String,
}

fn default_message_list_visibility() -> String {
    "show".to_string()
}

fn default_label_list_visibility() -> String {
    "labelShow".to_string()
}

impl LabelRequest {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(MailError::InvalidRequest(
                "label name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// --- Responses ---

#[derive(Debug, Clone, Serialize)]
pub struct SendEmailResponse {
    pub message_id: String,
    pub thread_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateDraftResponse {
    pub draft_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageSummary {
    pub id: String,
    pub thread_id: Option<String>,
    pub subject: String,
    pub from: String,
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub messages: Vec<MessageSummary>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReadMessageResponse {
    pub text: String,
    #[serde(flatten)]
    pub html: HtmlWindow,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub kind: String,
    pub message: String,
}

/// Normalized per-call outcome handed back to the tool layer; never
/// persisted.
#[derive(Debug, Clone, Serialize)]
pub struct MailOperationResult {
    pub status: OperationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl MailOperationResult {
    pub fn success(remote_id: impl Into<String>) -> Self {
        Self {
            status: OperationStatus::Success,
            remote_id: Some(remote_id.into()),
            error: None,
        }
    }

    pub fn failure(error: &MailError) -> Self {
        Self {
            status: OperationStatus::Failure,
            remote_id: None,
            error: Some(ErrorInfo {
                kind: error.kind().to_string(),
                message: error.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_request_requires_a_recipient() {
        let request = SendEmailRequest {
            to: vec![],
            cc: vec![],
            bcc: vec![],
            subject: "s".to_string(),
            body: "b".to_string(),
            in_reply_to: None,
            thread_id: None,
            attachments: vec![],
        };
        assert_eq!(request.validate().unwrap_err().kind(), "invalid_request");
    }

    #[test]
    fn search_exclusion_is_expressed_in_the_query() {
        let request = SearchRequest {
            query: "from:alice@example.com".to_string(),
            max_results: None,
            page_token: None,
            exclude_sent: true,
        };
        assert_eq!(
            request.effective_query(),
            "from:alice@example.com -in:sent"
        );

        let bare = SearchRequest {
            query: String::new(),
            max_results: None,
            page_token: None,
            exclude_sent: true,
        };
        assert_eq!(bare.effective_query(), "-in:sent");
    }

    #[test]
    fn search_bounds_max_results() {
        let request = SearchRequest {
            query: String::new(),
            max_results: Some(500),
            page_token: None,
            exclude_sent: false,
        };
        assert_eq!(request.validate().unwrap_err().kind(), "invalid_request");
    }

    #[test]
    fn delete_requires_a_message_id() {
        let request = DeleteMessageRequest {
            message_id: " ".to_string(),
        };
        assert_eq!(request.validate().unwrap_err().kind(), "invalid_request");
    }

    #[test]
    fn modify_labels_requires_some_change() {
        let request = ModifyLabelsRequest {
            message_id: "m1".to_string(),
            add_label_ids: vec![],
            remove_label_ids: vec![],
        };
        assert_eq!(request.validate().unwrap_err().kind(), "invalid_request");
    }

    #[test]
    fn request_shapes_deserialize_from_tool_json() {
        let request: SendEmailRequest = serde_json::from_str(
            r#"{"to":["x@example.com"],"subject":"Hi","body":"test","attachments":["a.pdf"]}"#,
        )
        .unwrap();
        assert_eq!(request.to, vec!["x@example.com"]);
        assert_eq!(request.attachments, vec!["a.pdf"]);
        assert!(request.cc.is_empty());

        let label: LabelRequest = serde_json::from_str(r#"{"name":"Receipts"}"#).unwrap();
        assert_eq!(label.message_list_visibility, "show");
        assert_eq!(label.label_list_visibility, "labelShow");
    }

    #[test]
    fn failure_result_carries_kind_and_message() {
        let err = MailError::AuthExpired("revoked".to_string());
        let result = MailOperationResult::failure(&err);
        assert_eq!(result.status, OperationStatus::Failure);
        let info = result.error.unwrap();
        assert_eq!(info.kind, "auth_expired");
        assert!(info.message.contains("revoked"));
    }
}
