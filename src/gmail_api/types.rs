use serde::{Deserialize, Serialize};

/// Body of messages.send: the composed payload plus an optional thread to
/// append to.
#[derive(Debug, Serialize)]
pub struct SendMessageRequest {
    pub raw: String,
    #[serde(rename = "threadId", skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateDraftRequest {
    pub message: SendMessageRequest,
}

#[derive(Debug, Deserialize)]
pub struct SentMessageResponse {
    pub id: String,
    #[serde(rename = "threadId")]
    pub thread_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DraftResponse {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct MessagesListResponse {
    pub messages: Option<Vec<MessageRef>>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessageRef {
    pub id: Option<String>,
    #[serde(rename = "threadId")]
    pub thread_id: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Message {
    pub id: Option<String>,
    pub snippet: Option<String>,
    pub payload: Option<MessagePart>,
    #[serde(rename = "threadId")]
    pub thread_id: Option<String>,
    #[serde(rename = "labelIds")]
    pub label_ids: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MessagePart {
    #[serde(rename = "mimeType")]
    pub mime_type: Option<String>,
    pub headers: Option<Vec<Header>>,
    pub body: Option<MessagePartBody>,
    pub parts: Option<Vec<MessagePart>>,
}

impl MessagePart {
    /// First value of the named header, if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref()?.iter().find_map(|header| {
            if header.name.as_deref() == Some(name) {
                header.value.as_deref()
            } else {
                None
            }
        })
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Header {
    pub name: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MessagePartBody {
    pub data: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LabelsResponse {
    pub labels: Option<Vec<Label>>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Label {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub label_type: Option<String>,
    #[serde(
        rename = "messageListVisibility",
        skip_serializing_if = "Option::is_none"
    )]
    pub message_list_visibility: Option<String>,
    #[serde(
        rename = "labelListVisibility",
        skip_serializing_if = "Option::is_none"
    )]
    pub label_list_visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<LabelColor>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LabelColor {
    #[serde(rename = "textColor", skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(rename = "backgroundColor", skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

/// Body of labels.create / labels.update.
#[derive(Debug, Serialize)]
pub struct LabelSpec {
    pub name: String,
    #[serde(rename = "messageListVisibility")]
    pub message_list_visibility: String,
    #[serde(rename = "labelListVisibility")]
    pub label_list_visibility: String,
}

/// Body of messages.modify.
#[derive(Debug, Serialize)]
pub struct ModifyLabelsBody {
    #[serde(rename = "addLabelIds", skip_serializing_if = "Vec::is_empty")]
    pub add_label_ids: Vec<String>,
    #[serde(rename = "removeLabelIds", skip_serializing_if = "Vec::is_empty")]
    pub remove_label_ids: Vec<String>,
}
