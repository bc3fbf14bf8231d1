//! Mailbox operations: the layer the tool dispatcher calls into.
//!
//! Each operation validates its request, does all local work (attachment
//! resolution, budget check, composition) before touching the network, and
//! returns a typed response or a [`MailError`](crate::error::MailError)
//! with a stable kind.

use std::sync::Arc;

use tracing::{info, warn};

use crate::attachments;
use crate::auth::{HttpTokenEndpoint, TokenEndpoint};
use crate::compose::{self, OutboundMessage};
use crate::config::Config;
use crate::credentials::CredentialStore;
use crate::error::Result;
use crate::gmail_api::labels::{self, LabelInventory};
use crate::gmail_api::types::{Label, LabelSpec};
use crate::gmail_api::{content, MailClient, RetryPolicy};
use crate::requests::{
    CreateDraftResponse, DeleteMessageRequest, LabelRequest, MessageSummary,
    ModifyLabelsRequest, ReadMessageRequest, ReadMessageResponse, SearchRequest, SearchResponse,
    SendEmailRequest, SendEmailResponse,
};

pub struct Mailbox<E: TokenEndpoint = HttpTokenEndpoint> {
    client: MailClient<E>,
}

impl Mailbox<HttpTokenEndpoint> {
    pub fn new(config: &Config, store: Arc<CredentialStore>) -> Self {
        Self {
            client: MailClient::new(config, store),
        }
    }
}

impl<E: TokenEndpoint> Mailbox<E> {
    pub fn with_client(client: MailClient<E>) -> Self {
        Self { client }
    }

    pub fn with_retry(self, retry: RetryPolicy) -> Self {
        Self {
            client: self.client.with_retry(retry),
        }
    }

    /// Resolves and budget-checks attachments, composes the payload, and
    /// sends it. All validation failures surface before any network call.
    pub async fn send_email(&self, request: SendEmailRequest) -> Result<SendEmailResponse> {
        let payload = self.build_payload(&request)?;
        let sent = self.client.send(&payload).await?;
        info!(message_id = %sent.id, "email sent");
        Ok(SendEmailResponse {
            message_id: sent.id,
            thread_id: sent.thread_id,
        })
    }

    /// Same payload as send; only the destination operation differs.
    pub async fn create_draft(&self, request: SendEmailRequest) -> Result<CreateDraftResponse> {
        let payload = self.build_payload(&request)?;
        let draft = self.client.create_draft(&payload).await?;
        info!(draft_id = %draft.id, "draft created");
        Ok(CreateDraftResponse { draft_id: draft.id })
    }

    fn build_payload(&self, request: &SendEmailRequest) -> Result<compose::TransportPayload> {
        request.validate()?;
        let descriptors = attachments::resolve_all(&request.attachments)?;
        attachments::check_budget(&descriptors, request.body.len() as u64)?;
        compose::compose(&OutboundMessage {
            to: request.to.clone(),
            cc: request.cc.clone(),
            bcc: request.bcc.clone(),
            subject: request.subject.clone(),
            body: request.body.clone(),
            in_reply_to: request.in_reply_to.clone(),
            thread_id: request.thread_id.clone(),
            attachments: descriptors,
        })
    }

    /// Lists matching message ids, then hydrates each summary with a
    /// metadata-format get for Subject/From/Date. Exclusion filters are part
    /// of the server-side query; nothing is filtered locally.
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        request.validate()?;
        let query = request.effective_query();
        let max_results = request
            .max_results
            .unwrap_or(SearchRequest::DEFAULT_MAX_RESULTS);

        let listing = self
            .client
            .list_messages(&query, max_results, request.page_token.as_deref())
            .await?;

        let mut summaries = Vec::new();
        for reference in listing.messages.unwrap_or_default() {
            let Some(id) = reference.id else { continue };
            // A single unreadable message must not sink the whole page.
            let message = match self.client.get_message(&id, "metadata").await {
                Ok(message) => message,
                Err(e) => {
                    warn!(message_id = %id, error = %e, "skipping summary hydration");
                    continue;
                }
            };
            let payload = message.payload.unwrap_or_default();
            summaries.push(MessageSummary {
                id,
                thread_id: reference.thread_id.or(message.thread_id),
                subject: payload.header("Subject").unwrap_or_default().to_string(),
                from: payload.header("From").unwrap_or_default().to_string(),
                date: payload.header("Date").unwrap_or_default().to_string(),
            });
        }

        Ok(SearchResponse {
            messages: summaries,
            next_page_token: listing.next_page_token,
        })
    }

    /// Fetches the full message and extracts its bodies; the HTML side is
    /// returned in a bounded window so huge messages stay pageable.
    pub async fn read_message(&self, request: ReadMessageRequest) -> Result<ReadMessageResponse> {
        request.validate()?;
        let message = self.client.get_message(&request.message_id, "full").await?;
        let payload = message.payload.unwrap_or_default();
        let (text, html) = content::extract_bodies(&payload);

        let offset = request.html_offset.unwrap_or(0);
        let limit = request
            .html_limit
            .unwrap_or(ReadMessageRequest::DEFAULT_HTML_LIMIT);
        Ok(ReadMessageResponse {
            text,
            html: content::window_html(&html, offset, limit),
        })
    }

    pub async fn delete_message(&self, request: DeleteMessageRequest) -> Result<String> {
        request.validate()?;
        self.client.delete_message(&request.message_id).await?;
        info!(message_id = %request.message_id, "message deleted");
        Ok(request.message_id)
    }

    pub async fn modify_labels(&self, request: ModifyLabelsRequest) -> Result<Vec<String>> {
        request.validate()?;
        let message = self
            .client
            .modify_message_labels(
                &request.message_id,
                request.add_label_ids,
                request.remove_label_ids,
            )
            .await?;
        Ok(message.label_ids.unwrap_or_default())
    }

    pub async fn list_labels(&self) -> Result<LabelInventory> {
        labels::list_grouped(&self.client).await
    }

    pub async fn find_label(&self, name: &str) -> Result<Option<Label>> {
        labels::find_by_name(&self.client, name).await
    }

    pub async fn create_label(&self, request: LabelRequest) -> Result<Label> {
        request.validate()?;
        self.client.create_label(&label_spec(&request)).await
    }

    pub async fn get_or_create_label(&self, request: LabelRequest) -> Result<Label> {
        request.validate()?;
        labels::get_or_create(&self.client, &label_spec(&request)).await
    }

    pub async fn update_label(&self, id: &str, request: LabelRequest) -> Result<Label> {
        request.validate()?;
        self.client.update_label(id, &label_spec(&request)).await
    }

    pub async fn delete_label(&self, id: &str) -> Result<Label> {
        labels::delete_checked(&self.client, id).await
    }
}

fn label_spec(request: &LabelRequest) -> LabelSpec {
    LabelSpec {
        name: request.name.clone(),
        message_list_visibility: request.message_list_visibility.clone(),
        label_list_visibility: request.label_list_visibility.clone(),
    }
}
