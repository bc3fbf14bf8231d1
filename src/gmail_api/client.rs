use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::auth::{HttpTokenEndpoint, TokenEndpoint, TokenRefresher};
use crate::compose::TransportPayload;
use crate::config::{Config, HTTP_TIMEOUT_SECS};
use crate::credentials::CredentialStore;
use crate::error::{MailError, Result};

use super::types::{
    CreateDraftRequest, DraftResponse, Label, LabelSpec, LabelsResponse, Message,
    MessagesListResponse, ModifyLabelsBody, SendMessageRequest, SentMessageResponse,
};

/// Explicit bounded-retry schedule for transient failures (timeouts, 5xx,
/// 429). Non-retryable rejections never consult it.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
        }
    }
}

impl RetryPolicy {
    fn delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms << attempt.min(6))
    }
}

/// Thin authenticated wrapper over the Gmail REST API. Obtains a valid
/// access token from the refresher before every call; on HTTP 401 it forces
/// exactly one refresh and retries once, treating the cached expiry as
/// stale.
pub struct MailClient<E: TokenEndpoint = HttpTokenEndpoint> {
    http: reqwest::Client,
    refresher: TokenRefresher<E>,
    base_url: String,
    retry: RetryPolicy,
}

impl MailClient<HttpTokenEndpoint> {
    pub fn new(config: &Config, store: Arc<CredentialStore>) -> Self {
        Self::with_endpoint(config, store, HttpTokenEndpoint::new())
    }
}

impl<E: TokenEndpoint> MailClient<E> {
    pub fn with_endpoint(config: &Config, store: Arc<CredentialStore>, endpoint: E) -> Self {
        Self {
            http: reqwest::Client::new(),
            refresher: TokenRefresher::new(store, endpoint),
            base_url: config.api_base.trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/users/me/{path}", self.base_url)
    }

    /// Issues one API call with the bounded-retry policy. The token is
    /// validated up front; a 401 response forces a single refresh-and-retry
    /// before the failure is surfaced.
    async fn execute<B: Serialize>(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<String> {
        let mut credentials = self.refresher.get_valid_token().await?;
        let mut refreshed_on_unauthorized = false;
        let mut attempt = 0u32;

        loop {
            let mut request = self
                .http
                .request(method.clone(), url)
                .bearer_auth(&credentials.access_token)
                .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS));
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.retry.max_attempts {
                        return Err(MailError::TransientNetwork {
                            attempts: attempt,
                            message: e.to_string(),
                        });
                    }
                    warn!(attempt, error = %e, "mail API request failed, backing off");
                    sleep(self.retry.delay(attempt)).await;
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                debug!(%status, url, "mail API call succeeded");
                return response.text().await.map_err(|e| MailError::TransientNetwork {
                    attempts: attempt + 1,
                    message: e.to_string(),
                });
            }

            if status == StatusCode::UNAUTHORIZED && !refreshed_on_unauthorized {
                warn!("mail API returned 401, forcing one token refresh");
                refreshed_on_unauthorized = true;
                credentials = self.refresher.force_refresh().await?;
                continue;
            }

            if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                attempt += 1;
                if attempt >= self.retry.max_attempts {
                    let message = response.text().await.unwrap_or_default();
                    return Err(MailError::TransientNetwork {
                        attempts: attempt,
                        message: format!("HTTP {status}: {message}"),
                    });
                }
                warn!(attempt, %status, "mail API transient failure, backing off");
                sleep(self.retry.delay(attempt)).await;
                continue;
            }

            let message = response.text().await.unwrap_or_default();
            return Err(MailError::RequestRejected {
                status: status.as_u16(),
                message,
            });
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let body = self
            .execute::<()>(Method::GET, &self.url(path), query, None)
            .await?;
        decode(&body)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .execute(Method::POST, &self.url(path), &[], Some(body))
            .await?;
        decode(&response)
    }

    pub async fn send(&self, payload: &TransportPayload) -> Result<SentMessageResponse> {
        let request = SendMessageRequest {
            raw: payload.raw.clone(),
            thread_id: payload.thread_id.clone(),
        };
        self.post_json("messages/send", &request).await
    }

    pub async fn create_draft(&self, payload: &TransportPayload) -> Result<DraftResponse> {
        let request = CreateDraftRequest {
            message: SendMessageRequest {
                raw: payload.raw.clone(),
                thread_id: payload.thread_id.clone(),
            },
        };
        self.post_json("drafts", &request).await
    }

    pub async fn list_messages(
        &self,
        query: &str,
        max_results: u32,
        page_token: Option<&str>,
    ) -> Result<MessagesListResponse> {
        let mut params = vec![("maxResults", max_results.to_string())];
        if !query.is_empty() {
            params.push(("q", query.to_string()));
        }
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }
        self.get_json("messages", &params).await
    }

    pub async fn get_message(&self, id: &str, format: &str) -> Result<Message> {
        self.get_json(
            &format!("messages/{id}"),
            &[("format", format.to_string())],
        )
        .await
    }

    pub async fn delete_message(&self, id: &str) -> Result<()> {
        self.execute::<()>(
            Method::DELETE,
            &self.url(&format!("messages/{id}")),
            &[],
            None,
        )
        .await?;
        Ok(())
    }

    pub async fn modify_message_labels(
        &self,
        id: &str,
        add_label_ids: Vec<String>,
        remove_label_ids: Vec<String>,
    ) -> Result<Message> {
        let body = ModifyLabelsBody {
            add_label_ids,
            remove_label_ids,
        };
        self.post_json(&format!("messages/{id}/modify"), &body).await
    }

    pub async fn list_labels(&self) -> Result<Vec<Label>> {
        let response: LabelsResponse = self.get_json("labels", &[]).await?;
        Ok(response.labels.unwrap_or_default())
    }

    pub async fn get_label(&self, id: &str) -> Result<Label> {
        self.get_json(&format!("labels/{id}"), &[]).await
    }

    pub async fn create_label(&self, spec: &LabelSpec) -> Result<Label> {
        self.post_json("labels", spec).await
    }

    pub async fn update_label(&self, id: &str, spec: &LabelSpec) -> Result<Label> {
        let response = self
            .execute(Method::PUT, &self.url(&format!("labels/{id}")), &[], Some(spec))
            .await?;
        decode(&response)
    }

    pub async fn delete_label(&self, id: &str) -> Result<()> {
        self.execute::<()>(
            Method::DELETE,
            &self.url(&format!("labels/{id}")),
            &[],
            None,
        )
        .await?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| MailError::RequestRejected {
        status: 200,
        message: format!("undecodable API response: {e}"),
    })
}
