use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::{Config, GMAIL_MODIFY_SCOPE, OAUTH_CALLBACK_PORT};
use crate::credentials::{CredentialSet, CredentialStore};
use crate::error::{MailError, Result};

/// Refresh proactively when the access token expires within this window.
pub const REFRESH_MARGIN_SECS: i64 = 60;

/// Wire shape of a token grant response (both refresh and consent exchange).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

/// Seam over the OAuth token endpoint so refresh behavior is testable
/// without network access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    async fn refresh(&self, credentials: &CredentialSet) -> Result<TokenResponse>;
}

/// Real refresh-token grant against the provider's token endpoint.
pub struct HttpTokenEndpoint {
    client: reqwest::Client,
}

impl HttpTokenEndpoint {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTokenEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenEndpoint for HttpTokenEndpoint {
    async fn refresh(&self, credentials: &CredentialSet) -> Result<TokenResponse> {
        let response = self
            .client
            .post(&credentials.token_uri)
            .form(&[
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("refresh_token", credentials.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .timeout(std::time::Duration::from_secs(
                crate::config::HTTP_TIMEOUT_SECS,
            ))
            .send()
            .await
            .map_err(|e| MailError::TransientNetwork {
                attempts: 1,
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MailError::TransientNetwork {
                attempts: 1,
                message: e.to_string(),
            })?;

        if !status.is_success() {
            // invalid_grant means the refresh token was revoked or expired;
            // only a new interactive consent can recover from that.
            if body.contains("invalid_grant") {
                return Err(MailError::AuthExpired(body));
            }
            return Err(MailError::RequestRejected {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| MailError::RequestRejected {
            status: status.as_u16(),
            message: format!("undecodable token response: {e}"),
        })
    }
}

/// Keeps the persisted credential set usable: hands out the stored token
/// while it is comfortably valid, otherwise exchanges the refresh token and
/// persists the result before returning it.
pub struct TokenRefresher<E: TokenEndpoint = HttpTokenEndpoint> {
    store: Arc<CredentialStore>,
    endpoint: E,
}

impl<E: TokenEndpoint> TokenRefresher<E> {
    pub fn new(store: Arc<CredentialStore>, endpoint: E) -> Self {
        Self { store, endpoint }
    }

    /// Returns credentials whose access token is valid for at least the
    /// safety margin, refreshing and persisting first when it is not.
    pub async fn get_valid_token(&self) -> Result<CredentialSet> {
        self.ensure_valid(false).await
    }

    /// Refreshes unconditionally. Used after an HTTP 401, which means the
    /// cached expiry was stale.
    pub async fn force_refresh(&self) -> Result<CredentialSet> {
        self.ensure_valid(true).await
    }

    async fn ensure_valid(&self, force: bool) -> Result<CredentialSet> {
        let _guard = self.store.acquire().await;
        let credentials = self.store.load()?;

        if !force && !credentials.expires_within(Duration::seconds(REFRESH_MARGIN_SECS)) {
            return Ok(credentials);
        }

        info!(forced = force, "refreshing access token");
        let response = self.endpoint.refresh(&credentials).await?;

        let mut refreshed = credentials;
        refreshed.access_token = response.access_token;
        refreshed.expiry = Utc::now() + Duration::seconds(response.expires_in);
        // Google omits the refresh token on refresh grants; keep the old one.
        if let Some(refresh_token) = response.refresh_token {
            refreshed.refresh_token = refresh_token;
        }

        self.store.save(&refreshed)?;
        Ok(refreshed)
    }
}

/// One-time interactive consent: opens a loopback listener, sends the user
/// to the provider's consent page, exchanges the returned authorization code
/// for the initial token set, and persists it.
///
/// This runs once per credential set; everything afterwards goes through
/// [`TokenRefresher`].
pub async fn run_consent_flow(config: &Config, store: &CredentialStore) -> Result<CredentialSet> {
    let secret = yup_oauth2::read_application_secret(&config.client_secret_path)
        .await
        .map_err(|e| {
            MailError::NotFound(format!(
                "{}: {e}",
                config.client_secret_path.display()
            ))
        })?;

    let listener = TcpListener::bind(("127.0.0.1", OAUTH_CALLBACK_PORT))
        .await
        .map_err(|e| MailError::Storage(format!("bind loopback callback listener: {e}")))?;
    let redirect_uri = format!("http://localhost:{OAUTH_CALLBACK_PORT}");

    let auth_url = format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
        secret.auth_uri,
        urlencoding::encode(&secret.client_id),
        urlencoding::encode(&redirect_uri),
        urlencoding::encode(GMAIL_MODIFY_SCOPE),
    );

    println!("Open this URL in your browser to authorize mailbox access:\n\n{auth_url}\n");
    info!("waiting for OAuth consent callback on {redirect_uri}");

    let code = wait_for_callback(&listener).await?;

    let client = reqwest::Client::new();
    let response = client
        .post(&secret.token_uri)
        .form(&[
            ("client_id", secret.client_id.as_str()),
            ("client_secret", secret.client_secret.as_str()),
            ("code", code.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri.as_str()),
        ])
        .send()
        .await
        .map_err(|e| MailError::TransientNetwork {
            attempts: 1,
            message: e.to_string(),
        })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| MailError::TransientNetwork {
            attempts: 1,
            message: e.to_string(),
        })?;
    if !status.is_success() {
        return Err(MailError::RequestRejected {
            status: status.as_u16(),
            message: body,
        });
    }
    let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
        MailError::RequestRejected {
            status: status.as_u16(),
            message: format!("undecodable token response: {e}"),
        }
    })?;

    let refresh_token = token.refresh_token.ok_or_else(|| {
        MailError::AuthExpired("consent exchange returned no refresh token".to_string())
    })?;

    let credentials = CredentialSet {
        access_token: token.access_token,
        refresh_token,
        expiry: Utc::now() + Duration::seconds(token.expires_in),
        scopes: vec![GMAIL_MODIFY_SCOPE.to_string()],
        client_id: secret.client_id,
        client_secret: secret.client_secret,
        token_uri: secret.token_uri,
    };

    store.save(&credentials)?;
    info!("consent complete, credentials persisted");
    Ok(credentials)
}

/// Accepts a single loopback connection and extracts the authorization code
/// from the callback request line (`GET /?code=...&scope=... HTTP/1.1`).
async fn wait_for_callback(listener: &TcpListener) -> Result<String> {
    let (stream, _) = listener
        .accept()
        .await
        .map_err(|e| MailError::Storage(format!("accept consent callback: {e}")))?;

    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .await
        .map_err(|e| MailError::Storage(format!("read consent callback: {e}")))?;

    let code = callback_query_param(&request_line, "code");
    let error = callback_query_param(&request_line, "error");

    let (status, message) = if code.is_some() {
        ("200 OK", "Authorization complete. You can close this window.")
    } else {
        ("400 Bad Request", "Authorization failed. Please try again.")
    };
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n<html><body><h1>{message}</h1></body></html>"
    );
    let mut stream = reader.into_inner();
    let _ = stream.write_all(response.as_bytes()).await;

    if let Some(error) = error {
        warn!(error, "consent callback returned an error");
        return Err(MailError::AuthExpired(format!("consent denied: {error}")));
    }
    code.ok_or_else(|| MailError::AuthExpired("no authorization code received".to_string()))
}

fn callback_query_param(request_line: &str, name: &str) -> Option<String> {
    request_line
        .split_whitespace()
        .nth(1)
        .and_then(|path| path.split('?').nth(1))
        .and_then(|query| {
            query.split('&').find_map(|param| {
                let mut parts = param.splitn(2, '=');
                if parts.next() == Some(name) {
                    parts.next().map(|value| value.to_string())
                } else {
                    None
                }
            })
        })
}
