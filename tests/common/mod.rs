#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};

use agentmail::config::{Config, GMAIL_MODIFY_SCOPE};
use agentmail::credentials::{CredentialSet, CredentialStore};
use agentmail::gmail_api::RetryPolicy;

/// Credential file seeded on disk, pointing its token endpoint at a mock
/// server so refreshes stay local.
pub fn seeded_store(
    dir: &tempfile::TempDir,
    token_uri: &str,
    access_token: &str,
    expires_in_secs: i64,
) -> Arc<CredentialStore> {
    let store = Arc::new(CredentialStore::new(dir.path().join("credentials.json")));
    store
        .save(&CredentialSet {
            access_token: access_token.to_string(),
            refresh_token: "test-refresh-token".to_string(),
            expiry: Utc::now() + Duration::seconds(expires_in_secs),
            scopes: vec![GMAIL_MODIFY_SCOPE.to_string()],
            client_id: "test-client-id".to_string(),
            client_secret: "test-client-secret".to_string(),
            token_uri: token_uri.to_string(),
        })
        .unwrap();
    store
}

pub fn test_config(dir: &tempfile::TempDir, api_base: &str) -> Config {
    Config {
        credentials_path: dir.path().join("credentials.json"),
        client_secret_path: dir.path().join("client_secret.json"),
        api_base: api_base.to_string(),
    }
}

/// Keeps backoff delays negligible in tests.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay_ms: 1,
    }
}
