use std::env;
use std::path::PathBuf;

/// Gmail REST API base URL.
pub const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";

/// Logical ceiling for an outbound message after transport encoding.
/// Gmail enforces a 25 MB hard limit; staying at 24 MB leaves headroom for
/// MIME framing and headers.
pub const MAX_ENCODED_MESSAGE_BYTES: u64 = 24 * 1024 * 1024;

/// OAuth scope granting read, send, and label-modify access.
pub const GMAIL_MODIFY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.modify";

/// Fixed loopback port for the one-time interactive consent callback.
pub const OAUTH_CALLBACK_PORT: u16 = 8080;

/// Per-request deadline so no token refresh or send blocks indefinitely.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Where the OAuth token set is persisted between runs.
    pub credentials_path: PathBuf,
    /// OAuth client metadata downloaded from the provider console.
    pub client_secret_path: PathBuf,
    /// Mail API base URL, overridable for tests.
    pub api_base: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            credentials_path: env::var("GMAIL_CREDENTIALS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("credentials.json")),
            client_secret_path: env::var("GMAIL_OAUTH_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("client_secret.json")),
            api_base: env::var("GMAIL_API_BASE").unwrap_or_else(|_| GMAIL_API_BASE.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_working_directory() {
        let config = Config {
            credentials_path: PathBuf::from("credentials.json"),
            client_secret_path: PathBuf::from("client_secret.json"),
            api_base: GMAIL_API_BASE.to_string(),
        };
        assert!(config.api_base.starts_with("https://gmail.googleapis.com"));
    }

    #[test]
    fn ceiling_is_below_remote_hard_limit() {
        assert!(MAX_ENCODED_MESSAGE_BYTES < 25 * 1024 * 1024);
    }
}
