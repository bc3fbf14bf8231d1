use thiserror::Error;

/// Error taxonomy surfaced to the tool-facing layer.
///
/// Every variant maps to a stable kind tag via [`MailError::kind`] so callers
/// can react programmatically (e.g. trigger re-consent on `auth_expired`)
/// without parsing messages.
#[derive(Debug, Error)]
pub enum MailError {
    /// Credential file or attachment path does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A local file exists but cannot be read.
    #[error("unreadable: {0}")]
    Unreadable(String),

    /// Body plus encoded attachments exceed the outbound size ceiling.
    #[error("message too large: {encoded} bytes after encoding, ceiling is {ceiling}")]
    SizeExceeded { encoded: u64, ceiling: u64 },

    /// Required request fields missing or malformed, caught before any network call.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The refresh token was rejected; a new interactive consent is required.
    #[error("authorization expired: {0}")]
    AuthExpired(String),

    /// Non-retryable remote rejection (4xx other than 401).
    #[error("request rejected (HTTP {status}): {message}")]
    RequestRejected { status: u16, message: String },

    /// Timeouts and 5xx, surfaced only after internal retries are exhausted.
    #[error("network failure after {attempts} attempt(s): {message}")]
    TransientNetwork { attempts: u32, message: String },

    /// Credential persistence failure.
    #[error("credential storage: {0}")]
    Storage(String),
}

impl MailError {
    pub fn kind(&self) -> &'static str {
        match self {
            MailError::NotFound(_) => "not_found",
            MailError::Unreadable(_) => "unreadable",
            MailError::SizeExceeded { .. } => "size_exceeded",
            MailError::InvalidRequest(_) => "invalid_request",
            MailError::AuthExpired(_) => "auth_expired",
            MailError::RequestRejected { .. } => "request_rejected",
            MailError::TransientNetwork { .. } => "transient_network",
            MailError::Storage(_) => "storage",
        }
    }
}

pub type Result<T> = std::result::Result<T, MailError>;
