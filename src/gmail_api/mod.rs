//! Gmail API surface split into logical submodules:
//! - client: authenticated HTTP wrapper with retry and 401 handling
//! - types: wire request/response shapes
//! - labels: label management built on the client
//! - content: MIME body extraction and HTML windowing

pub mod client;
pub mod content;
pub mod labels;
pub mod types;

pub use client::{MailClient, RetryPolicy};
