//! Gmail adapter for tool-calling agents.
//!
//! The crate wires five pieces together: a file-backed [`credentials`]
//! store, a token [`auth`] refresher, an [`attachments`] resolver, a pure
//! message [`compose`]r, and an authenticated [`gmail_api`] client. The
//! [`ops::Mailbox`] facade exposes the mailbox operations (send, draft,
//! search, read, delete, label management) that the agent-facing layer
//! dispatches into.

pub mod attachments;
pub mod auth;
pub mod compose;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gmail_api;
pub mod ops;
pub mod requests;

pub use config::Config;
pub use error::{MailError, Result};
pub use ops::Mailbox;
