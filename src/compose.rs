use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::engine::Engine;
use uuid::Uuid;

use crate::attachments::AttachmentDescriptor;
use crate::error::{MailError, Result};

/// Structured input for one outbound send or draft. Recipients and
/// attachments are ordered; both orders are observable in the payload.
#[derive(Debug, Clone, Default)]
pub struct OutboundMessage {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub body: String,
    pub in_reply_to: Option<String>,
    pub thread_id: Option<String>,
    pub attachments: Vec<AttachmentDescriptor>,
}

/// The fully assembled message, base64url-encoded the way the Gmail API
/// expects its `raw` field. Send and draft use the identical payload; only
/// the destination operation differs.
#[derive(Debug, Clone)]
pub struct TransportPayload {
    pub raw: String,
    pub thread_id: Option<String>,
}

/// Basic shape check mirroring `^[^\s@]+@[^\s@]+\.[^\s@]+$`: one `@`, no
/// whitespace, and a dotted domain. Not a full RFC 5321 validator.
pub fn is_valid_address(address: &str) -> bool {
    let mut parts = address.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            if local.is_empty()
                || local.chars().any(char::is_whitespace)
                || domain.chars().any(char::is_whitespace)
            {
                return false;
            }
            match domain.find('.') {
                Some(dot) => dot > 0 && dot + 1 < domain.len(),
                None => false,
            }
        }
        _ => false,
    }
}

/// RFC 2047 encoded-word form for headers containing non-ASCII text.
pub fn encode_header(text: &str) -> String {
    if text.is_ascii() {
        text.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(text.as_bytes()))
    }
}

/// Pure transformation from structured input to the transport payload.
/// No I/O and no network, so it can be tested against golden payloads.
///
/// Part order is fixed: text body first, then attachments in caller order.
pub fn compose(message: &OutboundMessage) -> Result<TransportPayload> {
    if message.to.is_empty() {
        return Err(MailError::InvalidRequest(
            "at least one recipient is required".to_string(),
        ));
    }
    for address in message
        .to
        .iter()
        .chain(&message.cc)
        .chain(&message.bcc)
    {
        if !is_valid_address(address) {
            return Err(MailError::InvalidRequest(format!(
                "invalid email address: {address}"
            )));
        }
    }

    let mut mime = String::new();
    mime.push_str(&format!("To: {}\r\n", message.to.join(", ")));
    if !message.cc.is_empty() {
        mime.push_str(&format!("Cc: {}\r\n", message.cc.join(", ")));
    }
    if !message.bcc.is_empty() {
        mime.push_str(&format!("Bcc: {}\r\n", message.bcc.join(", ")));
    }
    mime.push_str(&format!("Subject: {}\r\n", encode_header(&message.subject)));
    if let Some(parent) = &message.in_reply_to {
        mime.push_str(&format!("In-Reply-To: {parent}\r\n"));
        mime.push_str(&format!("References: {parent}\r\n"));
    }
    mime.push_str("MIME-Version: 1.0\r\n");

    if message.attachments.is_empty() {
        mime.push_str("Content-Type: text/plain; charset=UTF-8\r\n");
        mime.push_str("\r\n");
        mime.push_str(&message.body);
    } else {
        let boundary = format!("part_{}", Uuid::new_v4().simple());
        mime.push_str(&format!(
            "Content-Type: multipart/mixed; boundary=\"{boundary}\"\r\n\r\n"
        ));

        mime.push_str(&format!("--{boundary}\r\n"));
        mime.push_str("Content-Type: text/plain; charset=UTF-8\r\n\r\n");
        mime.push_str(&message.body);
        mime.push_str("\r\n");

        for attachment in &message.attachments {
            mime.push_str(&format!("--{boundary}\r\n"));
            mime.push_str(&format!("Content-Type: {}\r\n", attachment.mime_type));
            mime.push_str("Content-Transfer-Encoding: base64\r\n");
            mime.push_str(&format!(
                "Content-Disposition: attachment; filename=\"{}\"\r\n\r\n",
                attachment.file_name
            ));
            mime.push_str(&wrap_base64(&STANDARD.encode(&attachment.content)));
            mime.push_str("\r\n");
        }
        mime.push_str(&format!("--{boundary}--\r\n"));
    }

    Ok(TransportPayload {
        raw: URL_SAFE_NO_PAD.encode(mime.as_bytes()),
        thread_id: message.thread_id.clone(),
    })
}

/// Folds base64 output at the RFC 2045 76-character line limit.
fn wrap_base64(encoded: &str) -> String {
    let mut wrapped = String::with_capacity(encoded.len() + encoded.len() / 76 * 2 + 2);
    let mut start = 0;
    while start < encoded.len() {
        let end = (start + 76).min(encoded.len());
        wrapped.push_str(&encoded[start..end]);
        wrapped.push_str("\r\n");
        start = end;
    }
    wrapped
}
