use base64::engine::general_purpose::URL_SAFE;
use base64::engine::Engine;

use super::types::MessagePart;

/// Decodes Gmail's base64url body data, re-adding the padding the API
/// strips before decoding.
pub fn decode_base64url(data: &str) -> Option<String> {
    let padding = "=".repeat((4 - data.len() % 4) % 4);
    let padded = format!("{data}{padding}");
    let bytes = URL_SAFE.decode(padded).ok()?;
    String::from_utf8(bytes).ok()
}

/// Walks the (possibly nested) MIME tree and concatenates every plain-text
/// and HTML body found, in document order.
pub fn extract_bodies(payload: &MessagePart) -> (String, String) {
    let mut text = String::new();
    let mut html = String::new();
    collect_bodies(payload, &mut text, &mut html);
    (text, html)
}

fn collect_bodies(part: &MessagePart, text: &mut String, html: &mut String) {
    if let Some(data) = part.body.as_ref().and_then(|body| body.data.as_ref()) {
        if let Some(content) = decode_base64url(data) {
            match part.mime_type.as_deref() {
                Some("text/plain") => text.push_str(&content),
                Some("text/html") => html.push_str(&content),
                _ => {}
            }
        }
    }
    if let Some(parts) = &part.parts {
        for sub in parts {
            collect_bodies(sub, text, html);
        }
    }
}

/// One window of a potentially large HTML body. Agents page through long
/// bodies with repeated reads instead of receiving megabytes at once.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct HtmlWindow {
    pub html: String,
    pub truncated: bool,
    pub next_offset: Option<usize>,
}

/// Slices `html` at character offsets `[offset, offset + limit)`.
pub fn window_html(html: &str, offset: usize, limit: usize) -> HtmlWindow {
    let total_chars = html.chars().count();
    let window: String = html.chars().skip(offset).take(limit).collect();
    let end = offset.saturating_add(limit);
    let truncated = total_chars > end;
    HtmlWindow {
        html: window,
        truncated,
        next_offset: truncated.then_some(end),
    }
}
