use std::fs;
use std::io;
use std::path::Path;

use crate::config::MAX_ENCODED_MESSAGE_BYTES;
use crate::error::{MailError, Result};

/// A validated local file ready to be embedded as a message part.
/// Created per send/draft call and discarded afterwards, never cached.
#[derive(Debug, Clone)]
pub struct AttachmentDescriptor {
    pub path: String,
    /// Base name of the original path, used as the part's filename header.
    pub file_name: String,
    /// Size on disk at resolution time.
    pub size: u64,
    pub mime_type: String,
    pub content: Vec<u8>,
}

/// Content type inferred from the file extension. Inference failure is never
/// a reason to fail the send; unknown extensions fall back to a generic
/// binary type.
pub fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "txt" | "log" | "md" => "text/plain",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "zip" => "application/zip",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

/// Size of `len` bytes after base64 encoding: 4 output bytes per 3 input,
/// rounded up. The budget check must use this, not the raw file size.
pub fn encoded_len(len: u64) -> u64 {
    len.div_ceil(3) * 4
}

pub fn resolve(path: &str) -> Result<AttachmentDescriptor> {
    let p = Path::new(path);
    let metadata = match fs::metadata(p) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(MailError::NotFound(path.to_string()))
        }
        Err(e) => return Err(MailError::Unreadable(format!("{path}: {e}"))),
    };
    if !metadata.is_file() {
        return Err(MailError::Unreadable(format!(
            "{path}: not a regular file"
        )));
    }

    // Gate on the size before pulling the content into memory.
    if encoded_len(metadata.len()) > MAX_ENCODED_MESSAGE_BYTES {
        return Err(MailError::SizeExceeded {
            encoded: encoded_len(metadata.len()),
            ceiling: MAX_ENCODED_MESSAGE_BYTES,
        });
    }

    let content = match fs::read(p) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(MailError::NotFound(path.to_string()))
        }
        Err(e) => return Err(MailError::Unreadable(format!("{path}: {e}"))),
    };

    let file_name = p
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("attachment")
        .to_string();

    Ok(AttachmentDescriptor {
        path: path.to_string(),
        file_name,
        size: metadata.len(),
        mime_type: mime_type_for(p).to_string(),
        content,
    })
}

/// Resolves every path in caller order, failing fast on the first error so
/// a half-valid message is never constructed. Order is observable in the
/// resulting attachment parts.
pub fn resolve_all(paths: &[String]) -> Result<Vec<AttachmentDescriptor>> {
    let mut descriptors = Vec::with_capacity(paths.len());
    for path in paths {
        descriptors.push(resolve(path)?);
    }
    Ok(descriptors)
}

/// Pre-flight aggregate check: encoded body plus every encoded attachment
/// must fit under the ceiling. Runs before any network call so oversized
/// requests never waste a round trip.
pub fn check_budget(descriptors: &[AttachmentDescriptor], body_len: u64) -> Result<()> {
    let total = encoded_len(body_len)
        + descriptors
            .iter()
            .map(|d| encoded_len(d.size))
            .sum::<u64>();
    if total > MAX_ENCODED_MESSAGE_BYTES {
        return Err(MailError::SizeExceeded {
            encoded: total,
            ceiling: MAX_ENCODED_MESSAGE_BYTES,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> String {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content).unwrap();
        path.display().to_string()
    }

    #[test]
    fn resolve_reads_size_name_and_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "report.pdf", b"%PDF-1.4 fake");

        let descriptor = resolve(&path).unwrap();
        assert_eq!(descriptor.file_name, "report.pdf");
        assert_eq!(descriptor.size, 13);
        assert_eq!(descriptor.mime_type, "application/pdf");
        assert_eq!(descriptor.content, b"%PDF-1.4 fake");
    }

    #[test]
    fn missing_path_is_not_found() {
        let err = resolve("/no/such/file.bin").unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn unknown_extension_falls_back_to_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "blob.weird", b"data");
        assert_eq!(resolve(&path).unwrap().mime_type, "application/octet-stream");

        let no_extension = write_file(&dir, "noext", b"data");
        assert_eq!(
            resolve(&no_extension).unwrap().mime_type,
            "application/octet-stream"
        );
    }

    #[test]
    fn resolve_all_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(&dir, "a.pdf", b"a");
        let b = write_file(&dir, "b.png", b"b");

        let descriptors = resolve_all(&[a, b]).unwrap();
        let names: Vec<_> = descriptors.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.png"]);
    }

    #[test]
    fn resolve_all_fails_fast_on_first_error() {
        let dir = tempfile::tempdir().unwrap();
        let valid = write_file(&dir, "ok.txt", b"ok");
        let paths = vec![
            valid.clone(),
            "/no/such/file.bin".to_string(),
            valid,
        ];
        let err = resolve_all(&paths).unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn encoded_len_rounds_up_to_four_byte_groups() {
        assert_eq!(encoded_len(0), 0);
        assert_eq!(encoded_len(1), 4);
        assert_eq!(encoded_len(3), 4);
        assert_eq!(encoded_len(4), 8);
        assert_eq!(encoded_len(6), 8);
    }

    fn descriptor_of_size(size: u64) -> AttachmentDescriptor {
        AttachmentDescriptor {
            path: "synthetic.bin".to_string(),
            file_name: "synthetic.bin".to_string(),
            size,
            mime_type: "application/octet-stream".to_string(),
            content: Vec::new(),
        }
    }

    #[test]
    fn budget_accounts_for_base64_expansion() {
        // 19 MB raw expands past 24 MB encoded even though the raw size
        // is under the ceiling.
        let raw = 19 * 1024 * 1024;
        assert!(raw < MAX_ENCODED_MESSAGE_BYTES);
        let err = check_budget(&[descriptor_of_size(raw)], 0).unwrap_err();
        assert_eq!(err.kind(), "size_exceeded");
    }

    #[test]
    fn budget_sums_body_and_all_attachments() {
        let under = check_budget(
            &[descriptor_of_size(1024), descriptor_of_size(2048)],
            4096,
        );
        assert!(under.is_ok());

        let over = check_budget(
            &[
                descriptor_of_size(10 * 1024 * 1024),
                descriptor_of_size(10 * 1024 * 1024),
            ],
            0,
        );
        assert_eq!(over.unwrap_err().kind(), "size_exceeded");
    }

    #[test]
    fn oversized_single_file_is_rejected_before_reading() {
        let descriptor = descriptor_of_size(30 * 1024 * 1024);
        assert_eq!(
            check_budget(&[descriptor], 0).unwrap_err().kind(),
            "size_exceeded"
        );
    }
}
