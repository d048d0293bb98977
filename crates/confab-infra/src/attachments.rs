//! Attachment ingestion from the local filesystem.
//!
//! Reads a text file into an [`Attachment`] blob for message composition.
//! Only plain-text media types are accepted; binary formats are rejected
//! before any read happens.

use std::path::Path;

use thiserror::Error;

use confab_types::attachment::{Attachment, ALLOWED_MEDIA_TYPES};

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("unsupported file type: {0} (allowed: text/plain, text/csv, application/json)")]
    UnsupportedType(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Map a file extension to its attachment media type.
fn media_type_for(path: &Path) -> Option<&'static str> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("txt") | Some("text") | Some("md") | Some("log") => Some("text/plain"),
        Some("csv") => Some("text/csv"),
        Some("json") => Some("application/json"),
        _ => None,
    }
}

/// Read a local file into an [`Attachment`].
///
/// The attachment id is `{file_name}-{epoch_ms}` so repeated attachments of
/// the same file stay distinguishable.
pub async fn read_attachment(path: impl AsRef<Path>) -> Result<Attachment, AttachmentError> {
    let path = path.as_ref();
    let media_type = media_type_for(path).ok_or_else(|| {
        AttachmentError::UnsupportedType(
            path.extension()
                .and_then(|e| e.to_str())
                .unwrap_or("<none>")
                .to_string(),
        )
    })?;
    debug_assert!(ALLOWED_MEDIA_TYPES.contains(&media_type));

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AttachmentError::Io {
            path: path.display().to_string(),
            source,
        })?;

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("attachment")
        .to_string();
    let id = format!("{name}-{}", confab_core::sync::now_ms());

    Ok(Attachment {
        id,
        name,
        media_type: media_type.to_string(),
        content,
    })
}
