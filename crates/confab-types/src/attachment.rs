//! File attachment types for Confab.
//!
//! Attachments are local text files read into memory and inlined into the
//! composed message as delimited blocks, so the model sees the file content
//! without any upload step.

use serde::{Deserialize, Serialize};

/// Media types accepted for attachment ingestion.
pub const ALLOWED_MEDIA_TYPES: [&str; 3] = ["text/plain", "text/csv", "application/json"];

/// A local file read into an attachable text blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub media_type: String,
    pub content: String,
}

impl Attachment {
    /// Render the attachment as a delimited block for message composition.
    pub fn render(&self) -> String {
        format!(
            "--- Attachment: {} ({}) ---\n{}\n--- End Attachment: {} ---",
            self.name, self.media_type, self.content, self.name
        )
    }
}
