use std::path::Path;

use bytes::Bytes;

/// Largest résumé accepted, 5 MiB.
pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

pub const ALLOWED_RESUME_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];

pub const ALLOWED_RESUME_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ResumeError {
    #[error("Please upload your resume")]
    Missing,

    #[error("Only PDF, DOC, and DOCX files are allowed")]
    UnsupportedType,

    #[error("Resume must be 5 MB or smaller")]
    TooLarge { size: usize },
}

/// A file part as received from the client, not yet checked.
#[derive(Debug, Clone, Default)]
pub struct ResumeUpload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub content: Bytes,
}

/// A résumé that passed the type and size policy.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeAttachment {
    pub filename: String,
    pub mime_type: String,
    pub content: Bytes,
    pub size_bytes: usize,
}

impl ResumeUpload {
    /// Applies the résumé policy: allowed extension, allowed MIME type and
    /// the size cap.
    pub fn check(self) -> Result<ResumeAttachment, ResumeError> {
        let filename = self
            .filename
            .as_deref()
            .map(sanitize_filename)
            .unwrap_or_default();

        if self.content.is_empty() {
            return Err(ResumeError::Missing);
        }

        let extension = Path::new(&filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if !ALLOWED_RESUME_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ResumeError::UnsupportedType);
        }

        let mime_type = effective_mime(self.content_type.as_deref(), &filename)
            .ok_or(ResumeError::UnsupportedType)?;

        if !ALLOWED_RESUME_MIME_TYPES.contains(&mime_type.as_str()) {
            return Err(ResumeError::UnsupportedType);
        }

        let size_bytes = self.content.len();
        if size_bytes > MAX_RESUME_BYTES {
            return Err(ResumeError::TooLarge { size: size_bytes });
        }

        Ok(ResumeAttachment {
            filename,
            mime_type,
            content: self.content,
            size_bytes,
        })
    }
}

/// Declared MIME type without parameters, or a guess from the file name when
/// the client sent nothing useful.
fn effective_mime(declared: Option<&str>, filename: &str) -> Option<String> {
    let declared = declared
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| !value.is_empty() && value != "application/octet-stream");

    declared.or_else(|| mime_guess::from_path(filename).first_raw().map(str::to_owned))
}

/// Keeps the last path component of a client supplied file name and drops
/// control characters and quotes.
pub fn sanitize_filename(raw: &str) -> String {
    raw.rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .collect::<String>()
        .trim()
        .to_owned()
}
