//! Text extraction for supported upload formats.

use bytes::Bytes;
use mime::Mime;

use crate::ingestion::IngestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    PlainText,
    Markdown,
    Csv,
    Json,
    Html,
}

impl FileKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" | "text" => Some(Self::PlainText),
            "md" | "markdown" => Some(Self::Markdown),
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }

    pub fn from_mime(raw: &str) -> Option<Self> {
        let parsed: Mime = raw.parse().ok()?;
        match parsed.essence_str().to_ascii_lowercase().as_str() {
            "application/pdf" => Some(Self::Pdf),
            "application/json" => Some(Self::Json),
            "text/plain" => Some(Self::PlainText),
            "text/csv" => Some(Self::Csv),
            "text/html" => Some(Self::Html),
            "text/markdown" | "text/x-markdown" => Some(Self::Markdown),
            _ => None,
        }
    }

    /// Canonical extension used for stored file names.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::PlainText => "txt",
            Self::Markdown => "md",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Html => "html",
        }
    }
}

/// Extracts plain text. PDF parsing runs on the blocking pool.
pub async fn extract_text(
    kind: FileKind,
    bytes: Bytes,
    file_name: &str,
) -> Result<String, IngestError> {
    let text = match kind {
        FileKind::Pdf => {
            let extracted = tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string())
            })
            .await
            .map_err(|e| e.to_string())
            .and_then(|result| result);
            extracted.map_err(|reason| IngestError::Extraction {
                file: file_name.to_string(),
                reason,
            })?
        }
        FileKind::Html => strip_html_tags(&String::from_utf8_lossy(&bytes)),
        FileKind::PlainText | FileKind::Markdown | FileKind::Csv | FileKind::Json => {
            String::from_utf8_lossy(&bytes).into_owned()
        }
    };

    if text.trim().is_empty() {
        return Err(IngestError::EmptyDocument(file_name.to_string()));
    }
    Ok(text)
}

/// Drops markup and collapses whitespace. Script and style bodies are kept as text.
fn strip_html_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    let mut last_was_space = true;

    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                if !last_was_space {
                    out.push(' ');
                    last_was_space = true;
                }
            }
            _ if in_tag => {}
            c if c.is_whitespace() => {
                if !last_was_space {
                    out.push(' ');
                    last_was_space = true;
                }
            }
            c => {
                out.push(c);
                last_was_space = false;
            }
        }
    }

    out.trim().to_string()
}
