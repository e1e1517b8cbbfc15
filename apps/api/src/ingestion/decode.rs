//! Upload payload decoding: raw base64 or `data:<mime>;base64,<payload>` URLs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;

use crate::ingestion::IngestError;

#[derive(Debug, Clone)]
pub struct DecodedUpload {
    pub bytes: Bytes,
    /// MIME type declared by a data URL, if any.
    pub mime: Option<String>,
}

pub fn decode_upload(content: &str) -> Result<DecodedUpload, IngestError> {
    let (mime, payload) = split_data_url(content.trim());

    // Line-wrapped base64 is common from browsers and CLI tools.
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(IngestError::EmptyContent);
    }

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| IngestError::Decode(e.to_string()))?;
    if bytes.is_empty() {
        return Err(IngestError::EmptyContent);
    }

    Ok(DecodedUpload {
        bytes: Bytes::from(bytes),
        mime,
    })
}

/// Splits `data:<mime>;base64,<payload>` into its MIME type and payload.
/// Anything else is treated as a bare payload.
fn split_data_url(content: &str) -> (Option<String>, &str) {
    let Some(rest) = content.strip_prefix("data:") else {
        return (None, content);
    };
    let Some((header, payload)) = rest.split_once(',') else {
        return (None, content);
    };
    let mime = header
        .split(';')
        .next()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string);
    (mime, payload)
}
