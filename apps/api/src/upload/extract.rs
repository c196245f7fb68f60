//! Document kinds and text extraction for uploaded resumes.

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    PlainText,
    Pdf,
}

impl DocumentKind {
    /// Resolves the kind from the extension after the last `.`; `None` means not allowed.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, extension) = filename.rsplit_once('.')?;
        match extension.to_ascii_lowercase().as_str() {
            "txt" => Some(DocumentKind::PlainText),
            "pdf" => Some(DocumentKind::Pdf),
            _ => None,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            DocumentKind::PlainText => "text/plain; charset=utf-8",
            DocumentKind::Pdf => "application/pdf",
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Error reading text file: {0}")]
    Text(String),

    #[error("Error reading PDF file: {0}")]
    Pdf(String),
}

pub async fn extract_text(kind: DocumentKind, bytes: Bytes) -> Result<String, ExtractError> {
    match kind {
        DocumentKind::PlainText => decode_plain_text(&bytes),
        DocumentKind::Pdf => extract_pdf_text(bytes).await,
    }
}

fn decode_plain_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    String::from_utf8(bytes.to_vec()).map_err(|e| ExtractError::Text(e.to_string()))
}

/// PDF parsing is CPU-bound and `pdf-extract` can panic on malformed input,
/// so it runs on the blocking pool and panics surface as errors.
async fn extract_pdf_text(bytes: Bytes) -> Result<String, ExtractError> {
    let size = bytes.len();
    let result = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string())
    })
    .await
    .map_err(|e| {
        if e.is_panic() {
            ExtractError::Pdf("document could not be parsed".to_string())
        } else {
            ExtractError::Pdf(e.to_string())
        }
    })?;

    let text = result.map_err(ExtractError::Pdf)?;
    debug!("Extracted {} chars from {size}-byte PDF", text.len());
    Ok(text)
}

/// Reduces a client-supplied filename to a safe basename: ASCII alphanumerics,
/// `.`, `_` and `-` only, whitespace folded to `_`. Returns `None` if nothing survives.
pub fn secure_filename(raw: &str) -> Option<String> {
    let basename = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = basename
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Builds a one-page PDF showing each line of `text` in Helvetica.
#[cfg(test)]
pub(crate) fn single_page_pdf(text: &str) -> Vec<u8> {
    let mut content = String::new();
    for (i, line) in text.lines().enumerate() {
        let escaped = line
            .replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)");
        let y = 720 - 16 * i;
        content.push_str(&format!("BT /F1 12 Tf 72 {y} Td ({escaped}) Tj ET\n"));
    }

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{content}endstream",
            content.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }

    let xref_at = pdf.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        xref.push_str(&format!("{offset:010} 00000 n \n"));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
        objects.len() + 1
    ));
    pdf.extend_from_slice(xref.as_bytes());
    pdf
}
