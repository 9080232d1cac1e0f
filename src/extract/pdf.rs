//! PDF text extraction boundary.
//!
//! Extraction concatenates per-page text in document order. A document that
//! parses but yields only whitespace (scanned pages, no text layer) is a
//! distinct "no text" signal, not an error and not an empty-string success.

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("pdf parse failed: {0}")]
    Parse(String),
}

/// Extract UTF-8 text from a PDF byte stream.
///
/// Returns `Ok(None)` when the document contains no extractable text.
///
/// # Errors
///
/// Returns [`PdfError::Parse`] when the bytes are not a readable PDF.
pub fn extract_text(bytes: &[u8]) -> Result<Option<String>, PdfError> {
    let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| PdfError::Parse(e.to_string()))?;
    Ok(non_blank(text))
}

/// Collapse whitespace-only extraction output into the "no text" signal.
pub(crate) fn non_blank(text: String) -> Option<String> {
    if text.trim().is_empty() { None } else { Some(text) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_a_parse_error() {
        let result = extract_text(b"definitely not a pdf");
        assert!(matches!(result, Err(PdfError::Parse(_))));
    }

    #[test]
    fn blank_output_is_no_text_not_error() {
        assert_eq!(non_blank("   \n\t  ".to_string()), None);
        assert_eq!(non_blank(String::new()), None);
    }

    #[test]
    fn real_text_passes_through() {
        assert_eq!(non_blank("page one\n".to_string()).as_deref(), Some("page one\n"));
    }
}
