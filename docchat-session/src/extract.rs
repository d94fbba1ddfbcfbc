//! Text-extraction seam.
//!
//! Turning raw document bytes into plain text is an external concern
//! (page layout, OCR, and format parsing all live outside this crate).
//! [`TextExtractor`] is the seam callers plug their extractor into;
//! [`Utf8TextExtractor`] is the built-in passthrough for plain text.

use thiserror::Error;

/// The uploaded bytes could not be read as a document.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ExtractionError {
    /// A description of the failure.
    pub message: String,
}

/// Converts raw uploaded bytes into plain UTF-8 text.
///
/// Implementations concatenate pages in order and discard page-break
/// information; the chunker downstream only sees a flat string.
pub trait TextExtractor: Send + Sync {
    /// Extract the document's full text.
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// A [`TextExtractor`] for documents that already are plain UTF-8 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8TextExtractor;

impl TextExtractor for Utf8TextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        String::from_utf8(bytes.to_vec()).map_err(|e| ExtractionError {
            message: format!("document is not valid UTF-8: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        let text = Utf8TextExtractor.extract_text("hello world".as_bytes()).unwrap();
        assert_eq!(text, "hello world");
    }

    #[test]
    fn invalid_utf8_is_an_extraction_error() {
        let err = Utf8TextExtractor.extract_text(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(err.message.contains("not valid UTF-8"));
    }
}
