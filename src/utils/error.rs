use thiserror::Error;

/// Errors raised while turning an uploaded document into an extracted record.
///
/// `Conversion` and `Recognition` abort the whole call for that upload.
/// Everything downstream of recognition degrades to empty fields instead of
/// erroring, so no other stage-specific variants exist.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("document conversion error: {0}")]
    Conversion(String),
    #[error("text recognition error: {0}")]
    Recognition(String),
    #[error("image processing error: {0}")]
    ImageProcessing(String),
    #[error("IO error: {0}")]
    Io(String),
}
