use crate::utils::ExtractionError;
use log::debug;
use std::io::Write;
use tempfile::NamedTempFile;
use tesseract::Tesseract;

/// Text recognition over a still image. The pipeline only consumes flat
/// text with embedded newlines; layout information is never used.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image_data: &[u8]) -> Result<String, ExtractionError>;
}

/// Tesseract-backed recognizer with a combined Arabic+Latin script hint.
pub struct TesseractRecognizer {
    languages: String,
}

pub const DEFAULT_OCR_LANGUAGES: &str = "ara+eng";

impl TesseractRecognizer {
    pub fn new() -> Self {
        Self::with_languages(DEFAULT_OCR_LANGUAGES)
    }

    pub fn with_languages(languages: &str) -> Self {
        TesseractRecognizer {
            languages: languages.to_string(),
        }
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image_data: &[u8]) -> Result<String, ExtractionError> {
        // Tesseract wants a file path, so stage the image in a temp file
        let mut temp_file = NamedTempFile::new()
            .map_err(|e| ExtractionError::Io(format!("Failed to create temp file: {}", e)))?;
        temp_file
            .write_all(image_data)
            .map_err(|e| ExtractionError::Io(format!("Failed to write temp file: {}", e)))?;

        let image_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| ExtractionError::Io("Temp path is not valid UTF-8".to_string()))?;

        let text = Tesseract::new(None, Some(self.languages.as_str()))
            .map_err(|e| ExtractionError::Recognition(format!("Tesseract init error: {}", e)))?
            .set_image(image_path)
            .map_err(|e| ExtractionError::Recognition(format!("Tesseract set image error: {}", e)))?
            .get_text()
            .map_err(|e| ExtractionError::Recognition(format!("Tesseract error: {}", e)))?;

        debug!("recognized {} characters of text", text.chars().count());
        Ok(text)
    }
}
