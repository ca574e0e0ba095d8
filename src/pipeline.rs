use crate::models::{DocumentType, ExtractedRecord};
use crate::processing::{
    classify_document, decode_mrz, extract_birth_date, extract_full_name,
    extract_passport_number, extract_visa_number, locate_client_photo, preprocess_for_ocr,
    resolve_passport_name, synthesize_passport_email, synthesize_visa_email, FaceDetector,
    PageRasterizer, PdfiumRasterizer, SkinRegionDetector, TesseractRecognizer, TextRecognizer,
};
use crate::utils::ExtractionError;
use log::{debug, info, warn};

/// One extraction call per uploaded file: rasterize if needed, recognize,
/// classify, decode or pattern-extract, locate the portrait, derive the
/// email, and hand back one fully shaped record.
pub struct ExtractionPipeline {
    rasterizer: Box<dyn PageRasterizer>,
    recognizer: Box<dyn TextRecognizer>,
    detector: Box<dyn FaceDetector>,
}

impl ExtractionPipeline {
    pub fn new() -> Self {
        Self::with_collaborators(
            Box::new(PdfiumRasterizer::new()),
            Box::new(TesseractRecognizer::new()),
            Box::new(SkinRegionDetector::new()),
        )
    }

    pub fn with_collaborators(
        rasterizer: Box<dyn PageRasterizer>,
        recognizer: Box<dyn TextRecognizer>,
        detector: Box<dyn FaceDetector>,
    ) -> Self {
        ExtractionPipeline {
            rasterizer,
            recognizer,
            detector,
        }
    }

    /// Process one uploaded document. Rasterization and recognition failures
    /// abort the call; every later stage degrades to empty fields instead.
    pub fn extract(&self, file_bytes: &[u8]) -> Result<ExtractedRecord, ExtractionError> {
        let image = if is_pdf(file_bytes) {
            info!("uploaded file is a PDF, rasterizing first page");
            self.rasterizer.rasterize_first_page(file_bytes)?
        } else {
            file_bytes.to_vec()
        };

        let ocr_input = match preprocess_for_ocr(&image) {
            Ok(processed) => processed,
            Err(e) => {
                warn!("preprocessing failed, recognizing the raw image: {}", e);
                image.clone()
            }
        };

        let text = self.recognizer.recognize(&ocr_input)?;
        let document_type = classify_document(&text);
        info!("document classified as {:?}", document_type);

        let mut record = match document_type {
            DocumentType::Passport => assemble_passport_record(&text),
            DocumentType::Visa => assemble_visa_record(&text),
        };

        record.client_photo = locate_client_photo(&image, self.detector.as_ref());
        Ok(record)
    }
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF")
}

fn assemble_passport_record(text: &str) -> ExtractedRecord {
    let mrz = decode_mrz(text);
    if mrz.is_none() {
        debug!("no MRZ block found, relying on pattern extraction");
    }

    let full_name = resolve_passport_name(text, mrz.as_ref());
    let passport_number = mrz
        .as_ref()
        .map(|m| m.passport_number.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| extract_passport_number(text));
    let birth_date = mrz
        .as_ref()
        .map(|m| m.date_of_birth.clone())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| extract_birth_date(text));
    let email = synthesize_passport_email(mrz.as_ref(), &full_name);

    ExtractedRecord {
        full_name,
        email,
        passport_number,
        // Passports never carry a visa number
        visa_number: String::new(),
        birth_date,
        client_photo: String::new(),
    }
}

fn assemble_visa_record(text: &str) -> ExtractedRecord {
    let full_name = extract_full_name(text);
    let email = synthesize_visa_email(text, &full_name);

    ExtractedRecord {
        full_name,
        email,
        passport_number: extract_passport_number(text),
        visa_number: extract_visa_number(text),
        birth_date: extract_birth_date(text),
        client_photo: String::new(),
    }
}
