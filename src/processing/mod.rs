pub mod classifier;
pub mod email;
pub mod extractors;
pub mod image;
pub mod mrz;
pub mod ocr;
pub mod photo;
pub mod rasterizer;

pub use classifier::classify_document;
pub use email::{synthesize_passport_email, synthesize_visa_email};
pub use extractors::{
    extract_birth_date, extract_full_name, extract_passport_number, extract_visa_number,
    resolve_passport_name,
};
pub use self::image::preprocess_for_ocr;
pub use mrz::decode_mrz;
pub use ocr::{TesseractRecognizer, TextRecognizer};
pub use photo::{locate_client_photo, FaceDetector, SkinRegionDetector};
pub use rasterizer::{PageRasterizer, PdfiumRasterizer};
