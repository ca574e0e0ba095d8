use crate::utils::ExtractionError;
use image::imageops::{brighten, contrast};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// Lift a scan toward something Tesseract reads well: grayscale with a mild
/// contrast and brightness push. The photo branch never sees this output;
/// it always works from the original color image.
pub fn preprocess_for_ocr(image_bytes: &[u8]) -> Result<Vec<u8>, ExtractionError> {
    let image = image::load_from_memory(image_bytes)
        .map_err(|e| ExtractionError::ImageProcessing(format!("Failed to load image: {}", e)))?;

    let grayscale = image.grayscale().to_luma8();
    let enhanced = brighten(&contrast(&grayscale, 12.0), 8);

    let mut buffer = Vec::new();
    DynamicImage::ImageLuma8(enhanced)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| {
            ExtractionError::ImageProcessing(format!("Failed to encode processed image: {}", e))
        })?;

    Ok(buffer)
}
