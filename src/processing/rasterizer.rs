use crate::utils::ExtractionError;
use image::ImageFormat;
use log::debug;
use pdfium_render::prelude::*;
use std::io::Cursor;

/// Fixed upscale applied when rendering a PDF page for recognition; scanned
/// visas arrive as letter-size pages whose intrinsic resolution is too low
/// for reliable OCR.
pub const RASTER_SCALE: f32 = 2.0;

/// Conversion of a multi-page document container into a single still image
/// of its first page.
pub trait PageRasterizer: Send + Sync {
    fn rasterize_first_page(&self, pdf_bytes: &[u8]) -> Result<Vec<u8>, ExtractionError>;
}

/// pdfium-backed rasterizer. Any failure here is fatal for the upload being
/// processed; there is no retry.
pub struct PdfiumRasterizer {
    scale: f32,
}

impl PdfiumRasterizer {
    pub fn new() -> Self {
        PdfiumRasterizer { scale: RASTER_SCALE }
    }
}

impl Default for PdfiumRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn rasterize_first_page(&self, pdf_bytes: &[u8]) -> Result<Vec<u8>, ExtractionError> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| {
                ExtractionError::Conversion(format!("Failed to bind pdfium library: {}", e))
            })?;
        let pdfium = Pdfium::new(bindings);

        let document = pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(|e| ExtractionError::Conversion(format!("Failed to load PDF: {}", e)))?;

        let page = document
            .pages()
            .first()
            .map_err(|e| ExtractionError::Conversion(format!("PDF has no readable page: {}", e)))?;

        let width = (page.width().value * self.scale) as i32;
        let height = (page.height().value * self.scale) as i32;
        debug!("rendering PDF page 1 at {}x{}", width, height);

        let bitmap = page
            .render_with_config(
                &PdfRenderConfig::new()
                    .set_target_width(width)
                    .set_target_height(height),
            )
            .map_err(|e| ExtractionError::Conversion(format!("Failed to render page: {}", e)))?;

        let image = bitmap.as_image();
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| {
                ExtractionError::Conversion(format!("Failed to encode rendered page: {}", e))
            })?;

        Ok(buffer)
    }
}
