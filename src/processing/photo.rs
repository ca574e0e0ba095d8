// Best-effort portrait extraction. A detected face becomes a padded crop;
// anything short of that degrades to a bounded full-image thumbnail, and an
// unreadable image degrades to no photo at all. This stage never fails the
// pipeline.
use crate::models::FaceBox;
use crate::utils::ExtractionError;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};
use lazy_static::lazy_static;
use log::{debug, warn};

const FACE_PADDING: f32 = 0.25;
const MAX_FALLBACK_DIM: u32 = 1200;
const FACE_JPEG_QUALITY: u8 = 90;
const FALLBACK_JPEG_QUALITY: u8 = 80;

/// Single-best-face detection over a full document image.
pub trait FaceDetector: Send + Sync {
    fn detect_face(&self, image: &DynamicImage) -> Option<FaceBox>;
}

/// Extract the client portrait from the document image as a JPEG data URI.
/// Returns an empty string only when the image itself cannot be read.
pub fn locate_client_photo(image_bytes: &[u8], detector: &dyn FaceDetector) -> String {
    let image = match image::load_from_memory(image_bytes) {
        Ok(image) => image,
        Err(e) => {
            warn!("photo source image failed to load: {}", e);
            return String::new();
        }
    };

    if let Some(face) = detector.detect_face(&image) {
        debug!("face box {:?} on {}x{} image", face, image.width(), image.height());
        match crop_face_region(&image, face) {
            Ok(uri) => return uri,
            Err(e) => warn!("face crop failed, falling back to full image: {}", e),
        }
    }

    match fallback_full_image(&image) {
        Ok(uri) => uri,
        Err(e) => {
            warn!("photo fallback encode failed: {}", e);
            String::new()
        }
    }
}

// Grow the detected box by a quarter of its size on every side, clamp to the
// image, crop and encode.
fn crop_face_region(image: &DynamicImage, face: FaceBox) -> Result<String, ExtractionError> {
    let pad_x = face.width as f32 * FACE_PADDING;
    let pad_y = face.height as f32 * FACE_PADDING;

    let x0 = (face.x as f32 - pad_x).max(0.0) as u32;
    let y0 = (face.y as f32 - pad_y).max(0.0) as u32;
    let x1 = ((face.x + face.width) as f32 + pad_x).min(image.width() as f32) as u32;
    let y1 = ((face.y + face.height) as f32 + pad_y).min(image.height() as f32) as u32;

    if x1 <= x0 || y1 <= y0 {
        return Err(ExtractionError::ImageProcessing(
            "face box collapsed after clamping".to_string(),
        ));
    }

    let cropped = image.crop_imm(x0, y0, x1 - x0, y1 - y0);
    encode_jpeg_data_uri(&cropped, FACE_JPEG_QUALITY)
}

fn fallback_full_image(image: &DynamicImage) -> Result<String, ExtractionError> {
    let bounded = if image.width().max(image.height()) > MAX_FALLBACK_DIM {
        image.resize(MAX_FALLBACK_DIM, MAX_FALLBACK_DIM, FilterType::Triangle)
    } else {
        image.clone()
    };
    encode_jpeg_data_uri(&bounded, FALLBACK_JPEG_QUALITY)
}

fn encode_jpeg_data_uri(image: &DynamicImage, quality: u8) -> Result<String, ExtractionError> {
    let rgb = image.to_rgb8();
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .encode_image(&rgb)
        .map_err(|e| ExtractionError::ImageProcessing(format!("JPEG encode failed: {}", e)))?;

    Ok(format!(
        "data:image/jpeg;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&buffer)
    ))
}

// Fast single-face heuristic: quantized skin-probability lookup, largest
// connected skin region, plausibility checks on size and aspect. The lookup
// table is process-wide state built exactly once.
pub struct SkinRegionDetector;

const DETECT_DIM: u32 = 256;
const MIN_REGION_FRACTION: f32 = 0.02;
const MIN_ASPECT: f32 = 0.3;
const MAX_ASPECT: f32 = 1.8;

lazy_static! {
    // 5 bits per channel, 32768 entries
    static ref SKIN_LUT: Vec<bool> = build_skin_lut();
}

impl SkinRegionDetector {
    pub fn new() -> Self {
        SkinRegionDetector
    }
}

impl Default for SkinRegionDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceDetector for SkinRegionDetector {
    fn detect_face(&self, image: &DynamicImage) -> Option<FaceBox> {
        let small = image.thumbnail(DETECT_DIM, DETECT_DIM);
        let (small_w, small_h) = (small.width(), small.height());
        if small_w == 0 || small_h == 0 {
            return None;
        }

        let rgb = small.to_rgb8();
        let mut mask = GrayImage::new(small_w, small_h);
        for (x, y, pixel) in rgb.enumerate_pixels() {
            let idx = lut_index(pixel.0[0], pixel.0[1], pixel.0[2]);
            if SKIN_LUT[idx] {
                mask.put_pixel(x, y, Luma([255u8]));
            }
        }

        let labels = connected_components(&mask, Connectivity::Eight, Luma([0u8]));

        // Bounding box and area of every labelled region
        let mut regions: std::collections::HashMap<u32, (u32, u32, u32, u32, u32)> =
            std::collections::HashMap::new();
        for (x, y, label) in labels.enumerate_pixels() {
            if label.0[0] == 0 {
                continue;
            }
            let entry = regions
                .entry(label.0[0])
                .or_insert((x, y, x, y, 0));
            entry.0 = entry.0.min(x);
            entry.1 = entry.1.min(y);
            entry.2 = entry.2.max(x);
            entry.3 = entry.3.max(y);
            entry.4 += 1;
        }

        let (min_x, min_y, max_x, max_y, area) =
            regions.into_values().max_by_key(|r| r.4)?;

        let region_w = max_x - min_x + 1;
        let region_h = max_y - min_y + 1;
        let frame_area = (small_w * small_h) as f32;
        if (area as f32) / frame_area < MIN_REGION_FRACTION {
            return None;
        }
        let aspect = region_w as f32 / region_h as f32;
        if !(MIN_ASPECT..=MAX_ASPECT).contains(&aspect) {
            return None;
        }

        // Map back to full-resolution coordinates
        let scale_x = image.width() as f32 / small_w as f32;
        let scale_y = image.height() as f32 / small_h as f32;
        Some(FaceBox {
            x: (min_x as f32 * scale_x) as u32,
            y: (min_y as f32 * scale_y) as u32,
            width: (region_w as f32 * scale_x).ceil() as u32,
            height: (region_h as f32 * scale_y).ceil() as u32,
        })
    }
}

fn lut_index(r: u8, g: u8, b: u8) -> usize {
    (((r >> 3) as usize) << 10) | (((g >> 3) as usize) << 5) | ((b >> 3) as usize)
}

fn build_skin_lut() -> Vec<bool> {
    let mut lut = vec![false; 1 << 15];
    for r5 in 0u16..32 {
        for g5 in 0u16..32 {
            for b5 in 0u16..32 {
                let r = (r5 << 3) as i32;
                let g = (g5 << 3) as i32;
                let b = (b5 << 3) as i32;
                let max = r.max(g).max(b);
                let min = r.min(g).min(b);
                let skin = r > 95
                    && g > 40
                    && b > 20
                    && max - min > 15
                    && (r - g).abs() > 15
                    && r > g
                    && r > b;
                if skin {
                    let idx = ((r5 as usize) << 10) | ((g5 as usize) << 5) | (b5 as usize);
                    lut[idx] = true;
                }
            }
        }
    }
    lut
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use std::io::Cursor;

    struct NoFace;
    impl FaceDetector for NoFace {
        fn detect_face(&self, _image: &DynamicImage) -> Option<FaceBox> {
            None
        }
    }

    struct FixedFace(FaceBox);
    impl FaceDetector for FixedFace {
        fn detect_face(&self, _image: &DynamicImage) -> Option<FaceBox> {
            Some(self.0)
        }
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            image::Rgb([120u8, 140, 160]),
        ));
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn decode_data_uri(uri: &str) -> DynamicImage {
        let payload = uri.strip_prefix("data:image/jpeg;base64,").unwrap();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .unwrap();
        image::load_from_memory(&bytes).unwrap()
    }

    #[test]
    fn test_fallback_caps_longest_dimension() {
        let uri = locate_client_photo(&png_bytes(2400, 1500), &NoFace);
        let photo = decode_data_uri(&uri);
        assert!(photo.width().max(photo.height()) <= 1200);
        // Aspect ratio preserved: 2400x1500 bounds to 1200x750
        assert_eq!((photo.width(), photo.height()), (1200, 750));
    }

    #[test]
    fn test_fallback_keeps_small_images_unscaled() {
        let uri = locate_client_photo(&png_bytes(640, 480), &NoFace);
        let photo = decode_data_uri(&uri);
        assert_eq!((photo.width(), photo.height()), (640, 480));
    }

    #[test]
    fn test_face_crop_is_padded() {
        let face = FaceBox { x: 400, y: 300, width: 200, height: 200 };
        let uri = locate_client_photo(&png_bytes(1000, 800), &FixedFace(face));
        let photo = decode_data_uri(&uri);
        // 25% padding per side: 200 grows to 300 in both dimensions
        assert_eq!((photo.width(), photo.height()), (300, 300));
    }

    #[test]
    fn test_face_crop_clamps_to_image_bounds() {
        let face = FaceBox { x: 0, y: 0, width: 100, height: 100 };
        let uri = locate_client_photo(&png_bytes(500, 400), &FixedFace(face));
        let photo = decode_data_uri(&uri);
        assert_eq!((photo.width(), photo.height()), (125, 125));
    }

    #[test]
    fn test_unreadable_image_yields_empty_photo() {
        assert_eq!(locate_client_photo(b"not an image", &NoFace), "");
    }

    #[test]
    fn test_skin_detector_finds_portrait_block() {
        // Gray frame with a solid skin-tone rectangle in the upper left
        let mut image = RgbImage::from_pixel(400, 300, image::Rgb([60u8, 60, 60]));
        for y in 30..150 {
            for x in 40..140 {
                image.put_pixel(x, y, image::Rgb([210u8, 150, 120]));
            }
        }
        let detector = SkinRegionDetector::new();
        let face = detector
            .detect_face(&DynamicImage::ImageRgb8(image))
            .expect("skin block should be detected");
        // Box lands on the painted region, within quantization tolerance
        assert!(face.x >= 30 && face.x <= 50);
        assert!(face.y >= 20 && face.y <= 40);
        assert!(face.width >= 90 && face.width <= 115);
        assert!(face.height >= 110 && face.height <= 135);
    }

    #[test]
    fn test_skin_detector_ignores_empty_scene() {
        let image = RgbImage::from_pixel(300, 300, image::Rgb([40u8, 90, 200]));
        let detector = SkinRegionDetector::new();
        assert!(detector.detect_face(&DynamicImage::ImageRgb8(image)).is_none());
    }
}
