/// Client-upload image compression pipeline
///
/// Decodes an uploaded image, bounds its width, and re-encodes it as JPEG
/// at a configurable quality. Decoding doubles as the only content
/// validation an upload gets before it is persisted.
use crate::error::{GalleryError, GalleryResult};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

/// A compressed, self-contained JPEG payload ready for the store
#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Compress raw image bytes down to `max_width` pixels at `quality`
///
/// Images at or under the width bound keep their dimensions and are only
/// re-encoded. Wider images are scaled so the output width equals
/// `max_width` exactly, with height recomputed to preserve aspect ratio.
/// `quality` is a value in (0, 1] mapped onto the JPEG encoder's 1-100
/// scale.
pub fn compress(file_bytes: &[u8], max_width: u32, quality: f32) -> GalleryResult<CompressedImage> {
    if max_width == 0 {
        return Err(GalleryError::Validation(
            "Maximum width must be positive".to_string(),
        ));
    }
    if !(quality > 0.0 && quality <= 1.0) {
        return Err(GalleryError::Validation(
            "Quality must be in (0, 1]".to_string(),
        ));
    }

    let img = image::load_from_memory(file_bytes)
        .map_err(|e| GalleryError::Decode(format!("Unreadable image data: {}", e)))?;

    let (width, height) = (img.width(), img.height());
    let img = if width > max_width {
        let scaled_height = scale_height(width, height, max_width);
        img.resize_exact(max_width, scaled_height, FilterType::Lanczos3)
    } else {
        img
    };

    // JPEG has no alpha channel
    let rgb = img.to_rgb8();

    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, jpeg_scale(quality));
    rgb.write_with_encoder(encoder)
        .map_err(|e| GalleryError::Internal(format!("Failed to encode image: {}", e)))?;

    Ok(CompressedImage {
        width: rgb.width(),
        height: rgb.height(),
        data: buf,
    })
}

/// Recompute height for a width-bounded scale, rounding to nearest
fn scale_height(width: u32, height: u32, max_width: u32) -> u32 {
    let scaled = (height as u64 * max_width as u64 + width as u64 / 2) / width as u64;
    (scaled as u32).max(1)
}

/// Map a (0, 1] quality value onto the encoder's 1-100 scale
fn jpeg_scale(quality: f32) -> u8 {
    ((quality * 100.0).round() as u8).clamp(1, 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    /// Textured fixture so JPEG output sizes are not trivially small
    fn test_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                (x % 251) as u8,
                (y % 241) as u8,
                ((x * y) % 253) as u8,
            ])
        })
    }

    fn encode(img: &RgbImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buf), format)
            .unwrap();
        buf
    }

    #[test]
    fn test_wide_image_scaled_to_max_width() {
        let input = encode(&test_image(1600, 1200), ImageFormat::Png);

        let out = compress(&input, 800, 0.8).unwrap();
        assert_eq!(out.width, 800);
        // 1600x1200 halved
        assert_eq!(out.height, 600);
    }

    #[test]
    fn test_aspect_ratio_preserved_within_rounding() {
        let input = encode(&test_image(1000, 707), ImageFormat::Png);

        let out = compress(&input, 300, 0.8).unwrap();
        assert_eq!(out.width, 300);

        let input_ratio = 707.0 / 1000.0;
        let output_ratio = out.height as f64 / out.width as f64;
        assert!((input_ratio - output_ratio).abs() < 0.01);
    }

    #[test]
    fn test_narrow_image_keeps_dimensions() {
        let input = encode(&test_image(640, 480), ImageFormat::Png);

        let out = compress(&input, 800, 0.6).unwrap();
        assert_eq!(out.width, 640);
        assert_eq!(out.height, 480);
    }

    #[test]
    fn test_exact_width_keeps_dimensions() {
        let input = encode(&test_image(800, 600), ImageFormat::Png);

        let out = compress(&input, 800, 0.6).unwrap();
        assert_eq!(out.width, 800);
        assert_eq!(out.height, 600);
    }

    #[test]
    fn test_undecodable_input_is_decode_error() {
        let result = compress(b"definitely not an image", 800, 0.6);
        assert!(matches!(result, Err(GalleryError::Decode(_))));
    }

    #[test]
    fn test_quality_out_of_range_rejected() {
        let input = encode(&test_image(100, 100), ImageFormat::Png);

        assert!(matches!(
            compress(&input, 800, 0.0),
            Err(GalleryError::Validation(_))
        ));
        assert!(matches!(
            compress(&input, 800, 1.2),
            Err(GalleryError::Validation(_))
        ));
    }

    #[test]
    fn test_zero_max_width_rejected() {
        let input = encode(&test_image(100, 100), ImageFormat::Png);
        assert!(matches!(
            compress(&input, 0, 0.6),
            Err(GalleryError::Validation(_))
        ));
    }

    #[test]
    fn test_2000px_jpeg_compresses_to_800_and_shrinks() {
        let input = encode(&test_image(2000, 1000), ImageFormat::Jpeg);

        let out = compress(&input, 800, 0.6).unwrap();
        assert_eq!(out.width, 800);
        assert_eq!(out.height, 400);
        assert!(
            out.data.len() < input.len(),
            "expected {} < {}",
            out.data.len(),
            input.len()
        );
    }

    #[test]
    fn test_output_is_valid_jpeg() {
        let input = encode(&test_image(400, 300), ImageFormat::Png);

        let out = compress(&input, 800, 0.6).unwrap();
        let reloaded = image::load_from_memory(&out.data).unwrap();
        assert_eq!(reloaded.width(), 400);
        assert_eq!(reloaded.height(), 300);
    }
}
