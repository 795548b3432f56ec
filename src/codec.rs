//! Image decode/encode, delegated to the `image` crate.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use thiserror::Error;

use crate::format::TargetFormat;

pub const JPEG_QUALITY: u8 = 80;

/// The message carries the underlying library text verbatim; the conversion
/// handler compares it against a fixed string.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("{0}")]
    Decode(String),

    #[error("{0}")]
    Encode(String),
}

impl CodecError {
    pub fn message(&self) -> &str {
        match self {
            CodecError::Decode(msg) | CodecError::Encode(msg) => msg,
        }
    }
}

/// Converts raw image bytes into `format`. Implementations are blocking and
/// are driven from a blocking task.
pub trait ImageCodec: Send + Sync + 'static {
    fn convert(&self, bytes: &[u8], format: TargetFormat) -> Result<Vec<u8>, CodecError>;
}

/// Default codec backed by the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterCodec;

impl ImageCodec for RasterCodec {
    fn convert(&self, bytes: &[u8], format: TargetFormat) -> Result<Vec<u8>, CodecError> {
        let img = decode_image(bytes)?;
        encode_image(&img, format)
    }
}

/// Decodes `bytes`, guessing the source format from its content.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, CodecError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CodecError::Decode(e.to_string()))?;

    reader.decode().map_err(|e| CodecError::Decode(e.to_string()))
}

pub fn encode_image(img: &DynamicImage, format: TargetFormat) -> Result<Vec<u8>, CodecError> {
    let mut buf = Cursor::new(Vec::new());

    match format {
        TargetFormat::Jpg | TargetFormat::Jpeg => {
            // JPEG carries no alpha channel
            let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
            img.to_rgb8()
                .write_with_encoder(encoder)
                .map_err(|e| CodecError::Encode(e.to_string()))?;
        }
        TargetFormat::Png => {
            let widened;
            let img = match img {
                DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
                    widened = DynamicImage::ImageRgba16(img.to_rgba16());
                    &widened
                }
                other => other,
            };
            img.write_to(&mut buf, ImageFormat::Png)
                .map_err(|e| CodecError::Encode(e.to_string()))?;
        }
        TargetFormat::Webp => {
            // lossless only
            let encoder = WebPEncoder::new_lossless(&mut buf);
            let result = if img.color().has_alpha() {
                img.to_rgba8().write_with_encoder(encoder)
            } else {
                img.to_rgb8().write_with_encoder(encoder)
            };
            result.map_err(|e| CodecError::Encode(e.to_string()))?;
        }
    }

    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn sample_png() -> Vec<u8> {
        let img = RgbImage::from_fn(12, 7, |x, y| Rgb([(x * 20) as u8, (y * 30) as u8, 128]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_convert_to_jpeg() {
        let out = RasterCodec.convert(&sample_png(), TargetFormat::Jpeg).unwrap();
        // SOI marker
        assert_eq!(&out[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_convert_to_jpg() {
        let out = RasterCodec.convert(&sample_png(), TargetFormat::Jpg).unwrap();
        assert_eq!(&out[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_convert_to_png() {
        let out = RasterCodec.convert(&sample_png(), TargetFormat::Png).unwrap();
        assert_eq!(&out[0..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_convert_to_webp() {
        let out = RasterCodec.convert(&sample_png(), TargetFormat::Webp).unwrap();
        assert_eq!(&out[0..4], b"RIFF");
        assert_eq!(&out[8..12], b"WEBP");
    }

    #[test]
    fn test_jpeg_drops_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 40])));
        let out = encode_image(&img, TargetFormat::Jpeg).unwrap();
        let decoded = decode_image(&out).unwrap();
        assert!(!decoded.color().has_alpha());
        assert_eq!((decoded.width(), decoded.height()), (4, 4));
    }

    #[test]
    fn test_webp_keeps_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 5, Rgba([1, 2, 3, 200])));
        let out = encode_image(&img, TargetFormat::Webp).unwrap();
        let decoded = decode_image(&out).unwrap();
        assert_eq!(decoded.to_rgba8().get_pixel(0, 0), &Rgba([1, 2, 3, 200]));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = RasterCodec
            .convert(b"definitely not an image", TargetFormat::Png)
            .unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
        assert!(!err.message().is_empty());
    }

    #[test]
    fn test_decode_empty_fails() {
        assert!(decode_image(&[]).is_err());
    }
}
