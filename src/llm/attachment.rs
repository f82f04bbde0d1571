use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageOutputFormat};
use thiserror::Error;

/// Prefix of every image URL embedded in a request.
pub const JPEG_DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

const JPEG_QUALITY: u8 = 75;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("unsupported or corrupt image: {0}")]
    Codec(#[from] image::ImageError),
    #[error("not a JPEG data URL")]
    NotJpegDataUrl,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Decodes JPEG/PNG bytes and re-encodes them as a baseline JPEG.
///
/// Alpha channels are dropped since JPEG has no transparency.
pub fn to_jpeg(bytes: &[u8]) -> Result<Vec<u8>, ImageError> {
    let decoded = image::load_from_memory(bytes)?;
    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());
    let mut buffer = Vec::new();
    rgb.write_to(
        &mut Cursor::new(&mut buffer),
        ImageOutputFormat::Jpeg(JPEG_QUALITY),
    )?;
    Ok(buffer)
}

pub fn jpeg_data_url(jpeg: &[u8]) -> String {
    format!("{JPEG_DATA_URL_PREFIX}{}", STANDARD.encode(jpeg))
}

/// Inverse of [`jpeg_data_url`].
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, ImageError> {
    let payload = url
        .strip_prefix(JPEG_DATA_URL_PREFIX)
        .ok_or(ImageError::NotJpegDataUrl)?;
    Ok(STANDARD.decode(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, Rgba};

    fn png_bytes(image: DynamicImage) -> Vec<u8> {
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), ImageOutputFormat::Png)
            .expect("png encoding should succeed");
        buffer
    }

    #[test]
    fn data_url_round_trip_preserves_jpeg_bytes() {
        let source = ImageBuffer::from_pixel(16, 12, Rgb([200u8, 40, 40]));
        let jpeg = to_jpeg(&png_bytes(DynamicImage::ImageRgb8(source))).unwrap();

        let url = jpeg_data_url(&jpeg);
        assert!(url.starts_with(JPEG_DATA_URL_PREFIX));
        let decoded = decode_data_url(&url).unwrap();
        assert_eq!(decoded, jpeg);

        let picture = image::load_from_memory(&decoded).unwrap().to_rgb8();
        assert_eq!(picture.dimensions(), (16, 12));
        for pixel in picture.pixels() {
            for (got, want) in pixel.0.iter().zip([200u8, 40, 40]) {
                assert!(got.abs_diff(want) <= 10, "pixel drifted: {pixel:?}");
            }
        }
    }

    #[test]
    fn transparent_png_is_flattened_to_jpeg() {
        let source = ImageBuffer::from_pixel(4, 4, Rgba([10u8, 20, 30, 128]));
        let jpeg = to_jpeg(&png_bytes(DynamicImage::ImageRgba8(source))).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(matches!(to_jpeg(b"not an image"), Err(ImageError::Codec(_))));
    }

    #[test]
    fn foreign_data_urls_are_rejected() {
        assert!(matches!(
            decode_data_url("data:image/png;base64,AAAA"),
            Err(ImageError::NotJpegDataUrl)
        ));
        assert!(matches!(
            decode_data_url("data:image/jpeg;base64,!!"),
            Err(ImageError::Base64(_))
        ));
    }
}
