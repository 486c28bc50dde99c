//! Image container boundary: encoded bytes to [`PixelMatrix`].

use crate::error::{DecodeError, Result};
use crate::models::{Channels, PixelMatrix};
use image::{ColorType, DynamicImage, GenericImageView, ImageError};

/// Decode a PNG/JPEG/GIF (or any other format the `image` crate was built
/// with) into a pixel matrix.
///
/// Grey inputs become `Luma`, everything else `Rgb` (alpha is dropped).
pub fn load_from_memory(bytes: &[u8], max_input_bytes: usize) -> Result<PixelMatrix> {
    if bytes.is_empty() {
        return Err(DecodeError::InvalidInput("empty image data".into()));
    }
    if bytes.len() > max_input_bytes {
        return Err(DecodeError::InvalidInput(format!(
            "image is {} bytes, limit is {} bytes",
            bytes.len(),
            max_input_bytes
        )));
    }

    let img = image::load_from_memory(bytes).map_err(map_image_error)?;
    from_dynamic(img)
}

/// Convert an already-decoded image
pub fn from_dynamic(img: DynamicImage) -> Result<PixelMatrix> {
    let (w, h) = img.dimensions();
    let (width, height) = (w as usize, h as usize);
    let matrix = match img.color() {
        ColorType::L8 | ColorType::La8 | ColorType::L16 | ColorType::La16 => {
            PixelMatrix::from_raw(width, height, Channels::Luma, img.to_luma8().into_raw())
        }
        _ => PixelMatrix::from_raw(width, height, Channels::Rgb, img.to_rgb8().into_raw()),
    };
    matrix.ok_or_else(|| DecodeError::InvalidInput(format!("image has zero area ({width}x{height})")))
}

fn map_image_error(err: ImageError) -> DecodeError {
    match err {
        ImageError::Unsupported(e) => DecodeError::UnsupportedFormat(e.to_string()),
        ImageError::Limits(e) => DecodeError::InvalidInput(e.to_string()),
        other => DecodeError::InvalidInput(other.to_string()),
    }
}
