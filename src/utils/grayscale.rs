/// Luminance reduction
/// Y = 0.299*R + 0.587*G + 0.114*B
/// Uses fast integer arithmetic: Y = (77*R + 150*G + 29*B) >> 8
use crate::models::{Channels, PixelMatrix};
use rayon::prelude::*;

/// Coefficients for grayscale conversion: Y = (77*R + 150*G + 29*B) >> 8.
/// They sum to 256, so equal channels map to themselves and white stays 255.
const COEF_R: u32 = 77;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

/// Rows below this size are converted on the calling thread
const PARALLEL_MIN_PIXELS: usize = 64 * 1024;

/// Luminance of a single RGB sample
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    ((COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8) as u8
}

/// Convert a matrix to single-channel luminance.
///
/// Luma input is copied unchanged. Large RGB inputs are processed row by
/// row in parallel.
pub fn grayscale(src: &PixelMatrix) -> PixelMatrix {
    match src.channels() {
        Channels::Luma => src.clone(),
        Channels::Rgb => {
            let width = src.width();
            let rgb = src.as_bytes();
            let mut gray = vec![0u8; src.pixel_count()];

            let convert_row = |(y, row): (usize, &mut [u8])| {
                let row_start = y * width * 3;
                for (x, out) in row.iter_mut().enumerate() {
                    let idx = row_start + x * 3;
                    *out = luminance(rgb[idx], rgb[idx + 1], rgb[idx + 2]);
                }
            };

            if src.pixel_count() >= PARALLEL_MIN_PIXELS {
                gray.par_chunks_mut(width).enumerate().for_each(convert_row);
            } else {
                gray.chunks_mut(width).enumerate().for_each(convert_row);
            }

            luma_matrix(src, gray)
        }
    }
}

/// Luminance plane of any matrix, borrowing when it is already Luma
pub(crate) fn luma_plane(src: &PixelMatrix) -> std::borrow::Cow<'_, [u8]> {
    match src.channels() {
        Channels::Luma => std::borrow::Cow::Borrowed(src.as_bytes()),
        Channels::Rgb => std::borrow::Cow::Owned(grayscale(src).into_raw()),
    }
}

/// Wrap a luminance buffer with the extent of `like`
pub(crate) fn luma_matrix(like: &PixelMatrix, data: Vec<u8>) -> PixelMatrix {
    like.luma_with(data)
}
