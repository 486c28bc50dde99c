use super::grayscale::{luma_matrix, luma_plane};
use crate::models::PixelMatrix;

/// Stretch luminance to fill the full [0, 255] range.
///
/// A uniform matrix (max == min) has no range to stretch and comes back
/// unchanged.
pub fn contrast_stretch(src: &PixelMatrix) -> PixelMatrix {
    let gray = luma_plane(src);

    let mut lo = u8::MAX;
    let mut hi = u8::MIN;
    for &v in gray.iter() {
        lo = lo.min(v);
        hi = hi.max(v);
    }

    let range = (hi - lo) as u32;
    if range == 0 {
        return luma_matrix(src, gray.into_owned());
    }

    let stretched = gray
        .iter()
        .map(|&v| ((v - lo) as u32 * 255 / range) as u8)
        .collect();
    luma_matrix(src, stretched)
}

/// Invert every sample (255 - v), keeping the channel layout
pub fn invert(src: &PixelMatrix) -> PixelMatrix {
    let mut out = src.clone();
    for v in out.as_bytes_mut() {
        *v = 255 - *v;
    }
    out
}
