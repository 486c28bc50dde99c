use super::grayscale::{luma_matrix, luma_plane};
use crate::models::PixelMatrix;

/// Simple global threshold binarization.
/// Samples strictly above `threshold` become white (255), the rest black (0).
pub fn fixed_threshold(src: &PixelMatrix, threshold: u8) -> PixelMatrix {
    let gray = luma_plane(src);
    let binary = gray
        .iter()
        .map(|&v| if v > threshold { 255 } else { 0 })
        .collect();
    luma_matrix(src, binary)
}

/// Local-mean binarization.
///
/// Each pixel is compared with the mean of the `block_size` square window
/// centred on it (clipped at the matrix edges) minus `offset`. When the mean
/// is not above `offset` the mean itself is used.
pub fn adaptive_threshold(src: &PixelMatrix, block_size: usize, offset: u8) -> PixelMatrix {
    let width = src.width();
    let height = src.height();
    let gray = luma_plane(src);
    let integral = integral_image(&gray, width, height);
    let radius = block_size.max(1) / 2;
    let stride = width + 1;

    let mut binary = vec![0u8; width * height];
    for y in 0..height {
        let y0 = y.saturating_sub(radius);
        let y1 = (y + radius).min(height - 1) + 1;
        for x in 0..width {
            let x0 = x.saturating_sub(radius);
            let x1 = (x + radius).min(width - 1) + 1;

            let sum = integral[y1 * stride + x1] + integral[y0 * stride + x0]
                - integral[y0 * stride + x1]
                - integral[y1 * stride + x0];
            let count = ((y1 - y0) * (x1 - x0)) as u64;
            let mean = (sum / count) as u8;

            let threshold = if mean > offset { mean - offset } else { mean };
            let idx = y * width + x;
            binary[idx] = if gray[idx] > threshold { 255 } else { 0 };
        }
    }

    luma_matrix(src, binary)
}

/// Summed-area table with a zero row and column prepended
fn integral_image(gray: &[u8], width: usize, height: usize) -> Vec<u64> {
    let stride = width + 1;
    let mut integral = vec![0u64; stride * (height + 1)];
    for y in 0..height {
        let mut row_sum = 0u64;
        for x in 0..width {
            row_sum += gray[y * width + x] as u64;
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }
    integral
}
