use super::grayscale::{luma_matrix, luma_plane};
use crate::models::PixelMatrix;

/// 3x3 sharpening kernel (row-major)
const SHARPEN_KERNEL: [[i32; 3]; 3] = [[0, -1, 0], [-1, 5, -1], [0, -1, 0]];

/// Sharpen edges with a 3x3 kernel.
///
/// Interior pixels are convolved and clamped to [0, 255]; the one-pixel
/// border is copied from the input unchanged.
pub fn sharpen(src: &PixelMatrix) -> PixelMatrix {
    let width = src.width();
    let height = src.height();
    let gray = luma_plane(src);
    let mut out = gray.to_vec();

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            let mut sum = 0i32;
            for (ky, kernel_row) in SHARPEN_KERNEL.iter().enumerate() {
                let row = (y + ky - 1) * width;
                for (kx, &k) in kernel_row.iter().enumerate() {
                    sum += gray[row + x + kx - 1] as i32 * k;
                }
            }
            out[y * width + x] = sum.clamp(0, 255) as u8;
        }
    }

    luma_matrix(src, out)
}
