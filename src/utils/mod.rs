//! Image transform primitives
//!
//! Every function here maps one [`PixelMatrix`](crate::PixelMatrix) to a
//! freshly allocated one and never fails for a non-empty input:
//! - Grayscale conversion (RGB to luminance)
//! - Contrast stretch and inversion
//! - Binarization (fixed and adaptive local-mean thresholds)
//! - Sharpening (3x3 kernel)
//! - Nearest-neighbour scaling

pub mod binarization;
pub mod contrast;
pub mod filter;
pub mod grayscale;
pub mod scale;

pub use binarization::{adaptive_threshold, fixed_threshold};
pub use contrast::{contrast_stretch, invert};
pub use filter::sharpen;
pub use grayscale::grayscale;
pub use scale::{scale, scaled_extent};
