pub mod pixel;

pub use pixel::{Channels, PixelMatrix};
