//! Fixtures shared by the integration tests and the benches.
#![allow(dead_code)]

use image::{DynamicImage, GrayImage, ImageOutputFormat};
use qr_sieve::{Channels, DecodeFailure, DecodeOutcome, DecoderConfig, PixelMatrix, SymbolDecoder};
use qrcode::{Color, QrCode};
use std::io::Cursor;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Render `text` with `module` pixels per module and a 4-module quiet zone
pub fn synthetic_qr(text: &str, module: usize, light_on_dark: bool) -> PixelMatrix {
    let code = QrCode::new(text.as_bytes()).expect("encodable payload");
    let modules = code.width();
    let colors = code.to_colors();
    let quiet = 4;
    let side = (modules + 2 * quiet) * module;
    let (dark, light) = if light_on_dark { (255, 0) } else { (0, 255) };
    PixelMatrix::from_fn(side, side, |x, y| {
        let (mx, my) = (x / module, y / module);
        if mx < quiet || my < quiet || mx >= modules + quiet || my >= modules + quiet {
            return light;
        }
        match colors[(my - quiet) * modules + (mx - quiet)] {
            Color::Dark => dark,
            Color::Light => light,
        }
    })
    .expect("non-empty symbol")
}

/// Encode a luma matrix as an image container
pub fn encode_luma(matrix: &PixelMatrix, format: ImageOutputFormat) -> Vec<u8> {
    let img = GrayImage::from_raw(
        matrix.width() as u32,
        matrix.height() as u32,
        matrix.as_bytes().to_vec(),
    )
    .expect("luma buffer");
    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("encode");
    bytes
}

pub fn blank(width: usize, height: usize) -> PixelMatrix {
    PixelMatrix::from_fn(width, height, |_, _| 255).expect("non-empty")
}

/// Deterministic noisy RGB frame
pub fn noise_rgb(width: usize, height: usize) -> PixelMatrix {
    let data = (0..width * height * 3)
        .map(|i| (i.wrapping_mul(2654435761) >> 13) as u8)
        .collect();
    PixelMatrix::from_raw(width, height, Channels::Rgb, data).expect("sized buffer")
}

/// Wraps a decoder that cannot resolve symbols in images with a side
/// shorter than `min_side` pixels; such variants fail to prepare.
pub struct MinResolution<D> {
    pub inner: D,
    pub min_side: usize,
}

impl<D: SymbolDecoder> SymbolDecoder for MinResolution<D> {
    type Bitmap = D::Bitmap;

    fn prepare(&self, matrix: &PixelMatrix) -> Result<D::Bitmap, DecodeFailure> {
        if matrix.width().min(matrix.height()) < self.min_side {
            return Err(DecodeFailure::not_found("below minimum resolution"));
        }
        self.inner.prepare(matrix)
    }

    fn decode(&self, bitmap: &D::Bitmap, config: &DecoderConfig) -> DecodeOutcome {
        self.inner.decode(bitmap, config)
    }
}

/// Decoder stub that succeeds on the n-th call in call order.
/// Bitmaps are the variant dimensions.
pub struct NthCallDecoder {
    pub succeed_on: Option<usize>,
    /// Variants wider than this cannot be prepared
    pub max_width: usize,
    pub calls: AtomicUsize,
    pub prepared: Mutex<Vec<(usize, usize)>>,
}

impl NthCallDecoder {
    pub fn new(succeed_on: Option<usize>) -> Self {
        Self {
            succeed_on,
            max_width: usize::MAX,
            calls: AtomicUsize::new(0),
            prepared: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SymbolDecoder for NthCallDecoder {
    type Bitmap = (usize, usize);

    fn prepare(&self, matrix: &PixelMatrix) -> Result<(usize, usize), DecodeFailure> {
        if matrix.width() > self.max_width {
            return Err(DecodeFailure::not_found("too wide"));
        }
        let dims = (matrix.width(), matrix.height());
        self.prepared.lock().expect("lock").push(dims);
        Ok(dims)
    }

    fn decode(&self, _bitmap: &(usize, usize), config: &DecoderConfig) -> DecodeOutcome {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.succeed_on == Some(call) {
            DecodeOutcome::Success(format!("call {call} via {}", config.name))
        } else {
            DecodeOutcome::Failure(DecodeFailure::not_found(format!("miss {call}")))
        }
    }
}
