//! [`SymbolDecoder`] backed by the `rqrr` crate.
//!
//! rqrr exposes a single decode path, so the configuration flags are mapped
//! onto it as follows:
//! - `pure_barcode`: the plane is hard-thresholded at mid-grey before rqrr
//!   sees it, so its own binarization has nothing left to decide
//! - `try_harder`: every detected grid is decoded, not just the first
//! - `also_inverted`: a failed attempt is repeated on the inverted plane
//! - `character_set`: "UTF-8" demands valid UTF-8; otherwise non-UTF-8
//!   payload bytes are read as ISO-8859-1
//!
//! Panics raised inside rqrr are caught and reported as faults.

use super::{DecodeFailure, DecodeOutcome, DecoderConfig, SymbolDecoder};
use crate::models::PixelMatrix;
use crate::utils::grayscale::grayscale;
use rqrr::PreparedImage;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Largest variant (in pixels) handed to rqrr by default
pub const DEFAULT_MAX_PIXELS: usize = 40_000_000;

/// Samples below this are dark in pure-barcode mode
const PURE_DARK_BELOW: u8 = 128;

/// Luminance plane prepared for rqrr
#[derive(Debug, Clone)]
pub struct LumaPlane {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl LumaPlane {
    /// Plane width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Plane height in pixels
    pub fn height(&self) -> usize {
        self.height
    }
}

/// QR reader built on rqrr
#[derive(Debug, Clone)]
pub struct RqrrDecoder {
    max_pixels: usize,
}

impl RqrrDecoder {
    /// Decoder with the default pixel limit
    pub fn new() -> Self {
        Self {
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }

    /// Reject variants larger than `max_pixels` at prepare time
    pub fn with_max_pixels(max_pixels: usize) -> Self {
        Self {
            max_pixels: max_pixels.max(1),
        }
    }

    /// Largest accepted variant, in pixels
    pub fn max_pixels(&self) -> usize {
        self.max_pixels
    }

    fn read(&self, plane: &LumaPlane, config: &DecoderConfig, inverted: bool) -> Result<String, DecodeFailure> {
        let width = plane.width;
        let data = &plane.data;
        let pure = config.pure_barcode;

        let sample = |x: usize, y: usize| {
            let v = data[y * width + x];
            let v = if inverted { 255 - v } else { v };
            if pure {
                if v < PURE_DARK_BELOW { 0 } else { 255 }
            } else {
                v
            }
        };

        let mut img = PreparedImage::prepare_from_greyscale(plane.width, plane.height, sample);
        let grids = img.detect_grids();
        if grids.is_empty() {
            return Err(DecodeFailure::not_found("NoGridFound"));
        }

        let limit = if config.try_harder { grids.len() } else { 1 };
        let mut last = DecodeFailure::not_found("NoGridFound");
        for grid in grids.iter().take(limit) {
            let mut raw = Vec::new();
            match grid.decode_to(&mut raw) {
                Ok(_) => match payload_text(raw, config) {
                    Ok(text) => return Ok(text),
                    Err(failure) => last = failure,
                },
                Err(err) => last = DecodeFailure::not_found(format!("{err:?}")),
            }
        }
        Err(last)
    }

    fn guarded_read(&self, plane: &LumaPlane, config: &DecoderConfig, inverted: bool) -> Result<String, DecodeFailure> {
        panic::catch_unwind(AssertUnwindSafe(|| self.read(plane, config, inverted)))
            .unwrap_or_else(|payload| Err(DecodeFailure::fault(panic_message(payload.as_ref()))))
    }
}

impl Default for RqrrDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolDecoder for RqrrDecoder {
    type Bitmap = LumaPlane;

    fn prepare(&self, matrix: &PixelMatrix) -> Result<LumaPlane, DecodeFailure> {
        if matrix.pixel_count() > self.max_pixels {
            return Err(DecodeFailure::not_found("VariantTooLarge"));
        }
        Ok(LumaPlane {
            width: matrix.width(),
            height: matrix.height(),
            data: grayscale(matrix).into_raw(),
        })
    }

    fn decode(&self, plane: &LumaPlane, config: &DecoderConfig) -> DecodeOutcome {
        let first = match self.guarded_read(plane, config, false) {
            Ok(text) => return DecodeOutcome::Success(text),
            Err(failure) => failure,
        };
        if !config.also_inverted {
            return DecodeOutcome::Failure(first);
        }
        match self.guarded_read(plane, config, true) {
            Ok(text) => DecodeOutcome::Success(text),
            Err(failure) => DecodeOutcome::Failure(failure),
        }
    }
}

fn payload_text(raw: Vec<u8>, config: &DecoderConfig) -> Result<String, DecodeFailure> {
    match String::from_utf8(raw) {
        Ok(text) => Ok(text),
        Err(_) if config.requires_utf8() => Err(DecodeFailure::not_found("EncodingError")),
        // ISO-8859-1 maps each byte to the code point of the same value
        Err(err) => Ok(err.into_bytes().into_iter().map(char::from).collect()),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrcode::{Color, QrCode};

    /// Render `text` with `module` pixels per module and a 4-module quiet zone
    fn synthetic_qr(text: &str, module: usize, light_on_dark: bool) -> PixelMatrix {
        let code = QrCode::new(text.as_bytes()).unwrap();
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
        .unwrap()
    }

    #[test]
    fn test_clean_symbol_decodes() {
        let decoder = RqrrDecoder::new();
        let plane = decoder.prepare(&synthetic_qr("HELLO", 6, false)).unwrap();
        for config in DecoderConfig::STRATEGIES.iter() {
            assert_eq!(
                decoder.decode(&plane, config),
                DecodeOutcome::Success("HELLO".to_string()),
                "config {}",
                config.name
            );
        }
    }

    #[test]
    fn test_also_inverted_reads_light_on_dark() {
        let decoder = RqrrDecoder::new();
        let plane = decoder.prepare(&synthetic_qr("INVERTED", 6, true)).unwrap();
        assert!(decoder.decode(&plane, &DecoderConfig::TRY_HARDER_INVERTED).is_success());
    }

    #[test]
    fn test_blank_image_has_no_grid() {
        let decoder = RqrrDecoder::new();
        let blank = PixelMatrix::from_fn(64, 64, |_, _| 255).unwrap();
        let plane = decoder.prepare(&blank).unwrap();
        match decoder.decode(&plane, &DecoderConfig::MINIMAL) {
            DecodeOutcome::Failure(failure) => {
                assert_eq!(failure.kind, crate::decoder::FailureKind::NotFound);
                assert_eq!(failure.reason, "NoGridFound");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_prepare_rejects_oversized() {
        let decoder = RqrrDecoder::with_max_pixels(100);
        let big = PixelMatrix::from_fn(20, 20, |_, _| 0).unwrap();
        let err = decoder.prepare(&big).unwrap_err();
        assert_eq!(err.reason, "VariantTooLarge");
    }

    #[test]
    fn test_latin1_fallback() {
        let text = payload_text(vec![0x48, 0xE9], &DecoderConfig::MINIMAL).unwrap();
        assert_eq!(text, "H\u{e9}");
        assert!(payload_text(vec![0x48, 0xE9], &DecoderConfig::TRY_HARDER_UTF8).is_err());
    }
}
