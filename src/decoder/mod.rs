//! Symbol decoder boundary
//!
//! The strategy search treats QR symbol reading as a black box behind
//! [`SymbolDecoder`]: a variant is first prepared into the decoder's own
//! bitmap representation, then decoded once per [`DecoderConfig`].

/// Decoder option sets and their fixed order
pub mod config;
/// rqrr-backed implementation
pub mod rqrr_decoder;

pub use config::DecoderConfig;
pub use rqrr_decoder::RqrrDecoder;

use crate::models::PixelMatrix;
use std::fmt;

/// Why a single decode attempt did not produce a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Normal negative result (no symbol, bad ECC, bad encoding, ...)
    NotFound,
    /// The decoder itself broke while handling the input
    Fault,
}

/// Opaque failure report from the decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeFailure {
    /// Normal negative result or decoder breakage
    pub kind: FailureKind,
    /// Reason in the decoder's own vocabulary, passed through unchanged
    pub reason: String,
}

impl DecodeFailure {
    /// Ordinary failure with the decoder's reason
    pub fn not_found(reason: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::NotFound,
            reason: reason.into(),
        }
    }

    /// Decoder breakage, e.g. a caught panic
    pub fn fault(reason: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Fault,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FailureKind::NotFound => write!(f, "{}", self.reason),
            FailureKind::Fault => write!(f, "decoder fault: {}", self.reason),
        }
    }
}

/// Result of one (variant, configuration) attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// Decoded payload text
    Success(String),
    /// No payload from this attempt
    Failure(DecodeFailure),
}

impl DecodeOutcome {
    /// Whether a payload was produced
    pub fn is_success(&self) -> bool {
        matches!(self, DecodeOutcome::Success(_))
    }
}

/// External QR symbol reader
pub trait SymbolDecoder {
    /// Decoder-specific image representation, built once per variant
    type Bitmap;

    /// Convert a variant for decoding. An `Err` makes the search skip the
    /// variant without spending any attempts on it.
    fn prepare(&self, matrix: &PixelMatrix) -> Result<Self::Bitmap, DecodeFailure>;

    /// Run one decode attempt. Must not panic on ordinary input and must
    /// finish in bounded time.
    fn decode(&self, bitmap: &Self::Bitmap, config: &DecoderConfig) -> DecodeOutcome;
}

impl<D: SymbolDecoder + ?Sized> SymbolDecoder for &D {
    type Bitmap = D::Bitmap;

    fn prepare(&self, matrix: &PixelMatrix) -> Result<Self::Bitmap, DecodeFailure> {
        (**self).prepare(matrix)
    }

    fn decode(&self, bitmap: &Self::Bitmap, config: &DecoderConfig) -> DecodeOutcome {
        (**self).decode(bitmap, config)
    }
}
