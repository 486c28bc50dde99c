//! qr_sieve - robust QR code reading for poor-quality images
//!
//! A single input image is expanded into an ordered sequence of
//! preprocessed variants (grayscale, contrast stretch, fixed and adaptive
//! thresholds, inversion, sharpening, enlargement). Each variant is tried
//! against a fixed list of decoder configurations and the first success is
//! returned. Symbol decoding itself is delegated to a [`SymbolDecoder`];
//! the default one is backed by `rqrr`.
//!
//! ```no_run
//! let bytes = std::fs::read("ticket.png").unwrap();
//! match qr_sieve::decode(&bytes) {
//!     Ok(payload) => println!("{payload}"),
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Scan policy (thresholds, scales, budgets) and its environment overrides
pub mod config;
/// Symbol decoder boundary and the rqrr-backed implementation
pub mod decoder;
/// Error taxonomy
pub mod error;
/// Image container decoding
pub mod input;
/// Core data structures (PixelMatrix, Channels)
pub mod models;
/// Strategy search over variants and decoder configurations
pub mod pipeline;
/// Image transform primitives
pub mod utils;
/// Ordered variant generation
pub mod variants;

pub use config::{ScanConfig, SearchMode};
pub use decoder::{DecodeFailure, DecodeOutcome, DecoderConfig, FailureKind, RqrrDecoder, SymbolDecoder};
pub use error::{DecodeError, Result};
pub use models::{Channels, PixelMatrix};
pub use pipeline::{SearchHit, SearchResult, StrategySearch};
pub use variants::{Variant, Variants};

use log::debug;
use std::sync::OnceLock;

static PROCESS_CONFIG: OnceLock<ScanConfig> = OnceLock::new();

/// Process-wide configuration, read from `QR_SCAN_*` on first use
fn process_config() -> &'static ScanConfig {
    PROCESS_CONFIG.get_or_init(ScanConfig::from_env)
}

/// Decode the QR payload from encoded image bytes (PNG, JPEG, GIF, ...)
///
/// # Errors
/// - [`DecodeError::InvalidInput`] for empty, oversized or corrupt data
/// - [`DecodeError::UnsupportedFormat`] when no codec recognizes the data
/// - [`DecodeError::NoQrCodeFound`] when every candidate failed
/// - [`DecodeError::Timeout`] when `QR_SCAN_TIME_BUDGET_MS` ran out
pub fn decode(image_bytes: &[u8]) -> Result<String> {
    let config = process_config().clone();
    Scanner::with_config(config)
        .scan_bytes(image_bytes)
        .map(|hit| hit.payload)
}

/// Configured scanner: variant generation plus strategy search
pub struct Scanner<D = RqrrDecoder> {
    config: ScanConfig,
    decoder: D,
}

impl Scanner<RqrrDecoder> {
    /// Scanner with default settings
    pub fn new() -> Self {
        Self::with_config(ScanConfig::default())
    }

    /// Scanner with custom settings and the rqrr decoder
    pub fn with_config(config: ScanConfig) -> Self {
        let config = config.normalized();
        let decoder = RqrrDecoder::with_max_pixels(config.max_pixels);
        Self { config, decoder }
    }
}

impl Default for Scanner<RqrrDecoder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Scanner<D>
where
    D: SymbolDecoder + Sync,
    D::Bitmap: Send + Sync,
{
    /// Scanner with a custom symbol decoder
    pub fn with_decoder(config: ScanConfig, decoder: D) -> Self {
        Self {
            config: config.normalized(),
            decoder,
        }
    }

    /// Active settings
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Decode image bytes and scan them
    pub fn scan_bytes(&self, image_bytes: &[u8]) -> Result<SearchHit> {
        let matrix = input::load_from_memory(image_bytes, self.config.max_input_bytes)?;
        self.scan_matrix(matrix)
    }

    /// Scan an already-decoded image
    pub fn scan_matrix(&self, matrix: PixelMatrix) -> Result<SearchHit> {
        match self.search(matrix) {
            SearchResult::Success(hit) => Ok(hit),
            SearchResult::Exhausted {
                attempts,
                last_failure,
            } => Err(DecodeError::NoQrCodeFound {
                attempts,
                last_failure,
            }),
            SearchResult::TimedOut {
                attempts, elapsed, ..
            } => Err(DecodeError::Timeout { attempts, elapsed }),
        }
    }

    /// Run the strategy search and return the raw result
    pub fn search(&self, matrix: PixelMatrix) -> SearchResult {
        debug!(
            "scanning {}x{} {:?} image",
            matrix.width(),
            matrix.height(),
            matrix.channels()
        );
        let variants = Variants::new(matrix, &self.config);
        let search = StrategySearch::new(&self.decoder).time_budget(self.config.time_budget);
        match self.config.mode {
            SearchMode::Sequential => search.run(variants),
            SearchMode::Parallel => search.run_parallel(variants, self.config.parallel_window),
        }
    }
}
