//! Scan policy knobs.
//!
//! Defaults reproduce the tuned candidate space; `ScanConfig::from_env`
//! overrides individual values from `QR_SCAN_*` environment variables.

use crate::decoder::rqrr_decoder::DEFAULT_MAX_PIXELS;
use std::time::Duration;

/// Fixed binarization thresholds (low / mid / high sensitivity)
pub const DEFAULT_THRESHOLDS: [u8; 3] = [100, 128, 150];
/// Enlargement factors applied to the scaled variant groups, in order
pub const DEFAULT_SCALES: [f64; 7] = [2.0, 3.0, 4.0, 5.0, 6.0, 8.0, 10.0];
/// Adaptive threshold window side, in pixels
pub const DEFAULT_ADAPTIVE_BLOCK: usize = 15;
/// Amount subtracted from the local mean
pub const DEFAULT_ADAPTIVE_OFFSET: u8 = 10;
/// Largest encoded image accepted
pub const DEFAULT_MAX_INPUT_BYTES: usize = 10 * 1024 * 1024;
/// Variants decoded together in parallel mode
pub const DEFAULT_PARALLEL_WINDOW: usize = 8;

/// How the (variant, configuration) product is walked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// One attempt at a time, in generation order
    #[default]
    Sequential,
    /// Windows of variants decoded on the rayon pool; the earliest success
    /// in generation order still wins
    Parallel,
}

/// Settings for one scan
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// Low, mid and high fixed thresholds. The mid one also feeds the
    /// inverted and sharpened threshold variants.
    pub thresholds: [u8; 3],
    /// Adaptive threshold window side (odd)
    pub adaptive_block: usize,
    /// Adaptive threshold offset below the local mean
    pub adaptive_offset: u8,
    /// Enlargement factors, one scaled group per entry
    pub scales: Vec<f64>,
    /// Wall-clock budget for a whole scan
    pub time_budget: Option<Duration>,
    /// Largest encoded image accepted
    pub max_input_bytes: usize,
    /// Largest variant, in pixels, that is built or handed to the decoder
    pub max_pixels: usize,
    /// How the search walks the candidates
    pub mode: SearchMode,
    /// Variants per parallel window
    pub parallel_window: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            thresholds: DEFAULT_THRESHOLDS,
            adaptive_block: DEFAULT_ADAPTIVE_BLOCK,
            adaptive_offset: DEFAULT_ADAPTIVE_OFFSET,
            scales: DEFAULT_SCALES.to_vec(),
            time_budget: None,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            max_pixels: DEFAULT_MAX_PIXELS,
            mode: SearchMode::Sequential,
            parallel_window: DEFAULT_PARALLEL_WINDOW,
        }
    }
}

impl ScanConfig {
    /// Defaults overridden by any `QR_SCAN_*` variables that parse
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let budget_ms = parse_env_u64("QR_SCAN_TIME_BUDGET_MS", 0);
        Self {
            thresholds: defaults.thresholds,
            adaptive_block: parse_env_usize("QR_SCAN_ADAPTIVE_BLOCK", defaults.adaptive_block),
            adaptive_offset: parse_env_u8("QR_SCAN_ADAPTIVE_OFFSET", defaults.adaptive_offset),
            scales: parse_env_scales("QR_SCAN_SCALES").unwrap_or(defaults.scales),
            time_budget: (budget_ms > 0).then(|| Duration::from_millis(budget_ms)),
            max_input_bytes: parse_env_usize("QR_SCAN_MAX_INPUT_BYTES", defaults.max_input_bytes),
            max_pixels: parse_env_usize("QR_SCAN_MAX_PIXELS", defaults.max_pixels),
            mode: if parse_env_bool_u8("QR_SCAN_PARALLEL", false) {
                SearchMode::Parallel
            } else {
                SearchMode::Sequential
            },
            parallel_window: parse_env_usize("QR_SCAN_PARALLEL_WINDOW", defaults.parallel_window),
        }
        .normalized()
    }

    /// Clamp values into ranges the transforms accept
    pub fn normalized(mut self) -> Self {
        self.adaptive_block = self.adaptive_block.clamp(3, 255) | 1;
        self.scales.retain(|s| s.is_finite() && *s > 0.0);
        self.max_input_bytes = self.max_input_bytes.max(1);
        self.max_pixels = self.max_pixels.max(1);
        self.parallel_window = self.parallel_window.clamp(1, 128);
        self
    }

    /// Stop the scan once `budget` has elapsed
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Switch between sequential and parallel search
    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }
}

fn parse_env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn parse_env_u8(name: &str, default: u8) -> u8 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u8>().ok())
        .unwrap_or(default)
}

fn parse_env_bool_u8(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u8>().ok())
        .map(|v| v != 0)
        .unwrap_or(default)
}

fn parse_env_scales(name: &str) -> Option<Vec<f64>> {
    std::env::var(name).ok().and_then(|v| parse_scale_list(&v))
}

/// Parse "2,3,4.5" into factors; `None` if any entry is malformed
fn parse_scale_list(value: &str) -> Option<Vec<f64>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().ok())
        .collect()
}
