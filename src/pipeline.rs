//! Strategy search over (variant x decoder configuration).
//!
//! Variants are visited in generation order and each one is tried against
//! every configuration in order. The first success ends the search. A
//! variant the decoder cannot prepare is skipped without spending attempts;
//! failed attempts are dropped except for the most recent reason, which is
//! kept for diagnostics.

use crate::decoder::{DecodeOutcome, DecoderConfig, FailureKind, SymbolDecoder};
use crate::variants::Variant;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::time::{Duration, Instant};

/// The winning combination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Decoded payload text
    pub payload: String,
    /// Position of the winning variant in the plan
    pub variant_index: usize,
    /// Transform chain of the winning variant
    pub variant_name: String,
    /// Position of the winning configuration
    pub config_index: usize,
    /// Name of the winning configuration
    pub config_name: &'static str,
    /// Attempts made up to and including the winning one
    pub attempts: usize,
}

/// How a search ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResult {
    /// A pair produced a payload
    Success(SearchHit),
    /// Every pair failed
    Exhausted {
        /// Decode attempts made
        attempts: usize,
        /// Reason from the final failed attempt
        last_failure: Option<String>,
    },
    /// The time budget ran out
    TimedOut {
        /// Decode attempts made before the budget ran out
        attempts: usize,
        /// Time spent
        elapsed: Duration,
        /// Reason from the final failed attempt
        last_failure: Option<String>,
    },
}

impl SearchResult {
    /// Decode attempts made, whatever the outcome
    pub fn attempts(&self) -> usize {
        match self {
            SearchResult::Success(hit) => hit.attempts,
            SearchResult::Exhausted { attempts, .. } | SearchResult::TimedOut { attempts, .. } => {
                *attempts
            }
        }
    }
}

/// Running totals shared by both scan modes
struct Tally {
    started: Instant,
    budget: Option<Duration>,
    attempts: usize,
    skipped: usize,
    last_failure: Option<String>,
}

impl Tally {
    fn new(budget: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            budget,
            attempts: 0,
            skipped: 0,
            last_failure: None,
        }
    }

    fn expired(&self) -> bool {
        self.budget
            .is_some_and(|budget| self.started.elapsed() >= budget)
    }

    fn skip(&mut self, variant: &Variant, reason: &str) {
        self.skipped += 1;
        debug!("skipping variant #{} ({}): {}", variant.index + 1, variant.name, reason);
    }

    fn record(&mut self, outcome: DecodeOutcome, variant: &Variant, config_index: usize, config: &DecoderConfig) -> Option<SearchHit> {
        match outcome {
            DecodeOutcome::Success(payload) => {
                info!(
                    "decoded QR code after {} attempts (variant #{} {}, strategy #{} {})",
                    self.attempts,
                    variant.index + 1,
                    variant.name,
                    config_index + 1,
                    config.name
                );
                Some(SearchHit {
                    payload,
                    variant_index: variant.index,
                    variant_name: variant.name.clone(),
                    config_index,
                    config_name: config.name,
                    attempts: self.attempts,
                })
            }
            DecodeOutcome::Failure(failure) => {
                if failure.kind == FailureKind::Fault {
                    warn!("decoder fault on variant {} / {}: {}", variant.name, config.name, failure.reason);
                }
                self.last_failure = Some(failure.to_string());
                None
            }
        }
    }

    fn timed_out(self) -> SearchResult {
        let elapsed = self.started.elapsed();
        warn!("scan budget spent after {} attempts ({:?})", self.attempts, elapsed);
        SearchResult::TimedOut {
            attempts: self.attempts,
            elapsed,
            last_failure: self.last_failure,
        }
    }

    fn exhausted(self, configs: usize) -> SearchResult {
        warn!(
            "no QR code found: {} attempts over {} strategies ({} variants skipped)",
            self.attempts, configs, self.skipped
        );
        SearchResult::Exhausted {
            attempts: self.attempts,
            last_failure: self.last_failure,
        }
    }
}

/// Cross-product scan against a [`SymbolDecoder`]
pub struct StrategySearch<'a, D> {
    decoder: &'a D,
    configs: &'a [DecoderConfig],
    time_budget: Option<Duration>,
}

impl<'a, D: SymbolDecoder> StrategySearch<'a, D> {
    /// Search with the standard six configurations
    pub fn new(decoder: &'a D) -> Self {
        Self::with_configs(decoder, &DecoderConfig::STRATEGIES)
    }

    /// Search with a custom configuration list
    pub fn with_configs(decoder: &'a D, configs: &'a [DecoderConfig]) -> Self {
        Self {
            decoder,
            configs,
            time_budget: None,
        }
    }

    /// Abandon the scan once `budget` has elapsed
    pub fn time_budget(mut self, budget: Option<Duration>) -> Self {
        self.time_budget = budget;
        self
    }

    /// Scan one attempt at a time in generation order
    pub fn run<I>(&self, variants: I) -> SearchResult
    where
        I: IntoIterator<Item = Variant>,
    {
        let mut tally = Tally::new(self.time_budget);

        for variant in variants {
            let bitmap = match self.decoder.prepare(&variant.matrix) {
                Ok(bitmap) => bitmap,
                Err(failure) => {
                    tally.skip(&variant, &failure.reason);
                    continue;
                }
            };

            for (config_index, config) in self.configs.iter().enumerate() {
                if tally.expired() {
                    return tally.timed_out();
                }
                tally.attempts += 1;
                let outcome = self.decoder.decode(&bitmap, config);
                if let Some(hit) = tally.record(outcome, &variant, config_index, config) {
                    return SearchResult::Success(hit);
                }
            }
            // `variant` and its bitmap are released here
        }

        tally.exhausted(self.configs.len())
    }
}

impl<D> StrategySearch<'_, D>
where
    D: SymbolDecoder + Sync,
    D::Bitmap: Send + Sync,
{
    /// Scan `window` variants at a time on the rayon pool.
    ///
    /// Every pair in a window is decoded, then outcomes are read back in
    /// generation order, so the reported hit and attempt count match what
    /// [`run`](Self::run) would return for the same input.
    pub fn run_parallel<I>(&self, variants: I, window: usize) -> SearchResult
    where
        I: IntoIterator<Item = Variant>,
    {
        let window = window.max(1);
        let mut tally = Tally::new(self.time_budget);
        let mut variants = variants.into_iter();

        loop {
            if tally.expired() {
                return tally.timed_out();
            }
            let batch: Vec<Variant> = variants.by_ref().take(window).collect();
            if batch.is_empty() {
                break;
            }

            let prepared: Vec<_> = batch
                .into_par_iter()
                .map(|variant| {
                    let bitmap = self.decoder.prepare(&variant.matrix);
                    (variant, bitmap)
                })
                .collect();

            let mut ready = Vec::with_capacity(prepared.len());
            for (variant, bitmap) in prepared {
                match bitmap {
                    Ok(bitmap) => ready.push((variant, bitmap)),
                    Err(failure) => tally.skip(&variant, &failure.reason),
                }
            }

            let pairs: Vec<(usize, usize)> = (0..ready.len())
                .flat_map(|v| (0..self.configs.len()).map(move |c| (v, c)))
                .collect();
            let outcomes: Vec<DecodeOutcome> = pairs
                .par_iter()
                .map(|&(v, c)| self.decoder.decode(&ready[v].1, &self.configs[c]))
                .collect();

            for (&(v, c), outcome) in pairs.iter().zip(outcomes) {
                tally.attempts += 1;
                if let Some(hit) = tally.record(outcome, &ready[v].0, c, &self.configs[c]) {
                    return SearchResult::Success(hit);
                }
            }
        }

        tally.exhausted(self.configs.len())
    }
}
