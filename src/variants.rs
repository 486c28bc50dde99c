//! Ordered candidate images derived from one input.
//!
//! The plan is a flat list of [`VariantSpec`] descriptors: fourteen
//! native-resolution bases followed by twelve enlarged bases per scale
//! factor. [`Variants`] walks the plan lazily. Native bases are memoized
//! for the lifetime of the iterator because later specs reuse them as
//! scaling inputs; scaled matrices are produced one at a time and are
//! dropped as soon as the consumer lets go of them.
//!
//! Scaled specs whose output would exceed `ScanConfig::max_pixels` are
//! dropped from the plan up front, so they are never allocated.

use crate::config::ScanConfig;
use crate::models::PixelMatrix;
use crate::utils::{
    adaptive_threshold, contrast_stretch, fixed_threshold, grayscale, invert, scale, scaled_extent, sharpen,
};
use log::debug;
use std::fmt;
use std::sync::Arc;

/// A native-resolution transform chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseKind {
    /// The decoded input as-is
    Original,
    /// Luminance
    Gray,
    /// Inverted luminance
    GrayInverted,
    /// Contrast-stretched luminance
    Stretched,
    /// Inverted contrast stretch
    StretchedInverted,
    /// Fixed threshold at the low level
    ThresholdLow,
    /// Fixed threshold at the mid level
    ThresholdMid,
    /// Inverted mid-level threshold
    ThresholdMidInverted,
    /// Fixed threshold at the high level
    ThresholdHigh,
    /// Local-mean threshold
    Adaptive,
    /// Inverted local-mean threshold
    AdaptiveInverted,
    /// Sharpened luminance
    Sharpened,
    /// Sharpened, then mid-level threshold
    SharpenedThreshold,
    /// Inverted sharpened threshold
    SharpenedThresholdInverted,
}

impl BaseKind {
    /// Native-resolution bases in generation order
    pub const ALL: [BaseKind; 14] = [
        BaseKind::Original,
        BaseKind::Gray,
        BaseKind::GrayInverted,
        BaseKind::Stretched,
        BaseKind::StretchedInverted,
        BaseKind::ThresholdLow,
        BaseKind::ThresholdMid,
        BaseKind::ThresholdMidInverted,
        BaseKind::ThresholdHigh,
        BaseKind::Adaptive,
        BaseKind::AdaptiveInverted,
        BaseKind::Sharpened,
        BaseKind::SharpenedThreshold,
        BaseKind::SharpenedThresholdInverted,
    ];

    /// Bases enlarged at every scale factor; light-on-dark forms lead
    pub const SCALED: [BaseKind; 12] = [
        BaseKind::GrayInverted,
        BaseKind::StretchedInverted,
        BaseKind::ThresholdMidInverted,
        BaseKind::AdaptiveInverted,
        BaseKind::Original,
        BaseKind::Gray,
        BaseKind::Stretched,
        BaseKind::ThresholdMid,
        BaseKind::Adaptive,
        BaseKind::Sharpened,
        BaseKind::SharpenedThreshold,
        BaseKind::SharpenedThresholdInverted,
    ];

    fn slot(self) -> usize {
        self as usize
    }

    /// Base this one is derived from, if any
    fn parent(self) -> Option<BaseKind> {
        use BaseKind::*;
        match self {
            Original => None,
            Gray => Some(Original),
            GrayInverted | Stretched | ThresholdLow | ThresholdMid | ThresholdHigh | Adaptive
            | Sharpened => Some(Gray),
            StretchedInverted => Some(Stretched),
            ThresholdMidInverted => Some(ThresholdMid),
            AdaptiveInverted => Some(Adaptive),
            SharpenedThreshold => Some(Sharpened),
            SharpenedThresholdInverted => Some(SharpenedThreshold),
        }
    }

    /// Apply the last step of this chain to its parent's matrix
    fn derive(self, parent: &PixelMatrix, config: &ScanConfig) -> PixelMatrix {
        use BaseKind::*;
        let [low, mid, high] = config.thresholds;
        match self {
            Original => parent.clone(),
            Gray => grayscale(parent),
            GrayInverted | StretchedInverted | ThresholdMidInverted | AdaptiveInverted
            | SharpenedThresholdInverted => invert(parent),
            Stretched => contrast_stretch(parent),
            ThresholdLow => fixed_threshold(parent, low),
            ThresholdMid | SharpenedThreshold => fixed_threshold(parent, mid),
            ThresholdHigh => fixed_threshold(parent, high),
            Adaptive => adaptive_threshold(parent, config.adaptive_block, config.adaptive_offset),
            Sharpened => sharpen(parent),
        }
    }

    /// Transform chain, e.g. `gray>threshold(128)>invert`
    pub fn chain(self, config: &ScanConfig) -> String {
        use BaseKind::*;
        let [low, mid, high] = config.thresholds;
        let step = match self {
            Original => return "original".to_string(),
            Gray => return "gray".to_string(),
            GrayInverted | StretchedInverted | ThresholdMidInverted | AdaptiveInverted
            | SharpenedThresholdInverted => "invert".to_string(),
            Stretched => "stretch".to_string(),
            ThresholdLow => format!("threshold({low})"),
            ThresholdMid | SharpenedThreshold => format!("threshold({mid})"),
            ThresholdHigh => format!("threshold({high})"),
            Adaptive => "adaptive".to_string(),
            Sharpened => "sharpen".to_string(),
        };
        match self.parent() {
            Some(parent) => format!("{}>{}", parent.chain(config), step),
            None => step,
        }
    }
}

/// One entry of the variant plan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariantSpec {
    /// Transform chain at native resolution
    pub base: BaseKind,
    /// Nearest-neighbour enlargement applied after the base chain
    pub scale: Option<f64>,
}

impl VariantSpec {
    /// Display name, e.g. `gray>invert>scale(2)`
    pub fn name(&self, config: &ScanConfig) -> String {
        match self.scale {
            Some(factor) => format!("{}>scale({})", self.base.chain(config), factor),
            None => self.base.chain(config),
        }
    }
}

/// The full, ordered variant plan for `config`
pub fn plan(config: &ScanConfig) -> Vec<VariantSpec> {
    let mut specs = Vec::with_capacity(BaseKind::ALL.len() + config.scales.len() * BaseKind::SCALED.len());
    specs.extend(BaseKind::ALL.iter().map(|&base| VariantSpec { base, scale: None }));
    for &factor in &config.scales {
        specs.extend(
            BaseKind::SCALED
                .iter()
                .map(|&base| VariantSpec { base, scale: Some(factor) }),
        );
    }
    specs
}

/// A candidate image handed to the strategy search
#[derive(Clone)]
pub struct Variant {
    /// Position in generation order
    pub index: usize,
    /// Plan entry it was built from
    pub spec: VariantSpec,
    /// Display name of `spec`
    pub name: String,
    /// Pixels, shared with the base cache for native variants
    pub matrix: Arc<PixelMatrix>,
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("width", &self.matrix.width())
            .field("height", &self.matrix.height())
            .finish()
    }
}

/// Lazy iterator over the variant plan
pub struct Variants<'a> {
    config: &'a ScanConfig,
    /// Plan entries that fit the pixel limit, with their plan position
    specs: Vec<(usize, VariantSpec)>,
    next: usize,
    dropped: usize,
    original: Arc<PixelMatrix>,
    bases: Vec<Option<Arc<PixelMatrix>>>,
}

impl<'a> Variants<'a> {
    /// Plan the variants of `original`. Nothing is computed until the
    /// iterator is advanced.
    pub fn new(original: PixelMatrix, config: &'a ScanConfig) -> Self {
        let planned = plan(config);
        let total = planned.len();
        let specs: Vec<(usize, VariantSpec)> = planned
            .into_iter()
            .enumerate()
            .filter(|(index, spec)| fits(&original, spec, *index, config))
            .collect();
        Self {
            config,
            dropped: total - specs.len(),
            specs,
            next: 0,
            original: Arc::new(original),
            bases: vec![None; BaseKind::ALL.len()],
        }
    }

    /// Number of variants this iterator yields in total
    pub fn total(&self) -> usize {
        self.specs.len()
    }

    /// Plan entries left out because their output exceeds `max_pixels`
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    fn base(&mut self, kind: BaseKind) -> Arc<PixelMatrix> {
        let parent = match kind.parent() {
            Some(parent) => parent,
            None => return Arc::clone(&self.original),
        };
        if let Some(matrix) = &self.bases[kind.slot()] {
            return Arc::clone(matrix);
        }
        let parent = self.base(parent);
        let matrix = Arc::new(kind.derive(&parent, self.config));
        self.bases[kind.slot()] = Some(Arc::clone(&matrix));
        matrix
    }
}

/// Whether a plan entry can be materialized within `max_pixels`.
/// Native bases share the input's extent and always fit.
fn fits(original: &PixelMatrix, spec: &VariantSpec, index: usize, config: &ScanConfig) -> bool {
    let Some(factor) = spec.scale else {
        return true;
    };
    let stride = original.channels().stride();
    match scaled_extent(original.width(), original.height(), factor, stride) {
        Some((w, h)) if w * h <= config.max_pixels => true,
        extent => {
            debug!(
                "dropping variant #{} ({}): {:?} exceeds {} pixels",
                index + 1,
                spec.name(config),
                extent,
                config.max_pixels
            );
            false
        }
    }
}

impl Iterator for Variants<'_> {
    type Item = Variant;

    fn next(&mut self) -> Option<Variant> {
        while let Some(&(index, spec)) = self.specs.get(self.next) {
            self.next += 1;

            let base = self.base(spec.base);
            let matrix = match spec.scale {
                None => base,
                // Extent already checked in `fits`
                Some(factor) => match scale(&base, factor) {
                    Some(scaled) => Arc::new(scaled),
                    None => continue,
                },
            };
            return Some(Variant {
                index,
                spec,
                name: spec.name(self.config),
                matrix,
            });
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.specs.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Variants<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Channels;

    fn sample_rgb() -> PixelMatrix {
        let data = (0..12 * 10 * 3).map(|i| ((i * 37) % 256) as u8).collect();
        PixelMatrix::from_raw(12, 10, Channels::Rgb, data).unwrap()
    }

    #[test]
    fn test_plan_shape() {
        let config = ScanConfig::default();
        let specs = plan(&config);
        assert_eq!(specs.len(), 14 + 7 * 12);
        assert_eq!(specs[0].base, BaseKind::Original);
        assert_eq!(specs[13].base, BaseKind::SharpenedThresholdInverted);
        assert_eq!(specs[14], VariantSpec { base: BaseKind::GrayInverted, scale: Some(2.0) });
        assert_eq!(specs[97], VariantSpec { base: BaseKind::SharpenedThresholdInverted, scale: Some(10.0) });
    }

    #[test]
    fn test_names() {
        let config = ScanConfig::default();
        let names: Vec<String> = plan(&config).iter().map(|s| s.name(&config)).collect();
        assert_eq!(names[0], "original");
        assert_eq!(names[2], "gray>invert");
        assert_eq!(names[7], "gray>threshold(128)>invert");
        assert_eq!(names[13], "gray>sharpen>threshold(128)>invert");
        assert_eq!(names[14], "gray>invert>scale(2)");
        assert_eq!(names[18], "original>scale(2)");
    }

    #[test]
    fn test_deterministic() {
        let config = ScanConfig::default();
        let a: Vec<_> = Variants::new(sample_rgb(), &config).collect();
        let b: Vec<_> = Variants::new(sample_rgb(), &config).collect();
        assert_eq!(a.len(), 98);
        for (va, vb) in a.iter().zip(&b) {
            assert_eq!(va.index, vb.index);
            assert_eq!(va.name, vb.name);
            assert_eq!(va.matrix, vb.matrix);
        }
    }

    #[test]
    fn test_variant_contents() {
        let config = ScanConfig::default();
        let original = sample_rgb();
        let variants: Vec<_> = Variants::new(original.clone(), &config).collect();

        assert_eq!(*variants[0].matrix, original);
        let gray = grayscale(&original);
        assert_eq!(*variants[1].matrix, gray);
        assert_eq!(*variants[2].matrix, invert(&gray));
        assert_eq!(*variants[6].matrix, fixed_threshold(&gray, 128));
        assert_eq!(*variants[12].matrix, fixed_threshold(&sharpen(&gray), 128));

        let scaled = &variants[14];
        assert_eq!((scaled.matrix.width(), scaled.matrix.height()), (24, 20));
        assert_eq!(Some((*scaled.matrix).clone()), scale(&invert(&gray), 2.0));

        // Scaled original keeps its colour layout
        assert_eq!(variants[18].matrix.channels(), Channels::Rgb);
    }

    #[test]
    fn test_custom_scales() {
        let config = ScanConfig {
            scales: vec![3.0],
            ..ScanConfig::default()
        };
        let variants = Variants::new(sample_rgb(), &config);
        assert_eq!(variants.total(), 26);
        assert_eq!(variants.len(), 26);
    }

    #[test]
    fn test_oversized_scales_are_never_built() {
        let config = ScanConfig {
            max_pixels: 10_000,
            ..ScanConfig::default()
        };
        let original = PixelMatrix::from_fn(40, 40, |x, y| ((x + y) % 2 * 255) as u8).unwrap();
        let variants = Variants::new(original, &config);
        // 40x40 at scale 2 is 6400 pixels; scale 3 and up exceed the limit
        assert_eq!(variants.total(), 14 + 12);
        assert_eq!(variants.dropped(), 6 * 12);

        let yielded: Vec<_> = variants.collect();
        assert_eq!(yielded.len(), 26);
        assert!(yielded.iter().all(|v| v.matrix.pixel_count() <= config.max_pixels));
        assert_eq!(yielded[25].index, 25);
        assert_eq!(yielded[25].name, "gray>sharpen>threshold(128)>invert>scale(2)");
    }

    #[test]
    fn test_limit_below_every_scale() {
        let config = ScanConfig {
            max_pixels: 2_000,
            ..ScanConfig::default()
        };
        let original = PixelMatrix::from_fn(40, 40, |_, _| 255).unwrap();
        let yielded: Vec<_> = Variants::new(original, &config).collect();
        assert_eq!(yielded.len(), 14);
        assert!(yielded.iter().all(|v| v.spec.scale.is_none()));
    }
}
