use crate::locus::LocusModel;
use crate::random::{gaussian, log_normal};
use crate::utils::from_tenths;
use arrayvec::ArrayVec;
use rand::RngCore;
use std::collections::BTreeMap;

/// Ceiling on a drawn stutter rate.
pub const RATE_CEILING: f64 = 0.25;
/// Ceiling once the stutter-scale multiplier exceeds [`BOOST_THRESHOLD`].
pub const BOOSTED_RATE_CEILING: f64 = 0.40;
pub const BOOST_THRESHOLD: f64 = 1.5;
/// Sigma of the log-normal draw around a satellite's mean amplitude.
pub const STUTTER_SIGMA: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StutterOffset {
    Minus2,
    Minus1,
    Plus1,
}

impl StutterOffset {
    pub fn repeats(self) -> i64 {
        match self {
            StutterOffset::Minus2 => -2,
            StutterOffset::Minus1 => -1,
            StutterOffset::Plus1 => 1,
        }
    }

    /// Fraction of the parent's post-degradation amplitude a satellite is clamped into.
    /// These bands are empirically tuned and kept as fixed data.
    pub fn band(self) -> (f64, f64) {
        match self {
            StutterOffset::Minus1 => (0.08, 0.20),
            StutterOffset::Minus2 | StutterOffset::Plus1 => (0.01, 0.05),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StutterOffset::Minus2 => "n-2",
            StutterOffset::Minus1 => "n-1",
            StutterOffset::Plus1 => "n+1",
        }
    }
}

impl std::fmt::Display for StutterOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One satellite contribution received by a position.
#[derive(Debug, Clone, PartialEq)]
pub struct StutterSource {
    pub parent: f64,
    pub offset: StutterOffset,
    pub amplitude: f64,
}

/// Offsets modelled at a locus with their base rates; n-1 is always present.
pub fn locus_offsets(model: &LocusModel) -> ArrayVec<(StutterOffset, f64), 3> {
    let mut offsets = ArrayVec::new();
    offsets.push((StutterOffset::Minus1, model.stutter.minus1));
    if let Some(rate) = model.stutter.minus2 {
        offsets.push((StutterOffset::Minus2, rate));
    }
    if let Some(rate) = model.stutter.plus1 {
        offsets.push((StutterOffset::Plus1, rate));
    }
    offsets
}

pub fn rate_ceiling(stutter_scale: f64) -> f64 {
    if stutter_scale > BOOST_THRESHOLD {
        BOOSTED_RATE_CEILING
    } else {
        RATE_CEILING
    }
}

/// `(base + sd * z) * scale`, clamped to `[0, ceiling]`.
pub fn draw_rate<R: RngCore + ?Sized>(rng: &mut R, base: f64, sd: f64, stutter_scale: f64) -> f64 {
    let jittered = (base + sd * gaussian(rng)) * stutter_scale;
    jittered.clamp(0.0, rate_ceiling(stutter_scale))
}

/// The locus jitter SD describes n-1; smaller satellites jitter in proportion
/// to their rate relative to n-1.
pub fn jitter_sd(model: &LocusModel, base_rate: f64) -> f64 {
    let minus1 = model.stutter.minus1;
    if minus1 > 0.0 {
        model.stutter.jitter_sd() * (base_rate / minus1).min(1.0)
    } else {
        model.stutter.jitter_sd()
    }
}

/// Derives stutter satellites from post-degradation parent amplitudes.
///
/// Parents are visited in ascending position and offsets in the locus order, so
/// the draw sequence depends only on the inputs. Each satellite lands exactly
/// `offset` repeats from its parent (positions in tenths, so 9.3 feeds 8.3),
/// whether or not a catalog lists that allele. Targets below zero repeats are
/// skipped without drawing.
pub fn derive_stutter<R: RngCore + ?Sized>(
    rng: &mut R,
    model: &LocusModel,
    parents: &BTreeMap<i64, f64>,
    stutter_scale: f64,
) -> BTreeMap<i64, Vec<StutterSource>> {
    let mut received: BTreeMap<i64, Vec<StutterSource>> = BTreeMap::new();
    if stutter_scale <= 0.0 {
        return received;
    }
    let offsets = locus_offsets(model);

    for (&parent, &amplitude) in parents {
        if amplitude <= 0.0 {
            continue;
        }
        for &(offset, base_rate) in &offsets {
            let target = parent + 10 * offset.repeats();
            if target < 0 {
                continue;
            }
            let rate = draw_rate(rng, base_rate, jitter_sd(model, base_rate), stutter_scale);
            if rate <= 0.0 {
                continue;
            }
            let (low, high) = offset.band();
            let satellite =
                log_normal(rng, amplitude * rate, STUTTER_SIGMA).clamp(low * amplitude, high * amplitude);
            received.entry(target).or_default().push(StutterSource {
                parent: from_tenths(parent),
                offset,
                amplitude: satellite,
            });
        }
    }

    received
}
