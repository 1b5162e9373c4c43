use super::noise::{generate_noise, Noise};
use super::params::CoreParams;
use super::stutter::{derive_stutter, StutterSource};
use crate::locus::LocusModel;
use crate::mixture::MixtureInput;
use crate::random::{log_normal, rng_from_key};
use crate::utils::{format_allele, from_tenths, to_tenths};
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};

/// Half-width of the allele window used when no contributor carries any allele.
const EMPTY_RANGE_HALF_WIDTH: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeakKind {
    True,
    Stutter,
    Noise,
}

impl std::fmt::Display for PeakKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeakKind::True => write!(f, "true"),
            PeakKind::Stutter => write!(f, "stutter"),
            PeakKind::Noise => write!(f, "noise"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Peak {
    pub position: f64,
    pub intensity: f64,
    pub kind: PeakKind,
    /// Labels of the contributors whose alleles produced this signal.
    pub contributors: Vec<String>,
    /// Stutter received at this position. For a true peak this is the
    /// co-located component already included in `intensity`.
    pub stutter_sources: Vec<StutterSource>,
}

impl Peak {
    pub fn label(&self) -> String {
        format_allele(self.position)
    }

    pub fn stutter_component(&self) -> f64 {
        self.stutter_sources.iter().map(|s| s.amplitude).sum()
    }
}

/// Unthresholded CE signal for one locus.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreResult {
    pub locus_id: String,
    pub true_peaks: Vec<Peak>,
    pub stutter_peaks: Vec<Peak>,
    pub baseline: f64,
    pub noise_trace: Vec<(f64, f64)>,
    pub noise_peaks: Vec<Peak>,
}

/// Seed key of a CE simulation.
///
/// Contains the locus id, the ordered active contributor descriptors, the DNA
/// input, every core parameter, the locus n-1 stutter rate and the caller's
/// seed. Interpretation thresholds never enter the key, so changing AT or ST
/// re-interprets the same signal instead of resampling it.
pub fn seed_key(input: &MixtureInput, params: &CoreParams, model: &LocusModel) -> String {
    format!(
        "ce|{}|{}|dna={}|kappa={}|hb_cv={}|sigma={}|eff={}|k={}|baseline={}/{}|stutter_scale={}|stutter_rate={}|seed={}",
        input.locus_id,
        input.descriptor(),
        input.dna_input,
        params.kappa,
        params.het_balance_cv,
        params.lognormal_sigma,
        params.locus_efficiency,
        params.degradation,
        params.baseline_mean,
        params.baseline_sd,
        params.stutter_scale,
        model.stutter.minus1,
        input.seed,
    )
}

#[derive(Debug, Default)]
struct Signal {
    amplitude: f64,
    contributors: Vec<String>,
}

/// Generates true-allele peaks, stutter peaks and baseline noise for one locus.
///
/// Each contributor gets a single log-normal amplitude draw that is applied to
/// every allele it carries; allele-to-allele asymmetry within a contributor
/// comes only from degradation. Peaks are returned without any threshold applied.
pub fn generate_core(model: &LocusModel, input: &MixtureInput, params: &CoreParams) -> CoreResult {
    let mut rng = rng_from_key(&seed_key(input, params, model));

    let mut signals: BTreeMap<i64, Signal> = BTreeMap::new();
    for contributor in input.active_contributors() {
        if contributor.alleles.is_empty() {
            continue;
        }
        let mass = input.dna_input * contributor.proportion * params.locus_efficiency;
        let amplitude = log_normal(&mut rng, params.kappa * mass, params.lognormal_sigma);
        for allele in &contributor.alleles {
            let signal = signals.entry(allele.key()).or_default();
            signal.amplitude += amplitude;
            if !signal.contributors.contains(&contributor.label) {
                signal.contributors.push(contributor.label.clone());
            }
        }
    }

    if params.degradation > 0.0 {
        for (&key, signal) in signals.iter_mut() {
            signal.amplitude *= model.degradation_factor(from_tenths(key), params.degradation);
        }
    }

    let parents: BTreeMap<i64, f64> = signals.iter().map(|(&k, s)| (k, s.amplitude)).collect();
    let mut stutter = derive_stutter(&mut rng, model, &parents, params.stutter_scale);

    let positions: BTreeSet<i64> = signals
        .iter()
        .filter(|(_, s)| s.amplitude > 0.0)
        .map(|(&k, _)| k)
        .chain(stutter.keys().copied())
        .collect();

    let mut true_peaks = Vec::new();
    let mut stutter_peaks = Vec::new();
    for key in positions {
        let stutter_sources = stutter.remove(&key).unwrap_or_default();
        let stutter_amplitude: f64 = stutter_sources.iter().map(|s| s.amplitude).sum();
        match signals.get(&key).filter(|s| s.amplitude > 0.0) {
            // co-located signal cannot be separated by the instrument
            Some(signal) => true_peaks.push(Peak {
                position: from_tenths(key),
                intensity: signal.amplitude + stutter_amplitude,
                kind: PeakKind::True,
                contributors: signal.contributors.clone(),
                stutter_sources,
            }),
            None if stutter_amplitude > 0.0 => {
                let contributors = stutter_sources
                    .iter()
                    .filter_map(|s| signals.get(&to_tenths(s.parent)))
                    .flat_map(|s| s.contributors.iter().cloned())
                    .unique()
                    .collect();
                stutter_peaks.push(Peak {
                    position: from_tenths(key),
                    intensity: stutter_amplitude,
                    kind: PeakKind::Stutter,
                    contributors,
                    stutter_sources,
                })
            }
            None => {}
        }
    }

    let Noise {
        baseline,
        peaks: noise_peaks,
        trace: noise_trace,
    } = generate_noise(
        &mut rng,
        observed_range(input, model),
        params.baseline_mean,
        params.baseline_sd,
    );

    log::debug!(
        "{}: {} true peaks, {} stutter peaks, {} noise peaks",
        input.locus_id,
        true_peaks.len(),
        stutter_peaks.len(),
        noise_peaks.len()
    );

    CoreResult {
        locus_id: input.locus_id.clone(),
        true_peaks,
        stutter_peaks,
        baseline,
        noise_trace,
        noise_peaks,
    }
}

/// Span of alleles carried by active contributors, or a window around the
/// locus reference allele when there are none.
fn observed_range(input: &MixtureInput, model: &LocusModel) -> (f64, f64) {
    let sizes = input
        .active_contributors()
        .flat_map(|c| c.alleles.iter().map(|a| a.size));
    match sizes.minmax_by(|a, b| a.total_cmp(b)).into_option() {
        Some((low, high)) => (low, high),
        None => {
            let reference = model.length.reference_allele;
            (
                reference - EMPTY_RANGE_HALF_WIDTH,
                reference + EMPTY_RANGE_HALF_WIDTH,
            )
        }
    }
}
