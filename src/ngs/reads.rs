use super::params::{CallingThresholds, NgsParams};
use super::rows::{group_bars, NgsBar, NgsRow};
use crate::ce::stutter::{draw_rate, jitter_sd};
use crate::locus::LocusModel;
use crate::mixture::{Contributor, MixtureInput};
use crate::random::{gaussian, negative_binomial, rng_from_key};
use crate::utils::{format_allele, from_tenths};
use rand::RngCore;
use std::collections::{BTreeMap, BTreeSet};

/// Floor on a heterozygote-balance weight before normalisation.
const MIN_HET_WEIGHT: f64 = 0.05;
/// Amplicon length at which the NGS length attenuation is neutral.
const ATTENUATION_REFERENCE_LENGTH: f64 = 200.0;

/// Uncalled read counts for one locus.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadCounts {
    pub locus_id: String,
    /// Every position that received at least one read, ascending.
    pub rows: Vec<NgsRow>,
    pub total_coverage: u64,
}

/// Called rows and size-grouped bars.
#[derive(Debug, Clone, PartialEq)]
pub struct NgsResult {
    pub locus_id: String,
    pub thresholds: CallingThresholds,
    /// Coverage of the locus before calling; row fractions are relative to it.
    pub total_coverage: u64,
    pub rows: Vec<NgsRow>,
    pub bars: Vec<NgsBar>,
}

/// Seed key of an NGS simulation. The calling thresholds are not part of it.
pub fn ngs_seed_key(input: &MixtureInput, params: &NgsParams, model: &LocusModel) -> String {
    format!(
        "ngs|{}|{}|dna={}|reads_per_ng={}|dispersion={}|k={}|hb_cv={}|eff={}|stutter_rate={}|seed={}",
        input.locus_id,
        input.descriptor(),
        input.dna_input,
        params.reads_per_ng,
        params.dispersion,
        params.degradation,
        params.het_balance_cv,
        params.locus_efficiency,
        model.stutter.minus1,
        input.seed,
    )
}

/// Extra sequencing loss for long amplicons, `10^(-k (length - 200) / 100)`.
pub fn length_attenuation(amplicon_length: f64, k: f64) -> f64 {
    if k <= 0.0 {
        return 1.0;
    }
    10f64.powf(-k * (amplicon_length - ATTENUATION_REFERENCE_LENGTH) / 100.0)
}

/// Heterozygote-balance weights for `n` allele copies, normalised to sum to `n`.
fn het_weights<R: RngCore + ?Sized>(rng: &mut R, n: usize, cv: f64) -> Vec<f64> {
    let raw: Vec<f64> = (0..n)
        .map(|_| (1.0 + cv * gaussian(rng)).max(MIN_HET_WEIGHT))
        .collect();
    let total: f64 = raw.iter().sum();
    raw.iter().map(|w| w * n as f64 / total).collect()
}

#[derive(Debug, Default)]
struct Expected {
    mean: f64,
    contributors: Vec<String>,
}

fn expected_reads<R: RngCore + ?Sized>(
    rng: &mut R,
    model: &LocusModel,
    contributor: &Contributor,
    dna_input: f64,
    params: &NgsParams,
    expected: &mut BTreeMap<i64, Expected>,
) {
    let mass = dna_input * contributor.proportion * params.locus_efficiency;
    let weights = het_weights(rng, contributor.alleles.len(), params.het_balance_cv);
    for (allele, weight) in contributor.alleles.iter().zip(weights) {
        let length = model.amplicon_length(allele.size);
        let mean = params.reads_per_ng
            * mass
            * weight
            * model.degradation_factor(allele.size, params.degradation)
            * length_attenuation(length, params.degradation);
        let entry = expected.entry(allele.key()).or_default();
        entry.mean += mean;
        if !entry.contributors.contains(&contributor.label) {
            entry.contributors.push(contributor.label.clone());
        }
    }
}

/// Draws true-allele and n-1 stutter read counts for one locus.
pub fn generate_reads(model: &LocusModel, input: &MixtureInput, params: &NgsParams) -> ReadCounts {
    let mut rng = rng_from_key(&ngs_seed_key(input, params, model));

    let mut expected: BTreeMap<i64, Expected> = BTreeMap::new();
    for contributor in input.active_contributors() {
        expected_reads(
            &mut rng,
            model,
            contributor,
            input.dna_input,
            params,
            &mut expected,
        );
    }

    let true_counts: BTreeMap<i64, u64> = expected
        .iter()
        .map(|(&key, e)| (key, negative_binomial(&mut rng, e.mean, params.dispersion)))
        .collect();

    let minus1 = model.stutter.minus1;
    let sd = jitter_sd(model, minus1);
    let mut stutter_counts: BTreeMap<i64, u64> = BTreeMap::new();
    for (&key, &count) in &true_counts {
        if count == 0 {
            continue;
        }
        let rate = draw_rate(&mut rng, minus1, sd, 1.0);
        let reads = (rate * count as f64).round() as u64;
        if reads > 0 {
            let slot = stutter_counts.entry(key - 10).or_default();
            *slot = slot.saturating_add(reads);
        }
    }

    let mut rows = Vec::new();
    let keys: BTreeSet<i64> = true_counts
        .keys()
        .chain(stutter_counts.keys())
        .copied()
        .collect();
    for key in keys {
        let true_reads = true_counts.get(&key).copied().unwrap_or(0);
        let stutter_reads = stutter_counts.get(&key).copied().unwrap_or(0);
        let coverage = true_reads.saturating_add(stutter_reads);
        if coverage == 0 {
            continue;
        }
        let contributors = match expected.get(&key) {
            Some(e) => e.contributors.clone(),
            None => expected
                .get(&(key + 10))
                .map(|e| e.contributors.clone())
                .unwrap_or_default(),
        };
        rows.push(NgsRow {
            allele: format_allele(from_tenths(key)),
            size: from_tenths(key),
            coverage,
            stutter_reads,
            stutter_influenced: stutter_reads > 0,
            contributors,
            sequence: None,
        });
    }

    let total_coverage = rows.iter().fold(0u64, |total, r| total.saturating_add(r.coverage));
    log::debug!(
        "{}: {} read rows, {} reads",
        input.locus_id,
        rows.len(),
        total_coverage
    );

    ReadCounts {
        locus_id: input.locus_id.clone(),
        rows,
        total_coverage,
    }
}

/// Keeps the rows that pass both calling thresholds; the rest are dropped.
pub fn call_rows(counts: &ReadCounts, thresholds: &CallingThresholds) -> NgsResult {
    let total = counts.total_coverage;
    let rows: Vec<NgsRow> = counts
        .rows
        .iter()
        .filter(|row| {
            let fraction = if total == 0 {
                0.0
            } else {
                row.coverage as f64 / total as f64
            };
            row.coverage >= thresholds.min_reads && fraction >= thresholds.min_fraction
        })
        .cloned()
        .collect();
    let bars = group_bars(&rows);

    NgsResult {
        locus_id: counts.locus_id.clone(),
        thresholds: *thresholds,
        total_coverage: total,
        rows,
        bars,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locus::BUILTIN_REGISTRY;
    use crate::random::Mulberry32;

    fn two_person(minor: f64) -> MixtureInput {
        MixtureInput::new(
            "D3S1358",
            vec![
                Contributor::new("Major", "M", 1.0 - minor, &[15.0, 17.0]),
                Contributor::new("Minor", "m", minor, &[14.0, 18.0]),
            ],
            1.0,
        )
    }

    #[test]
    fn test_identical_inputs_identical_counts() {
        let model = BUILTIN_REGISTRY.get("D3S1358");
        let input = two_person(0.2);
        let first = generate_reads(model, &input, &NgsParams::default());
        assert_eq!(generate_reads(model, &input, &NgsParams::default()), first);
        let reseeded = generate_reads(model, &input.clone().with_seed(9), &NgsParams::default());
        assert_ne!(reseeded, first);
    }

    #[test]
    fn test_calling_rule() {
        let model = BUILTIN_REGISTRY.get("D3S1358");
        let thresholds = CallingThresholds {
            min_reads: 50,
            min_fraction: 0.05,
        };
        for seed in 0..30 {
            let counts = generate_reads(model, &two_person(0.03).with_seed(seed), &NgsParams::default());
            let result = call_rows(&counts, &thresholds);
            for row in &result.rows {
                assert!(row.coverage >= 50);
                assert!(row.coverage as f64 / result.total_coverage as f64 >= 0.05);
            }
            for row in &counts.rows {
                let called = result.rows.iter().any(|r| r.size == row.size);
                let passes = row.coverage >= 50
                    && row.coverage as f64 / counts.total_coverage as f64 >= 0.05;
                assert_eq!(called, passes);
            }
        }
    }

    #[test]
    fn test_thresholds_refilter_same_counts() {
        let model = BUILTIN_REGISTRY.get("D3S1358");
        let counts = generate_reads(model, &two_person(0.1), &NgsParams::default());
        let loose = call_rows(
            &counts,
            &CallingThresholds {
                min_reads: 0,
                min_fraction: 0.0,
            },
        );
        let strict = call_rows(&counts, &CallingThresholds::default());
        assert_eq!(loose.rows, counts.rows);
        for row in &strict.rows {
            assert!(loose.rows.contains(row));
        }
    }

    #[test]
    fn test_back_stutter_flagged() {
        let model = BUILTIN_REGISTRY.get("D3S1358");
        let input = MixtureInput::new("D3S1358", vec![Contributor::new("A", "A", 1.0, &[15.0, 17.0])], 1.0);
        let counts = generate_reads(model, &input, &NgsParams::default());
        let row_14 = counts.rows.iter().find(|r| r.allele == "14").unwrap();
        assert!(row_14.stutter_influenced);
        assert_eq!(row_14.coverage, row_14.stutter_reads);
        assert_eq!(row_14.stutter_fraction(), 1.0);
        assert_eq!(row_14.contributors, vec!["A"]);
        let row_16 = counts.rows.iter().find(|r| r.allele == "16").unwrap();
        assert!(row_16.stutter_influenced);
        let row_15 = counts.rows.iter().find(|r| r.allele == "15").unwrap();
        assert!(!row_15.stutter_influenced);
    }

    #[test]
    fn test_degradation_reduces_long_alleles() {
        let model = BUILTIN_REGISTRY.get("FGA");
        let params = NgsParams {
            degradation: 0.1,
            het_balance_cv: 0.0,
            dispersion: 0.0,
            ..Default::default()
        };
        let input = MixtureInput::new("FGA", vec![Contributor::new("A", "A", 1.0, &[18.0, 30.0])], 1.0);
        let counts = generate_reads(model, &input, &params);
        let short = counts.rows.iter().find(|r| r.allele == "18").unwrap();
        let long = counts.rows.iter().find(|r| r.allele == "30").unwrap();
        assert!(long.coverage < short.coverage);
    }

    #[test]
    fn test_length_attenuation() {
        assert_eq!(length_attenuation(300.0, 0.0), 1.0);
        assert_eq!(length_attenuation(200.0, 0.05), 1.0);
        assert!((length_attenuation(300.0, 1.0) - 0.1).abs() < 1e-12);
        assert!(length_attenuation(350.0, 0.02) < length_attenuation(250.0, 0.02));
    }

    #[test]
    fn test_het_weights_normalised() {
        let mut rng = Mulberry32::new(11);
        for _ in 0..100 {
            let weights = het_weights(&mut rng, 2, 0.8);
            assert!((weights.iter().sum::<f64>() - 2.0).abs() < 1e-9);
            assert!(weights.iter().all(|&w| w > 0.0));
        }
        assert_eq!(het_weights(&mut rng, 2, 0.0), vec![1.0, 1.0]);
    }

    #[test]
    fn test_huge_dna_input_returns() {
        let model = BUILTIN_REGISTRY.get("FGA");
        let input = MixtureInput::new("FGA", vec![Contributor::new("A", "a", 1.0, &[20.0, 22.0])], 1e16);
        let counts = generate_reads(model, &input, &NgsParams::default());
        assert!(counts.rows.iter().any(|r| r.size == 20.0));
        assert!(counts.total_coverage > 0);
    }

    #[test]
    fn test_zero_dna_yields_no_rows() {
        let model = BUILTIN_REGISTRY.get("D3S1358");
        let mut input = two_person(0.2);
        input.dna_input = 0.0;
        let counts = generate_reads(model, &input, &NgsParams::default());
        assert!(counts.rows.is_empty());
        let result = call_rows(&counts, &CallingThresholds::default());
        assert!(result.rows.is_empty());
        assert!(result.bars.is_empty());
    }
}
