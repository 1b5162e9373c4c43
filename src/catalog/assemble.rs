use super::entry::{CatalogEntry, MarkerCatalog};
use super::motif::display_sequence;
use crate::ngs::{group_bars, NgsBar, NgsRow};
use crate::random::{rng_from_key, uniform, uniform_index};
use crate::utils::{from_tenths, gaussian_superposition, grid, AxisScale};
use rand::seq::SliceRandom;
use std::collections::BTreeMap;

/// Largest number of alleles drawn from a catalog.
const MAX_SELECTED: usize = 4;
const MIN_SELECTED: usize = 2;
/// Coverage jitter is uniform in ±10 %.
const COVERAGE_JITTER: f64 = 0.10;
/// Height of a contributor's allele in the catalog CE curve at ratio 1.
pub const CURVE_INTENSITY: f64 = 1000.0;
pub const CURVE_SIGMA: f64 = 0.04;
pub const CURVE_STEP: f64 = 0.01;
pub const CURVE_PADDING: f64 = 0.4;
/// Satellite fractions of the catalog CE curve: (repeat offset, fraction).
const CURVE_SATELLITES: [(i64, f64); 3] = [(-1, 0.06), (-2, 0.01), (1, 0.005)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualContributor {
    A,
    B,
}

impl VirtualContributor {
    pub fn label(self) -> &'static str {
        match self {
            VirtualContributor::A => "A",
            VirtualContributor::B => "B",
        }
    }

    /// Share of the mixture carried by this contributor when A has `ratio`.
    pub fn share(self, ratio: f64) -> f64 {
        match self {
            VirtualContributor::A => ratio,
            VirtualContributor::B => 1.0 - ratio,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedAllele {
    pub entry: CatalogEntry,
    pub contributor: VirtualContributor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogParams {
    /// Share of contributor A; B receives the rest.
    pub ratio: f64,
    pub base_coverage: f64,
    pub seed: u64,
    pub scale: AxisScale,
}

impl Default for CatalogParams {
    fn default() -> Self {
        Self {
            ratio: 0.5,
            base_coverage: 1000.0,
            seed: 0,
            scale: AxisScale::Linear,
        }
    }
}

/// Two-contributor mixture assembled from a marker catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogMixture {
    pub marker: String,
    pub selected: Vec<SelectedAllele>,
    pub rows: Vec<NgsRow>,
    pub bars: Vec<NgsBar>,
    /// Accumulated CE signal before the Gaussian bumps are drawn.
    pub ce_peaks: Vec<(f64, f64)>,
    pub ce_curve: Vec<(f64, f64)>,
}

/// Picks 2 to 4 alleles from the catalog, seeded by marker and seed only.
///
/// When the marker has an isoallele group, one group is chosen and two of its
/// variants are taken first. The remaining slots are filled with distinct
/// sizes. The result is sorted by size; the first half (rounded up) belongs to
/// contributor A, the rest to B.
pub fn select_alleles(catalog: &MarkerCatalog, seed: u64) -> Vec<SelectedAllele> {
    let mut rng = rng_from_key(&format!("catalog-select|{}|{}", catalog.marker, seed));
    let target = (MIN_SELECTED + uniform_index(&mut rng, MAX_SELECTED - MIN_SELECTED + 1))
        .min(catalog.len());

    let mut groups = catalog.size_groups();
    let mut picked: Vec<usize> = Vec::with_capacity(target);

    let isoallele_groups: Vec<usize> = groups
        .iter()
        .enumerate()
        .filter(|(_, g)| g.len() > 1)
        .map(|(i, _)| i)
        .collect();
    if target >= 2 && !isoallele_groups.is_empty() {
        let group_index = isoallele_groups[uniform_index(&mut rng, isoallele_groups.len())];
        let mut group = groups.remove(group_index);
        let first = group.remove(uniform_index(&mut rng, group.len()));
        let second = group.remove(uniform_index(&mut rng, group.len()));
        picked.push(first);
        picked.push(second);
    }

    groups.shuffle(&mut rng);
    for group in groups {
        if picked.len() >= target {
            break;
        }
        picked.push(group[uniform_index(&mut rng, group.len())]);
    }

    picked.sort_by_key(|&i| (catalog.entries[i].key(), i));
    let group_a = picked.len().div_ceil(2);
    picked
        .into_iter()
        .enumerate()
        .map(|(rank, i)| SelectedAllele {
            entry: catalog.entries[i].clone(),
            contributor: if rank < group_a {
                VirtualContributor::A
            } else {
                VirtualContributor::B
            },
        })
        .collect()
}

/// One row per selected allele; isoalleles stay separate.
pub fn catalog_rows(marker: &str, selected: &[SelectedAllele], params: &CatalogParams) -> Vec<NgsRow> {
    let mut rng = rng_from_key(&format!(
        "catalog-reads|{}|{}|ratio={}|coverage={}",
        marker, params.seed, params.ratio, params.base_coverage
    ));
    selected
        .iter()
        .map(|allele| {
            let jitter = 1.0 + COVERAGE_JITTER * (2.0 * uniform(&mut rng) - 1.0);
            let expected = params.base_coverage * allele.contributor.share(params.ratio) * jitter;
            NgsRow {
                allele: allele.entry.label.clone(),
                size: allele.entry.size,
                coverage: expected.round().max(1.0) as u64,
                stutter_reads: 0,
                stutter_influenced: false,
                contributors: vec![allele.contributor.label().to_string()],
                sequence: display_sequence(
                    allele.entry.sequence.as_deref(),
                    allele.entry.repeat_structure.as_deref(),
                ),
            }
        })
        .collect()
}

/// Ratio-weighted signal of every selected allele plus its n-1, n-2 and n+1
/// satellites, summed per position.
pub fn curve_peaks(selected: &[SelectedAllele], ratio: f64) -> Vec<(f64, f64)> {
    let mut signal: BTreeMap<i64, f64> = BTreeMap::new();
    for allele in selected {
        let height = CURVE_INTENSITY * allele.contributor.share(ratio);
        let key = allele.entry.key();
        *signal.entry(key).or_default() += height;
        for (repeats, fraction) in CURVE_SATELLITES {
            *signal.entry(key + 10 * repeats).or_default() += height * fraction;
        }
    }
    signal
        .into_iter()
        .map(|(key, height)| (from_tenths(key), height))
        .collect()
}

/// Evaluates narrow Gaussian bumps over the padded peak range. The bumps are
/// narrow enough that 14 and 14.2 stay visually distinct.
pub fn render_curve(peaks: &[(f64, f64)], scale: AxisScale) -> Vec<(f64, f64)> {
    let (Some(first), Some(last)) = (peaks.first(), peaks.last()) else {
        return Vec::new();
    };
    grid(first.0 - CURVE_PADDING, last.0 + CURVE_PADDING, CURVE_STEP)
        .into_iter()
        .map(|x| (x, scale.apply(gaussian_superposition(x, peaks, CURVE_SIGMA))))
        .collect()
}

/// Selects alleles and builds the NGS rows, bars and CE curve for one marker.
pub fn assemble(catalog: &MarkerCatalog, params: &CatalogParams) -> CatalogMixture {
    let selected = select_alleles(catalog, params.seed);
    let rows = catalog_rows(&catalog.marker, &selected, params);
    let bars = group_bars(&rows);
    let ce_peaks = curve_peaks(&selected, params.ratio);
    let ce_curve = render_curve(&ce_peaks, params.scale);

    log::debug!(
        "{}: selected {} alleles, {} bars",
        catalog.marker,
        selected.len(),
        bars.len()
    );

    CatalogMixture {
        marker: catalog.marker.clone(),
        selected,
        rows,
        bars,
        ce_peaks,
        ce_curve,
    }
}
