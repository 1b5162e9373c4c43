use super::core::{Peak, PeakKind};
use crate::random::{gaussian, log_normal, uniform, uniform_index};
use crate::utils::{grid, round_tenth};
use rand::RngCore;

/// Resolution of the dense noise trace, in repeat units.
pub const TRACE_STEP: f64 = 0.05;
/// Spacing of the random knots the trace interpolates between.
const KNOT_SPACING: f64 = 0.5;
/// Noise peaks and trace extend this far beyond the observed alleles.
pub const RANGE_PADDING: f64 = 2.0;
const NOISE_PEAK_SIGMA: f64 = 0.35;
const TRACE_JITTER: f64 = 0.2;
const CEILING_SDS: f64 = 6.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Noise {
    pub baseline: f64,
    pub peaks: Vec<Peak>,
    pub trace: Vec<(f64, f64)>,
}

/// Upper bound shared by the baseline, noise peaks and the dense trace.
pub fn noise_ceiling(baseline_mean: f64, baseline_sd: f64) -> f64 {
    (baseline_mean + CEILING_SDS * baseline_sd).max(0.0)
}

/// Baseline level, sparse noise peaks and the dense trace over `range`
/// (the observed allele span, padded by [`RANGE_PADDING`] on each side).
pub fn generate_noise<R: RngCore + ?Sized>(
    rng: &mut R,
    range: (f64, f64),
    baseline_mean: f64,
    baseline_sd: f64,
) -> Noise {
    let ceiling = noise_ceiling(baseline_mean, baseline_sd);
    let baseline = (baseline_mean + baseline_sd * gaussian(rng)).clamp(0.0, ceiling);

    let start = range.0 - RANGE_PADDING;
    let end = range.1 + RANGE_PADDING;
    let width = end - start;

    // roughly one noise peak per two repeat units
    let num_peaks = (width / 2.0).ceil() as usize + uniform_index(rng, 3);
    let peak_mean = baseline_mean + 2.0 * baseline_sd;
    let mut peaks = Vec::with_capacity(num_peaks);
    for _ in 0..num_peaks {
        let position = round_tenth(start + uniform(rng) * width);
        let intensity = log_normal(rng, peak_mean, NOISE_PEAK_SIGMA).min(ceiling);
        if intensity > 0.0 {
            peaks.push(Peak {
                position,
                intensity,
                kind: PeakKind::Noise,
                contributors: Vec::new(),
                stutter_sources: Vec::new(),
            });
        }
    }
    peaks.sort_by(|a, b| a.position.total_cmp(&b.position));

    let knots: Vec<(f64, f64)> = grid(start, end, KNOT_SPACING)
        .into_iter()
        .map(|x| (x, (baseline + baseline_sd * gaussian(rng)).clamp(0.0, ceiling)))
        .collect();

    let trace = grid(start, end, TRACE_STEP)
        .into_iter()
        .map(|x| {
            let level = interpolate(&knots, x) + TRACE_JITTER * baseline_sd * gaussian(rng);
            (x, level.clamp(0.0, ceiling))
        })
        .collect();

    Noise {
        baseline,
        peaks,
        trace,
    }
}

fn interpolate(knots: &[(f64, f64)], x: f64) -> f64 {
    match knots.iter().position(|&(kx, _)| kx >= x) {
        None => knots.last().map_or(0.0, |&(_, y)| y),
        Some(0) => knots[0].1,
        Some(i) => {
            let (x0, y0) = knots[i - 1];
            let (x1, y1) = knots[i];
            if x1 == x0 {
                y1
            } else {
                y0 + (y1 - y0) * (x - x0) / (x1 - x0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::Mulberry32;

    #[test]
    fn test_noise_spans_padded_range() {
        let mut rng = Mulberry32::new(1);
        let noise = generate_noise(&mut rng, (20.0, 22.0), 10.0, 3.0);
        let first = noise.trace.first().unwrap().0;
        let last = noise.trace.last().unwrap().0;
        assert_eq!(first, 18.0);
        assert_eq!(last, 24.0);
        for peak in &noise.peaks {
            assert!(peak.position >= 18.0 && peak.position <= 24.0);
            assert_eq!(peak.kind, PeakKind::Noise);
        }
    }

    #[test]
    fn test_noise_clipped_to_ceiling() {
        let ceiling = noise_ceiling(10.0, 3.0);
        for seed in 0..50 {
            let mut rng = Mulberry32::new(seed);
            let noise = generate_noise(&mut rng, (8.0, 12.0), 10.0, 3.0);
            assert!(noise.baseline <= ceiling);
            assert!(noise.peaks.iter().all(|p| p.intensity <= ceiling));
            assert!(noise.trace.iter().all(|&(_, y)| (0.0..=ceiling).contains(&y)));
        }
    }

    #[test]
    fn test_noise_peaks_sorted() {
        let mut rng = Mulberry32::new(2);
        let noise = generate_noise(&mut rng, (5.0, 30.0), 10.0, 3.0);
        assert!(noise
            .peaks
            .windows(2)
            .all(|w| w[0].position <= w[1].position));
        assert!(noise.peaks.len() >= 15);
    }

    #[test]
    fn test_silent_baseline() {
        let mut rng = Mulberry32::new(3);
        let noise = generate_noise(&mut rng, (10.0, 11.0), 0.0, 0.0);
        assert_eq!(noise.baseline, 0.0);
        assert!(noise.peaks.is_empty());
        assert!(noise.trace.iter().all(|&(_, y)| y == 0.0));
    }

    #[test]
    fn test_interpolate() {
        let knots = [(0.0, 0.0), (1.0, 10.0), (2.0, 0.0)];
        assert_eq!(interpolate(&knots, 0.5), 5.0);
        assert_eq!(interpolate(&knots, 1.5), 5.0);
        assert_eq!(interpolate(&knots, -1.0), 0.0);
        assert_eq!(interpolate(&knots, 3.0), 0.0);
    }
}
