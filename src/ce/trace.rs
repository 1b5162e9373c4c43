use super::core::CoreResult;
use crate::utils::{gaussian_superposition, AxisScale};

/// Width of the bump drawn for each CE peak, in repeat units.
pub const CE_PEAK_SIGMA: f64 = 0.06;

/// Renders the core result as an ordered `(position, intensity)` series.
///
/// True, stutter and noise peaks are drawn as narrow Gaussian bumps on top of
/// the dense baseline trace, then mapped onto `scale`.
pub fn render_trace(core: &CoreResult, scale: AxisScale) -> Vec<(f64, f64)> {
    let bumps: Vec<(f64, f64)> = core
        .true_peaks
        .iter()
        .chain(&core.stutter_peaks)
        .chain(&core.noise_peaks)
        .map(|p| (p.position, p.intensity))
        .collect();

    core.noise_trace
        .iter()
        .map(|&(x, baseline)| {
            let y = baseline + gaussian_superposition(x, &bumps, CE_PEAK_SIGMA);
            (x, scale.apply(y))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ce::{generate_core, CoreParams};
    use crate::locus::BUILTIN_REGISTRY;
    use crate::mixture::{Contributor, MixtureInput};

    fn core() -> CoreResult {
        let input = MixtureInput::new(
            "D8S1179",
            vec![
                Contributor::new("A", "A", 0.7, &[12.0, 14.0]),
                Contributor::new("B", "B", 0.3, &[13.0, 15.0]),
            ],
            1.0,
        );
        generate_core(BUILTIN_REGISTRY.get("D8S1179"), &input, &CoreParams::default())
    }

    fn value_at(trace: &[(f64, f64)], position: f64) -> f64 {
        trace
            .iter()
            .min_by(|a, b| (a.0 - position).abs().total_cmp(&(b.0 - position).abs()))
            .map(|&(_, y)| y)
            .unwrap()
    }

    #[test]
    fn test_trace_covers_true_peaks() {
        let core = core();
        let trace = render_trace(&core, AxisScale::Linear);
        assert_eq!(trace.len(), core.noise_trace.len());
        for peak in &core.true_peaks {
            assert!(value_at(&trace, peak.position) >= 0.99 * peak.intensity);
        }
    }

    #[test]
    fn test_trace_is_ordered() {
        let trace = render_trace(&core(), AxisScale::Linear);
        assert!(trace.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_log_axis() {
        let core = core();
        let linear = render_trace(&core, AxisScale::Linear);
        let log = render_trace(&core, AxisScale::Log);
        for (l, g) in linear.iter().zip(&log) {
            assert_eq!(l.0, g.0);
            assert!((g.1 - (1.0 + l.1).log10()).abs() < 1e-9);
        }
    }
}
