use super::{format_float, load_registry, write_lines};
use crate::ce::{render_trace, simulate, CoreOverrides, CoreParams, Peak, Thresholds};
use crate::cli::CeArgs;
use crate::mixture::MixtureInput;
use crate::utils::{format_allele, Result};
use itertools::Itertools;

pub fn ce(args: CeArgs) -> Result<()> {
    let registry = load_registry(args.loci_path.as_deref())?;
    let params = CoreParams::merged(&CoreOverrides {
        kappa: args.kappa,
        het_balance_cv: args.het_balance_cv,
        lognormal_sigma: args.lognormal_sigma,
        locus_efficiency: args.locus_efficiency,
        degradation: args.degradation,
        baseline_mean: args.baseline_mean,
        baseline_sd: args.baseline_sd,
        stutter_scale: args.stutter_scale,
    });
    let thresholds = Thresholds {
        analytical: args.analytical_threshold,
        stochastic: args.stochastic_threshold,
    };
    let input =
        MixtureInput::new(&args.locus, args.contributors, args.dna_input).with_seed(args.seed);

    log::info!(
        "Simulating CE for {} with {} contributor(s)",
        input.locus_id,
        input.active_contributors().count()
    );
    let (core, interpreted) = simulate(&registry, &input, &params, &thresholds);

    let mut lines: Vec<String> = interpreted.notes.iter().map(|n| format!("# {}", n)).collect();
    if args.trace {
        lines.push("position\tintensity".to_string());
        lines.extend(
            render_trace(&core, args.axis)
                .into_iter()
                .map(|(x, y)| format!("{:.2}\t{:.3}", x, y)),
        );
    } else {
        lines.push(format!("# baseline\t{}", format_float(core.baseline)));
        lines.push("allele\tkind\tintensity\tstutter\tflag\tcontributors\tsources".to_string());
        for reported in &interpreted.true_peaks {
            let flag = if reported.below_stochastic {
                "below_st"
            } else {
                "."
            };
            lines.push(peak_line(&reported.peak, flag));
        }
        for peak in &interpreted.stutter_peaks {
            lines.push(peak_line(peak, "."));
        }
    }

    write_lines(lines)
}

fn peak_line(peak: &Peak, flag: &str) -> String {
    let sources = if peak.stutter_sources.is_empty() {
        ".".to_string()
    } else {
        peak.stutter_sources
            .iter()
            .map(|s| format!("{}@{}", s.offset, format_allele(s.parent)))
            .join(",")
    };
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}",
        peak.label(),
        peak.kind,
        format_float(peak.intensity),
        format_float(peak.stutter_component()),
        flag,
        peak.contributors.join(","),
        sources
    )
}
