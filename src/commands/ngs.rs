use super::{format_float, load_registry, write_lines};
use crate::cli::NgsArgs;
use crate::mixture::MixtureInput;
use crate::ngs::{simulate, CallingThresholds, NgsOverrides, NgsParams};
use crate::utils::{format_allele, Result};

pub fn ngs(args: NgsArgs) -> Result<()> {
    let registry = load_registry(args.loci_path.as_deref())?;
    let params = NgsParams::merged(&NgsOverrides {
        reads_per_ng: args.reads_per_ng,
        dispersion: args.dispersion,
        degradation: args.degradation,
        het_balance_cv: args.het_balance_cv,
        locus_efficiency: args.locus_efficiency,
    });
    let thresholds = CallingThresholds {
        min_reads: args.min_reads,
        min_fraction: args.min_fraction,
    };
    let input =
        MixtureInput::new(&args.locus, args.contributors, args.dna_input).with_seed(args.seed);

    log::info!(
        "Simulating NGS reads for {} with {} contributor(s)",
        input.locus_id,
        input.active_contributors().count()
    );
    let result = simulate(&registry, &input, &params, &thresholds);

    let mut lines = vec![
        format!("# total_coverage\t{}", result.total_coverage),
        "allele\tcoverage\tstutter_fraction\tstutter_influenced\tcontributors".to_string(),
    ];
    lines.extend(result.rows.iter().map(|row| {
        format!(
            "{}\t{}\t{}\t{}\t{}",
            row.allele,
            row.coverage,
            format_float(row.stutter_fraction()),
            row.stutter_influenced,
            row.contributors.join(",")
        )
    }));
    lines.push("# bars".to_string());
    lines.push("size\tcoverage\theight".to_string());
    lines.extend(result.bars.iter().map(|bar| {
        format!(
            "{}\t{}\t{}",
            format_allele(bar.size),
            bar.coverage,
            format_float(bar.height(args.axis))
        )
    }));

    write_lines(lines)
}
