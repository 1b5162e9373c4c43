use super::{load_registry, write_lines};
use crate::cli::LociArgs;
use crate::locus::LocusModel;
use crate::utils::{format_allele, Result};

pub fn loci(args: LociArgs) -> Result<()> {
    let registry = load_registry(args.loci_path.as_deref())?;
    log::info!("Listing {} locus models", registry.len());

    let mut lines =
        vec!["id\tminus1\tminus2\tplus1\tsd\treference_allele\treference_length\tmotif_length\tclass"
            .to_string()];
    lines.extend(registry.models().map(model_line));
    lines.push(model_line(registry.default_model()));
    write_lines(lines)
}

fn model_line(model: &LocusModel) -> String {
    let optional = |rate: Option<f64>| rate.map_or("-".to_string(), |r| r.to_string());
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        model.id,
        model.stutter.minus1,
        optional(model.stutter.minus2),
        optional(model.stutter.plus1),
        optional(model.stutter.sd),
        format_allele(model.length.reference_allele),
        model.length.reference_length,
        model.length.motif_length,
        model.degradation_class
    )
}
