use super::{format_float, write_lines};
use crate::catalog::{assemble, Catalog, CatalogParams};
use crate::cli::CatalogArgs;
use crate::utils::{format_allele, Result};

pub fn catalog(args: CatalogArgs) -> Result<()> {
    log::info!("Loading allele catalog from {}", args.catalog_path.display());
    let catalog = Catalog::from_path(&args.catalog_path)?;
    let marker = catalog.marker(&args.marker).ok_or_else(|| {
        format!(
            "Marker {} not found in {}",
            args.marker,
            args.catalog_path.display()
        )
    })?;

    let params = CatalogParams {
        ratio: args.ratio,
        base_coverage: args.base_coverage,
        seed: args.seed,
        scale: args.axis,
    };
    let mixture = assemble(marker, &params);
    log::info!(
        "Assembled {} allele(s) for {}",
        mixture.selected.len(),
        mixture.marker
    );

    let mut lines = vec!["allele\tcontributor\tcoverage\tsequence".to_string()];
    lines.extend(mixture.rows.iter().map(|row| {
        format!(
            "{}\t{}\t{}\t{}",
            row.allele,
            row.contributors.join(","),
            row.coverage,
            row.sequence.as_deref().unwrap_or(".")
        )
    }));
    lines.push("# bars".to_string());
    lines.push("size\tcoverage\theight".to_string());
    lines.extend(mixture.bars.iter().map(|bar| {
        format!(
            "{}\t{}\t{}",
            format_allele(bar.size),
            bar.coverage,
            format_float(bar.height(args.axis))
        )
    }));
    if args.curve {
        lines.push("# ce_curve".to_string());
        lines.push("position\tintensity".to_string());
        lines.extend(
            mixture
                .ce_curve
                .iter()
                .map(|(x, y)| format!("{:.2}\t{:.3}", x, y)),
        );
    }

    write_lines(lines)
}
