pub mod catalog;
pub mod ce;
pub mod loci;
pub mod ngs;

use crate::locus::LocusRegistry;
use crate::utils::{open_catalog_reader, Result};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Built-in locus models, with the models of `path` layered over them.
fn load_registry(path: Option<&Path>) -> Result<LocusRegistry> {
    let registry = LocusRegistry::builtin();
    match path {
        Some(path) => {
            log::info!("Loading locus models from {}", path.display());
            let reader = open_catalog_reader(path)?;
            registry
                .with_overrides(reader)
                .map_err(|e| format!("{}: {}", path.display(), e))
        }
        None => Ok(registry),
    }
}

/// Writes tab-separated lines to stdout.
fn write_lines<I: IntoIterator<Item = String>>(lines: I) -> Result<()> {
    let stdout = std::io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    for line in lines {
        writeln!(writer, "{}", line).map_err(|e| format!("Failed to write output: {}", e))?;
    }
    writer
        .flush()
        .map_err(|e| format!("Failed to write output: {}", e))
}

fn format_float(value: f64) -> String {
    format!("{:.2}", value)
}
