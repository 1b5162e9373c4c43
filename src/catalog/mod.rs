//! Mixtures assembled straight from a marker's static allele catalog.

mod assemble;
mod entry;
mod motif;

pub use assemble::{
    assemble, catalog_rows, curve_peaks, render_curve, select_alleles, CatalogMixture,
    CatalogParams, SelectedAllele, VirtualContributor, CURVE_SIGMA,
};
pub use entry::{Catalog, CatalogEntry, MarkerCatalog};
pub use motif::{display_sequence, expand_motif};
