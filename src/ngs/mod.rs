//! NGS read-count simulation.

mod params;
mod reads;
mod rows;

pub use params::{CallingThresholds, NgsOverrides, NgsParams};
pub use reads::{call_rows, generate_reads, length_attenuation, ngs_seed_key, NgsResult, ReadCounts};
pub use rows::{group_bars, NgsBar, NgsRow};

use crate::locus::LocusRegistry;
use crate::mixture::MixtureInput;

/// Looks up the locus model, draws read counts and calls them.
pub fn simulate(
    registry: &LocusRegistry,
    input: &MixtureInput,
    params: &NgsParams,
    thresholds: &CallingThresholds,
) -> NgsResult {
    let counts = generate_reads(registry.get(&input.locus_id), input, params);
    call_rows(&counts, thresholds)
}
