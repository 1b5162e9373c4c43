//! Capillary electrophoresis simulation.
//!
//! [`generate_core`] produces the raw signal for one locus and never looks at
//! a threshold; [`interpret`] gates that signal by AT/ST without resampling.

mod core;
mod interpret;
mod noise;
mod params;
pub mod stutter;
mod trace;

pub use self::core::{generate_core, seed_key, CoreResult, Peak, PeakKind};
pub use interpret::{interpret, InterpretedPeak, InterpretedResult};
pub use noise::noise_ceiling;
pub use params::{CoreOverrides, CoreParams, Thresholds};
pub use stutter::{StutterOffset, StutterSource};
pub use trace::{render_trace, CE_PEAK_SIGMA};

use crate::locus::LocusRegistry;
use crate::mixture::MixtureInput;

/// Looks up the locus model, generates the core signal and interprets it.
pub fn simulate(
    registry: &LocusRegistry,
    input: &MixtureInput,
    params: &CoreParams,
    thresholds: &Thresholds,
) -> (CoreResult, InterpretedResult) {
    let core = generate_core(registry.get(&input.locus_id), input, params);
    let interpreted = interpret(&core, thresholds);
    (core, interpreted)
}
