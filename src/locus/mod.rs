//! Per-locus stutter and amplicon-length parameters.

mod model;
mod registry;

pub use model::{DegradationClass, LengthModel, LocusModel, StutterRates, DEFAULT_STUTTER_SD};
pub use registry::{default_model, normalize_id, LocusRegistry, BUILTIN_REGISTRY, DEFAULT_LOCUS_ID};
