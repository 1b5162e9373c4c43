mod axis;
mod math;
mod readers;
mod util;

pub use axis::AxisScale;
pub use math::{
    format_allele, from_tenths, gaussian_superposition, grid, parse_allele, round_tenth,
    to_tenths,
};
pub use readers::open_catalog_reader;
pub use util::{handle_error_and_exit, Result};
