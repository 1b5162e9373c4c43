use crate::utils::{to_tenths, Result};
use std::str::FromStr;

/// Jitter standard deviation used when a locus does not specify one.
pub const DEFAULT_STUTTER_SD: f64 = 0.015;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StutterRates {
    /// Back stutter (n-1), always modelled.
    pub minus1: f64,
    /// Double back stutter (n-2).
    pub minus2: Option<f64>,
    /// Forward stutter (n+1).
    pub plus1: Option<f64>,
    pub sd: Option<f64>,
}

impl StutterRates {
    pub fn jitter_sd(&self) -> f64 {
        self.sd.unwrap_or(DEFAULT_STUTTER_SD)
    }
}

/// Maps repeat counts to amplicon length in base pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthModel {
    pub reference_allele: f64,
    pub reference_length: f64,
    pub motif_length: u32,
}

impl LengthModel {
    /// Amplicon length of an allele. The decimal digit of a microvariant counts
    /// extra bases, so 9.3 at a tetranucleotide locus is 9 * 4 + 3 bases of repeat.
    pub fn amplicon_length(&self, size: f64) -> f64 {
        self.reference_length + (self.repeat_bases(size) - self.repeat_bases(self.reference_allele))
    }

    fn repeat_bases(&self, size: f64) -> f64 {
        let tenths = to_tenths(size);
        let whole = tenths.div_euclid(10);
        let partial = tenths.rem_euclid(10);
        (whole * self.motif_length as i64 + partial) as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegradationClass {
    #[default]
    Standard,
    /// Loci with long amplicons that lose signal faster in degraded samples.
    Long,
}

impl DegradationClass {
    /// Multiplier applied to the user-facing degradation coefficient.
    pub fn multiplier(self) -> f64 {
        match self {
            DegradationClass::Standard => 4.0,
            DegradationClass::Long => 6.0,
        }
    }
}

impl FromStr for DegradationClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "standard" => Ok(DegradationClass::Standard),
            "long" => Ok(DegradationClass::Long),
            _ => Err(format!(
                "Invalid degradation class '{}'. Options are: standard, long",
                s
            )),
        }
    }
}

impl std::fmt::Display for DegradationClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegradationClass::Standard => write!(f, "standard"),
            DegradationClass::Long => write!(f, "long"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocusModel {
    pub id: String,
    pub stutter: StutterRates,
    pub length: LengthModel,
    pub degradation_class: DegradationClass,
}

impl LocusModel {
    pub fn amplicon_length(&self, size: f64) -> f64 {
        self.length.amplicon_length(size)
    }

    /// Fraction of signal left after degradation with coefficient `k`.
    /// Decreases strictly with amplicon length for any `k > 0`.
    pub fn degradation_factor(&self, size: f64, k: f64) -> f64 {
        if k <= 0.0 {
            return 1.0;
        }
        let internal_k = k * self.degradation_class.multiplier();
        (-internal_k * self.amplicon_length(size) / 100.0).exp()
    }
}
