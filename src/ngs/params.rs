/// Read-count model parameters. Every field enters the NGS seed key.
#[derive(Debug, Clone, PartialEq)]
pub struct NgsParams {
    /// Expected reads per ng of template per allele copy.
    pub reads_per_ng: f64,
    /// Negative-binomial dispersion; 0 gives Poisson counts.
    pub dispersion: f64,
    /// Degradation coefficient k; 0 disables degradation.
    pub degradation: f64,
    /// Coefficient of variation of heterozygote balance.
    pub het_balance_cv: f64,
    pub locus_efficiency: f64,
}

impl Default for NgsParams {
    fn default() -> Self {
        Self {
            reads_per_ng: 2000.0,
            dispersion: 0.05,
            degradation: 0.0,
            het_balance_cv: 0.1,
            locus_efficiency: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NgsOverrides {
    pub reads_per_ng: Option<f64>,
    pub dispersion: Option<f64>,
    pub degradation: Option<f64>,
    pub het_balance_cv: Option<f64>,
    pub locus_efficiency: Option<f64>,
}

impl NgsParams {
    pub fn merged(overrides: &NgsOverrides) -> Self {
        let defaults = Self::default();
        Self {
            reads_per_ng: overrides.reads_per_ng.unwrap_or(defaults.reads_per_ng),
            dispersion: overrides.dispersion.unwrap_or(defaults.dispersion),
            degradation: overrides.degradation.unwrap_or(defaults.degradation),
            het_balance_cv: overrides.het_balance_cv.unwrap_or(defaults.het_balance_cv),
            locus_efficiency: overrides
                .locus_efficiency
                .unwrap_or(defaults.locus_efficiency),
        }
    }
}

/// A row is called when it has at least `min_reads` reads and at least
/// `min_fraction` of the locus coverage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallingThresholds {
    pub min_reads: u64,
    pub min_fraction: f64,
}

impl Default for CallingThresholds {
    fn default() -> Self {
        Self {
            min_reads: 20,
            min_fraction: 0.02,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overrides() {
        assert_eq!(NgsParams::merged(&NgsOverrides::default()), NgsParams::default());
        let params = NgsParams::merged(&NgsOverrides {
            dispersion: Some(0.0),
            ..Default::default()
        });
        assert_eq!(params.dispersion, 0.0);
        assert_eq!(params.reads_per_ng, NgsParams::default().reads_per_ng);
    }
}
