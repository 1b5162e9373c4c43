/// Biological and instrument parameters of the CE core generator.
///
/// Every field enters the seed key, so any change produces a new draw. The
/// interpretation thresholds live in [`Thresholds`] and never do.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreParams {
    /// RFU per ng of effective template (κ).
    pub kappa: f64,
    /// Coefficient of variation of heterozygote balance.
    pub het_balance_cv: f64,
    /// Sigma of the per-contributor log-normal amplitude draw.
    pub lognormal_sigma: f64,
    pub locus_efficiency: f64,
    /// Degradation coefficient k; 0 disables degradation.
    pub degradation: f64,
    pub baseline_mean: f64,
    pub baseline_sd: f64,
    /// Multiplier on every stutter rate; 0 disables stutter.
    pub stutter_scale: f64,
}

impl Default for CoreParams {
    fn default() -> Self {
        Self {
            kappa: 3000.0,
            het_balance_cv: 0.1,
            lognormal_sigma: 0.15,
            locus_efficiency: 1.0,
            degradation: 0.0,
            baseline_mean: 10.0,
            baseline_sd: 3.0,
            stutter_scale: 1.0,
        }
    }
}

/// Partial parameter set; unset fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreOverrides {
    pub kappa: Option<f64>,
    pub het_balance_cv: Option<f64>,
    pub lognormal_sigma: Option<f64>,
    pub locus_efficiency: Option<f64>,
    pub degradation: Option<f64>,
    pub baseline_mean: Option<f64>,
    pub baseline_sd: Option<f64>,
    pub stutter_scale: Option<f64>,
}

impl CoreParams {
    pub fn merged(overrides: &CoreOverrides) -> Self {
        let defaults = Self::default();
        Self {
            kappa: overrides.kappa.unwrap_or(defaults.kappa),
            het_balance_cv: overrides.het_balance_cv.unwrap_or(defaults.het_balance_cv),
            lognormal_sigma: overrides.lognormal_sigma.unwrap_or(defaults.lognormal_sigma),
            locus_efficiency: overrides
                .locus_efficiency
                .unwrap_or(defaults.locus_efficiency),
            degradation: overrides.degradation.unwrap_or(defaults.degradation),
            baseline_mean: overrides.baseline_mean.unwrap_or(defaults.baseline_mean),
            baseline_sd: overrides.baseline_sd.unwrap_or(defaults.baseline_sd),
            stutter_scale: overrides.stutter_scale.unwrap_or(defaults.stutter_scale),
        }
    }
}

/// Analytical and stochastic thresholds in RFU. AT <= ST by convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub analytical: f64,
    pub stochastic: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            analytical: 50.0,
            stochastic: 200.0,
        }
    }
}
