use super::core::{CoreResult, Peak};
use super::params::Thresholds;

/// A reported true-allele peak.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpretedPeak {
    pub peak: Peak,
    /// Above AT but below ST: the sister allele may have dropped out.
    pub below_stochastic: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterpretedResult {
    pub locus_id: String,
    pub thresholds: Thresholds,
    pub true_peaks: Vec<InterpretedPeak>,
    pub stutter_peaks: Vec<Peak>,
    /// Advisory messages; never errors.
    pub notes: Vec<String>,
}

impl InterpretedResult {
    pub fn has_dropout_risk(&self) -> bool {
        self.true_peaks.iter().any(|p| p.below_stochastic)
    }
}

/// Gates the peaks of `core` by the analytical and stochastic thresholds.
///
/// Peaks are cloned as they are; their positions and intensities never change,
/// so calling this again with other thresholds re-interprets the same signal.
pub fn interpret(core: &CoreResult, thresholds: &Thresholds) -> InterpretedResult {
    let Thresholds {
        analytical,
        stochastic,
    } = *thresholds;
    let mut notes = Vec::new();

    if analytical > stochastic {
        notes.push(format!(
            "Analytical threshold ({} RFU) is above the stochastic threshold ({} RFU)",
            analytical, stochastic
        ));
    }

    let true_peaks: Vec<InterpretedPeak> = core
        .true_peaks
        .iter()
        .filter(|p| p.intensity >= analytical)
        .map(|p| {
            let below_stochastic = p.intensity < stochastic;
            if below_stochastic {
                notes.push(format!(
                    "Possible drop-out: allele {} at {:.0} RFU is below the stochastic threshold ({} RFU)",
                    p.label(),
                    p.intensity,
                    stochastic
                ));
            }
            InterpretedPeak {
                peak: p.clone(),
                below_stochastic,
            }
        })
        .collect();

    let stutter_peaks = core
        .stutter_peaks
        .iter()
        .filter(|p| p.intensity >= analytical)
        .cloned()
        .collect();

    InterpretedResult {
        locus_id: core.locus_id.clone(),
        thresholds: *thresholds,
        true_peaks,
        stutter_peaks,
        notes,
    }
}
