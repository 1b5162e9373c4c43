//! Contributors and alleles shared by the CE and NGS simulators.

use crate::utils::{format_allele, parse_allele, round_tenth, to_tenths, Result};
use itertools::Itertools;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct Allele {
    /// Repeat-unit count; microvariants carry the extra bases as a decimal (9.3).
    pub size: f64,
    /// Same size as another allele but a different internal sequence.
    pub isoallele: bool,
}

impl Allele {
    pub fn new(size: f64) -> Self {
        Self {
            size: round_tenth(size),
            isoallele: false,
        }
    }

    pub fn isoallele(size: f64) -> Self {
        Self {
            size: round_tenth(size),
            isoallele: true,
        }
    }

    pub fn key(&self) -> i64 {
        to_tenths(self.size)
    }

    pub fn label(&self) -> String {
        format_allele(self.size)
    }
}

/// One DNA source in a simulated mixture.
///
/// Proportions need not sum to one across contributors; the total DNA input
/// scales the amplitude of every contributor.
#[derive(Debug, Clone, PartialEq)]
pub struct Contributor {
    pub label: String,
    pub sample_id: String,
    pub proportion: f64,
    pub alleles: Vec<Allele>,
}

impl Contributor {
    pub fn new(label: &str, sample_id: &str, proportion: f64, alleles: &[f64]) -> Self {
        Self {
            label: label.to_string(),
            sample_id: sample_id.to_string(),
            proportion,
            alleles: alleles.iter().map(|&size| Allele::new(size)).collect(),
        }
    }

    /// Contributors with a zero proportion are ignored by every simulator.
    pub fn is_active(&self) -> bool {
        self.proportion > 0.0
    }

    /// Stable text form used when building seed keys.
    pub fn descriptor(&self) -> String {
        format!(
            "{}@{}:{}:[{}]",
            self.label,
            self.sample_id,
            self.proportion,
            self.alleles
                .iter()
                .map(|a| if a.isoallele {
                    format!("{}*", a.label())
                } else {
                    a.label()
                })
                .join(",")
        )
    }
}

/// Inputs identifying one simulated locus: shared by the CE and NGS paths.
#[derive(Debug, Clone, PartialEq)]
pub struct MixtureInput {
    pub locus_id: String,
    pub contributors: Vec<Contributor>,
    /// Total DNA input in ng.
    pub dna_input: f64,
    pub seed: u64,
}

impl MixtureInput {
    pub fn new(locus_id: &str, contributors: Vec<Contributor>, dna_input: f64) -> Self {
        Self {
            locus_id: locus_id.to_string(),
            contributors,
            dna_input,
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn active_contributors(&self) -> impl Iterator<Item = &Contributor> {
        self.contributors.iter().filter(|c| c.is_active())
    }

    /// `;`-joined descriptors of the active contributors, in input order.
    pub fn descriptor(&self) -> String {
        self.active_contributors().map(Contributor::descriptor).join(";")
    }
}

/// Parses `LABEL[:SAMPLE]:PROPORTION:ALLELE,ALLELE...`. The allele list may be
/// empty (`A:0.5:`), which yields a contributor that adds no signal.
impl FromStr for Contributor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.split(':').collect();
        let (label, sample_id, proportion, alleles) = match &fields[..] {
            [label, proportion, alleles] => (*label, *label, *proportion, *alleles),
            [label, sample_id, proportion, alleles] => (*label, *sample_id, *proportion, *alleles),
            _ => {
                return Err(format!(
                    "Contributor must be in 'LABEL[:SAMPLE]:PROPORTION:ALLELES' format: '{}'",
                    s
                ))
            }
        };

        if label.trim().is_empty() {
            return Err(format!("Contributor label cannot be empty: '{}'", s));
        }

        let proportion = proportion
            .parse::<f64>()
            .map_err(|e| format!("Could not parse proportion '{}': {}", proportion, e))?;
        if !(0.0..=1.0).contains(&proportion) {
            return Err(format!(
                "Proportion must be between 0.0 and 1.0, got: {}",
                proportion
            ));
        }

        let alleles = alleles
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(|a| parse_allele(a).ok_or_else(|| format!("Invalid allele '{}' in '{}'", a, s)))
            .collect::<Result<Vec<f64>>>()?;

        Ok(Contributor::new(label, sample_id, proportion, &alleles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_contributor_with_sample() {
        let c: Contributor = "A:S1:0.7:20,22".parse().unwrap();
        assert_eq!(c, Contributor::new("A", "S1", 0.7, &[20.0, 22.0]));
    }

    #[test]
    fn test_parse_contributor_without_sample() {
        let c: Contributor = "Victim:1.0:9.3,10".parse().unwrap();
        assert_eq!(c.sample_id, "Victim");
        assert_eq!(c.alleles[0].size, 9.3);
        assert_eq!(c.alleles[1].size, 10.0);
    }

    #[test]
    fn test_parse_contributor_empty_alleles() {
        let c: Contributor = "A:0.5:".parse().unwrap();
        assert!(c.alleles.is_empty());
    }

    #[test]
    fn test_parse_contributor_errors() {
        assert!("A".parse::<Contributor>().is_err());
        assert!("A:1.5:20".parse::<Contributor>().is_err());
        assert!("A:x:20".parse::<Contributor>().is_err());
        assert!("A:0.5:20,abc".parse::<Contributor>().is_err());
        assert!(":0.5:20".parse::<Contributor>().is_err());
        assert!("A:B:C:0.5:20".parse::<Contributor>().is_err());
    }

    #[test]
    fn test_descriptor_reflects_order_and_isoalleles() {
        let mut c = Contributor::new("A", "S1", 0.5, &[14.0, 14.2]);
        assert_eq!(c.descriptor(), "A@S1:0.5:[14,14.2]");
        c.alleles[1] = Allele::isoallele(14.2);
        assert_eq!(c.descriptor(), "A@S1:0.5:[14,14.2*]");
    }

    #[test]
    fn test_input_descriptor_skips_inactive() {
        let input = MixtureInput::new(
            "TH01",
            vec![
                Contributor::new("A", "A", 0.6, &[6.0, 9.3]),
                Contributor::new("B", "B", 0.0, &[7.0]),
                Contributor::new("C", "C", 0.4, &[8.0]),
            ],
            1.0,
        );
        assert_eq!(input.descriptor(), "A@A:0.6:[6,9.3];C@C:0.4:[8]");
        assert_eq!(input.active_contributors().count(), 2);
    }

    #[test]
    fn test_inactive_contributor() {
        assert!(!Contributor::new("A", "A", 0.0, &[10.0]).is_active());
        assert!(Contributor::new("A", "A", 0.01, &[10.0]).is_active());
    }
}
