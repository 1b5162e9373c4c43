use super::model::DegradationClass::{Long, Standard};
use super::model::{DegradationClass, LengthModel, LocusModel, StutterRates};
use crate::utils::Result;
use itertools::Itertools;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::io::BufRead;

/// Built-in registry, built once and never mutated.
pub static BUILTIN_REGISTRY: Lazy<LocusRegistry> = Lazy::new(LocusRegistry::builtin);

pub const DEFAULT_LOCUS_ID: &str = "DEFAULT";

/// Model used for any locus id the registry does not know: 8% back stutter,
/// small n-2/n+1 satellites, a tetranucleotide repeat with allele 10 at 200 bp.
pub fn default_model() -> LocusModel {
    LocusModel {
        id: DEFAULT_LOCUS_ID.to_string(),
        stutter: StutterRates {
            minus1: 0.08,
            minus2: Some(0.005),
            plus1: Some(0.01),
            sd: Some(0.015),
        },
        length: LengthModel {
            reference_allele: 10.0,
            reference_length: 200.0,
            motif_length: 4,
        },
        degradation_class: DegradationClass::Standard,
    }
}

type Row = (
    &'static str,
    f64,
    Option<f64>,
    Option<f64>,
    f64,
    f64,
    f64,
    u32,
    DegradationClass,
);

// id, n-1, n-2, n+1, sd, reference allele, reference length (bp), motif length, class
#[rustfmt::skip]
const BUILTIN_LOCI: &[Row] = &[
    ("CSF1PO",   0.075, Some(0.004), Some(0.008), 0.015, 10.0, 305.0, 4, Standard),
    ("D1S1656",  0.100, Some(0.006), Some(0.010), 0.020, 15.0, 140.0, 4, Standard),
    ("D2S441",   0.065, Some(0.004), Some(0.008), 0.015, 11.0,  90.0, 4, Standard),
    ("D2S1338",  0.100, Some(0.006), Some(0.010), 0.020, 20.0, 320.0, 4, Long),
    ("D3S1358",  0.105, Some(0.006), Some(0.010), 0.020, 15.0, 120.0, 4, Standard),
    ("D5S818",   0.072, Some(0.004), Some(0.008), 0.015, 11.0, 150.0, 4, Standard),
    ("D7S820",   0.068, Some(0.004), Some(0.008), 0.015, 10.0, 285.0, 4, Standard),
    ("D8S1179",  0.085, Some(0.005), Some(0.009), 0.015, 13.0, 145.0, 4, Standard),
    ("D10S1248", 0.090, Some(0.005), Some(0.009), 0.015, 13.0, 100.0, 4, Standard),
    ("D12S391",  0.120, Some(0.008), Some(0.012), 0.020, 19.0, 230.0, 4, Standard),
    ("D13S317",  0.070, Some(0.004), Some(0.008), 0.015, 11.0, 215.0, 4, Standard),
    ("D16S539",  0.080, Some(0.005), Some(0.008), 0.015, 11.0, 280.0, 4, Standard),
    ("D18S51",   0.105, Some(0.007), Some(0.010), 0.020, 16.0, 300.0, 4, Long),
    ("D19S433",  0.085, Some(0.005), Some(0.009), 0.015, 14.0, 120.0, 4, Standard),
    ("D21S11",   0.095, Some(0.006), Some(0.010), 0.020, 30.0, 230.0, 4, Long),
    ("D22S1045", 0.110, Some(0.006), Some(0.040), 0.020, 15.0, 100.0, 3, Standard),
    ("FGA",      0.090, Some(0.006), Some(0.010), 0.020, 22.0, 260.0, 4, Long),
    ("PENTA D",  0.025, None,        None,        0.010, 12.0, 420.0, 5, Long),
    ("PENTA E",  0.030, None,        None,        0.010, 12.0, 430.0, 5, Long),
    ("SE33",     0.110, Some(0.008), Some(0.012), 0.020, 25.0, 380.0, 4, Long),
    ("TH01",     0.030, None,        None,        0.010,  8.0, 180.0, 4, Standard),
    ("TPOX",     0.045, Some(0.003), Some(0.006), 0.010,  8.0, 240.0, 4, Standard),
    ("vWA",      0.095, Some(0.006), Some(0.010), 0.020, 17.0, 170.0, 4, Standard),
];

/// Lookup key for locus ids: case, spaces, underscores and dashes are ignored,
/// so `vWA`, `VWA` and `Penta_D`/`PENTA D` resolve to the same model.
pub fn normalize_id(id: &str) -> String {
    id.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_uppercase)
        .collect()
}

#[derive(Debug, Clone)]
pub struct LocusRegistry {
    models: HashMap<String, LocusModel>,
    default: LocusModel,
}

impl LocusRegistry {
    pub fn builtin() -> Self {
        let models = BUILTIN_LOCI
            .iter()
            .map(
                |&(id, minus1, minus2, plus1, sd, reference_allele, reference_length, motif_length, class)| {
                    LocusModel {
                        id: id.to_string(),
                        stutter: StutterRates {
                            minus1,
                            minus2,
                            plus1,
                            sd: Some(sd),
                        },
                        length: LengthModel {
                            reference_allele,
                            reference_length,
                            motif_length,
                        },
                        degradation_class: class,
                    }
                },
            )
            .map(|model| (normalize_id(&model.id), model))
            .collect();
        Self {
            models,
            default: default_model(),
        }
    }

    /// Model for `id`, or the default model if the id is unknown.
    pub fn get(&self, id: &str) -> &LocusModel {
        match self.models.get(&normalize_id(id)) {
            Some(model) => model,
            None => {
                log::debug!("{}: not in locus registry, using default model", id);
                &self.default
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.models.contains_key(&normalize_id(id))
    }

    pub fn default_model(&self) -> &LocusModel {
        &self.default
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Models ordered by id.
    pub fn models(&self) -> impl Iterator<Item = &LocusModel> {
        self.models.values().sorted_by(|a, b| a.id.cmp(&b.id))
    }

    /// Returns a new registry with the models read from `reader` layered over
    /// this one. A model whose id is `DEFAULT` replaces the fallback model.
    pub fn with_overrides<R: BufRead>(&self, reader: R) -> Result<Self> {
        let mut registry = self.clone();
        for model in Self::read_models(reader)? {
            if normalize_id(&model.id) == DEFAULT_LOCUS_ID {
                registry.default = model;
            } else {
                registry.models.insert(normalize_id(&model.id), model);
            }
        }
        Ok(registry)
    }

    /// Parses a whitespace-separated model table with columns
    /// `id minus1 minus2 plus1 sd reference_allele reference_length motif_length class`.
    /// Absent optional values are written as `-`; blank lines and `#` comments are skipped.
    pub fn read_models<R: BufRead>(reader: R) -> Result<Vec<LocusModel>> {
        const EXPECTED_FIELD_COUNT: usize = 9;
        let mut models: Vec<LocusModel> = Vec::new();

        for (line_number, line) in reader.lines().enumerate() {
            let line =
                line.map_err(|e| format!("Error reading line {}: {}", line_number + 1, e))?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != EXPECTED_FIELD_COUNT {
                return Err(format!(
                    "Expected {} fields at line {}, found {}: {}",
                    EXPECTED_FIELD_COUNT,
                    line_number + 1,
                    fields.len(),
                    line
                ));
            }

            let model = parse_model(&fields)
                .map_err(|e| format!("Invalid locus model at line {}: {}", line_number + 1, e))?;
            if models
                .iter()
                .any(|m| normalize_id(&m.id) == normalize_id(&model.id))
            {
                return Err(format!(
                    "Duplicate locus entry at line {}: {}",
                    line_number + 1,
                    model.id
                ));
            }
            models.push(model);
        }

        Ok(models)
    }
}

fn parse_model(fields: &[&str]) -> Result<LocusModel> {
    let parse_rate = |name: &str, value: &str| -> Result<f64> {
        let rate = value
            .parse::<f64>()
            .map_err(|_| format!("{} is not a number: {}", name, value))?;
        if !(0.0..=1.0).contains(&rate) {
            return Err(format!("{} must be between 0 and 1, got {}", name, rate));
        }
        Ok(rate)
    };
    let parse_optional_rate = |name: &str, value: &str| -> Result<Option<f64>> {
        match value {
            "-" => Ok(None),
            _ => parse_rate(name, value).map(Some),
        }
    };
    let parse_positive = |name: &str, value: &str| -> Result<f64> {
        match value.parse::<f64>() {
            Ok(v) if v > 0.0 => Ok(v),
            _ => Err(format!("{} must be a positive number: {}", name, value)),
        }
    };

    let motif_length = fields[7]
        .parse::<u32>()
        .ok()
        .filter(|&m| m > 0)
        .ok_or_else(|| format!("motif_length must be a positive integer: {}", fields[7]))?;

    Ok(LocusModel {
        id: fields[0].to_string(),
        stutter: StutterRates {
            minus1: parse_rate("minus1", fields[1])?,
            minus2: parse_optional_rate("minus2", fields[2])?,
            plus1: parse_optional_rate("plus1", fields[3])?,
            sd: parse_optional_rate("sd", fields[4])?,
        },
        length: LengthModel {
            reference_allele: parse_positive("reference_allele", fields[5])?,
            reference_length: parse_positive("reference_length", fields[6])?,
            motif_length,
        },
        degradation_class: fields[8].parse()?,
    })
}
