use crate::utils::{from_tenths, to_tenths, AxisScale};
use itertools::Itertools;

/// One sequence-level row of an NGS result.
#[derive(Debug, Clone, PartialEq)]
pub struct NgsRow {
    /// Display label; isoalleles carry a letter suffix (`14a`).
    pub allele: String,
    pub size: f64,
    pub coverage: u64,
    /// Reads at this row that came from n-1 stutter of the allele above.
    pub stutter_reads: u64,
    pub stutter_influenced: bool,
    pub contributors: Vec<String>,
    pub sequence: Option<String>,
}

impl NgsRow {
    pub fn stutter_fraction(&self) -> f64 {
        if self.coverage == 0 {
            0.0
        } else {
            self.stutter_reads as f64 / self.coverage as f64
        }
    }
}

/// Coverage summed over every row of one length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NgsBar {
    pub size: f64,
    pub coverage: u64,
}

impl NgsBar {
    pub fn height(&self, scale: AxisScale) -> f64 {
        scale.apply(self.coverage as f64)
    }
}

/// Groups rows by numeric size. Isoalleles share a size, so they collapse into
/// one bar while remaining separate rows.
pub fn group_bars(rows: &[NgsRow]) -> Vec<NgsBar> {
    rows.iter()
        .sorted_by_key(|row| to_tenths(row.size))
        .chunk_by(|row| to_tenths(row.size))
        .into_iter()
        .map(|(key, group)| NgsBar {
            size: from_tenths(key),
            coverage: group.map(|row| row.coverage).sum(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(allele: &str, size: f64, coverage: u64) -> NgsRow {
        NgsRow {
            allele: allele.to_string(),
            size,
            coverage,
            stutter_reads: 0,
            stutter_influenced: false,
            contributors: Vec::new(),
            sequence: None,
        }
    }

    #[test]
    fn test_isoalleles_collapse_into_one_bar() {
        let rows = vec![
            row("15", 15.0, 40),
            row("14a", 14.0, 100),
            row("14b", 14.0, 60),
            row("14.2", 14.2, 7),
        ];
        let bars = group_bars(&rows);
        assert_eq!(
            bars,
            vec![
                NgsBar {
                    size: 14.0,
                    coverage: 160
                },
                NgsBar {
                    size: 14.2,
                    coverage: 7
                },
                NgsBar {
                    size: 15.0,
                    coverage: 40
                },
            ]
        );
    }

    #[test]
    fn test_stutter_fraction() {
        let mut r = row("13", 13.0, 0);
        assert_eq!(r.stutter_fraction(), 0.0);
        r.coverage = 200;
        r.stutter_reads = 50;
        assert_eq!(r.stutter_fraction(), 0.25);
    }

    #[test]
    fn test_bar_height_on_log_axis() {
        let bar = NgsBar {
            size: 10.0,
            coverage: 999,
        };
        assert_eq!(bar.height(AxisScale::Linear), 999.0);
        assert!((bar.height(AxisScale::Log) - 3.0).abs() < 1e-12);
    }
}
