use std::str::FromStr;

/// Intensity axis used when rendering traces and bar series.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AxisScale {
    #[default]
    Linear,
    Log,
}

impl AxisScale {
    /// Maps a raw intensity onto the axis. The log axis uses log10(1 + y) so that
    /// zero baseline stays at zero.
    pub fn apply(self, value: f64) -> f64 {
        match self {
            AxisScale::Linear => value,
            AxisScale::Log => (1.0 + value.max(0.0)).log10(),
        }
    }
}

impl FromStr for AxisScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(AxisScale::Linear),
            "log" => Ok(AxisScale::Log),
            _ => Err(format!("Invalid axis scale '{}'. Options are: linear, log", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_axis_scale() {
        assert_eq!("linear".parse::<AxisScale>(), Ok(AxisScale::Linear));
        assert_eq!("log".parse::<AxisScale>(), Ok(AxisScale::Log));
        assert!("sqrt".parse::<AxisScale>().is_err());
    }

    #[test]
    fn test_log_axis_keeps_zero_at_zero() {
        assert_eq!(AxisScale::Log.apply(0.0), 0.0);
        assert!((AxisScale::Log.apply(99.0) - 2.0).abs() < 1e-12);
        assert_eq!(AxisScale::Linear.apply(42.5), 42.5);
    }
}
