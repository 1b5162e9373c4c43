/// Allele sizes are keyed in tenths of a repeat unit so that microvariants
/// (e.g. 9.3 = nine repeats plus three bases) compare and offset exactly.
#[inline]
pub fn to_tenths(size: f64) -> i64 {
    (size * 10.0).round() as i64
}

#[inline]
pub fn from_tenths(tenths: i64) -> f64 {
    tenths as f64 / 10.0
}

#[inline]
pub fn round_tenth(value: f64) -> f64 {
    from_tenths(to_tenths(value))
}

/// Formats an allele size the way catalogs write it: `14`, `9.3`.
pub fn format_allele(size: f64) -> String {
    let tenths = to_tenths(size);
    let whole = tenths.div_euclid(10);
    let partial = tenths.rem_euclid(10);
    if partial == 0 {
        format!("{}", whole)
    } else {
        format!("{}.{}", whole, partial)
    }
}

/// Parses the numeric part of an allele label, ignoring any isoallele suffix
/// (`14a` and `14b` both parse to 14).
pub fn parse_allele(label: &str) -> Option<f64> {
    let label = label.trim();
    let numeric_len = label
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit() || *c == '.')
        .map(|(i, c)| i + c.len_utf8())
        .last()?;
    label[..numeric_len]
        .trim_end_matches('.')
        .parse::<f64>()
        .ok()
        .map(round_tenth)
}

/// Evenly spaced positions from `start` to `end` inclusive. The last point is
/// clamped to `end` so the range is always fully covered.
pub fn grid(start: f64, end: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 || end < start {
        return vec![start];
    }
    let num_steps = ((end - start) / step).ceil() as usize;
    let mut points: Vec<f64> = (0..=num_steps)
        .map(|i| (start + i as f64 * step).min(end))
        .collect();
    points.dedup();
    points
}

/// Sum of Gaussian bumps of width `sigma` centred at each `(position, height)`.
pub fn gaussian_superposition(x: f64, peaks: &[(f64, f64)], sigma: f64) -> f64 {
    let two_sigma_sq = 2.0 * sigma * sigma;
    peaks
        .iter()
        .map(|&(position, height)| {
            let d = x - position;
            height * (-(d * d) / two_sigma_sq).exp()
        })
        .sum()
}
