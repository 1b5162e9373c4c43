//! Distribution sampling on top of any [`RngCore`].
//!
//! All functions take the generator explicitly and draw uniforms only through
//! [`uniform`], so a given generator state always yields the same variate.

use rand::RngCore;
use std::f64::consts::PI;

/// Largest λ handed to a single product-of-uniforms run; e^-500 is still a
/// normal f64.
const POISSON_CHUNK: f64 = 500.0;

/// Above this λ Poisson draws use the normal approximation, so the cost of a
/// draw stays constant however large the mean gets.
const POISSON_NORMAL_CUTOFF: f64 = 1e7;

/// Uniform in [0, 1) from the top of the generator's 32-bit output.
#[inline]
pub fn uniform<R: RngCore + ?Sized>(rng: &mut R) -> f64 {
    rng.next_u32() as f64 / 4_294_967_296.0
}

/// Uniform index in `0..len`. `len` must be non-zero.
pub fn uniform_index<R: RngCore + ?Sized>(rng: &mut R, len: usize) -> usize {
    ((uniform(rng) * len as f64) as usize).min(len - 1)
}

fn nonzero_uniform<R: RngCore + ?Sized>(rng: &mut R) -> f64 {
    loop {
        let u = uniform(rng);
        if u > 0.0 {
            return u;
        }
    }
}

/// Standard normal via the Box-Muller transform of two non-zero uniforms.
pub fn gaussian<R: RngCore + ?Sized>(rng: &mut R) -> f64 {
    let u = nonzero_uniform(rng);
    let v = nonzero_uniform(rng);
    (-2.0 * u.ln()).sqrt() * (2.0 * PI * v).cos()
}

/// `exp(ln(mean) + sigma * z)`; the median of the draw is `mean`.
/// Non-positive means yield 0 without consuming randomness.
pub fn log_normal<R: RngCore + ?Sized>(rng: &mut R, mean: f64, sigma: f64) -> f64 {
    if mean <= 0.0 || !mean.is_finite() {
        return 0.0;
    }
    (mean.ln() + sigma * gaussian(rng)).exp()
}

/// Gamma(shape, scale) by Marsaglia-Tsang acceptance-rejection.
///
/// Shapes below one are boosted to `shape + 1` and corrected with `u^(1/shape)`.
pub fn gamma<R: RngCore + ?Sized>(rng: &mut R, shape: f64, scale: f64) -> f64 {
    if shape <= 0.0 || scale <= 0.0 || !shape.is_finite() || !scale.is_finite() {
        return 0.0;
    }
    if shape < 1.0 {
        let u = nonzero_uniform(rng);
        return gamma(rng, shape + 1.0, scale) * u.powf(1.0 / shape);
    }

    let d = shape - 1.0 / 3.0;
    let c = 1.0 / (9.0 * d).sqrt();
    loop {
        let (x, v) = loop {
            let x = gaussian(rng);
            let v = 1.0 + c * x;
            if v > 0.0 {
                break (x, v);
            }
        };
        let v = v * v * v;
        let u = uniform(rng);
        let x_sq = x * x;
        if u < 1.0 - 0.0331 * x_sq * x_sq {
            return d * v * scale;
        }
        if u.ln() < 0.5 * x_sq + d * (1.0 - v + v.ln()) {
            return d * v * scale;
        }
    }
}

/// Poisson(λ) by multiplying uniforms until the product drops below e^-λ.
///
/// Large λ is split into chunks of at most [`POISSON_CHUNK`] whose draws are
/// summed (a sum of independent Poissons is Poisson). Beyond
/// [`POISSON_NORMAL_CUTOFF`] the draw is `round(λ + sqrt(λ) * z)`, floored at 0
/// and saturating at `u64::MAX`.
pub fn poisson<R: RngCore + ?Sized>(rng: &mut R, lambda: f64) -> u64 {
    if lambda <= 0.0 || !lambda.is_finite() {
        return 0;
    }
    if lambda > POISSON_NORMAL_CUTOFF {
        return (lambda + lambda.sqrt() * gaussian(rng)).round().max(0.0) as u64;
    }
    let mut remaining = lambda;
    let mut total = 0;
    while remaining > 0.0 {
        let chunk = remaining.min(POISSON_CHUNK);
        total += poisson_product(rng, chunk);
        remaining -= chunk;
    }
    total
}

fn poisson_product<R: RngCore + ?Sized>(rng: &mut R, lambda: f64) -> u64 {
    let limit = (-lambda).exp();
    let mut k = 0;
    let mut p = 1.0;
    loop {
        k += 1;
        p *= uniform(rng);
        if p <= limit {
            return k - 1;
        }
    }
}

/// Negative binomial with the given mean and dispersion (variance = mean + dispersion * mean^2),
/// drawn as a gamma-Poisson mixture with r = 1/dispersion and p = r/(r + mean).
/// A non-positive dispersion degenerates to Poisson(mean).
pub fn negative_binomial<R: RngCore + ?Sized>(rng: &mut R, mean: f64, dispersion: f64) -> u64 {
    if mean <= 0.0 {
        return 0;
    }
    if dispersion <= 0.0 {
        return poisson(rng, mean);
    }
    let r = 1.0 / dispersion;
    let p = r / (r + mean);
    let lambda = gamma(rng, r, (1.0 - p) / p);
    poisson(rng, lambda)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::Mulberry32;

    fn mean_and_var(samples: &[f64]) -> (f64, f64) {
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        (mean, var)
    }

    #[test]
    fn test_gaussian_moments() {
        let mut rng = Mulberry32::new(1);
        let samples: Vec<f64> = (0..20_000).map(|_| gaussian(&mut rng)).collect();
        let (mean, var) = mean_and_var(&samples);
        assert!(mean.abs() < 0.05, "mean = {}", mean);
        assert!((var - 1.0).abs() < 0.05, "var = {}", var);
    }

    #[test]
    fn test_log_normal_median_is_mean_parameter() {
        let mut rng = Mulberry32::new(2);
        let mut samples: Vec<f64> = (0..20_001).map(|_| log_normal(&mut rng, 100.0, 0.2)).collect();
        samples.sort_by(f64::total_cmp);
        let median = samples[samples.len() / 2];
        assert!((median - 100.0).abs() < 2.0, "median = {}", median);
        assert!(samples.iter().all(|&x| x > 0.0));
    }

    #[test]
    fn test_log_normal_zero_mean_consumes_nothing() {
        let mut rng = Mulberry32::new(3);
        let before = rng.clone();
        assert_eq!(log_normal(&mut rng, 0.0, 0.3), 0.0);
        assert_eq!(rng, before);
    }

    #[test]
    fn test_gamma_moments() {
        let mut rng = Mulberry32::new(4);
        let samples: Vec<f64> = (0..20_000).map(|_| gamma(&mut rng, 3.0, 2.0)).collect();
        let (mean, var) = mean_and_var(&samples);
        assert!((mean - 6.0).abs() < 0.15, "mean = {}", mean);
        assert!((var - 12.0).abs() < 1.0, "var = {}", var);
    }

    #[test]
    fn test_gamma_small_shape() {
        let mut rng = Mulberry32::new(5);
        let samples: Vec<f64> = (0..20_000).map(|_| gamma(&mut rng, 0.5, 1.0)).collect();
        let (mean, _) = mean_and_var(&samples);
        assert!(samples.iter().all(|&x| x >= 0.0));
        assert!((mean - 0.5).abs() < 0.05, "mean = {}", mean);
    }

    #[test]
    fn test_gamma_invalid_parameters() {
        let mut rng = Mulberry32::new(6);
        assert_eq!(gamma(&mut rng, 0.0, 1.0), 0.0);
        assert_eq!(gamma(&mut rng, 2.0, -1.0), 0.0);
    }

    #[test]
    fn test_poisson_small_lambda() {
        let mut rng = Mulberry32::new(7);
        let samples: Vec<f64> = (0..20_000).map(|_| poisson(&mut rng, 4.0) as f64).collect();
        let (mean, var) = mean_and_var(&samples);
        assert!((mean - 4.0).abs() < 0.1, "mean = {}", mean);
        assert!((var - 4.0).abs() < 0.3, "var = {}", var);
    }

    #[test]
    fn test_poisson_large_lambda_does_not_underflow() {
        let mut rng = Mulberry32::new(8);
        let samples: Vec<f64> = (0..500).map(|_| poisson(&mut rng, 2_000.0) as f64).collect();
        let (mean, _) = mean_and_var(&samples);
        assert!((mean - 2_000.0).abs() < 15.0, "mean = {}", mean);
    }

    #[test]
    fn test_poisson_huge_lambda_returns() {
        let mut rng = Mulberry32::new(1);
        let draw = poisson(&mut rng, 1e20);
        assert!(draw > 0);

        let samples: Vec<f64> = (0..2_000).map(|_| poisson(&mut rng, 1e8) as f64).collect();
        let (mean, var) = mean_and_var(&samples);
        assert!((mean - 1e8).abs() < 1e3, "mean = {}", mean);
        assert!((var / 1e8 - 1.0).abs() < 0.15, "var = {}", var);
    }

    #[test]
    fn test_poisson_degenerate() {
        let mut rng = Mulberry32::new(9);
        assert_eq!(poisson(&mut rng, 0.0), 0);
        assert_eq!(poisson(&mut rng, -3.0), 0);
        assert_eq!(poisson(&mut rng, f64::NAN), 0);
    }

    #[test]
    fn test_negative_binomial_overdispersed() {
        let mut rng = Mulberry32::new(10);
        let samples: Vec<f64> = (0..20_000)
            .map(|_| negative_binomial(&mut rng, 50.0, 0.1) as f64)
            .collect();
        let (mean, var) = mean_and_var(&samples);
        // variance = mean + dispersion * mean^2 = 50 + 250
        assert!((mean - 50.0).abs() < 1.0, "mean = {}", mean);
        assert!(var > 200.0 && var < 400.0, "var = {}", var);
    }

    #[test]
    fn test_negative_binomial_zero_dispersion_is_poisson() {
        let mut rng = Mulberry32::new(11);
        let samples: Vec<f64> = (0..20_000)
            .map(|_| negative_binomial(&mut rng, 20.0, 0.0) as f64)
            .collect();
        let (mean, var) = mean_and_var(&samples);
        assert!((mean - 20.0).abs() < 0.3, "mean = {}", mean);
        assert!((var - 20.0).abs() < 1.5, "var = {}", var);
    }

    #[test]
    fn test_uniform_index_in_bounds() {
        let mut rng = Mulberry32::new(12);
        for _ in 0..1_000 {
            assert!(uniform_index(&mut rng, 3) < 3);
        }
    }

    #[test]
    fn test_same_generator_state_same_draws() {
        let mut rng1 = Mulberry32::new(13);
        let mut rng2 = Mulberry32::new(13);
        let draws1: Vec<u64> = (0..50).map(|_| negative_binomial(&mut rng1, 300.0, 0.05)).collect();
        let draws2: Vec<u64> = (0..50).map(|_| negative_binomial(&mut rng2, 300.0, 0.05)).collect();
        assert_eq!(draws1, draws2);
    }
}
