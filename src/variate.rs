//! Random variates for synthetic venue data
//!
//! Normal samples use the Box-Muller transform and gamma samples use
//! Marsaglia & Tsang's squeeze/rejection method. Nothing here is meant for
//! security; any `rand::Rng` will do, and tests plug in a seeded `StdRng`
//! so the statistical checks are reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;
use thiserror::Error;

pub const DEFAULT_EXPERIENCE_MEAN: f64 = 2000.0;
pub const DEFAULT_EXPERIENCE_STD_DEV: f64 = 1000.0;
pub const DEFAULT_EXPERIENCE_FLOOR: i64 = 500;

#[derive(Debug, Error, PartialEq)]
pub enum VariateError {
    #[error("{name} must be a positive finite number, got {value}")]
    InvalidArgument { name: &'static str, value: f64 },
    #[error("gamma sampling (alpha = {alpha}) gave up after {limit} rejection rounds")]
    RejectionLimit { alpha: f64, limit: u64 },
}

/// Owns an entropy source and draws variates from it.
pub struct VariateSampler<R: Rng> {
    rng: R,
    /// Unbounded rejection loop when `None`
    gamma_max_iterations: Option<u64>,
}

impl VariateSampler<StdRng> {
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> VariateSampler<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            gamma_max_iterations: None,
        }
    }

    /// Bound the gamma rejection loop. Past the limit `gamma` returns
    /// `VariateError::RejectionLimit` instead of looping on.
    pub fn with_gamma_limit(mut self, limit: Option<u64>) -> Self {
        self.gamma_max_iterations = limit;
        self
    }

    /// Uniform on (0, 1]. Never returns 0, so it is safe to take the log.
    fn uniform_open(&mut self) -> f64 {
        1.0 - self.rng.gen::<f64>()
    }

    /// Normal(mean, std_dev) via Box-Muller, using the cosine branch only.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.uniform_open();
        let u2: f64 = self.rng.gen();
        let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        z0 * std_dev + mean
    }

    /// Gamma(alpha, theta) with shape `alpha` and scale `theta`.
    ///
    /// Shapes below 1 are boosted to `alpha + 1` and corrected by
    /// `U^(1/alpha)`. The rejection loop terminates with probability 1 but
    /// has no fixed bound unless one was set with [`Self::with_gamma_limit`].
    pub fn gamma(&mut self, alpha: f64, theta: f64) -> Result<f64, VariateError> {
        ensure_positive("alpha", alpha)?;
        ensure_positive("theta", theta)?;
        self.gamma_inner(alpha, theta)
    }

    fn gamma_inner(&mut self, alpha: f64, theta: f64) -> Result<f64, VariateError> {
        if alpha < 1.0 {
            let boosted = self.gamma_inner(alpha + 1.0, theta)?;
            let u: f64 = self.rng.gen();
            return Ok(boosted * u.powf(1.0 / alpha));
        }

        let d = alpha - 1.0 / 3.0;
        let c = 1.0 / (9.0 * d).sqrt();
        let mut rounds: u64 = 0;

        loop {
            if let Some(limit) = self.gamma_max_iterations {
                if rounds >= limit {
                    return Err(VariateError::RejectionLimit { alpha, limit });
                }
            }
            rounds += 1;

            let (x, v) = loop {
                let x = self.normal(0.0, 1.0);
                let v = 1.0 + c * x;
                if v > 0.0 {
                    break (x, v);
                }
            };

            let v = v * v * v;
            let u: f64 = self.rng.gen();
            let x2 = x * x;

            // Squeeze
            if u < 1.0 - 0.0331 * x2 * x2 {
                return Ok(d * v * theta);
            }
            if u.ln() < 0.5 * x2 + d * (1.0 - v + v.ln()) {
                return Ok(d * v * theta);
            }
        }
    }

    /// Starting EXP for a synthetic user: `max(500, round(N(2000, 1000)))`.
    pub fn experience_value(&mut self) -> i64 {
        self.experience_value_with(
            DEFAULT_EXPERIENCE_MEAN,
            DEFAULT_EXPERIENCE_STD_DEV,
            DEFAULT_EXPERIENCE_FLOOR,
        )
    }

    pub fn experience_value_with(&mut self, mean: f64, std_dev: f64, floor: i64) -> i64 {
        let sample = self.normal(mean, std_dev).round();
        if sample.is_nan() {
            return floor;
        }
        (sample as i64).max(floor)
    }
}

fn ensure_positive(name: &'static str, value: f64) -> Result<(), VariateError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(VariateError::InvalidArgument { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIALS: usize = 100_000;

    fn mean_and_variance(samples: &[f64]) -> (f64, f64) {
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        (mean, var)
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = VariateSampler::from_seed(7);
        let mut b = VariateSampler::from_seed(7);
        for _ in 0..100 {
            assert_eq!(a.normal(0.0, 1.0), b.normal(0.0, 1.0));
            assert_eq!(a.gamma(2.5, 1.0), b.gamma(2.5, 1.0));
        }
    }

    #[test]
    fn test_normal_moments() {
        let mut sampler = VariateSampler::from_seed(42);
        let (mean, std_dev) = (10.0, 3.0);
        let samples: Vec<f64> = (0..TRIALS).map(|_| sampler.normal(mean, std_dev)).collect();
        let (m, v) = mean_and_variance(&samples);
        assert!((m - mean).abs() < 0.05 * std_dev, "sample mean {}", m);
        assert!((v.sqrt() - std_dev).abs() < 0.1 * std_dev, "sample std {}", v.sqrt());
    }

    #[test]
    fn test_normal_zero_std_dev_is_the_mean() {
        let mut sampler = VariateSampler::from_seed(1);
        for _ in 0..1000 {
            assert_eq!(sampler.normal(3.5, 0.0), 3.5);
        }
    }

    #[test]
    fn test_normal_survives_zero_uniform() {
        // StepRng(0, 0) makes every raw draw zero, the ln(0) case.
        let mut sampler = VariateSampler::new(rand::rngs::mock::StepRng::new(0, 0));
        assert!(sampler.normal(0.0, 1.0).is_finite());
    }

    #[test]
    fn test_gamma_moments_shape_above_one() {
        let mut sampler = VariateSampler::from_seed(42);
        let (alpha, theta) = (2.0, 3.0);
        let samples: Vec<f64> = (0..TRIALS)
            .map(|_| sampler.gamma(alpha, theta).unwrap())
            .collect();
        let (m, v) = mean_and_variance(&samples);
        assert!((m - alpha * theta).abs() < 0.05 * alpha * theta, "sample mean {}", m);
        let expected_var = alpha * theta * theta;
        assert!((v - expected_var).abs() < 0.1 * expected_var, "sample variance {}", v);
    }

    #[test]
    fn test_gamma_moments_shape_below_one() {
        let mut sampler = VariateSampler::from_seed(1234);
        let (alpha, theta) = (0.5, 2.0);
        let samples: Vec<f64> = (0..TRIALS)
            .map(|_| sampler.gamma(alpha, theta).unwrap())
            .collect();
        let (m, v) = mean_and_variance(&samples);
        assert!((m - alpha * theta).abs() < 0.05 * alpha * theta, "sample mean {}", m);
        let expected_var = alpha * theta * theta;
        assert!((v - expected_var).abs() < 0.1 * expected_var, "sample variance {}", v);
    }

    #[test]
    fn test_gamma_samples_are_non_negative() {
        let mut sampler = VariateSampler::from_seed(99);
        for _ in 0..10_000 {
            assert!(sampler.gamma(0.3, 1.0).unwrap() >= 0.0);
        }
    }

    #[test]
    fn test_gamma_rejects_bad_parameters() {
        let mut sampler = VariateSampler::from_seed(5);
        assert_eq!(
            sampler.gamma(0.0, 1.0),
            Err(VariateError::InvalidArgument { name: "alpha", value: 0.0 })
        );
        assert_eq!(
            sampler.gamma(2.0, -1.0),
            Err(VariateError::InvalidArgument { name: "theta", value: -1.0 })
        );
        assert!(sampler.gamma(f64::NAN, 1.0).is_err());
        assert!(sampler.gamma(1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_gamma_limit_zero_always_fails() {
        let mut sampler = VariateSampler::from_seed(5).with_gamma_limit(Some(0));
        assert_eq!(
            sampler.gamma(3.0, 1.0),
            Err(VariateError::RejectionLimit { alpha: 3.0, limit: 0 })
        );
    }

    #[test]
    fn test_gamma_generous_limit_behaves_like_unbounded() {
        let mut sampler = VariateSampler::from_seed(5).with_gamma_limit(Some(1_000));
        for _ in 0..10_000 {
            assert!(sampler.gamma(3.0, 1.0).is_ok());
        }
    }

    #[test]
    fn test_experience_value_floor() {
        let mut sampler = VariateSampler::from_seed(2024);
        let values: Vec<i64> = (0..10_000).map(|_| sampler.experience_value()).collect();
        assert!(values.iter().all(|v| *v >= 500));
        // N(2000, 1000) sits below 500 about 7% of the time
        assert!(values.iter().any(|v| *v == 500));
        assert!(values.iter().any(|v| *v > 3000));
    }

    #[test]
    fn test_experience_value_with_custom_floor() {
        let mut sampler = VariateSampler::from_seed(3);
        for _ in 0..1000 {
            assert_eq!(sampler.experience_value_with(10.0, 0.0, 50), 50);
        }
    }
}
