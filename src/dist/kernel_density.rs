use crate::dist::normal::Normal;
use crate::dist::{ContinuousDistribution, Validity};
use crate::error::DistributionError;
use crate::moments::Moments;
use crate::numerics::root_finding;
use rayon::prelude::*;
use statrs::function::erf::erf;
use std::f64::consts::{PI, SQRT_2};

/// Gaussian kernel density estimate over a fixed sample.
///
/// The only free parameter is the bandwidth (Silverman's rule by default).
/// PDF and CDF evaluations sum one kernel contribution per sample point;
/// the reduction is a parallel sum, which is safe because addition of the
/// independent per-point terms is associative and commutative.
///
/// An all-equal sample is a valid degenerate configuration (bandwidth 0,
/// point mass), not an error.
#[derive(Debug, Clone)]
pub struct KernelDensity {
    data: Vec<f64>,
    bandwidth: f64,
    sample_moments: Moments,
    data_min: f64,
    data_max: f64,
    validity: Validity,
}

impl KernelDensity {
    /// Builds the estimate with Silverman's rule-of-thumb bandwidth
    /// 0.9 min(s, IQR/1.34) n^(-1/5).
    pub fn from_sample(sample: &[f64]) -> Result<Self, DistributionError> {
        let moments = Moments::from_sample(sample)?;
        let mut sorted = sample.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let n = sorted.len();
        let iqr = crate::numerics::interpolation::percentile(&sorted, 0.75)
            - crate::numerics::interpolation::percentile(&sorted, 0.25);
        let spread = if iqr > 0.0 {
            moments.std_dev.min(iqr / 1.34)
        } else {
            moments.std_dev
        };
        let bandwidth = 0.9 * spread * (n as f64).powf(-0.2);
        Self::with_bandwidth(sample, bandwidth)
    }

    /// Builds the estimate with an explicit bandwidth.
    pub fn with_bandwidth(sample: &[f64], bandwidth: f64) -> Result<Self, DistributionError> {
        let sample_moments = Moments::from_sample(sample)?;
        let data_min = sample.iter().cloned().fold(f64::INFINITY, f64::min);
        let data_max = sample.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mut dist = KernelDensity {
            data: sample.to_vec(),
            bandwidth,
            sample_moments,
            data_min,
            data_max,
            validity: Validity::Unvalidated,
        };
        dist.revalidate();
        Ok(dist)
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn set_bandwidth(&mut self, bandwidth: f64) {
        self.bandwidth = bandwidth;
        self.revalidate();
    }

    fn revalidate(&mut self) {
        self.validity = Validity::from_result(self.validate_parameters(&self.parameters()));
    }

    fn is_degenerate(&self) -> bool {
        self.bandwidth == 0.0 || self.data_min == self.data_max
    }
}

impl ContinuousDistribution for KernelDensity {
    fn name(&self) -> &'static str {
        "KernelDensity"
    }

    fn n_params(&self) -> usize {
        1
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["bandwidth"]
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.bandwidth]
    }

    fn set_parameters(&mut self, values: &[f64]) {
        if let &[bandwidth] = values {
            self.bandwidth = bandwidth;
        }
        self.validity = Validity::from_result(self.validate_parameters(values));
    }

    fn validate_parameters(&self, values: &[f64]) -> Result<(), DistributionError> {
        let &[bandwidth] = values else {
            return Err(DistributionError::ParameterCount {
                distribution: self.name(),
                expected: 1,
                actual: values.len(),
            });
        };
        if !bandwidth.is_finite() || bandwidth < 0.0 {
            return Err(DistributionError::InvalidParameter {
                distribution: self.name(),
                parameter: "bandwidth",
                value: bandwidth,
                reason: "must be non-negative and finite",
            });
        }
        if bandwidth == 0.0 && self.data_min < self.data_max {
            return Err(DistributionError::InvalidParameter {
                distribution: self.name(),
                parameter: "bandwidth",
                value: bandwidth,
                reason: "must be positive for a dispersed sample",
            });
        }
        Ok(())
    }

    fn validity(&self) -> &Validity {
        &self.validity
    }

    fn mean(&self) -> f64 {
        self.sample_moments.mean
    }

    fn variance(&self) -> f64 {
        // Kernel smoothing inflates the sample variance by h^2.
        self.sample_moments.std_dev * self.sample_moments.std_dev
            + self.bandwidth * self.bandwidth
    }

    fn skewness(&self) -> f64 {
        self.sample_moments.skewness
    }

    fn kurtosis(&self) -> f64 {
        self.sample_moments.kurtosis
    }

    fn minimum(&self) -> f64 {
        if self.is_degenerate() {
            self.data_min
        } else {
            f64::NEG_INFINITY
        }
    }

    fn maximum(&self) -> f64 {
        if self.is_degenerate() {
            self.data_max
        } else {
            f64::INFINITY
        }
    }

    fn density(&self, x: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        let h = self.bandwidth;
        let norm = 1.0 / (self.data.len() as f64 * h * (2.0 * PI).sqrt());
        let sum: f64 = self
            .data
            .par_iter()
            .map(|&xi| {
                let z = (x - xi) / h;
                (-0.5 * z * z).exp()
            })
            .sum();
        norm * sum
    }

    fn cumulative(&self, x: f64) -> f64 {
        if self.is_degenerate() {
            return 1.0;
        }
        let h = self.bandwidth;
        let sum: f64 = self
            .data
            .par_iter()
            .map(|&xi| 0.5 * (1.0 + erf((x - xi) / (h * SQRT_2))))
            .sum();
        sum / self.data.len() as f64
    }

    fn quantile(&self, p: f64) -> f64 {
        if self.is_degenerate() {
            return self.data_min;
        }
        if p <= 0.0 {
            return f64::NEG_INFINITY;
        }
        if p >= 1.0 {
            return f64::INFINITY;
        }
        let h = self.bandwidth;
        let lower = self.data_min - 10.0 * h;
        let upper = self.data_max + 10.0 * h;
        let guess = self.mean() + Normal::standard_quantile(p) * self.variance().sqrt();
        match root_finding::robust_solve(
            |x| self.cumulative(x) - p,
            |x| self.density(x),
            guess.clamp(lower, upper),
            lower,
            upper,
            1e-12,
            200,
        ) {
            Ok(x) => x,
            Err(_) => f64::NAN,
        }
    }

    /// Overridden so a non-converged quantile inversion surfaces as an
    /// error instead of the kernel's NaN fallback.
    fn inverse_cdf(&self, p: f64) -> Result<f64, DistributionError> {
        if p.is_nan() || !(0.0..=1.0).contains(&p) {
            return Err(DistributionError::InvalidProbability { value: p });
        }
        self.ensure_valid()?;
        let x = self.quantile(p);
        if x.is_nan() {
            return Err(DistributionError::NonConvergence {
                operation: "kernel-density quantile inversion",
                iterations: 200,
            });
        }
        Ok(x)
    }
}
