use crate::dist::{ContinuousDistribution, Validity};
use crate::error::DistributionError;
use crate::estimation::{Estimable, EstimationMethod, MleSummary};
use crate::moments::{LMoments, Moments, LOG_FLOOR};
use crate::uncertainty::{ParameterRole, SamplingUncertainty};
use ndarray::{array, Array2};
use statrs::function::erf::{erf, erf_inv};
use std::f64::consts::{PI, SQRT_2};

/// The LogNormal distribution, parameterized by the mean and standard
/// deviation of ln X.
///
/// Estimators that pass through log space substitute the [`LOG_FLOOR`]
/// for non-positive values instead of failing.
#[derive(Debug, Clone)]
pub struct LogNormal {
    log_mean: f64,
    log_std: f64,
    validity: Validity,
}

impl LogNormal {
    pub fn new(log_mean: f64, log_std: f64) -> Self {
        let mut dist = LogNormal {
            log_mean,
            log_std,
            validity: Validity::Unvalidated,
        };
        dist.revalidate();
        dist
    }

    pub fn log_mean(&self) -> f64 {
        self.log_mean
    }

    pub fn log_std(&self) -> f64 {
        self.log_std
    }

    pub fn set_log_mean(&mut self, log_mean: f64) {
        self.log_mean = log_mean;
        self.revalidate();
    }

    pub fn set_log_std(&mut self, log_std: f64) {
        self.log_std = log_std;
        self.revalidate();
    }

    fn revalidate(&mut self) {
        self.validity = Validity::from_result(self.validate_parameters(&self.parameters()));
    }
}

impl Default for LogNormal {
    fn default() -> Self {
        LogNormal::new(0.0, 1.0)
    }
}

impl ContinuousDistribution for LogNormal {
    fn name(&self) -> &'static str {
        "LogNormal"
    }

    fn n_params(&self) -> usize {
        2
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["log mean", "log standard deviation"]
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.log_mean, self.log_std]
    }

    fn set_parameters(&mut self, values: &[f64]) {
        if let &[log_mean, log_std] = values {
            self.log_mean = log_mean;
            self.log_std = log_std;
        }
        self.validity = Validity::from_result(self.validate_parameters(values));
    }

    fn validate_parameters(&self, values: &[f64]) -> Result<(), DistributionError> {
        let &[log_mean, log_std] = values else {
            return Err(DistributionError::ParameterCount {
                distribution: self.name(),
                expected: 2,
                actual: values.len(),
            });
        };
        if !log_mean.is_finite() {
            return Err(DistributionError::InvalidParameter {
                distribution: self.name(),
                parameter: "log mean",
                value: log_mean,
                reason: "must be finite",
            });
        }
        if !log_std.is_finite() || log_std <= 0.0 {
            return Err(DistributionError::InvalidParameter {
                distribution: self.name(),
                parameter: "log standard deviation",
                value: log_std,
                reason: "must be positive and finite",
            });
        }
        Ok(())
    }

    fn validity(&self) -> &Validity {
        &self.validity
    }

    fn mean(&self) -> f64 {
        (self.log_mean + 0.5 * self.log_std * self.log_std).exp()
    }

    fn variance(&self) -> f64 {
        let s2 = self.log_std * self.log_std;
        (s2.exp() - 1.0) * (2.0 * self.log_mean + s2).exp()
    }

    fn skewness(&self) -> f64 {
        let w = (self.log_std * self.log_std).exp();
        (w + 2.0) * (w - 1.0).sqrt()
    }

    fn kurtosis(&self) -> f64 {
        let s2 = self.log_std * self.log_std;
        (4.0 * s2).exp() + 2.0 * (3.0 * s2).exp() + 3.0 * (2.0 * s2).exp() - 3.0
    }

    fn minimum(&self) -> f64 {
        0.0
    }

    fn maximum(&self) -> f64 {
        f64::INFINITY
    }

    fn density(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        let z = (x.ln() - self.log_mean) / self.log_std;
        (-0.5 * z * z).exp() / (x * self.log_std * (2.0 * PI).sqrt())
    }

    fn log_density(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return f64::NEG_INFINITY;
        }
        let z = (x.ln() - self.log_mean) / self.log_std;
        -0.5 * z * z - x.ln() - self.log_std.ln() - 0.5 * (2.0 * PI).ln()
    }

    fn cumulative(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        let z = (x.ln() - self.log_mean) / self.log_std;
        0.5 * (1.0 + erf(z / SQRT_2))
    }

    fn quantile(&self, p: f64) -> f64 {
        if p <= 0.0 {
            return 0.0;
        }
        if p >= 1.0 {
            return f64::INFINITY;
        }
        (self.log_mean + self.log_std * SQRT_2 * erf_inv(2.0 * p - 1.0)).exp()
    }
}

impl Estimable for LogNormal {
    /// Exact inversion of the real-space mean and standard deviation; the
    /// mean is floored before the log so non-positive inputs degrade
    /// gracefully instead of failing.
    fn set_from_moments(&mut self, moments: &Moments) -> Result<(), DistributionError> {
        let mean = moments.mean.max(LOG_FLOOR);
        let cv = moments.std_dev / mean;
        let s2 = (1.0 + cv * cv).ln();
        self.set_parameters(&[mean.ln() - 0.5 * s2, s2.sqrt()]);
        self.ensure_valid()
    }

    fn set_from_l_moments(&mut self, l_moments: &LMoments) -> Result<(), DistributionError> {
        // L2 / L1 = erf(sigma / 2).
        if l_moments.l1 <= 0.0 {
            return Err(DistributionError::InvalidParameter {
                distribution: self.name(),
                parameter: "log mean",
                value: l_moments.l1,
                reason: "L1 must be positive for a log-space fit",
            });
        }
        let ratio = l_moments.l2 / l_moments.l1;
        if !(0.0..1.0).contains(&ratio) {
            return Err(DistributionError::InvalidParameter {
                distribution: self.name(),
                parameter: "log standard deviation",
                value: ratio,
                reason: "L2/L1 must lie in (0, 1)",
            });
        }
        let sigma = 2.0 * erf_inv(ratio);
        self.set_parameters(&[l_moments.l1.ln() - 0.5 * sigma * sigma, sigma]);
        self.ensure_valid()
    }

    /// Only L1 and L2 have closed forms for the LogNormal; the ratios
    /// tau3/tau4 do not, so the forward conversion is a capability gap.
    fn linear_moments(&self) -> Result<LMoments, DistributionError> {
        Err(DistributionError::MethodNotSupported {
            distribution: self.name(),
            method: EstimationMethod::LinearMoments,
            operation: "forward linear-moment conversion",
        })
    }

    /// The LogNormal MLE is closed form: log-space sample mean and the
    /// n-divisor standard deviation, with the non-positive floor applied.
    fn fit_maximum_likelihood(
        &mut self,
        sample: &[f64],
    ) -> Result<MleSummary, DistributionError> {
        let log_moments = Moments::from_log_sample(sample)?;
        let n = sample.len() as f64;
        let sigma_mle = log_moments.std_dev * ((n - 1.0) / n).sqrt();
        self.set_parameters(&[log_moments.mean, sigma_mle]);
        self.ensure_valid()?;
        let log_likelihood: f64 = sample.iter().map(|&x| self.log_density(x)).sum();
        Ok(MleSummary {
            parameters: self.parameters(),
            log_likelihood,
            iterations: 0,
            converged: true,
        })
    }
}

impl SamplingUncertainty for LogNormal {
    fn parameter_roles(&self) -> Vec<ParameterRole> {
        vec![ParameterRole::Location, ParameterRole::Scale]
    }

    fn parameter_covariance(
        &self,
        sample_size: usize,
        method: EstimationMethod,
    ) -> Result<Array2<f64>, DistributionError> {
        self.ensure_valid()?;
        if sample_size == 0 {
            return Err(DistributionError::SampleTooSmall {
                required: 1,
                actual: 0,
            });
        }
        let n = sample_size as f64;
        let s2 = self.log_std * self.log_std;
        match method {
            // Log-space normal theory.
            EstimationMethod::MaximumLikelihood => Ok(array![
                [s2 / n, 0.0],
                [0.0, s2 / (2.0 * n)]
            ]),
            _ => Err(DistributionError::MethodNotSupported {
                distribution: self.name(),
                method,
                operation: "parameter covariance",
            }),
        }
    }

    fn quantile_gradient(&self, p: f64) -> Result<Vec<f64>, DistributionError> {
        if p.is_nan() || !(0.0..=1.0).contains(&p) {
            return Err(DistributionError::InvalidProbability { value: p });
        }
        self.ensure_valid()?;
        // Q = exp(mu + sigma z); dQ/dmu = Q, dQ/dsigma = Q z.
        let z = SQRT_2 * erf_inv(2.0 * p - 1.0);
        let q = self.quantile(p);
        Ok(vec![q, q * z])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn quantile_round_trip() {
        let d = LogNormal::new(1.0, 0.5);
        for &p in &[0.01, 0.2, 0.5, 0.8, 0.99] {
            let x = d.inverse_cdf(p).unwrap();
            assert_relative_eq!(d.cdf(x).unwrap(), p, epsilon = 1e-10);
        }
    }

    #[test]
    fn moment_inversion_round_trip() {
        let d = LogNormal::new(2.0, 0.4);
        let m = d.product_moments().unwrap();
        let mut refit = LogNormal::default();
        refit.set_from_moments(&m).unwrap();
        assert_relative_eq!(refit.log_mean(), 2.0, epsilon = 1e-9);
        assert_relative_eq!(refit.log_std(), 0.4, epsilon = 1e-9);
    }

    #[test]
    fn mle_handles_non_positive_values_via_floor() {
        let mut d = LogNormal::default();
        let sample = [0.0, 1.0, 2.0, 4.0, 8.0];
        let summary = d.fit_maximum_likelihood(&sample).unwrap();
        assert!(summary.converged);
        assert!(d.log_mean().is_finite());
    }

    #[test]
    fn forward_linear_moments_are_a_capability_gap() {
        let d = LogNormal::default();
        assert!(matches!(
            d.linear_moments(),
            Err(DistributionError::MethodNotSupported { .. })
        ));
    }
}
