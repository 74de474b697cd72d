use crate::dist::{ContinuousDistribution, Validity};
use crate::error::DistributionError;
use crate::estimation::{Estimable, EstimationMethod};
use crate::moments::{LMoments, Moments};
use crate::uncertainty::{ParameterRole, SamplingUncertainty};
use ndarray::{array, Array2};
use statrs::function::erf::{erf, erf_inv};
use std::f64::consts::{PI, SQRT_2};

/// The Normal (Gaussian) distribution.
///
/// Parameters: mean and standard deviation.
#[derive(Debug, Clone)]
pub struct Normal {
    mean: f64,
    std_dev: f64,
    validity: Validity,
}

impl Normal {
    pub fn new(mean: f64, std_dev: f64) -> Self {
        let mut dist = Normal {
            mean,
            std_dev,
            validity: Validity::Unvalidated,
        };
        dist.revalidate();
        dist
    }

    /// Standard normal, mean 0 and standard deviation 1.
    pub fn standard() -> Self {
        Normal::new(0.0, 1.0)
    }

    pub fn set_mean(&mut self, mean: f64) {
        self.mean = mean;
        self.revalidate();
    }

    pub fn set_std_dev(&mut self, std_dev: f64) {
        self.std_dev = std_dev;
        self.revalidate();
    }

    fn revalidate(&mut self) {
        self.validity = Validity::from_result(self.validate_parameters(&self.parameters()));
    }

    /// Standard-normal quantile, shared with the Monte-Carlo engine.
    pub(crate) fn standard_quantile(p: f64) -> f64 {
        if p <= 0.0 {
            return f64::NEG_INFINITY;
        }
        if p >= 1.0 {
            return f64::INFINITY;
        }
        SQRT_2 * erf_inv(2.0 * p - 1.0)
    }
}

impl Default for Normal {
    fn default() -> Self {
        Normal::standard()
    }
}

impl ContinuousDistribution for Normal {
    fn name(&self) -> &'static str {
        "Normal"
    }

    fn n_params(&self) -> usize {
        2
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["mean", "standard deviation"]
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.mean, self.std_dev]
    }

    fn set_parameters(&mut self, values: &[f64]) {
        if let &[mean, std_dev] = values {
            self.mean = mean;
            self.std_dev = std_dev;
        }
        self.validity = Validity::from_result(self.validate_parameters(values));
    }

    fn validate_parameters(&self, values: &[f64]) -> Result<(), DistributionError> {
        let &[mean, std_dev] = values else {
            return Err(DistributionError::ParameterCount {
                distribution: self.name(),
                expected: 2,
                actual: values.len(),
            });
        };
        if !mean.is_finite() {
            return Err(DistributionError::InvalidParameter {
                distribution: self.name(),
                parameter: "mean",
                value: mean,
                reason: "must be finite",
            });
        }
        if !std_dev.is_finite() || std_dev <= 0.0 {
            return Err(DistributionError::InvalidParameter {
                distribution: self.name(),
                parameter: "standard deviation",
                value: std_dev,
                reason: "must be positive and finite",
            });
        }
        Ok(())
    }

    fn validity(&self) -> &Validity {
        &self.validity
    }

    fn mean(&self) -> f64 {
        self.mean
    }

    fn variance(&self) -> f64 {
        self.std_dev * self.std_dev
    }

    fn std_dev(&self) -> f64 {
        self.std_dev
    }

    fn skewness(&self) -> f64 {
        0.0
    }

    fn kurtosis(&self) -> f64 {
        3.0
    }

    fn minimum(&self) -> f64 {
        f64::NEG_INFINITY
    }

    fn maximum(&self) -> f64 {
        f64::INFINITY
    }

    fn density(&self, x: f64) -> f64 {
        let z = (x - self.mean) / self.std_dev;
        (-0.5 * z * z).exp() / (self.std_dev * (2.0 * PI).sqrt())
    }

    fn log_density(&self, x: f64) -> f64 {
        let z = (x - self.mean) / self.std_dev;
        -0.5 * z * z - self.std_dev.ln() - 0.5 * (2.0 * PI).ln()
    }

    fn cumulative(&self, x: f64) -> f64 {
        let z = (x - self.mean) / self.std_dev;
        0.5 * (1.0 + erf(z / SQRT_2))
    }

    fn quantile(&self, p: f64) -> f64 {
        self.mean + self.std_dev * Normal::standard_quantile(p)
    }
}

impl Estimable for Normal {
    fn set_from_moments(&mut self, moments: &Moments) -> Result<(), DistributionError> {
        self.set_parameters(&[moments.mean, moments.std_dev]);
        self.ensure_valid()
    }

    fn set_from_l_moments(&mut self, l_moments: &LMoments) -> Result<(), DistributionError> {
        // L2 = sigma / sqrt(pi).
        self.set_parameters(&[l_moments.l1, l_moments.l2 * PI.sqrt()]);
        self.ensure_valid()
    }

    fn linear_moments(&self) -> Result<LMoments, DistributionError> {
        self.ensure_valid()?;
        Ok(LMoments {
            l1: self.mean,
            l2: self.std_dev / PI.sqrt(),
            tau3: 0.0,
            tau4: 30.0 / PI * SQRT_2.atan() - 9.0,
        })
    }
}

impl SamplingUncertainty for Normal {
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
        let variance = self.variance();
        match method {
            // Moment and likelihood estimators coincide for the Normal.
            EstimationMethod::ProductMoments | EstimationMethod::MaximumLikelihood => {
                Ok(array![
                    [variance / n, 0.0],
                    [0.0, variance / (2.0 * n)]
                ])
            }
            EstimationMethod::LinearMoments => Err(DistributionError::MethodNotSupported {
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
        // Q = mean + sigma * z(p)
        Ok(vec![1.0, Normal::standard_quantile(p)])
    }
}
