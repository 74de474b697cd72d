use crate::dist::{ContinuousDistribution, Validity};
use crate::error::DistributionError;
use crate::estimation::{Estimable, EstimationMethod, MleSummary};
use crate::moments::{LMoments, Moments};
use crate::uncertainty::{ParameterRole, SamplingUncertainty};
use ndarray::Array2;

/// The continuous Uniform distribution on [min, max].
///
/// A zero-width interval (min = max) is a valid degenerate configuration
/// collapsing to a point mass, not an error.
#[derive(Debug, Clone)]
pub struct Uniform {
    min: f64,
    max: f64,
    validity: Validity,
}

impl Uniform {
    pub fn new(min: f64, max: f64) -> Self {
        let mut dist = Uniform {
            min,
            max,
            validity: Validity::Unvalidated,
        };
        dist.revalidate();
        dist
    }

    pub fn min_value(&self) -> f64 {
        self.min
    }

    pub fn max_value(&self) -> f64 {
        self.max
    }

    pub fn set_min(&mut self, min: f64) {
        self.min = min;
        self.revalidate();
    }

    pub fn set_max(&mut self, max: f64) {
        self.max = max;
        self.revalidate();
    }

    fn revalidate(&mut self) {
        self.validity = Validity::from_result(self.validate_parameters(&self.parameters()));
    }

    fn is_degenerate(&self) -> bool {
        self.min == self.max
    }
}

impl Default for Uniform {
    fn default() -> Self {
        Uniform::new(0.0, 1.0)
    }
}

impl ContinuousDistribution for Uniform {
    fn name(&self) -> &'static str {
        "Uniform"
    }

    fn n_params(&self) -> usize {
        2
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["min", "max"]
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.min, self.max]
    }

    fn set_parameters(&mut self, values: &[f64]) {
        if let &[min, max] = values {
            self.min = min;
            self.max = max;
        }
        self.validity = Validity::from_result(self.validate_parameters(values));
    }

    fn validate_parameters(&self, values: &[f64]) -> Result<(), DistributionError> {
        let &[min, max] = values else {
            return Err(DistributionError::ParameterCount {
                distribution: self.name(),
                expected: 2,
                actual: values.len(),
            });
        };
        if !min.is_finite() {
            return Err(DistributionError::InvalidParameter {
                distribution: self.name(),
                parameter: "min",
                value: min,
                reason: "must be finite",
            });
        }
        if !max.is_finite() {
            return Err(DistributionError::InvalidParameter {
                distribution: self.name(),
                parameter: "max",
                value: max,
                reason: "must be finite",
            });
        }
        if min > max {
            return Err(DistributionError::InvalidParameter {
                distribution: self.name(),
                parameter: "min",
                value: min,
                reason: "must not exceed max",
            });
        }
        Ok(())
    }

    fn validity(&self) -> &Validity {
        &self.validity
    }

    fn mean(&self) -> f64 {
        0.5 * (self.min + self.max)
    }

    fn variance(&self) -> f64 {
        let width = self.max - self.min;
        width * width / 12.0
    }

    fn skewness(&self) -> f64 {
        0.0
    }

    fn kurtosis(&self) -> f64 {
        1.8
    }

    fn minimum(&self) -> f64 {
        self.min
    }

    fn maximum(&self) -> f64 {
        self.max
    }

    fn density(&self, x: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        if x < self.min || x > self.max {
            0.0
        } else {
            1.0 / (self.max - self.min)
        }
    }

    fn cumulative(&self, x: f64) -> f64 {
        if self.is_degenerate() {
            return 1.0;
        }
        if x <= self.min {
            0.0
        } else if x >= self.max {
            1.0
        } else {
            (x - self.min) / (self.max - self.min)
        }
    }

    fn quantile(&self, p: f64) -> f64 {
        if self.is_degenerate() {
            return self.min;
        }
        self.min + p * (self.max - self.min)
    }
}

impl Estimable for Uniform {
    fn set_from_moments(&mut self, moments: &Moments) -> Result<(), DistributionError> {
        let half_width = 3.0f64.sqrt() * moments.std_dev;
        self.set_parameters(&[moments.mean - half_width, moments.mean + half_width]);
        self.ensure_valid()
    }

    fn set_from_l_moments(&mut self, l_moments: &LMoments) -> Result<(), DistributionError> {
        // L2 = (max - min) / 6.
        self.set_parameters(&[l_moments.l1 - 3.0 * l_moments.l2, l_moments.l1 + 3.0 * l_moments.l2]);
        self.ensure_valid()
    }

    fn linear_moments(&self) -> Result<LMoments, DistributionError> {
        self.ensure_valid()?;
        Ok(LMoments {
            l1: self.mean(),
            l2: (self.max - self.min) / 6.0,
            tau3: 0.0,
            tau4: 0.0,
        })
    }

    /// The uniform likelihood is maximized at the sample extremes; the
    /// simplex engine would only crawl toward that corner, so the order
    /// statistics are used directly.
    fn fit_maximum_likelihood(
        &mut self,
        sample: &[f64],
    ) -> Result<MleSummary, DistributionError> {
        if sample.is_empty() {
            return Err(DistributionError::SampleTooSmall {
                required: 1,
                actual: 0,
            });
        }
        let min = sample.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = sample.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        self.set_parameters(&[min, max]);
        let log_likelihood = if max > min {
            -(sample.len() as f64) * (max - min).ln()
        } else {
            0.0
        };
        Ok(MleSummary {
            parameters: vec![min, max],
            log_likelihood,
            iterations: 0,
            converged: true,
        })
    }
}

impl SamplingUncertainty for Uniform {
    fn parameter_roles(&self) -> Vec<ParameterRole> {
        vec![ParameterRole::Location, ParameterRole::Location]
    }

    /// No asymptotic covariance formula is implemented for the uniform
    /// endpoints (their order-statistic estimators are not asymptotically
    /// normal); every method reports the capability gap.
    fn parameter_covariance(
        &self,
        _sample_size: usize,
        method: EstimationMethod,
    ) -> Result<Array2<f64>, DistributionError> {
        Err(DistributionError::MethodNotSupported {
            distribution: self.name(),
            method,
            operation: "parameter covariance",
        })
    }

    fn quantile_gradient(&self, p: f64) -> Result<Vec<f64>, DistributionError> {
        if p.is_nan() || !(0.0..=1.0).contains(&p) {
            return Err(DistributionError::InvalidProbability { value: p });
        }
        self.ensure_valid()?;
        // Q = (1 - p) min + p max
        Ok(vec![1.0 - p, p])
    }
}
