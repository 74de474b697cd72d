use crate::dist::{ContinuousDistribution, Validity};
use crate::error::DistributionError;
use crate::estimation::{Estimable, EstimationMethod, MleSummary};
use crate::moments::{LMoments, Moments};
use crate::uncertainty::{ParameterRole, SamplingUncertainty};
use ndarray::{array, Array2};

/// The two-parameter (shifted) Exponential distribution used in
/// partial-duration frequency analysis.
///
/// Parameters: location (lower bound) and scale (mean excess).
#[derive(Debug, Clone)]
pub struct Exponential {
    location: f64,
    scale: f64,
    validity: Validity,
}

impl Exponential {
    pub fn new(location: f64, scale: f64) -> Self {
        let mut dist = Exponential {
            location,
            scale,
            validity: Validity::Unvalidated,
        };
        dist.revalidate();
        dist
    }

    pub fn location(&self) -> f64 {
        self.location
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn set_location(&mut self, location: f64) {
        self.location = location;
        self.revalidate();
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
        self.revalidate();
    }

    fn revalidate(&mut self) {
        self.validity = Validity::from_result(self.validate_parameters(&self.parameters()));
    }
}

impl Default for Exponential {
    fn default() -> Self {
        Exponential::new(0.0, 1.0)
    }
}

impl ContinuousDistribution for Exponential {
    fn name(&self) -> &'static str {
        "Exponential"
    }

    fn n_params(&self) -> usize {
        2
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["location", "scale"]
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.location, self.scale]
    }

    fn set_parameters(&mut self, values: &[f64]) {
        if let &[location, scale] = values {
            self.location = location;
            self.scale = scale;
        }
        self.validity = Validity::from_result(self.validate_parameters(values));
    }

    fn validate_parameters(&self, values: &[f64]) -> Result<(), DistributionError> {
        let &[location, scale] = values else {
            return Err(DistributionError::ParameterCount {
                distribution: self.name(),
                expected: 2,
                actual: values.len(),
            });
        };
        if !location.is_finite() {
            return Err(DistributionError::InvalidParameter {
                distribution: self.name(),
                parameter: "location",
                value: location,
                reason: "must be finite",
            });
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(DistributionError::InvalidParameter {
                distribution: self.name(),
                parameter: "scale",
                value: scale,
                reason: "must be positive and finite",
            });
        }
        Ok(())
    }

    fn validity(&self) -> &Validity {
        &self.validity
    }

    fn mean(&self) -> f64 {
        self.location + self.scale
    }

    fn variance(&self) -> f64 {
        self.scale * self.scale
    }

    fn skewness(&self) -> f64 {
        2.0
    }

    fn kurtosis(&self) -> f64 {
        9.0
    }

    fn minimum(&self) -> f64 {
        self.location
    }

    fn maximum(&self) -> f64 {
        f64::INFINITY
    }

    fn density(&self, x: f64) -> f64 {
        if x < self.location {
            return 0.0;
        }
        (-(x - self.location) / self.scale).exp() / self.scale
    }

    fn log_density(&self, x: f64) -> f64 {
        if x < self.location {
            return f64::NEG_INFINITY;
        }
        -self.scale.ln() - (x - self.location) / self.scale
    }

    fn cumulative(&self, x: f64) -> f64 {
        if x <= self.location {
            return 0.0;
        }
        1.0 - (-(x - self.location) / self.scale).exp()
    }

    fn quantile(&self, p: f64) -> f64 {
        if p >= 1.0 {
            return f64::INFINITY;
        }
        self.location - self.scale * (1.0 - p).ln()
    }
}

impl Estimable for Exponential {
    fn set_from_moments(&mut self, moments: &Moments) -> Result<(), DistributionError> {
        self.set_parameters(&[moments.mean - moments.std_dev, moments.std_dev]);
        self.ensure_valid()
    }

    fn set_from_l_moments(&mut self, l_moments: &LMoments) -> Result<(), DistributionError> {
        // L2 = scale / 2.
        let scale = 2.0 * l_moments.l2;
        self.set_parameters(&[l_moments.l1 - scale, scale]);
        self.ensure_valid()
    }

    fn linear_moments(&self) -> Result<LMoments, DistributionError> {
        self.ensure_valid()?;
        Ok(LMoments {
            l1: self.mean(),
            l2: self.scale / 2.0,
            tau3: 1.0 / 3.0,
            tau4: 1.0 / 6.0,
        })
    }

    /// The likelihood increases monotonically as the location approaches
    /// the smallest observation, so the order-statistic MLE is closed form.
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
        let n = sample.len() as f64;
        let min = sample.iter().cloned().fold(f64::INFINITY, f64::min);
        let mean = sample.iter().sum::<f64>() / n;
        let scale = mean - min;
        self.set_parameters(&[min, scale]);
        let log_likelihood = if scale > 0.0 {
            -n * scale.ln() - n
        } else {
            f64::NEG_INFINITY
        };
        Ok(MleSummary {
            parameters: vec![min, scale],
            log_likelihood,
            iterations: 0,
            converged: true,
        })
    }
}

impl SamplingUncertainty for Exponential {
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
        let b2 = self.scale * self.scale;
        match method {
            EstimationMethod::MaximumLikelihood => Ok(array![
                [b2 / (n * n), -b2 / (n * n)],
                [-b2 / (n * n), b2 / n]
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
        // Q = location - scale * ln(1 - p)
        Ok(vec![1.0, -(1.0 - p).ln()])
    }
}
