use crate::constraints::ParameterConstraints;
use crate::dist::{ContinuousDistribution, Validity};
use crate::error::DistributionError;
use crate::estimation::{Estimable, EstimationMethod};
use crate::moments::{LMoments, Moments};

/// The Triangular distribution on [min, max] with mode inside.
///
/// A collapsed configuration (min = mode = max) is a valid point mass:
/// PDF 0 everywhere, CDF 1 everywhere, and every quantile equal to the
/// collapsed point.
#[derive(Debug, Clone)]
pub struct Triangular {
    min: f64,
    mode: f64,
    max: f64,
    validity: Validity,
}

impl Triangular {
    pub fn new(min: f64, mode: f64, max: f64) -> Self {
        let mut dist = Triangular {
            min,
            mode,
            max,
            validity: Validity::Unvalidated,
        };
        dist.revalidate();
        dist
    }

    pub fn min_value(&self) -> f64 {
        self.min
    }

    pub fn mode(&self) -> f64 {
        self.mode
    }

    pub fn max_value(&self) -> f64 {
        self.max
    }

    pub fn set_min(&mut self, min: f64) {
        self.min = min;
        self.revalidate();
    }

    pub fn set_mode(&mut self, mode: f64) {
        self.mode = mode;
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

impl Default for Triangular {
    fn default() -> Self {
        Triangular::new(0.0, 0.5, 1.0)
    }
}

impl ContinuousDistribution for Triangular {
    fn name(&self) -> &'static str {
        "Triangular"
    }

    fn n_params(&self) -> usize {
        3
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["min", "mode", "max"]
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.min, self.mode, self.max]
    }

    fn set_parameters(&mut self, values: &[f64]) {
        if let &[min, mode, max] = values {
            self.min = min;
            self.mode = mode;
            self.max = max;
        }
        self.validity = Validity::from_result(self.validate_parameters(values));
    }

    fn validate_parameters(&self, values: &[f64]) -> Result<(), DistributionError> {
        let &[min, mode, max] = values else {
            return Err(DistributionError::ParameterCount {
                distribution: self.name(),
                expected: 3,
                actual: values.len(),
            });
        };
        for (value, parameter) in [(min, "min"), (mode, "mode"), (max, "max")] {
            if !value.is_finite() {
                return Err(DistributionError::InvalidParameter {
                    distribution: self.name(),
                    parameter,
                    value,
                    reason: "must be finite",
                });
            }
        }
        if mode < min {
            return Err(DistributionError::InvalidParameter {
                distribution: self.name(),
                parameter: "mode",
                value: mode,
                reason: "must not be below min",
            });
        }
        if max < mode {
            return Err(DistributionError::InvalidParameter {
                distribution: self.name(),
                parameter: "max",
                value: max,
                reason: "must not be below mode",
            });
        }
        Ok(())
    }

    fn validity(&self) -> &Validity {
        &self.validity
    }

    fn mean(&self) -> f64 {
        (self.min + self.mode + self.max) / 3.0
    }

    fn variance(&self) -> f64 {
        let (a, c, b) = (self.min, self.mode, self.max);
        (a * a + b * b + c * c - a * b - a * c - b * c) / 18.0
    }

    fn skewness(&self) -> f64 {
        let (a, c, b) = (self.min, self.mode, self.max);
        let spread = a * a + b * b + c * c - a * b - a * c - b * c;
        if spread <= 0.0 {
            return 0.0;
        }
        2.0f64.sqrt() * (a + b - 2.0 * c) * (2.0 * a - b - c) * (a - 2.0 * b + c)
            / (5.0 * spread.powf(1.5))
    }

    fn kurtosis(&self) -> f64 {
        2.4
    }

    fn minimum(&self) -> f64 {
        self.min
    }

    fn maximum(&self) -> f64 {
        self.max
    }

    fn density(&self, x: f64) -> f64 {
        if self.is_degenerate() || x < self.min || x > self.max {
            return 0.0;
        }
        let width = self.max - self.min;
        if x < self.mode {
            2.0 * (x - self.min) / (width * (self.mode - self.min))
        } else if x == self.mode {
            2.0 / width
        } else {
            2.0 * (self.max - x) / (width * (self.max - self.mode))
        }
    }

    fn log_density(&self, x: f64) -> f64 {
        let d = self.density(x);
        if d > 0.0 {
            d.ln()
        } else {
            f64::NEG_INFINITY
        }
    }

    fn cumulative(&self, x: f64) -> f64 {
        if self.is_degenerate() {
            return 1.0;
        }
        if x <= self.min {
            return 0.0;
        }
        if x >= self.max {
            return 1.0;
        }
        let width = self.max - self.min;
        if x <= self.mode {
            let rise = x - self.min;
            rise * rise / (width * (self.mode - self.min))
        } else {
            let fall = self.max - x;
            1.0 - fall * fall / (width * (self.max - self.mode))
        }
    }

    fn quantile(&self, p: f64) -> f64 {
        if self.is_degenerate() {
            return self.min;
        }
        let width = self.max - self.min;
        let mode_fraction = (self.mode - self.min) / width;
        if p <= mode_fraction {
            self.min + (p * width * (self.mode - self.min)).sqrt()
        } else {
            self.max - ((1.0 - p) * width * (self.max - self.mode)).sqrt()
        }
    }
}

impl Estimable for Triangular {
    /// The moment 4-tuple does not carry the support endpoints, so the
    /// conversion is a capability gap; estimation goes through the
    /// sample-based `estimate` override instead.
    fn set_from_moments(&mut self, _moments: &Moments) -> Result<(), DistributionError> {
        Err(DistributionError::MethodNotSupported {
            distribution: self.name(),
            method: EstimationMethod::ProductMoments,
            operation: "moment conversion",
        })
    }

    fn set_from_l_moments(&mut self, _l_moments: &LMoments) -> Result<(), DistributionError> {
        Err(DistributionError::MethodNotSupported {
            distribution: self.name(),
            method: EstimationMethod::LinearMoments,
            operation: "linear-moment conversion",
        })
    }

    fn linear_moments(&self) -> Result<LMoments, DistributionError> {
        Err(DistributionError::MethodNotSupported {
            distribution: self.name(),
            method: EstimationMethod::LinearMoments,
            operation: "forward linear-moment conversion",
        })
    }

    /// The likelihood search needs the support to bracket the data; the
    /// box extends one sample range beyond the extremes and the mode seeds
    /// at the moment-matched 3*mean - min - max.
    fn parameter_constraints(
        &self,
        sample: &[f64],
    ) -> Result<ParameterConstraints, DistributionError> {
        if sample.len() < 2 {
            return Err(DistributionError::SampleTooSmall {
                required: 2,
                actual: sample.len(),
            });
        }
        let min = sample.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = sample.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mean = sample.iter().sum::<f64>() / sample.len() as f64;
        let range = (max - min).max(f64::MIN_POSITIVE);
        let mode = (3.0 * mean - min - max).clamp(min, max);
        Ok(ParameterConstraints::new(
            vec![min - 0.05 * range, mode, max + 0.05 * range],
            vec![min - range, min, max],
            vec![min, max, max + range],
        ))
    }

    fn estimate(
        &mut self,
        sample: &[f64],
        method: EstimationMethod,
    ) -> Result<(), DistributionError> {
        match method {
            // Both moment flavors estimate directly from the sample: the
            // extremes bound the support and the mode is moment-matched.
            EstimationMethod::ProductMoments | EstimationMethod::LinearMoments => {
                if sample.len() < 2 {
                    return Err(DistributionError::SampleTooSmall {
                        required: 2,
                        actual: sample.len(),
                    });
                }
                let min = sample.iter().cloned().fold(f64::INFINITY, f64::min);
                let max = sample.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                let mean = sample.iter().sum::<f64>() / sample.len() as f64;
                let mode = (3.0 * mean - min - max).clamp(min, max);
                self.set_parameters(&[min, mode, max]);
            }
            EstimationMethod::MaximumLikelihood => {
                let summary = self.fit_maximum_likelihood(sample)?;
                if !summary.converged {
                    return Err(DistributionError::NonConvergence {
                        operation: "maximum-likelihood estimation",
                        iterations: summary.iterations,
                    });
                }
            }
        }
        self.ensure_valid()
    }
}
