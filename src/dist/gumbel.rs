use crate::dist::{ContinuousDistribution, Validity};
use crate::error::DistributionError;
use crate::estimation::{Estimable, EstimationMethod};
use crate::moments::{LMoments, Moments};
use crate::numerics::special::EULER_GAMMA;
use crate::uncertainty::{ParameterRole, SamplingUncertainty};
use ndarray::{array, Array2};
use std::f64::consts::PI;

/// Gumbel skewness, 12 * sqrt(6) * zeta(3) / pi^3.
const GUMBEL_SKEW: f64 = 1.139_547_099_404_648_6;
/// Gumbel full kurtosis, 3 + 12/5.
const GUMBEL_KURTOSIS: f64 = 5.4;

/// The Gumbel distribution (Extreme Value Type I, maxima form), the
/// workhorse of annual-maximum frequency analysis.
///
/// Parameters: location (mode) and scale.
#[derive(Debug, Clone)]
pub struct Gumbel {
    location: f64,
    scale: f64,
    validity: Validity,
}

impl Gumbel {
    pub fn new(location: f64, scale: f64) -> Self {
        let mut dist = Gumbel {
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

impl Default for Gumbel {
    fn default() -> Self {
        Gumbel::new(0.0, 1.0)
    }
}

impl ContinuousDistribution for Gumbel {
    fn name(&self) -> &'static str {
        "Gumbel"
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
        self.location + self.scale * EULER_GAMMA
    }

    fn variance(&self) -> f64 {
        PI * PI / 6.0 * self.scale * self.scale
    }

    fn skewness(&self) -> f64 {
        GUMBEL_SKEW
    }

    fn kurtosis(&self) -> f64 {
        GUMBEL_KURTOSIS
    }

    fn minimum(&self) -> f64 {
        f64::NEG_INFINITY
    }

    fn maximum(&self) -> f64 {
        f64::INFINITY
    }

    fn density(&self, x: f64) -> f64 {
        let z = (x - self.location) / self.scale;
        let exp_neg_z = (-z).exp();
        exp_neg_z * (-exp_neg_z).exp() / self.scale
    }

    fn log_density(&self, x: f64) -> f64 {
        let z = (x - self.location) / self.scale;
        -self.scale.ln() - z - (-z).exp()
    }

    fn cumulative(&self, x: f64) -> f64 {
        let z = (x - self.location) / self.scale;
        (-(-z).exp()).exp()
    }

    fn quantile(&self, p: f64) -> f64 {
        if p <= 0.0 {
            return f64::NEG_INFINITY;
        }
        if p >= 1.0 {
            return f64::INFINITY;
        }
        self.location - self.scale * (-p.ln()).ln()
    }
}

impl Estimable for Gumbel {
    fn set_from_moments(&mut self, moments: &Moments) -> Result<(), DistributionError> {
        let scale = moments.std_dev * 6.0f64.sqrt() / PI;
        let location = moments.mean - EULER_GAMMA * scale;
        self.set_parameters(&[location, scale]);
        self.ensure_valid()
    }

    fn set_from_l_moments(&mut self, l_moments: &LMoments) -> Result<(), DistributionError> {
        // L2 = scale * ln 2.
        let scale = l_moments.l2 / 2.0f64.ln();
        let location = l_moments.l1 - EULER_GAMMA * scale;
        self.set_parameters(&[location, scale]);
        self.ensure_valid()
    }

    fn linear_moments(&self) -> Result<LMoments, DistributionError> {
        self.ensure_valid()?;
        Ok(LMoments {
            l1: self.mean(),
            l2: self.scale * 2.0f64.ln(),
            tau3: 2.0 * 3.0f64.ln() / 2.0f64.ln() - 3.0,
            tau4: 0.150_374_805_7,
        })
    }
}

impl SamplingUncertainty for Gumbel {
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
            EstimationMethod::MaximumLikelihood => {
                // Inverse Fisher information.
                let c = 6.0 / (PI * PI);
                let one_minus_gamma = 1.0 - EULER_GAMMA;
                Ok(array![
                    [
                        b2 / n * (1.0 + c * one_minus_gamma * one_minus_gamma),
                        b2 / n * c * one_minus_gamma
                    ],
                    [b2 / n * c * one_minus_gamma, b2 / n * c]
                ])
            }
            EstimationMethod::ProductMoments => {
                // Delta method through the sample mean and standard
                // deviation, using the Gumbel's own skew and kurtosis.
                let sigma2 = self.variance();
                let var_mean = sigma2 / n;
                let var_sd = sigma2 * (GUMBEL_KURTOSIS - 1.0) / (4.0 * n);
                let cov_mean_sd = GUMBEL_SKEW * sigma2 / (2.0 * n);

                let c = 6.0f64.sqrt() / PI; // scale = c * sd
                let var_scale = c * c * var_sd;
                let cov_mean_scale = c * cov_mean_sd;
                let var_location = var_mean + EULER_GAMMA * EULER_GAMMA * var_scale
                    - 2.0 * EULER_GAMMA * cov_mean_scale;
                let cov_location_scale = cov_mean_scale - EULER_GAMMA * var_scale;

                Ok(array![
                    [var_location, cov_location_scale],
                    [cov_location_scale, var_scale]
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
        // Q = location - scale * ln(-ln p)
        Ok(vec![1.0, -(-p.ln()).ln()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_and_median_of_flood_like_fit() {
        let d = Gumbel::new(100.0, 10.0);
        assert_relative_eq!(d.mean(), 100.0 + 10.0 * EULER_GAMMA, epsilon = 1e-12);
        // Median = location - scale * ln(ln 2); ln(ln 2) is negative, so
        // the median sits above the location.
        assert_relative_eq!(d.median(), 100.0 - 10.0 * 2.0f64.ln().ln(), epsilon = 1e-9);
        assert_relative_eq!(d.median(), 103.665, epsilon = 1e-3);
    }

    #[test]
    fn quantile_round_trip() {
        let d = Gumbel::new(50.0, 7.0);
        for &p in &[0.01, 0.1, 0.5, 0.9, 0.999] {
            let x = d.inverse_cdf(p).unwrap();
            assert_relative_eq!(d.cdf(x).unwrap(), p, epsilon = 1e-12);
        }
    }

    #[test]
    fn mle_covariance_has_known_leading_constants() {
        let d = Gumbel::new(0.0, 1.0);
        let cov = d
            .parameter_covariance(100, EstimationMethod::MaximumLikelihood)
            .unwrap();
        assert_relative_eq!(cov[[0, 0]], 1.10867 / 100.0, epsilon = 1e-4);
        assert_relative_eq!(cov[[1, 1]], 0.60793 / 100.0, epsilon = 1e-4);
    }

    #[test]
    fn l_moment_fit_recovers_parameters() {
        let d = Gumbel::new(30.0, 4.0);
        let lm = d.linear_moments().unwrap();
        let mut refit = Gumbel::default();
        refit.set_from_l_moments(&lm).unwrap();
        assert_relative_eq!(refit.location(), 30.0, epsilon = 1e-10);
        assert_relative_eq!(refit.scale(), 4.0, epsilon = 1e-10);
    }
}
