//! Propagation of sampling uncertainty from parameters to quantiles:
//! asymptotic parameter covariance, quantile partial derivatives, the
//! delta-method quantile variance, and the probability-to-parameter
//! Jacobian with its determinant.

use crate::dist::ContinuousDistribution;
use crate::error::DistributionError;
use crate::estimation::EstimationMethod;
use crate::numerics::linalg;
use ndarray::Array2;

/// Statistical role of a parameter, used by the Monte-Carlo engine to pick
/// each parameter's asymptotic sampling distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterRole {
    Location,
    Scale,
    Shape,
}

/// Square matrix of quantile partial derivatives stacked over as many
/// probabilities as there are parameters, with its determinant. A
/// determinant near zero signals poor local identifiability of the
/// parameter-to-quantile mapping; it is returned to the caller, never
/// divided through.
#[derive(Debug, Clone)]
pub struct QuantileJacobian {
    pub matrix: Array2<f64>,
    pub determinant: f64,
}

/// Sampling-uncertainty capability.
///
/// `parameter_covariance` holds closed-form asymptotic formulas that exist
/// only for specific (estimation method, distribution) pairs; undefined
/// pairs return `MethodNotSupported` rather than a silent zero matrix.
pub trait SamplingUncertainty: ContinuousDistribution {
    /// Role of each parameter, aligned with `parameters()`.
    fn parameter_roles(&self) -> Vec<ParameterRole>;

    /// Asymptotic covariance of the parameter estimators for a sample of
    /// `sample_size`, under `method`.
    fn parameter_covariance(
        &self,
        sample_size: usize,
        method: EstimationMethod,
    ) -> Result<Array2<f64>, DistributionError>;

    /// Diagonal of `parameter_covariance`.
    fn parameter_variance(
        &self,
        sample_size: usize,
        method: EstimationMethod,
    ) -> Result<Vec<f64>, DistributionError> {
        let covariance = self.parameter_covariance(sample_size, method)?;
        Ok((0..self.n_params()).map(|i| covariance[[i, i]]).collect())
    }

    /// Partial derivatives of the quantile function with respect to each
    /// parameter, evaluated at non-exceedance probability `p`.
    ///
    /// The default differentiates `quantile` centrally on a probe clone;
    /// variants with an algebraic quantile relation override with the
    /// closed form.
    fn quantile_gradient(&self, p: f64) -> Result<Vec<f64>, DistributionError> {
        if p.is_nan() || !(0.0..=1.0).contains(&p) {
            return Err(DistributionError::InvalidProbability { value: p });
        }
        self.ensure_valid()?;

        let theta = self.parameters();
        let names = self.parameter_names();
        let mut probe = self.clone();
        let mut gradient = Vec::with_capacity(theta.len());

        for i in 0..theta.len() {
            let h = theta[i].abs().max(1.0) * 1e-6;

            let mut up = theta.clone();
            up[i] += h;
            probe.set_parameters(&up);
            let q_up = probe.validity().is_valid().then(|| probe.quantile(p));

            let mut down = theta.clone();
            down[i] -= h;
            probe.set_parameters(&down);
            let q_down = probe.validity().is_valid().then(|| probe.quantile(p));

            let slope = match (q_up, q_down) {
                (Some(a), Some(b)) => (a - b) / (2.0 * h),
                // One-sided fallback when the perturbation crosses the
                // parameter domain boundary.
                (Some(a), None) => (a - self.quantile(p)) / h,
                (None, Some(b)) => (self.quantile(p) - b) / h,
                (None, None) => {
                    return Err(DistributionError::InvalidParameter {
                        distribution: self.name(),
                        parameter: names[i],
                        value: theta[i],
                        reason: "no differentiable neighborhood inside the parameter domain",
                    })
                }
            };
            gradient.push(slope);
        }

        Ok(gradient)
    }

    /// First-order (delta-method) propagation of parameter uncertainty into
    /// the quantile at `p`: the quadratic form g' Cov g.
    fn quantile_variance(
        &self,
        p: f64,
        sample_size: usize,
        method: EstimationMethod,
    ) -> Result<f64, DistributionError> {
        let gradient = self.quantile_gradient(p)?;
        let covariance = self.parameter_covariance(sample_size, method)?;
        let k = gradient.len();
        let mut variance = 0.0;
        for i in 0..k {
            for j in 0..k {
                variance += gradient[i] * gradient[j] * covariance[[i, j]];
            }
        }
        Ok(variance)
    }

    /// Stacks `quantile_gradient` rows at exactly `n_params` probabilities
    /// into a square matrix and returns it with its determinant.
    fn quantile_jacobian(
        &self,
        probabilities: &[f64],
    ) -> Result<QuantileJacobian, DistributionError> {
        let k = self.n_params();
        if probabilities.len() != k {
            return Err(DistributionError::ParameterCount {
                distribution: self.name(),
                expected: k,
                actual: probabilities.len(),
            });
        }

        let mut matrix = Array2::zeros((k, k));
        for (row, &p) in probabilities.iter().enumerate() {
            let gradient = self.quantile_gradient(p)?;
            for (col, &g) in gradient.iter().enumerate() {
                matrix[[row, col]] = g;
            }
        }

        let determinant = linalg::determinant(&matrix);
        Ok(QuantileJacobian {
            matrix,
            determinant,
        })
    }
}
