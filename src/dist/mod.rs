pub mod exponential;
pub mod gamma;
pub mod gev;
pub mod gumbel;
pub mod kernel_density;
pub mod log_normal;
pub mod normal;
pub mod triangular;
pub mod uniform;
pub mod weibull;

// Re-export all distributions for convenience
pub use exponential::Exponential;
pub use gamma::Gamma;
pub use gev::GeneralizedExtremeValue;
pub use gumbel::Gumbel;
pub use kernel_density::KernelDensity;
pub use log_normal::LogNormal;
pub use normal::Normal;
pub use triangular::Triangular;
pub use uniform::Uniform;
pub use weibull::Weibull;

use crate::error::DistributionError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Debug;

/// Validation state of a distribution's parameter vector.
///
/// Recomputed on every setter invocation; numerical methods consult it
/// (never assume it) before evaluating.
#[derive(Debug, Clone, PartialEq)]
pub enum Validity {
    Unvalidated,
    Valid,
    Invalid(DistributionError),
}

impl Validity {
    pub fn from_result(result: Result<(), DistributionError>) -> Validity {
        match result {
            Ok(()) => Validity::Valid,
            Err(e) => Validity::Invalid(e),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }
}

/// The contract every distribution variant implements.
///
/// Variants supply the unchecked kernels `density`, `cumulative` and
/// `quantile`, which may assume a valid parameter vector; callers use the
/// checked `pdf`/`cdf`/`inverse_cdf` wrappers, which consult the validity
/// state first and surface the stored domain error at the point of use.
/// `Clone` must produce a fully independent instance — parameter storage is
/// plain owned data, never shared.
pub trait ContinuousDistribution: Clone + Debug {
    /// Short display name used in error messages.
    fn name(&self) -> &'static str;

    /// Number of parameters for this variant.
    fn n_params(&self) -> usize;

    /// Parameter names, in the same order as `parameters()`.
    fn parameter_names(&self) -> &'static [&'static str];

    /// The current parameter vector, in the variant's canonical order.
    fn parameters(&self) -> Vec<f64>;

    /// Assigns the parameter vector and eagerly re-validates, recording the
    /// outcome in the validity state. A wrong-arity vector leaves the stored
    /// parameters untouched but still records the failure.
    fn set_parameters(&mut self, values: &[f64]);

    /// Validates a candidate parameter vector against the variant's domain
    /// constraints without mutating anything.
    fn validate_parameters(&self, values: &[f64]) -> Result<(), DistributionError>;

    /// Current validation state.
    fn validity(&self) -> &Validity;

    /// Returns the stored domain error if the last-set parameters were
    /// invalid; re-validates if the state is stale.
    fn ensure_valid(&self) -> Result<(), DistributionError> {
        match self.validity() {
            Validity::Valid => Ok(()),
            Validity::Invalid(e) => Err(e.clone()),
            Validity::Unvalidated => self.validate_parameters(&self.parameters()),
        }
    }

    fn mean(&self) -> f64;
    fn variance(&self) -> f64;
    fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
    fn skewness(&self) -> f64;
    /// Full kurtosis (Normal = 3).
    fn kurtosis(&self) -> f64;
    /// Lower support bound (may be -inf).
    fn minimum(&self) -> f64;
    /// Upper support bound (may be +inf).
    fn maximum(&self) -> f64;
    fn median(&self) -> f64 {
        self.quantile(0.5)
    }

    /// Probability density at `x`. Precondition: valid parameters.
    fn density(&self, x: f64) -> f64;

    /// Log density at `x`. Variants with a cheap closed form override.
    fn log_density(&self, x: f64) -> f64 {
        self.density(x).ln()
    }

    /// Non-exceedance probability at `x`. Precondition: valid parameters.
    fn cumulative(&self, x: f64) -> f64;

    /// Value at non-exceedance probability `p` in [0, 1].
    /// Precondition: valid parameters.
    fn quantile(&self, p: f64) -> f64;

    /// Checked density: surfaces the stored domain error before computing.
    fn pdf(&self, x: f64) -> Result<f64, DistributionError> {
        self.ensure_valid()?;
        Ok(self.density(x))
    }

    /// Checked log density.
    fn ln_pdf(&self, x: f64) -> Result<f64, DistributionError> {
        self.ensure_valid()?;
        Ok(self.log_density(x))
    }

    /// Checked cumulative distribution function.
    fn cdf(&self, x: f64) -> Result<f64, DistributionError> {
        self.ensure_valid()?;
        Ok(self.cumulative(x))
    }

    /// Checked quantile function. The probability argument is validated
    /// first, independent of parameter validity.
    fn inverse_cdf(&self, p: f64) -> Result<f64, DistributionError> {
        if p.is_nan() || !(0.0..=1.0).contains(&p) {
            return Err(DistributionError::InvalidProbability { value: p });
        }
        self.ensure_valid()?;
        Ok(self.quantile(p))
    }

    /// Draws `n` values by inverse-transform sampling from a seeded uniform
    /// sequence. Identical seed and parameters reproduce identical output;
    /// no global RNG state is involved.
    fn random_values(&self, n: usize, seed: u64) -> Result<Vec<f64>, DistributionError> {
        self.ensure_valid()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut values = Vec::with_capacity(n);
        for _ in 0..n {
            // Keep draws strictly inside (0, 1) so infinite-support
            // quantile tails cannot emit +-inf into the sample.
            let u: f64 = rng.random::<f64>().clamp(f64::EPSILON, 1.0 - f64::EPSILON);
            values.push(self.quantile(u));
        }
        Ok(values)
    }
}
