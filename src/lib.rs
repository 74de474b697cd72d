//! Univariate probability distributions for risk and frequency analysis:
//! a shared distribution contract, moment/L-moment/maximum-likelihood
//! estimation, bootstrap resampling, and Monte-Carlo uncertainty
//! propagation from parameters to quantiles.

pub mod constraints;
pub mod dist;
pub mod error;
pub mod estimation;
pub mod moments;
pub mod numerics;
pub mod resampling;
pub mod uncertainty;

// Re-export commonly used types at crate root
pub use constraints::ParameterConstraints;
pub use dist::{ContinuousDistribution, Validity};
pub use error::DistributionError;
pub use estimation::{Estimable, EstimationMethod, MleSummary};
pub use moments::{LMoments, Moments};
pub use resampling::{confidence_intervals, Bootstrap, ConfidenceIntervals};
pub use uncertainty::{ParameterRole, QuantileJacobian, SamplingUncertainty};
