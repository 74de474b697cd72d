//! Monte-Carlo confidence intervals for fitted quantile curves.
//!
//! Each realization draws every parameter from its own asymptotic sampling
//! distribution, builds an independent candidate distribution, and
//! contributes one quantile row. Percentile bands come from the
//! cross-realization order statistics; the expected-probability curve
//! averages the realization CDFs (equal weights, Total Probability
//! Theorem) and inverts the average by monotone interpolation.

use crate::dist::gamma::inverse_gamma_p;
use crate::dist::normal::Normal;
use crate::dist::ContinuousDistribution;
use crate::error::DistributionError;
use crate::estimation::EstimationMethod;
use crate::numerics::interpolation::{interp1, percentile};
use crate::uncertainty::{ParameterRole, SamplingUncertainty};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Resolution of the expected-probability grid.
const GRID_POINTS: usize = 999;

/// Confidence bands and the expected-probability curve for a set of
/// exceedance probabilities.
#[derive(Debug, Clone)]
pub struct ConfidenceIntervals {
    /// Exceedance probabilities, as requested.
    pub quantiles: Vec<f64>,
    /// Confidence percentiles, as requested.
    pub percentiles: Vec<f64>,
    /// Band values, one row per exceedance probability and one column per
    /// percentile.
    pub bands: Array2<f64>,
    /// Expected-probability quantile for each requested exceedance
    /// probability.
    pub expected_probability: Vec<f64>,
    /// Realizations that survived (invalid parameter draws abort their
    /// replicate and are dropped from the population).
    pub realizations_used: usize,
}

/// Draws `realizations` parameter sets from their asymptotic sampling
/// distributions and derives percentile bands for the requested
/// exceedance probabilities.
///
/// Location- and shape-like parameters draw from a Normal centred on the
/// point estimate with the covariance-diagonal standard error; scale-like
/// parameters draw through the chi-squared scaling
/// `theta * sqrt((n - 1) / chi2(n - 1))`. All randomness comes from the
/// explicit `seed`; a single realization degenerates to the point estimate.
pub fn confidence_intervals<D>(
    dist: &D,
    sample_size: usize,
    realizations: usize,
    quantiles: &[f64],
    percentiles: &[f64],
    method: EstimationMethod,
    seed: u64,
) -> Result<ConfidenceIntervals, DistributionError>
where
    D: SamplingUncertainty + Send + Sync,
{
    dist.ensure_valid()?;
    if realizations == 0 {
        return Err(DistributionError::SampleTooSmall {
            required: 1,
            actual: 0,
        });
    }
    for &p in quantiles.iter().chain(percentiles.iter()) {
        if p.is_nan() || !(0.0..=1.0).contains(&p) {
            return Err(DistributionError::InvalidProbability { value: p });
        }
    }

    // Non-exceedance targets for the quantile rows.
    let targets: Vec<f64> = quantiles.iter().map(|&q| 1.0 - q).collect();

    let realized: Vec<D> = if realizations == 1 {
        // A single realization carries no sampling noise: it is the point
        // estimate itself, so every percentile collapses onto it.
        vec![dist.clone()]
    } else {
        draw_realizations(dist, sample_size, realizations, method, seed)?
    };
    if realized.is_empty() {
        return Err(DistributionError::NonConvergence {
            operation: "Monte-Carlo realization generation",
            iterations: realizations,
        });
    }

    // Each realization writes its own quantile row; rows are disjoint, so
    // the map is lock free.
    let rows: Vec<Vec<f64>> = realized
        .par_iter()
        .map(|candidate| targets.iter().map(|&p| candidate.quantile(p)).collect())
        .collect();

    // Percentile extraction is independent per quantile row.
    let band_rows: Vec<Vec<f64>> = (0..targets.len())
        .into_par_iter()
        .map(|j| {
            let mut column: Vec<f64> = rows.iter().map(|row| row[j]).collect();
            column.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            percentiles.iter().map(|&p| percentile(&column, p)).collect()
        })
        .collect();

    let mut bands = Array2::zeros((targets.len(), percentiles.len()));
    for (j, row) in band_rows.iter().enumerate() {
        for (k, &value) in row.iter().enumerate() {
            bands[[j, k]] = value;
        }
    }

    let expected_probability = expected_probability_curve(dist, &realized, &targets);

    Ok(ConfidenceIntervals {
        quantiles: quantiles.to_vec(),
        percentiles: percentiles.to_vec(),
        bands,
        expected_probability,
        realizations_used: realized.len(),
    })
}

fn draw_realizations<D>(
    dist: &D,
    sample_size: usize,
    realizations: usize,
    method: EstimationMethod,
    seed: u64,
) -> Result<Vec<D>, DistributionError>
where
    D: SamplingUncertainty + Send + Sync,
{
    if sample_size < 2 {
        return Err(DistributionError::SampleTooSmall {
            required: 2,
            actual: sample_size,
        });
    }
    let covariance = dist.parameter_covariance(sample_size, method)?;
    let roles = dist.parameter_roles();
    let theta = dist.parameters();
    let n = sample_size as f64;
    let half_dof = (n - 1.0) / 2.0;

    let standard_errors: Vec<f64> = (0..theta.len())
        .map(|i| covariance[[i, i]].max(0.0).sqrt())
        .collect();

    // All draws come from one seeded stream, before the parallel region,
    // so the output is reproducible regardless of thread scheduling.
    let mut rng = StdRng::seed_from_u64(seed);
    let mut draws: Vec<Vec<f64>> = Vec::with_capacity(realizations);
    for _ in 0..realizations {
        let mut candidate = Vec::with_capacity(theta.len());
        for i in 0..theta.len() {
            let u: f64 = rng.random::<f64>().clamp(f64::EPSILON, 1.0 - f64::EPSILON);
            let value = match roles[i] {
                ParameterRole::Location | ParameterRole::Shape => {
                    theta[i] + standard_errors[i] * Normal::standard_quantile(u)
                }
                ParameterRole::Scale => {
                    let chi2 = 2.0 * inverse_gamma_p(half_dof, u)?;
                    theta[i] * ((n - 1.0) / chi2).sqrt()
                }
            };
            candidate.push(value);
        }
        draws.push(candidate);
    }

    // Invalid draws abort their replicate rather than contaminating the
    // population.
    let realized: Vec<D> = draws
        .par_iter()
        .filter_map(|candidate| {
            let mut replicate = dist.clone();
            replicate.set_parameters(candidate);
            replicate.validity().is_valid().then_some(replicate)
        })
        .collect();

    Ok(realized)
}

/// Averages the realization CDFs over a dense quantile grid and inverts
/// the expected CDF at each requested non-exceedance target.
fn expected_probability_curve<D>(dist: &D, realized: &[D], targets: &[f64]) -> Vec<f64>
where
    D: SamplingUncertainty + Send + Sync,
{
    let grid: Vec<f64> = (1..=GRID_POINTS)
        .map(|i| i as f64 / (GRID_POINTS + 1) as f64)
        .collect();
    let xs: Vec<f64> = grid.iter().map(|&p| dist.quantile(p)).collect();

    let expected_cdf: Vec<f64> = xs
        .par_iter()
        .map(|&x| {
            realized.iter().map(|r| r.cumulative(x)).sum::<f64>() / realized.len() as f64
        })
        .collect();

    targets
        .iter()
        .map(|&target| interp1(target, &expected_cdf, &xs))
        .collect()
}
