//! Sample moment estimators: the two canonical exchange formats between
//! samples and distribution parameters.
//!
//! Product moments use the unbiased estimators (n-1 variance divisor,
//! bias-corrected skewness and kurtosis); L-moments use the unbiased
//! probability-weighted-moment estimators over the sorted sample. Kurtosis
//! is reported in full form throughout the crate (Normal = 3, not 0).

use crate::error::DistributionError;

/// Floor substituted for non-positive sample values before a log transform.
/// Log-space estimators (LogNormal product moments) use this instead of
/// failing on a sample that contains zeros or negatives.
pub const LOG_FLOOR: f64 = 1e-8;

/// Natural log with the non-positive guard applied.
pub fn ln_floored(x: f64) -> f64 {
    if x > 0.0 {
        x.ln()
    } else {
        LOG_FLOOR.ln()
    }
}

/// Product-moment vector {mean, standard deviation, skewness, kurtosis}.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub mean: f64,
    pub std_dev: f64,
    pub skewness: f64,
    pub kurtosis: f64,
}

impl Moments {
    /// Unbiased sample product moments. Requires at least 4 points so all
    /// four entries are defined.
    pub fn from_sample(sample: &[f64]) -> Result<Moments, DistributionError> {
        let n = sample.len();
        if n < 4 {
            return Err(DistributionError::SampleTooSmall {
                required: 4,
                actual: n,
            });
        }
        let nf = n as f64;
        let mean = sample.iter().sum::<f64>() / nf;

        let mut m2 = 0.0;
        let mut m3 = 0.0;
        let mut m4 = 0.0;
        for &x in sample {
            let d = x - mean;
            m2 += d * d;
            m3 += d * d * d;
            m4 += d * d * d * d;
        }

        let variance = m2 / (nf - 1.0);
        let std_dev = variance.sqrt();

        let (skewness, kurtosis) = if std_dev > 0.0 {
            let g1 = nf / ((nf - 1.0) * (nf - 2.0)) * m3 / std_dev.powi(3);
            let g2 = nf * (nf + 1.0) / ((nf - 1.0) * (nf - 2.0) * (nf - 3.0)) * m4
                / std_dev.powi(4)
                - 3.0 * (nf - 1.0) * (nf - 1.0) / ((nf - 2.0) * (nf - 3.0));
            (g1, g2 + 3.0)
        } else {
            // All-equal sample: a valid degenerate input.
            (0.0, 0.0)
        };

        Ok(Moments {
            mean,
            std_dev,
            skewness,
            kurtosis,
        })
    }

    /// Product moments of the log-transformed sample, with the non-positive
    /// floor substitution applied first.
    pub fn from_log_sample(sample: &[f64]) -> Result<Moments, DistributionError> {
        let logs: Vec<f64> = sample.iter().map(|&x| ln_floored(x)).collect();
        Moments::from_sample(&logs)
    }
}

/// L-moment vector {L1, L2, tau3, tau4}.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LMoments {
    pub l1: f64,
    pub l2: f64,
    pub tau3: f64,
    pub tau4: f64,
}

impl LMoments {
    /// Unbiased sample L-moments via the probability-weighted moments
    /// b0..b3 of the sorted sample.
    pub fn from_sample(sample: &[f64]) -> Result<LMoments, DistributionError> {
        let n = sample.len();
        if n < 4 {
            return Err(DistributionError::SampleTooSmall {
                required: 4,
                actual: n,
            });
        }
        let mut sorted = sample.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let nf = n as f64;
        let mut b0 = 0.0;
        let mut b1 = 0.0;
        let mut b2 = 0.0;
        let mut b3 = 0.0;
        for (index, &x) in sorted.iter().enumerate() {
            let i = (index + 1) as f64; // 1-based rank
            b0 += x;
            b1 += x * (i - 1.0);
            b2 += x * (i - 1.0) * (i - 2.0);
            b3 += x * (i - 1.0) * (i - 2.0) * (i - 3.0);
        }
        b0 /= nf;
        b1 /= nf * (nf - 1.0);
        b2 /= nf * (nf - 1.0) * (nf - 2.0);
        b3 /= nf * (nf - 1.0) * (nf - 2.0) * (nf - 3.0);

        let l1 = b0;
        let l2 = 2.0 * b1 - b0;
        let l3 = 6.0 * b2 - 6.0 * b1 + b0;
        let l4 = 20.0 * b3 - 30.0 * b2 + 12.0 * b1 - b0;

        let (tau3, tau4) = if l2 > 0.0 {
            (l3 / l2, l4 / l2)
        } else {
            (0.0, 0.0)
        };

        Ok(LMoments { l1, l2, tau3, tau4 })
    }
}
