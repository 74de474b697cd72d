//! Uncertainty battery: closed-form gradients agree with numerical
//! differentiation, the delta-method variance matches known results, the
//! Jacobian determinant behaves, and undefined (method, distribution)
//! covariance pairs surface as capability gaps.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use freqfit::dist::{Exponential, Gamma, GeneralizedExtremeValue, Gumbel, Normal, Weibull};
use freqfit::{
    ContinuousDistribution, DistributionError, EstimationMethod, SamplingUncertainty,
};

/// Central-difference reference for a closed-form gradient override.
fn numerical_gradient<D: SamplingUncertainty>(dist: &D, p: f64) -> Vec<f64> {
    let theta = dist.parameters();
    let mut probe = dist.clone();
    (0..theta.len())
        .map(|i| {
            let h = theta[i].abs().max(1.0) * 1e-6;
            let mut up = theta.clone();
            up[i] += h;
            probe.set_parameters(&up);
            let q_up = probe.quantile(p);
            let mut down = theta.clone();
            down[i] -= h;
            probe.set_parameters(&down);
            let q_down = probe.quantile(p);
            (q_up - q_down) / (2.0 * h)
        })
        .collect()
}

macro_rules! gradient_agreement {
    ($name:ident, $ctor:expr) => {
        #[test]
        fn $name() {
            let d = $ctor;
            for &p in &[0.05, 0.5, 0.95] {
                let closed = d.quantile_gradient(p).unwrap();
                let numeric = numerical_gradient(&d, p);
                for i in 0..closed.len() {
                    assert_relative_eq!(closed[i], numeric[i], epsilon = 1e-4, max_relative = 1e-4);
                }
            }
        }
    };
}

gradient_agreement!(normal_gradient_matches_numeric, Normal::new(10.0, 2.0));
gradient_agreement!(gumbel_gradient_matches_numeric, Gumbel::new(100.0, 10.0));
gradient_agreement!(exponential_gradient_matches_numeric, Exponential::new(5.0, 2.0));
gradient_agreement!(weibull_gradient_matches_numeric, Weibull::new(1.8, 3.0));
gradient_agreement!(
    gev_gradient_matches_numeric,
    GeneralizedExtremeValue::new(100.0, 15.0, 0.2)
);

#[test]
fn gamma_uses_the_numeric_default() {
    // No closed-form quantile for the Gamma: the trait default
    // differentiates the inversion, which must still be smooth.
    let d = Gamma::new(3.0, 2.0);
    let gradient = d.quantile_gradient(0.9).unwrap();
    assert!(gradient[0] > 0.0, "quantile grows with shape");
    assert!(gradient[1] > 0.0, "quantile grows with scale");
    assert_relative_eq!(gradient[1], d.quantile(0.9) / 2.0, epsilon = 1e-5);
}

#[test]
fn normal_quantile_variance_has_the_textbook_form() {
    let d = Normal::new(0.0, 4.0);
    let n = 80;
    for &p in &[0.1, 0.5, 0.99] {
        let z = d.inverse_cdf(p).unwrap() / 4.0;
        let expected = d.variance() * (1.0 + 0.5 * z * z) / n as f64;
        let got = d
            .quantile_variance(p, n, EstimationMethod::ProductMoments)
            .unwrap();
        assert_relative_eq!(got, expected, epsilon = 1e-9);
    }
}

#[test]
fn quantile_variance_shrinks_with_sample_size() {
    let d = Gumbel::new(100.0, 10.0);
    let small = d
        .quantile_variance(0.99, 20, EstimationMethod::MaximumLikelihood)
        .unwrap();
    let large = d
        .quantile_variance(0.99, 200, EstimationMethod::MaximumLikelihood)
        .unwrap();
    assert!(large < small);
    assert_relative_eq!(small / large, 10.0, epsilon = 1e-9);
}

#[test]
fn jacobian_is_square_with_a_nonzero_determinant() {
    let d = Gumbel::new(100.0, 10.0);
    let jacobian = d.quantile_jacobian(&[0.1, 0.9]).unwrap();
    assert_eq!(jacobian.matrix.shape(), &[2, 2]);
    assert!(jacobian.determinant.abs() > 1e-6);
}

#[test]
fn jacobian_at_identical_probabilities_is_singular() {
    // Two identical rows: the determinant must report the identifiability
    // collapse instead of being patched over.
    let d = Normal::new(0.0, 1.0);
    let jacobian = d.quantile_jacobian(&[0.4, 0.4]).unwrap();
    assert_abs_diff_eq!(jacobian.determinant, 0.0, epsilon = 1e-12);
}

#[test]
fn jacobian_arity_mismatch_is_rejected() {
    let d = Normal::new(0.0, 1.0);
    assert!(matches!(
        d.quantile_jacobian(&[0.1, 0.5, 0.9]),
        Err(DistributionError::ParameterCount { .. })
    ));
}

#[test]
fn covariance_capability_gaps_are_typed() {
    let gumbel = Gumbel::new(100.0, 10.0);
    assert!(matches!(
        gumbel.parameter_covariance(50, EstimationMethod::LinearMoments),
        Err(DistributionError::MethodNotSupported { .. })
    ));

    let gev = GeneralizedExtremeValue::new(100.0, 15.0, 0.1);
    for method in [
        EstimationMethod::ProductMoments,
        EstimationMethod::LinearMoments,
        EstimationMethod::MaximumLikelihood,
    ] {
        assert!(matches!(
            gev.parameter_covariance(50, method),
            Err(DistributionError::MethodNotSupported { .. })
        ));
    }
}

#[test]
fn gumbel_moment_covariance_is_positive_definite() {
    let d = Gumbel::new(100.0, 10.0);
    let cov = d
        .parameter_covariance(60, EstimationMethod::ProductMoments)
        .unwrap();
    assert!(cov[[0, 0]] > 0.0 && cov[[1, 1]] > 0.0);
    let det = cov[[0, 0]] * cov[[1, 1]] - cov[[0, 1]] * cov[[1, 0]];
    assert!(det > 0.0);
}

#[test]
fn weibull_mle_covariance_matches_the_fisher_information() {
    // Invert the per-observation information in (shape, scale) and compare
    // against the closed form carried by the distribution.
    let shape: f64 = 2.2;
    let scale: f64 = 5.0;
    let n = 100;
    let gamma_e = 0.577_215_664_901_532_9_f64;
    let pi = std::f64::consts::PI;

    let i_kk = (pi * pi / 6.0 + (1.0 - gamma_e).powi(2)) / (shape * shape);
    let i_kl = -(1.0 - gamma_e) / scale;
    let i_ll = shape * shape / (scale * scale);
    let det = i_kk * i_ll - i_kl * i_kl;

    let d = Weibull::new(shape, scale);
    let cov = d
        .parameter_covariance(n, EstimationMethod::MaximumLikelihood)
        .unwrap();
    assert_relative_eq!(cov[[0, 0]], i_ll / det / n as f64, epsilon = 1e-10);
    assert_relative_eq!(cov[[1, 1]], i_kk / det / n as f64, epsilon = 1e-10);
    assert_relative_eq!(cov[[0, 1]], -i_kl / det / n as f64, epsilon = 1e-10);
}
