//! End-to-end scenarios pinning exact numbers: the uniform sanity check,
//! Gumbel textbook statistics, degenerate point masses, and a full
//! fit-then-quantify-uncertainty workflow.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use freqfit::dist::{Gumbel, Triangular, Uniform};
use freqfit::{
    confidence_intervals, Bootstrap, ContinuousDistribution, Estimable, EstimationMethod,
    SamplingUncertainty,
};

#[test]
fn uniform_zero_to_ten() {
    let d = Uniform::new(0.0, 10.0);
    assert_relative_eq!(d.cdf(5.0).unwrap(), 0.5);
    assert_relative_eq!(d.inverse_cdf(0.5).unwrap(), 5.0);
    assert_relative_eq!(d.pdf(5.0).unwrap(), 0.1);
}

#[test]
fn gumbel_textbook_statistics() {
    let d = Gumbel::new(100.0, 10.0);
    assert_abs_diff_eq!(d.mean(), 105.772, epsilon = 1e-3);
    assert_abs_diff_eq!(d.median(), 103.665, epsilon = 1e-3);
}

#[test]
fn collapsed_triangular_point_mass() {
    let d = Triangular::new(7.0, 7.0, 7.0);
    for x in [-100.0, 0.0, 7.0, 100.0] {
        assert_eq!(d.pdf(x).unwrap(), 0.0);
        assert_eq!(d.cdf(x).unwrap(), 1.0);
    }
    for p in [0.0, 0.25, 0.5, 1.0] {
        assert_eq!(d.inverse_cdf(p).unwrap(), 7.0);
    }
}

#[test]
fn frequency_analysis_workflow() {
    // Fit an annual-maximum series, then quantify what the fit does not
    // know: standard errors on the 100-year event, a bootstrap replicate,
    // and Monte-Carlo confidence bands.
    let truth = Gumbel::new(250.0, 40.0);
    let record = truth.random_values(60, 1_972).unwrap();

    let mut fitted = Gumbel::default();
    fitted
        .estimate(&record, EstimationMethod::LinearMoments)
        .unwrap();
    assert_abs_diff_eq!(fitted.location(), 250.0, epsilon = 25.0);

    let hundred_year = fitted.inverse_cdf(0.99).unwrap();
    assert!(hundred_year > fitted.mean());

    let variance = fitted
        .quantile_variance(0.99, record.len(), EstimationMethod::MaximumLikelihood)
        .unwrap();
    assert!(variance > 0.0);

    let replicate = fitted
        .bootstrap(EstimationMethod::LinearMoments, record.len(), 55)
        .unwrap();
    assert!(replicate.scale() > 0.0);

    let bands = confidence_intervals(
        &fitted,
        record.len(),
        1500,
        &[0.01],
        &[0.05, 0.95],
        EstimationMethod::MaximumLikelihood,
        8,
    )
    .unwrap();
    assert!(bands.bands[[0, 0]] < hundred_year);
    assert!(hundred_year < bands.bands[[0, 1]]);
}
