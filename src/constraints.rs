//! Search box derivation for the maximum-likelihood engine.

/// Initial guess and box bounds for a bounded parameter search, one entry
/// per parameter. Invariant: every initial value lies strictly inside its
/// (lower, upper) interval.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterConstraints {
    pub initial: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// Half-width of the box used for near-zero (shape/skew-like) parameters.
const NEUTRAL_HALF_WIDTH: f64 = 1.0;
/// Below this magnitude a parameter is treated as near-zero.
const NEAR_ZERO: f64 = 1e-8;
/// Order-of-magnitude envelope factor.
const ENVELOPE: f64 = 10.0;

impl ParameterConstraints {
    /// Build an order-of-magnitude envelope around a moment-based initial
    /// guess. Near-zero entries get a symmetric unit box centred on zero;
    /// if an initial value still falls outside its own bounds it is reset
    /// to the neutral midpoint, so the strict-interior invariant holds by
    /// construction.
    pub fn envelope(initial: &[f64]) -> ParameterConstraints {
        let mut init = Vec::with_capacity(initial.len());
        let mut lower = Vec::with_capacity(initial.len());
        let mut upper = Vec::with_capacity(initial.len());

        for &value in initial {
            let (mut v, lo, hi) = if !value.is_finite() || value.abs() < NEAR_ZERO {
                (0.0, -NEUTRAL_HALF_WIDTH, NEUTRAL_HALF_WIDTH)
            } else if value > 0.0 {
                (value, value / ENVELOPE, value * ENVELOPE)
            } else {
                (value, value * ENVELOPE, value / ENVELOPE)
            };
            if v <= lo || v >= hi {
                v = 0.5 * (lo + hi);
            }
            init.push(v);
            lower.push(lo);
            upper.push(hi);
        }

        ParameterConstraints {
            initial: init,
            lower,
            upper,
        }
    }

    /// Explicit constraints; nudges any initial value sitting on a bound
    /// into the strict interior.
    pub fn new(initial: Vec<f64>, lower: Vec<f64>, upper: Vec<f64>) -> ParameterConstraints {
        let mut init = initial;
        for i in 0..init.len() {
            if init[i] <= lower[i] || init[i] >= upper[i] {
                init[i] = 0.5 * (lower[i] + upper[i]);
            }
        }
        ParameterConstraints {
            initial: init,
            lower,
            upper,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_initial_gets_decade_envelope() {
        let c = ParameterConstraints::envelope(&[100.0]);
        assert_eq!(c.lower[0], 10.0);
        assert_eq!(c.upper[0], 1000.0);
        assert!(c.initial[0] > c.lower[0] && c.initial[0] < c.upper[0]);
    }

    #[test]
    fn negative_initial_keeps_bounds_ordered() {
        let c = ParameterConstraints::envelope(&[-5.0]);
        assert!(c.lower[0] < c.upper[0]);
        assert!(c.initial[0] > c.lower[0] && c.initial[0] < c.upper[0]);
    }

    #[test]
    fn near_zero_shape_resets_to_neutral_box() {
        let c = ParameterConstraints::envelope(&[1e-12]);
        assert_eq!(c.initial[0], 0.0);
        assert_eq!(c.lower[0], -1.0);
        assert_eq!(c.upper[0], 1.0);
    }

    #[test]
    fn non_finite_initial_is_replaced() {
        let c = ParameterConstraints::envelope(&[f64::NAN]);
        assert!(c.initial[0].is_finite());
        assert!(c.initial[0] > c.lower[0] && c.initial[0] < c.upper[0]);
    }
}
