//! Newton-Raphson with a maintained bracket and bisection fallback.

use crate::error::DistributionError;

/// Solve `f(x) = 0` for x in `[lower, upper]`.
///
/// Takes a Newton step whenever the derivative is usable and the step stays
/// inside the current bracket; otherwise bisects. The bracket shrinks on
/// every iteration, so the method is robust to poor starting guesses as long
/// as `f(lower)` and `f(upper)` straddle zero. If they do not, plain Newton
/// iterations from `guess` are used and the bracket only clamps the iterate.
pub fn robust_solve<F, D>(
    mut f: F,
    mut df: D,
    guess: f64,
    lower: f64,
    upper: f64,
    tolerance: f64,
    max_iterations: usize,
) -> Result<f64, DistributionError>
where
    F: FnMut(f64) -> f64,
    D: FnMut(f64) -> f64,
{
    let mut lo = lower;
    let mut hi = upper;
    let f_lo = f(lo);
    let f_hi = f(hi);
    let bracketed = f_lo * f_hi < 0.0;
    let ascending = f_lo < 0.0;

    let mut x = guess.clamp(lower, upper);

    for _ in 0..max_iterations {
        let fx = f(x);
        if fx.abs() <= tolerance {
            return Ok(x);
        }

        if bracketed {
            if (fx < 0.0) == ascending {
                lo = x;
            } else {
                hi = x;
            }
        }

        let dfx = df(x);
        let newton = x - fx / dfx;
        let newton_ok = dfx.is_finite()
            && dfx != 0.0
            && newton.is_finite()
            && newton > lo.min(hi)
            && newton < lo.max(hi);

        let next = if newton_ok {
            newton
        } else if bracketed {
            0.5 * (lo + hi)
        } else {
            // No bracket and Newton failed: nothing sensible left to try.
            return Err(DistributionError::NonConvergence {
                operation: "root finding",
                iterations: max_iterations,
            });
        };

        if (next - x).abs() <= tolerance * x.abs().max(1.0) {
            return Ok(next);
        }
        x = next;

        if bracketed && (hi - lo).abs() <= tolerance {
            return Ok(0.5 * (lo + hi));
        }
    }

    Err(DistributionError::NonConvergence {
        operation: "root finding",
        iterations: max_iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn solves_bracketed_cubic() {
        let root = robust_solve(
            |x| x * x * x - 2.0 * x - 5.0,
            |x| 3.0 * x * x - 2.0,
            2.0,
            0.0,
            4.0,
            1e-12,
            100,
        )
        .unwrap();
        assert_abs_diff_eq!(root, 2.094_551_481_542_327, epsilon = 1e-9);
    }

    #[test]
    fn bisection_rescues_flat_derivative() {
        // Derivative reported as zero everywhere; bisection must carry it.
        let root = robust_solve(|x| x - 1.5, |_| 0.0, 0.0, 0.0, 4.0, 1e-10, 200).unwrap();
        assert_abs_diff_eq!(root, 1.5, epsilon = 1e-8);
    }

    #[test]
    fn unbracketed_flat_function_errors() {
        let result = robust_solve(|_| 1.0, |_| 0.0, 0.5, 0.0, 1.0, 1e-10, 50);
        assert!(matches!(
            result,
            Err(DistributionError::NonConvergence { .. })
        ));
    }
}
