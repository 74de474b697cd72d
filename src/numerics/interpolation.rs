//! Monotone piecewise-linear interpolation and order-statistic percentiles.

/// Interpolate `y` at `x` over the node arrays `xs` (ascending) / `ys`.
///
/// Values outside the node range clamp to the end ordinates, which keeps the
/// mapping monotone when `ys` is monotone.
pub fn interp1(x: f64, xs: &[f64], ys: &[f64]) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    if xs.is_empty() {
        return f64::NAN;
    }
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[xs.len() - 1] {
        return ys[ys.len() - 1];
    }
    // Binary search for the bracketing segment.
    let mut lo = 0;
    let mut hi = xs.len() - 1;
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if xs[mid] <= x {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let width = xs[hi] - xs[lo];
    if width <= 0.0 {
        return ys[lo];
    }
    let t = (x - xs[lo]) / width;
    ys[lo] + t * (ys[hi] - ys[lo])
}

/// Percentile of `sorted` (ascending) at level `p` in [0, 1], interpolating
/// linearly between order statistics. A single-element slice returns that
/// element for every level.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let below = rank.floor() as usize;
    let above = (below + 1).min(sorted.len() - 1);
    let fraction = rank - below as f64;
    sorted[below] + fraction * (sorted[above] - sorted[below])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn interp1_hits_nodes_and_midpoints() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [10.0, 20.0, 40.0];
        assert_abs_diff_eq!(interp1(1.0, &xs, &ys), 20.0);
        assert_abs_diff_eq!(interp1(1.5, &xs, &ys), 30.0);
        assert_abs_diff_eq!(interp1(-5.0, &xs, &ys), 10.0);
        assert_abs_diff_eq!(interp1(9.0, &xs, &ys), 40.0);
    }

    #[test]
    fn percentile_interpolates_between_ranks() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_abs_diff_eq!(percentile(&v, 0.0), 1.0);
        assert_abs_diff_eq!(percentile(&v, 1.0), 4.0);
        assert_abs_diff_eq!(percentile(&v, 0.5), 2.5);
    }

    #[test]
    fn percentile_of_singleton_is_that_value() {
        assert_abs_diff_eq!(percentile(&[7.0], 0.9), 7.0);
    }
}
