//! Bounded Nelder-Mead simplex maximizer.
//!
//! Used by the maximum-likelihood engine to search a box-constrained
//! parameter space without derivatives. Convergence status is part of the
//! returned value so callers can distinguish "converged to a poor fit" from
//! "never converged".

/// Result of a simplex search. `converged` is false when the iteration
/// budget ran out before the stopping tolerances were met; `parameters`
/// still holds the best vertex found.
#[derive(Debug, Clone)]
pub struct SimplexSolution {
    pub parameters: Vec<f64>,
    pub objective: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Stopping tolerances and iteration budget.
#[derive(Debug, Clone, Copy)]
pub struct SimplexOptions {
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for SimplexOptions {
    fn default() -> Self {
        SimplexOptions {
            tolerance: 1e-10,
            max_iterations: 1000,
        }
    }
}

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Maximize `f` over the box `[lower, upper]`, starting from `initial`.
///
/// Candidate vertices are clamped to the box, so `f` is never evaluated
/// outside it. `f` may return a very large negative value (or -inf) to mark
/// an infeasible candidate; the simplex will move away from it.
pub fn maximize<F>(
    mut f: F,
    initial: &[f64],
    lower: &[f64],
    upper: &[f64],
    options: SimplexOptions,
) -> SimplexSolution
where
    F: FnMut(&[f64]) -> f64,
{
    let n = initial.len();
    let clamp = |x: &mut Vec<f64>| {
        for i in 0..n {
            x[i] = x[i].clamp(lower[i], upper[i]);
        }
    };

    // Initial simplex: the start point plus one vertex displaced along each
    // axis by 5% of the box width.
    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    let mut start = initial.to_vec();
    clamp(&mut start);
    simplex.push(start.clone());
    for i in 0..n {
        let mut vertex = start.clone();
        let step = 0.05 * (upper[i] - lower[i]);
        let step = if step > 0.0 { step } else { 0.05 * vertex[i].abs().max(1.0) };
        vertex[i] = if vertex[i] + step <= upper[i] {
            vertex[i] + step
        } else {
            vertex[i] - step
        };
        clamp(&mut vertex);
        simplex.push(vertex);
    }

    let mut values: Vec<f64> = simplex.iter().map(|v| f(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < options.max_iterations {
        iterations += 1;

        // Order vertices best (largest objective) first.
        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[b].partial_cmp(&values[a]).unwrap_or(std::cmp::Ordering::Equal));
        let simplex_sorted: Vec<Vec<f64>> = order.iter().map(|&i| simplex[i].clone()).collect();
        let values_sorted: Vec<f64> = order.iter().map(|&i| values[i]).collect();
        simplex = simplex_sorted;
        values = values_sorted;

        let best = values[0];
        let worst = values[n];

        // Objective-spread test plus a simplex-diameter test so flat
        // plateaus still terminate.
        let spread = (best - worst).abs();
        let scale = best.abs().max(worst.abs()).max(1.0);
        let diameter = (0..n)
            .map(|i| {
                simplex
                    .iter()
                    .map(|v| v[i])
                    .fold(f64::NEG_INFINITY, f64::max)
                    - simplex.iter().map(|v| v[i]).fold(f64::INFINITY, f64::min)
            })
            .fold(0.0f64, f64::max);
        if spread <= options.tolerance * scale && diameter <= options.tolerance.sqrt() {
            converged = true;
            break;
        }

        // Centroid of all vertices but the worst.
        let mut centroid = vec![0.0; n];
        for vertex in simplex.iter().take(n) {
            for i in 0..n {
                centroid[i] += vertex[i] / n as f64;
            }
        }

        let blend = |coef: f64| -> Vec<f64> {
            let mut x: Vec<f64> = (0..n)
                .map(|i| centroid[i] + coef * (centroid[i] - simplex[n][i]))
                .collect();
            for i in 0..n {
                x[i] = x[i].clamp(lower[i], upper[i]);
            }
            x
        };

        let reflected = blend(REFLECT);
        let f_reflected = f(&reflected);

        if f_reflected > values[0] {
            let expanded = blend(EXPAND);
            let f_expanded = f(&expanded);
            if f_expanded > f_reflected {
                simplex[n] = expanded;
                values[n] = f_expanded;
            } else {
                simplex[n] = reflected;
                values[n] = f_reflected;
            }
            continue;
        }

        if f_reflected > values[n - 1] {
            simplex[n] = reflected;
            values[n] = f_reflected;
            continue;
        }

        let contracted = blend(-CONTRACT);
        let f_contracted = f(&contracted);
        if f_contracted > values[n] {
            simplex[n] = contracted;
            values[n] = f_contracted;
            continue;
        }

        // Shrink toward the best vertex.
        for j in 1..=n {
            for i in 0..n {
                simplex[j][i] = simplex[0][i] + SHRINK * (simplex[j][i] - simplex[0][i]);
            }
            clamp(&mut simplex[j]);
            values[j] = f(&simplex[j]);
        }
    }

    // Final ordering so the reported vertex is the best one.
    let mut best_index = 0;
    for i in 1..=n {
        if values[i] > values[best_index] {
            best_index = i;
        }
    }

    SimplexSolution {
        parameters: simplex[best_index].clone(),
        objective: values[best_index],
        iterations,
        converged,
    }
}
