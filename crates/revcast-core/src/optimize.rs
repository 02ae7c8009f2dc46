//! Bounded Nelder-Mead simplex search
//!
//! Derivative-free minimiser used to estimate Holt-Winters parameters.
//! The search is fully deterministic: the initial simplex is built from the
//! start point and per-coordinate step sizes, and ties are broken by vertex
//! index, so identical inputs always produce identical results.

use serde::{Deserialize, Serialize};

/// Reflection coefficient
const RHO: f64 = 1.0;
/// Expansion coefficient
const CHI: f64 = 2.0;
/// Contraction coefficient
const PSI: f64 = 0.5;
/// Shrink coefficient
const SIGMA: f64 = 0.5;

/// Limits for the simplex search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Maximum number of simplex iterations
    pub max_iterations: usize,
    /// Convergence threshold on the objective spread or simplex diameter
    pub tolerance: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20_000,
            tolerance: 1e-8,
        }
    }
}

/// Outcome of a simplex search
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// Best point found
    pub point: Vec<f64>,
    /// Objective value at `point`
    pub value: f64,
    pub iterations: usize,
    /// Whether the tolerance was met before the iteration cap
    pub converged: bool,
}

/// Minimise `objective` starting from `start`.
///
/// `steps` gives the initial simplex edge length per coordinate. When
/// `bounds` is given, every candidate is projected into the box before it is
/// evaluated. Non-finite objective values are treated as +infinity.
pub fn nelder_mead<F>(
    objective: F,
    start: &[f64],
    steps: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: &OptimizerConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let dim = start.len();
    debug_assert_eq!(steps.len(), dim);

    let project = |x: &mut Vec<f64>| {
        if let Some(bounds) = bounds {
            for (v, &(lo, hi)) in x.iter_mut().zip(bounds) {
                *v = v.clamp(lo, hi);
            }
        }
    };
    let eval = |x: &[f64]| {
        let v = objective(x);
        if v.is_finite() {
            v
        } else {
            f64::INFINITY
        }
    };

    // Initial simplex: start plus one vertex per coordinate
    let mut first = start.to_vec();
    project(&mut first);
    let mut simplex = vec![first.clone()];
    for i in 0..dim {
        let mut vertex = first.clone();
        vertex[i] += steps[i];
        project(&mut vertex);
        if vertex[i] == first[i] {
            // Pinned against an upper bound, step the other way
            vertex[i] -= steps[i];
            project(&mut vertex);
        }
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|x| eval(x)).collect();

    let mut order: Vec<usize> = (0..=dim).collect();
    let mut iterations = 0;
    let mut converged = false;

    loop {
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]).then(a.cmp(&b)));
        let best = order[0];
        let worst = order[dim];

        if has_converged(&simplex, &values, best, worst, config.tolerance) {
            converged = true;
            break;
        }
        if iterations >= config.max_iterations {
            break;
        }
        iterations += 1;

        let second_worst = order[dim.saturating_sub(1)];

        // Centroid of every vertex except the worst
        let mut centroid = vec![0.0; dim];
        for &idx in &order[..dim] {
            for (c, v) in centroid.iter_mut().zip(&simplex[idx]) {
                *c += v;
            }
        }
        for c in centroid.iter_mut() {
            *c /= dim as f64;
        }

        let along = |coef: f64| {
            let mut x: Vec<f64> = centroid
                .iter()
                .zip(&simplex[worst])
                .map(|(c, w)| c + coef * (c - w))
                .collect();
            project(&mut x);
            x
        };

        let reflected = along(RHO);
        let f_reflected = eval(&reflected);

        if f_reflected < values[best] {
            let expanded = along(RHO * CHI);
            let f_expanded = eval(&expanded);
            if f_expanded < f_reflected {
                simplex[worst] = expanded;
                values[worst] = f_expanded;
            } else {
                simplex[worst] = reflected;
                values[worst] = f_reflected;
            }
            continue;
        }

        if f_reflected < values[second_worst] {
            simplex[worst] = reflected;
            values[worst] = f_reflected;
            continue;
        }

        let (contracted, f_contracted, accept) = if f_reflected < values[worst] {
            // Outside contraction
            let x = along(RHO * PSI);
            let f = eval(&x);
            let accept = f <= f_reflected;
            (x, f, accept)
        } else {
            // Inside contraction
            let x = along(-PSI);
            let f = eval(&x);
            let accept = f < values[worst];
            (x, f, accept)
        };

        if accept {
            simplex[worst] = contracted;
            values[worst] = f_contracted;
            continue;
        }

        // Shrink towards the best vertex
        let anchor = simplex[best].clone();
        for idx in 0..=dim {
            if idx == best {
                continue;
            }
            let mut x: Vec<f64> = anchor
                .iter()
                .zip(&simplex[idx])
                .map(|(b, v)| b + SIGMA * (v - b))
                .collect();
            project(&mut x);
            values[idx] = eval(&x);
            simplex[idx] = x;
        }
    }

    let best = order[0];
    NelderMeadResult {
        point: simplex[best].clone(),
        value: values[best],
        iterations,
        converged,
    }
}

fn has_converged(
    simplex: &[Vec<f64>],
    values: &[f64],
    best: usize,
    worst: usize,
    tolerance: f64,
) -> bool {
    if !values[best].is_finite() {
        return false;
    }
    if (values[worst] - values[best]).abs() <= tolerance {
        return true;
    }
    let diameter = simplex
        .iter()
        .flat_map(|x| x.iter().zip(&simplex[best]).map(|(a, b)| (a - b).abs()))
        .fold(0.0_f64, f64::max);
    diameter <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_bowl() {
        let result = nelder_mead(
            |x| (x[0] - 3.0).powi(2) + 2.0 * (x[1] + 1.0).powi(2),
            &[0.0, 0.0],
            &[0.5, 0.5],
            None,
            &OptimizerConfig::default(),
        );
        assert!(result.converged);
        assert!((result.point[0] - 3.0).abs() < 1e-3, "{:?}", result.point);
        assert!((result.point[1] + 1.0).abs() < 1e-3, "{:?}", result.point);
        assert!(result.value < 1e-6);
    }

    #[test]
    fn test_rosenbrock() {
        let result = nelder_mead(
            |x| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2),
            &[-1.2, 1.0],
            &[0.1, 0.1],
            None,
            &OptimizerConfig::default(),
        );
        assert!(result.converged);
        assert!((result.point[0] - 1.0).abs() < 1e-2, "{:?}", result.point);
        assert!((result.point[1] - 1.0).abs() < 1e-2, "{:?}", result.point);
    }

    #[test]
    fn test_respects_bounds() {
        let result = nelder_mead(
            |x| (x[0] - 2.0).powi(2),
            &[0.5],
            &[0.1],
            Some(&[(0.0, 1.0)]),
            &OptimizerConfig::default(),
        );
        assert!(result.point[0] <= 1.0);
        assert!((result.point[0] - 1.0).abs() < 1e-6, "{:?}", result.point);
    }

    #[test]
    fn test_start_on_upper_bound() {
        let result = nelder_mead(
            |x| (x[0] - 0.25).powi(2),
            &[1.0],
            &[0.1],
            Some(&[(0.0, 1.0)]),
            &OptimizerConfig::default(),
        );
        assert!((result.point[0] - 0.25).abs() < 1e-3, "{:?}", result.point);
    }

    #[test]
    fn test_non_finite_treated_as_infinite() {
        let result = nelder_mead(
            |x| if x[0] < 0.0 { f64::NAN } else { (x[0] - 0.5).powi(2) },
            &[2.0],
            &[1.0],
            None,
            &OptimizerConfig::default(),
        );
        assert!(result.value.is_finite());
        assert!((result.point[0] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_iteration_cap() {
        let config = OptimizerConfig {
            max_iterations: 2,
            tolerance: 1e-14,
        };
        let result = nelder_mead(
            |x| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2),
            &[-1.2, 1.0],
            &[0.1, 0.1],
            None,
            &config,
        );
        assert!(!result.converged);
        assert_eq!(result.iterations, 2);
    }

    #[test]
    fn test_deterministic() {
        let f = |x: &[f64]| (x[0] - 1.0).powi(2) + (x[0] * x[1] - 2.0).powi(2);
        let a = nelder_mead(f, &[0.0, 0.0], &[0.3, 0.3], None, &OptimizerConfig::default());
        let b = nelder_mead(f, &[0.0, 0.0], &[0.3, 0.3], None, &OptimizerConfig::default());
        assert_eq!(a.point, b.point);
        assert_eq!(a.iterations, b.iterations);
    }
}
