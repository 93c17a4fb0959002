//! Derivative-free minimization (Nelder-Mead simplex).

/// Result of a minimization run
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub point: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct NelderMead {
    pub max_iterations: usize,
    /// Stop when the spread of simplex values falls to
    /// `tolerance * (1 + |best|)`
    pub tolerance: f64,
    /// Offset of the initial vertices along each axis
    pub initial_step: f64,
}

impl NelderMead {
    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
            initial_step: 0.25,
        }
    }

    /// Minimize `f` starting from `start`. Non-finite objective values are
    /// treated as `+inf`.
    pub fn minimize<F>(&self, f: F, start: &[f64]) -> Minimum
    where
        F: Fn(&[f64]) -> f64,
    {
        let eval = |x: &[f64]| {
            let v = f(x);
            if v.is_finite() {
                v
            } else {
                f64::INFINITY
            }
        };

        let dim = start.len();
        let n = dim.max(1) as f64;
        let (reflect, expand, contract, shrink) = (1.0, 2.0, 0.5, 0.5);

        let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(dim + 1);
        simplex.push((start.to_vec(), eval(start)));
        for i in 0..dim {
            let mut vertex = start.to_vec();
            vertex[i] += if vertex[i].abs() > 1e-8 {
                self.initial_step * vertex[i].abs().max(1.0)
            } else {
                self.initial_step
            };
            let value = eval(&vertex);
            simplex.push((vertex, value));
        }

        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

            let best = simplex[0].1;
            let worst = simplex[dim].1;
            if best.is_finite() && (worst - best).abs() <= self.tolerance * (1.0 + best.abs()) {
                converged = true;
                break;
            }
            iterations += 1;

            let centroid: Vec<f64> = (0..dim)
                .map(|j| simplex[..dim].iter().map(|(x, _)| x[j]).sum::<f64>() / n)
                .collect();
            let towards = |coef: f64, from: &[f64]| -> Vec<f64> {
                centroid
                    .iter()
                    .zip(from)
                    .map(|(c, w)| c + coef * (c - w))
                    .collect()
            };

            let worst_point = simplex[dim].0.clone();
            let reflected = towards(reflect, &worst_point);
            let f_reflected = eval(&reflected);

            if f_reflected < simplex[0].1 {
                let expanded = towards(expand, &worst_point);
                let f_expanded = eval(&expanded);
                simplex[dim] = if f_expanded < f_reflected {
                    (expanded, f_expanded)
                } else {
                    (reflected, f_reflected)
                };
                continue;
            }

            if f_reflected < simplex[dim - 1].1 {
                simplex[dim] = (reflected, f_reflected);
                continue;
            }

            let (candidate, f_candidate) = if f_reflected < simplex[dim].1 {
                // Outside contraction
                let point = towards(contract, &worst_point);
                let value = eval(&point);
                (point, value)
            } else {
                // Inside contraction
                let point = towards(-contract, &worst_point);
                let value = eval(&point);
                (point, value)
            };

            if f_candidate < simplex[dim].1.min(f_reflected) {
                simplex[dim] = (candidate, f_candidate);
                continue;
            }

            let anchor = simplex[0].0.clone();
            for vertex in simplex.iter_mut().skip(1) {
                let point: Vec<f64> = anchor
                    .iter()
                    .zip(&vertex.0)
                    .map(|(a, x)| a + shrink * (x - a))
                    .collect();
                let value = eval(&point);
                *vertex = (point, value);
            }
        }

        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        let (point, value) = simplex.swap_remove(0);
        Minimum {
            point,
            value,
            iterations,
            converged,
        }
    }
}
