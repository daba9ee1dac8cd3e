#![allow(dead_code)]

use newtonic::dense::{dot, mat_vec};
use newtonic::{Model, Objective, TwiceDifferentiable};

// ============================================================
// Smooth objectives
// ============================================================

/// f(x) = 0.5 x^T A x + b^T x + c
#[derive(Debug, Clone)]
pub struct Quadratic {
    pub a: Vec<Vec<f64>>,
    pub b: Vec<f64>,
    pub c: f64,
}

impl Quadratic {
    pub fn new(a: Vec<Vec<f64>>, b: Vec<f64>, c: f64) -> Self {
        Quadratic { a, b, c }
    }

    /// `0.5 ‖x‖² + b^T x + c`.
    pub fn isotropic(b: Vec<f64>, c: f64) -> Self {
        let n = b.len();
        let a = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
            .collect();
        Quadratic { a, b, c }
    }
}

impl Objective<f64> for Quadratic {
    fn dim(&self) -> usize {
        self.b.len()
    }

    fn value(&self, x: &[f64]) -> f64 {
        0.5 * dot(x, &mat_vec(&self.a, x)) + dot(&self.b, x) + self.c
    }

    fn gradient(&self, x: &[f64]) -> Vec<f64> {
        mat_vec(&self.a, x)
            .iter()
            .zip(&self.b)
            .map(|(ax, b)| ax + b)
            .collect()
    }
}

impl TwiceDifferentiable<f64> for Quadratic {
    fn hessian(&self, _x: &[f64]) -> Vec<Vec<f64>> {
        self.a.clone()
    }
}

/// f(x) = (1 - x0)^2 + 100 (x1 - x0^2)^2
pub struct Rosenbrock;

impl Objective<f64> for Rosenbrock {
    fn dim(&self) -> usize {
        2
    }

    fn value(&self, x: &[f64]) -> f64 {
        let a = 1.0 - x[0];
        let b = x[1] - x[0] * x[0];
        a * a + 100.0 * b * b
    }

    fn gradient(&self, x: &[f64]) -> Vec<f64> {
        let a = 1.0 - x[0];
        let b = x[1] - x[0] * x[0];
        vec![-2.0 * a - 400.0 * x[0] * b, 200.0 * b]
    }
}

impl TwiceDifferentiable<f64> for Rosenbrock {
    fn hessian(&self, x: &[f64]) -> Vec<Vec<f64>> {
        let h00 = 2.0 - 400.0 * (x[1] - 3.0 * x[0] * x[0]);
        let h01 = -400.0 * x[0];
        vec![vec![h00, h01], vec![h01, 200.0]]
    }
}

/// Two wells and a bump on a paraboloid. Gradient only.
///
/// f(x) = −0.03 / (‖x − (−0.25, 0.2)‖² + 0.03) − 0.1 / (‖x − (0.25, −0.2)‖² + 0.04)
///        + 0.1 / (‖x‖² + 0.05) + 2 + ‖x‖²
pub struct Bumps;

impl Bumps {
    fn terms(x: &[f64]) -> (f64, f64, f64) {
        let (x1, x2) = (x[0], x[1]);
        let d1 = (x1 + 0.25).powi(2) + (x2 - 0.2).powi(2) + 0.03;
        let d2 = (x1 - 0.25).powi(2) + (x2 + 0.2).powi(2) + 0.04;
        let d3 = x1 * x1 + x2 * x2 + 0.05;
        (d1, d2, d3)
    }
}

impl Objective<f64> for Bumps {
    fn dim(&self) -> usize {
        2
    }

    fn value(&self, x: &[f64]) -> f64 {
        let (d1, d2, d3) = Self::terms(x);
        -0.03 / d1 - 0.1 / d2 + 0.1 / d3 + 2.0 + x[0] * x[0] + x[1] * x[1]
    }

    fn gradient(&self, x: &[f64]) -> Vec<f64> {
        let (x1, x2) = (x[0], x[1]);
        let (d1, d2, d3) = Self::terms(x);
        let g1 = 2.0 * (x1 + 0.25) * 0.03 / (d1 * d1) + 2.0 * (x1 - 0.25) * 0.1 / (d2 * d2)
            - 2.0 * x1 * 0.1 / (d3 * d3)
            + 2.0 * x1;
        let g2 = 2.0 * (x2 - 0.2) * 0.03 / (d1 * d1) + 2.0 * (x2 + 0.2) * 0.1 / (d2 * d2)
            - 2.0 * x2 * 0.1 / (d3 * d3)
            + 2.0 * x2;
        vec![g1, g2]
    }
}

// ============================================================
// Least-squares models
// ============================================================

/// r_i(p) = p0 exp(p1 t_i) − y_i
pub struct Exponential {
    pub t: Vec<f64>,
    pub y: Vec<f64>,
}

impl Exponential {
    /// Noise-free samples of `a exp(b t)` at `t = 0, 0.5, ..., 2.5`.
    pub fn exact(a: f64, b: f64) -> Self {
        let t: Vec<f64> = (0..6).map(|i| 0.5 * i as f64).collect();
        let y = t.iter().map(|&ti| a * (b * ti).exp()).collect();
        Exponential { t, y }
    }
}

impl Model<f64> for Exponential {
    fn dim(&self) -> usize {
        2
    }

    fn residual(&self, p: &[f64]) -> Vec<f64> {
        self.t
            .iter()
            .zip(&self.y)
            .map(|(&t, &y)| p[0] * (p[1] * t).exp() - y)
            .collect()
    }

    fn jacobian(&self, p: &[f64]) -> Vec<Vec<f64>> {
        self.t
            .iter()
            .map(|&t| {
                let e = (p[1] * t).exp();
                vec![e, p[0] * t * e]
            })
            .collect()
    }
}

/// Rosenbrock as residuals: r = (1 − p0, 10 (p1 − p0²)).
pub struct RosenbrockResiduals;

impl Model<f64> for RosenbrockResiduals {
    fn dim(&self) -> usize {
        2
    }

    fn residual(&self, p: &[f64]) -> Vec<f64> {
        vec![1.0 - p[0], 10.0 * (p[1] - p[0] * p[0])]
    }

    fn jacobian(&self, p: &[f64]) -> Vec<Vec<f64>> {
        vec![vec![-1.0, 0.0], vec![-20.0 * p[0], 10.0]]
    }
}
