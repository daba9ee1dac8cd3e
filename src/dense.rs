//! Dense vector and matrix kernels.
//!
//! Matrices are stored row-major as `Vec<Vec<F>>` (`a[row][col]`). All
//! kernels assume consistent dimensions; callers validate shapes once at
//! their entry point and the kernels only `debug_assert!` them.

use num_traits::Float;

/// Convert an `f64` literal into `F`.
///
/// Every `Float` implementor in practice can represent the small constants
/// used by the solvers; NaN is returned otherwise so the failure surfaces as
/// a numerical one instead of a panic.
#[inline]
pub fn constant<F: Float>(v: f64) -> F {
    F::from(v).unwrap_or_else(F::nan)
}

/// Dot product of two vectors.
pub fn dot<F: Float>(a: &[F], b: &[F]) -> F {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .fold(F::zero(), |acc, (&ai, &bi)| acc + ai * bi)
}

/// Euclidean norm of a vector.
pub fn norm<F: Float>(v: &[F]) -> F {
    dot(v, v).sqrt()
}

/// `y <- y + alpha * x`.
pub fn axpy<F: Float>(y: &mut [F], alpha: F, x: &[F]) {
    debug_assert_eq!(y.len(), x.len());
    for (yi, &xi) in y.iter_mut().zip(x) {
        *yi = *yi + alpha * xi;
    }
}

/// Returns `x + t * d`.
pub fn add_scaled<F: Float>(x: &[F], t: F, d: &[F]) -> Vec<F> {
    debug_assert_eq!(x.len(), d.len());
    x.iter().zip(d).map(|(&xi, &di)| xi + t * di).collect()
}

/// Returns `a - b`.
pub fn sub<F: Float>(a: &[F], b: &[F]) -> Vec<F> {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(&ai, &bi)| ai - bi).collect()
}

/// Returns `-v`.
pub fn neg<F: Float>(v: &[F]) -> Vec<F> {
    v.iter().map(|&vi| -vi).collect()
}

/// Matrix-vector product `A * x`.
pub fn mat_vec<F: Float>(a: &[Vec<F>], x: &[F]) -> Vec<F> {
    a.iter().map(|row| dot(row, x)).collect()
}

/// Transposed matrix-vector product `J^T * r` for an `m x n` matrix `J`.
// Column access over a row-major matrix reads clearer with explicit indices
#[allow(clippy::needless_range_loop)]
pub fn transpose_mat_vec<F: Float>(j: &[Vec<F>], r: &[F]) -> Vec<F> {
    debug_assert_eq!(j.len(), r.len());
    let n = j.first().map_or(0, Vec::len);
    let mut out = vec![F::zero(); n];
    for (row, &ri) in j.iter().zip(r) {
        for k in 0..n {
            out[k] = out[k] + row[k] * ri;
        }
    }
    out
}

/// Gram matrix `J^T * J` of an `m x n` matrix `J`.
#[allow(clippy::needless_range_loop)]
pub fn gram<F: Float>(j: &[Vec<F>]) -> Vec<Vec<F>> {
    let n = j.first().map_or(0, Vec::len);
    let mut g = vec![vec![F::zero(); n]; n];
    for row in j {
        for a in 0..n {
            let ra = row[a];
            if ra == F::zero() {
                continue;
            }
            for b in a..n {
                g[a][b] = g[a][b] + ra * row[b];
            }
        }
    }
    for a in 0..n {
        for b in 0..a {
            g[a][b] = g[b][a];
        }
    }
    g
}

/// The `n x n` identity matrix.
pub fn identity<F: Float>(n: usize) -> Vec<Vec<F>> {
    let mut m = vec![vec![F::zero(); n]; n];
    for (i, row) in m.iter_mut().enumerate() {
        row[i] = F::one();
    }
    m
}

/// Returns `true` when `a` is square with side `n`.
pub fn is_square<F>(a: &[Vec<F>], n: usize) -> bool {
    a.len() == n && a.iter().all(|row| row.len() == n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_and_norm() {
        assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, -5.0, 6.0]), 12.0);
        assert_eq!(norm(&[3.0_f64, 4.0]), 5.0);
        assert_eq!(norm::<f64>(&[]), 0.0);
    }

    #[test]
    fn gram_matches_explicit_product() {
        let j = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![0.0, -1.0]];
        let g = gram(&j);
        assert_eq!(g, vec![vec![10.0, 14.0], vec![14.0, 21.0]]);
        assert_eq!(transpose_mat_vec(&j, &[1.0, 1.0, 1.0]), vec![4.0, 5.0]);
    }

    #[test]
    fn axpy_and_add_scaled_agree() {
        let x = vec![1.0, -1.0];
        let d = vec![0.5, 2.0];
        let mut y = x.clone();
        axpy(&mut y, 2.0, &d);
        assert_eq!(y, add_scaled(&x, 2.0, &d));
        assert_eq!(sub(&y, &x), vec![1.0, 4.0]);
        assert_eq!(neg(&d), vec![-0.5, -2.0]);
    }

    #[test]
    fn identity_is_square() {
        let i3: Vec<Vec<f32>> = identity(3);
        assert!(is_square(&i3, 3));
        assert_eq!(mat_vec(&i3, &[1.0, 2.0, 3.0]), vec![1.0, 2.0, 3.0]);
    }
}
