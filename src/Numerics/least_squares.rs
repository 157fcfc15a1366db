//! Linear least squares and straight line fitting.
use nalgebra::{DMatrix, DVector};

/// Least squares solution of `a * x = b` through SVD.
///
/// The result is a vector of NaN when the problem has no unique solution: no rows, fewer rows
/// than unknowns, a numerically rank deficient matrix, or a non-finite entry in `a` or `b`.
pub fn lstsq(a: &DMatrix<f64>, b: &DVector<f64>) -> DVector<f64> {
    let (nrows, ncols) = a.shape();
    let undetermined = DVector::from_element(ncols, f64::NAN);
    if nrows == 0 || nrows < ncols || b.len() != nrows {
        return undetermined;
    }
    if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
        return undetermined;
    }
    let svd = a.clone().svd(true, true);
    let max_sv = svd.singular_values.max();
    let eps = f64::EPSILON * (nrows.max(ncols) as f64) * max_sv;
    let rank = svd.singular_values.iter().filter(|sv| **sv > eps).count();
    if rank < ncols {
        return undetermined;
    }
    match svd.solve(b, eps) {
        Ok(x) => x,
        Err(_) => undetermined,
    }
}

/// Degree-1 polynomial fit, returns `(slope, intercept)`.
///
/// NaN pair for fewer than two points, mismatched lengths or zero spread of `x`.
pub fn polyfit_linear(x: &[f64], y: &[f64]) -> (f64, f64) {
    let n = x.len();
    if n < 2 || y.len() != n {
        return (f64::NAN, f64::NAN);
    }
    let nf = n as f64;
    let x_mean = x.iter().sum::<f64>() / nf;
    let y_mean = y.iter().sum::<f64>() / nf;
    let (sxx, sxy) = x
        .iter()
        .zip(y.iter())
        .fold((0.0, 0.0), |(sxx, sxy), (xi, yi)| {
            let dx = xi - x_mean;
            (sxx + dx * dx, sxy + dx * (yi - y_mean))
        });
    if sxx == 0.0 || !sxx.is_finite() {
        return (f64::NAN, f64::NAN);
    }
    let slope = sxy / sxx;
    (slope, y_mean - slope * x_mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lstsq_exact_plane() {
        // z = 1 + 2x - 3y
        let pts = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (2.0, 1.0), (1.5, 3.0)];
        let mut a = DMatrix::zeros(pts.len(), 3);
        let mut b = DVector::zeros(pts.len());
        for (i, (x, y)) in pts.iter().enumerate() {
            a[(i, 0)] = 1.0;
            a[(i, 1)] = *x;
            a[(i, 2)] = *y;
            b[i] = 1.0 + 2.0 * x - 3.0 * y;
        }
        let coef = lstsq(&a, &b);
        assert_relative_eq!(coef[0], 1.0, epsilon = 1e-10);
        assert_relative_eq!(coef[1], 2.0, epsilon = 1e-10);
        assert_relative_eq!(coef[2], -3.0, epsilon = 1e-10);
    }

    #[test]
    fn test_lstsq_overdetermined_noisy() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.1, 0.9, 2.1, 2.9];
        let mut a = DMatrix::zeros(4, 2);
        for i in 0..4 {
            a[(i, 0)] = 1.0;
            a[(i, 1)] = x[i];
        }
        let coef = lstsq(&a, &DVector::from_row_slice(&y));
        let (slope, intercept) = polyfit_linear(&x, &y);
        assert_relative_eq!(coef[0], intercept, epsilon = 1e-10);
        assert_relative_eq!(coef[1], slope, epsilon = 1e-10);
    }

    #[test]
    fn test_lstsq_undetermined() {
        let empty = lstsq(&DMatrix::zeros(0, 3), &DVector::zeros(0));
        assert_eq!(empty.len(), 3);
        assert!(empty.iter().all(|c| c.is_nan()));

        // two identical columns
        let a = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
        let b = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        assert!(lstsq(&a, &b).iter().all(|c| c.is_nan()));

        let a = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]);
        let b = DVector::from_row_slice(&[f64::NAN, 1.0]);
        assert!(lstsq(&a, &b).iter().all(|c| c.is_nan()));
    }

    #[test]
    fn test_polyfit_linear() {
        let x = [0.0, 0.5, 1.0, 1.5];
        let y: Vec<f64> = x.iter().map(|v| 8.0 - 0.01 * v).collect();
        let (slope, intercept) = polyfit_linear(&x, &y);
        assert_relative_eq!(slope, -0.01, epsilon = 1e-12);
        assert_relative_eq!(intercept, 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_polyfit_linear_degenerate() {
        assert!(polyfit_linear(&[1.0], &[2.0]).0.is_nan());
        assert!(polyfit_linear(&[], &[]).1.is_nan());
        assert!(polyfit_linear(&[1.0, 1.0], &[2.0, 3.0]).0.is_nan());
        assert!(polyfit_linear(&[1.0, 2.0], &[2.0]).0.is_nan());
    }
}
