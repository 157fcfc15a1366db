//! # Numeric primitives
//!
//! ## Aim
//! The extraction algorithms of [`crate::IVtools`] consume three generic numeric services as
//! black boxes: a linear least squares solve over an arbitrary design matrix, a degree-1
//! polynomial fit, and a multidimensional nonlinear root finder that reports success or
//! failure. This module puts them behind the [`NumericBackend`] trait so that the matrix and
//! solver machinery can be swapped without touching the algorithm code.
//!
//! ## Main Data Structures
//! - [`NumericBackend`]: the three-method contract
//! - [`NalgebraBackend`]: default implementation built on `nalgebra` (SVD least squares,
//!   closed-form line fit, Levenberg-Marquardt root finder of the `levenberg_marquardt` crate)
//! - [`LevenbergMarquardt`], [`LMSettings`], [`LMStatus`], [`RootResult`]: the root finder
//!
//! ## Usage
//! ```rust
//! use PVfit::Numerics::{NalgebraBackend, NumericBackend};
//! use nalgebra::DVector;
//! let backend = NalgebraBackend::new();
//! let (slope, intercept) = backend.polyfit_linear(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0]);
//! assert!((slope - 2.0).abs() < 1e-12 && (intercept - 1.0).abs() < 1e-12);
//! let f = |x: &DVector<f64>| DVector::from_vec(vec![x[0] * x[0] - 4.0]);
//! let result = backend.root(&f, &DVector::from_vec(vec![1.0]));
//! assert!(result.success);
//! ```
#[allow(non_snake_case)]
pub mod LM_solver;
pub mod least_squares;

pub use LM_solver::{LMSettings, LMStatus, LevenbergMarquardt, RootResult};
use nalgebra::{DMatrix, DVector};

/// Numeric services consumed by the parameter extraction pipelines
pub trait NumericBackend {
    /// Least squares solution of `a * x = b`. Undeterminable coefficients come back as NaN.
    fn lstsq(&self, a: &DMatrix<f64>, b: &DVector<f64>) -> DVector<f64>;
    /// Straight line through `(x, y)` in the least squares sense, returned as `(slope, intercept)`
    fn polyfit_linear(&self, x: &[f64], y: &[f64]) -> (f64, f64);
    /// Root of the residual function `f` starting from `x0`. Fixed auxiliary parameters are
    /// captured by the closure.
    fn root(&self, f: &dyn Fn(&DVector<f64>) -> DVector<f64>, x0: &DVector<f64>) -> RootResult;
}

/// Default backend on top of `nalgebra`
#[derive(Debug, Clone, Default)]
pub struct NalgebraBackend {
    pub lm: LMSettings,
}

impl NalgebraBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lm_settings(lm: LMSettings) -> Self {
        Self { lm }
    }
}

impl NumericBackend for NalgebraBackend {
    fn lstsq(&self, a: &DMatrix<f64>, b: &DVector<f64>) -> DVector<f64> {
        least_squares::lstsq(a, b)
    }

    fn polyfit_linear(&self, x: &[f64], y: &[f64]) -> (f64, f64) {
        least_squares::polyfit_linear(x, y)
    }

    fn root(&self, f: &dyn Fn(&DVector<f64>) -> DVector<f64>, x0: &DVector<f64>) -> RootResult {
        LevenbergMarquardt::new(self.lm).solve(f, x0)
    }
}
