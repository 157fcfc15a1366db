//! # Levenberg-Marquardt root finder
//!
//! Solves `F(x) = 0` for `F: R^n -> R^m`, `m >= n`, by minimizing `|F(x)|^2` with the MINPACK
//! Levenberg-Marquardt algorithm of the `levenberg_marquardt` crate. The residual closure is
//! wrapped into a [`LeastSquaresProblem`] whose Jacobian is built by forward differences with
//! the MINPACK step `sqrt(eps) * |x_j|`, which makes the solve equivalent to `lmdif`.
//!
//! Success is the crate's own verdict: the ftol/xtol tests, the orthogonality test or an
//! exactly zero residual. Running out of evaluations or failing to improve is reported with
//! the reason in [`LMStatus`].
use levenberg_marquardt::{
    LeastSquaresProblem, LevenbergMarquardt as MinpackSolver, MinimizationReport,
    TerminationReason,
};
use log::{debug, info};
use nalgebra::storage::Owned;
use nalgebra::{DMatrix, DVector, Dyn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// trial residuals that overflow are replaced by this value so the step is rejected
const NON_FINITE_RESIDUAL: f64 = 1e150;

/// Tolerances and budget of the Levenberg-Marquardt iteration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LMSettings {
    /// relative tolerance on the scaled step
    pub xtol: f64,
    /// relative tolerance on the reduction of the sum of squares
    pub ftol: f64,
    /// maximum number of residual evaluations, rounded down to a multiple of `n + 1`
    /// (at least `n + 1`); the evaluations of the forward difference Jacobian are not counted
    pub max_fev: usize,
}

impl Default for LMSettings {
    fn default() -> Self {
        Self {
            xtol: 1.49012e-8,
            ftol: 1.49012e-8,
            max_fev: 1200,
        }
    }
}

/// Termination reason of the iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LMStatus {
    ZeroResidual,
    FtolReached,
    XtolReached,
    /// residuals orthogonal to the Jacobian columns
    Orthogonal,
    MaxFevReached,
    NoImprovementPossible,
    /// non-finite Jacobian or failed evaluation inside the iteration
    NumericalFailure,
    ImproperInput,
}

impl LMStatus {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            LMStatus::ZeroResidual
                | LMStatus::FtolReached
                | LMStatus::XtolReached
                | LMStatus::Orthogonal
        )
    }

    fn from_termination(reason: &TerminationReason) -> Self {
        match reason {
            TerminationReason::ResidualsZero => LMStatus::ZeroResidual,
            TerminationReason::Converged { ftol: true, .. } => LMStatus::FtolReached,
            TerminationReason::Converged { .. } => LMStatus::XtolReached,
            TerminationReason::Orthogonal => LMStatus::Orthogonal,
            TerminationReason::LostPatience => LMStatus::MaxFevReached,
            TerminationReason::NoImprovementPossible(_) => LMStatus::NoImprovementPossible,
            TerminationReason::NoParameters
            | TerminationReason::NoResiduals
            | TerminationReason::WrongDimensions(_) => LMStatus::ImproperInput,
            _ => LMStatus::NumericalFailure,
        }
    }
}

impl fmt::Display for LMStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            LMStatus::ZeroResidual => "residual is exactly zero",
            LMStatus::FtolReached => "relative reduction of the sum of squares is at most ftol",
            LMStatus::XtolReached => "relative step between two iterates is at most xtol",
            LMStatus::Orthogonal => "residual vector is orthogonal to the Jacobian columns",
            LMStatus::MaxFevReached => "number of function evaluations reached max_fev",
            LMStatus::NoImprovementPossible => "tolerances too small, no further improvement",
            LMStatus::NumericalFailure => "non-finite Jacobian or failed evaluation",
            LMStatus::ImproperInput => "improper input: empty, underdetermined or non-finite start",
        };
        write!(f, "{}", msg)
    }
}

/// Outcome of a root search
#[derive(Debug, Clone)]
pub struct RootResult {
    pub x: DVector<f64>,
    pub success: bool,
    pub status: LMStatus,
    /// residual evaluations counted by the minimizer
    pub n_fev: usize,
    pub residual_norm: f64,
}

/// Residual closure seen as a least squares problem
struct ResidualProblem<'a> {
    f: &'a dyn Fn(&DVector<f64>) -> DVector<f64>,
    x: DVector<f64>,
    m: usize,
}

impl LeastSquaresProblem<f64, Dyn, Dyn> for ResidualProblem<'_> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, x: &DVector<f64>) {
        self.x.copy_from(x);
    }

    fn params(&self) -> DVector<f64> {
        self.x.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        let r = (self.f)(&self.x);
        if r.len() != self.m {
            return None;
        }
        Some(r.map(|v| if v.is_finite() { v } else { NON_FINITE_RESIDUAL }))
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        let jac = forward_difference_jacobian(self.f, &self.x)?;
        jac.iter().all(|v| v.is_finite()).then_some(jac)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LevenbergMarquardt {
    pub settings: LMSettings,
}

impl LevenbergMarquardt {
    pub fn new(settings: LMSettings) -> Self {
        Self { settings }
    }

    pub fn solve(
        &self,
        f: &dyn Fn(&DVector<f64>) -> DVector<f64>,
        x0: &DVector<f64>,
    ) -> RootResult {
        let n = x0.len();
        let f0 = f(x0);
        let m = f0.len();
        let LMSettings {
            xtol,
            ftol,
            max_fev,
        } = self.settings;
        let proper = n > 0
            && m >= n
            && all_finite(x0)
            && all_finite(&f0)
            && xtol >= 0.0
            && ftol >= 0.0;
        if !proper {
            return finish(x0.clone(), f0.norm(), LMStatus::ImproperInput, false, 1);
        }
        // the minimizer budget is patience * (n + 1) residual evaluations
        let patience = (max_fev / (n + 1)).max(1);
        debug!(
            "LM start: n = {}, m = {}, |F(x0)| = {:e}, patience = {}",
            n,
            m,
            f0.norm(),
            patience
        );
        let problem = ResidualProblem {
            f,
            x: x0.clone(),
            m,
        };
        let (problem, report): (_, MinimizationReport<f64>) = MinpackSolver::new()
            .with_xtol(xtol)
            .with_ftol(ftol)
            .with_patience(patience)
            .minimize(problem);
        let status = LMStatus::from_termination(&report.termination);
        let residual_norm = (2.0 * report.objective_function).sqrt();
        finish(
            problem.x,
            residual_norm,
            status,
            report.termination.was_successful(),
            report.number_of_evaluations,
        )
    }
}

fn finish(
    x: DVector<f64>,
    residual_norm: f64,
    status: LMStatus,
    success: bool,
    n_fev: usize,
) -> RootResult {
    info!(
        "LM finished after {} evaluations: {} (|F| = {:e})",
        n_fev, status, residual_norm
    );
    RootResult {
        x,
        success,
        status,
        n_fev,
        residual_norm,
    }
}

fn all_finite(v: &DVector<f64>) -> bool {
    v.iter().all(|x| x.is_finite())
}

/// Forward difference Jacobian with MINPACK step `sqrt(eps) * |x_j|`.
/// `None` when an evaluation changes the residual dimension.
fn forward_difference_jacobian(
    f: &dyn Fn(&DVector<f64>) -> DVector<f64>,
    x: &DVector<f64>,
) -> Option<DMatrix<f64>> {
    let eps = f64::EPSILON.sqrt();
    let fvec = f(x);
    let mut jac = DMatrix::zeros(fvec.len(), x.len());
    let mut xh = x.clone();
    for j in 0..x.len() {
        let temp = xh[j];
        let mut h = eps * temp.abs();
        if h == 0.0 {
            h = eps;
        }
        xh[j] = temp + h;
        let fh = f(&xh);
        xh[j] = temp;
        if fh.len() != fvec.len() {
            return None;
        }
        jac.set_column(j, &((fh - &fvec) / h));
    }
    Some(jac)
}
