use crate::Numerics::LMStatus;
use thiserror::Error;

/// Failures of the parameter extraction procedures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionError {
    /// segmentation or regression found no valid window, a recovered parameter is NaN,
    /// or the saturation current could not be reconciled
    #[error("Parameter extraction failed: {0}")]
    ExtractionFailed(String),
    /// cell technology is recognized but its bandgap model is not implemented
    #[error("Cell technology '{0}' is not implemented yet")]
    UnsupportedTechnology(String),
    #[error("Unknown cell type: '{0}'")]
    UnknownTechnology(String),
    #[error(
        "Parameter estimation failed: nonlinear solver did not converge ({status}) after {n_fev} evaluations, residual norm {residual_norm:e}"
    )]
    SolverDidNotConverge {
        status: LMStatus,
        n_fev: usize,
        residual_norm: f64,
    },
    /// caller contract violated: empty or mismatched arrays, non-finite scalars
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
