/// value types: IV curve, regression coefficients, parameter records, datasheet values
pub mod iv_types;
/// error taxonomy of the extraction procedures
pub mod ivtools_errors;
/// non-iterative fit of the single diode equation to a full IV curve:
/// segmentation of the curve into a linear and an exponential region, regression on each,
/// closed-form recovery of IL, I0, Rsh, Rs and nNsVth
pub mod sde_sandia;
/// five single diode parameters from six datasheet values by the De Soto et al. procedure
pub mod sdm_desoto;
mod sdm_desoto_tests;
/// forward single diode model: current at voltage, open circuit voltage, IV curves
pub mod single_diode;
/// bandgap constants, temperature coefficient conversion and projection, initial guess
pub mod temperature_model;

pub use ivtools_errors::ExtractionError;
