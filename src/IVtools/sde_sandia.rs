//! # Single diode equation fit to an IV curve
//!
//! ## Aim
//! Non-iterative extraction of the five single diode equation parameters from a full sampled
//! IV curve (C. B. Jones, C. W. Hansen, 46th IEEE PVSC, 2019).
//!
//! ## Method
//! With `Rsh = 1/Gp` the single diode equation rearranges to
//! ```text
//! I = IL/(1 + Gp Rs) - Gp V/(1 + Gp Rs) - I0/(1 + Gp Rs) (exp((V + I Rs)/nNsVth) - 1)
//! ```
//! 1. On the low voltage part of the curve the exponential term is negligible and a line
//!    `I = beta0 - beta1 V` is fitted ([`find_beta0_beta1`]).
//! 2. Where `y = beta0 - beta1 V - I` exceeds `ilim * i_sc` the exponential dominates and
//!    `log(y) = beta2 + beta3 V + beta4 I` is fitted ([`find_beta3_beta4`]).
//! 3. The parameters follow in closed form from beta0, beta1, beta3, beta4, with the
//!    saturation current estimated at both the max power and the open circuit points
//!    ([`calculate_sde_parameters`]).
//!
//! ## Usage
//! ```rust
//! use PVfit::IVtools::sde_sandia::{SandiaOptions, fit_sde_sandia};
//! use PVfit::IVtools::single_diode::iv_curve;
//! use PVfit::IVtools::iv_types::SDEParameters;
//! let truth = SDEParameters {
//!     photocurrent: 8.0,
//!     saturation_current: 5e-10,
//!     resistance_shunt: 1000.0,
//!     resistance_series: 0.2,
//!     nNsVth: 61.5 * 0.025,
//! };
//! let curve = iv_curve(&truth, 300).unwrap();
//! let fitted = fit_sde_sandia(&curve.voltage, &curve.current, &SandiaOptions::default()).unwrap();
//! assert!((fitted.resistance_series - 0.2).abs() < 2e-3);
//! ```
use super::iv_types::{RegressionCoefficients, SDEParameters, validate_arrays};
use super::ivtools_errors::ExtractionError;
use crate::Numerics::{NalgebraBackend, NumericBackend};
use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};

/// Optional curve landmarks and the two segmentation fractions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SandiaOptions {
    /// open circuit voltage, last voltage sample if `None`
    pub v_oc: Option<f64>,
    /// short circuit current, first current sample if `None`
    pub i_sc: Option<f64>,
    /// max power point, located on the curve if `None`
    pub v_mp_i_mp: Option<(f64, f64)>,
    /// the linear region starts at `V <= vlim * v_oc`
    pub vlim: f64,
    /// the exponential region is where `beta0 - beta1 V - I > ilim * i_sc`
    pub ilim: f64,
}

impl Default for SandiaOptions {
    fn default() -> Self {
        Self {
            v_oc: None,
            i_sc: None,
            v_mp_i_mp: None,
            vlim: 0.2,
            ilim: 0.1,
        }
    }
}

/// Fits the single diode equation to an IV curve with the default numeric backend.
pub fn fit_sde_sandia(
    voltage: &[f64],
    current: &[f64],
    options: &SandiaOptions,
) -> Result<SDEParameters, ExtractionError> {
    fit_sde_sandia_with(&NalgebraBackend::new(), voltage, current, options)
}

pub fn fit_sde_sandia_with<B: NumericBackend>(
    backend: &B,
    voltage: &[f64],
    current: &[f64],
    options: &SandiaOptions,
) -> Result<SDEParameters, ExtractionError> {
    validate_arrays(voltage, current)?;
    // landmarks default to the curve end points
    let v_oc = options.v_oc.unwrap_or(voltage[voltage.len() - 1]);
    let i_sc = options.i_sc.unwrap_or(current[0]);
    let (v_mp, i_mp) = match options.v_mp_i_mp {
        Some(mp) => mp,
        None => find_mp(voltage, current)?,
    };
    debug!(
        "fit_sde_sandia: v_oc = {}, i_sc = {}, v_mp = {}, i_mp = {}",
        v_oc, i_sc, v_mp, i_mp
    );

    let (beta0, beta1) = find_beta0_beta1(backend, voltage, current, options.vlim, v_oc)?;
    let (beta3, beta4) =
        find_beta3_beta4(backend, voltage, current, beta0, beta1, options.ilim, i_sc)?;
    let betas = RegressionCoefficients {
        beta0,
        beta1,
        beta3,
        beta4,
    };
    let params = calculate_sde_parameters(&betas, (v_mp, i_mp), v_oc)?;
    info!("single diode equation parameters from IV curve: {:?}", params);
    Ok(params)
}

/// Voltage and current at the sample with the largest power, first one on ties.
pub fn find_mp(voltage: &[f64], current: &[f64]) -> Result<(f64, f64), ExtractionError> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, (v, i)) in voltage.iter().zip(current.iter()).enumerate() {
        let p = v * i;
        match best {
            Some((_, p_best)) if !(p > p_best) => {}
            _ => best = Some((idx, p)),
        }
    }
    match best {
        Some((idx, _)) => Ok((voltage[idx], current[idx])),
        None => Err(ExtractionError::InvalidInput(
            "cannot locate the max power point of an empty IV curve".to_string(),
        )),
    }
}

/// Intercept and (sign flipped) slope of the linear portion of the IV curve.
///
/// The fitted window starts with the points below `vlim * v_oc` and is extended one point at
/// a time until the fitted slope is negative.
pub fn find_beta0_beta1<B: NumericBackend>(
    backend: &B,
    voltage: &[f64],
    current: &[f64],
    vlim: f64,
    v_oc: f64,
) -> Result<(f64, f64), ExtractionError> {
    let first_idx = voltage.partition_point(|v| *v < vlim * v_oc);
    for idx in first_idx..voltage.len() {
        let (slope, intercept) = backend.polyfit_linear(&voltage[..idx], &current[..idx]);
        if slope < 0.0 {
            debug!(
                "linear region: {} points (first candidate {}), slope {:e}, intercept {}",
                idx, first_idx, slope, intercept
            );
            return Ok((intercept, -slope));
        }
    }
    Err(ExtractionError::ExtractionFailed(format!(
        "beta0={}, beta1={}",
        f64::NAN,
        f64::NAN
    )))
}

/// Voltage and current coefficients of the log-linear fit to the exponential portion.
pub fn find_beta3_beta4<B: NumericBackend>(
    backend: &B,
    voltage: &[f64],
    current: &[f64],
    beta0: f64,
    beta1: f64,
    ilim: f64,
    i_sc: f64,
) -> Result<(f64, f64), ExtractionError> {
    // subtract the IV curve from the linear fit and keep the points far from it
    let selected: Vec<(f64, f64, f64)> = voltage
        .iter()
        .zip(current.iter())
        .map(|(v, i)| (*v, *i, beta0 - beta1 * v - i))
        .filter(|(_, _, y)| *y > ilim * i_sc)
        .collect();
    debug!("exponential region: {} points", selected.len());

    let n = selected.len();
    let mut x = DMatrix::<f64>::zeros(n, 3);
    let mut log_y = DVector::<f64>::zeros(n);
    for (row, (v, i, y)) in selected.iter().enumerate() {
        x[(row, 0)] = 1.0;
        x[(row, 1)] = *v;
        x[(row, 2)] = *i;
        log_y[row] = y.ln();
    }
    let coef = backend.lstsq(&x, &log_y);
    let (beta3, beta4) = (coef[1], coef[2]);
    if beta3.is_nan() || beta4.is_nan() {
        return Err(ExtractionError::ExtractionFailed(format!(
            "beta3={}, beta4={}",
            beta3, beta4
        )));
    }
    Ok((beta3, beta4))
}

/// Outcome of combining the two saturation current estimates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SaturationCurrent {
    /// both estimates positive, their mean
    Averaged(f64),
    /// only the estimate at the max power point is positive
    FromMaxPower(f64),
    /// only the estimate at the open circuit point is positive
    FromOpenCircuit(f64),
}

impl SaturationCurrent {
    pub fn value(&self) -> f64 {
        match self {
            SaturationCurrent::Averaged(i0)
            | SaturationCurrent::FromMaxPower(i0)
            | SaturationCurrent::FromOpenCircuit(i0) => *i0,
        }
    }
}

/// Saturation current from one point (V, I) of the curve
pub fn calc_i0(il: f64, i: f64, v: f64, gp: f64, rs: f64, n_ns_vth: f64) -> f64 {
    (il - i - gp * v - gp * rs * i) / ((v + rs * i) / n_ns_vth).exp()
}

pub fn reconcile_saturation_current(
    i0_vmp: f64,
    i0_voc: f64,
) -> Result<SaturationCurrent, ExtractionError> {
    if i0_vmp.is_nan() || i0_voc.is_nan() || (i0_vmp <= 0.0 && i0_voc <= 0.0) {
        return Err(ExtractionError::ExtractionFailed(
            "I0 is undetermined.".to_string(),
        ));
    }
    let i0 = if i0_vmp > 0.0 && i0_voc > 0.0 {
        SaturationCurrent::Averaged(0.5 * (i0_vmp + i0_voc))
    } else if i0_vmp > 0.0 {
        warn!(
            "I0 estimate at open circuit is not positive ({:e}), using the max power estimate",
            i0_voc
        );
        SaturationCurrent::FromMaxPower(i0_vmp)
    } else {
        warn!(
            "I0 estimate at max power is not positive ({:e}), using the open circuit estimate",
            i0_vmp
        );
        SaturationCurrent::FromOpenCircuit(i0_voc)
    };
    Ok(i0)
}

/// Single diode equation parameters from the regression coefficients
#[allow(non_snake_case)]
pub fn calculate_sde_parameters(
    betas: &RegressionCoefficients,
    v_mp_i_mp: (f64, f64),
    v_oc: f64,
) -> Result<SDEParameters, ExtractionError> {
    let RegressionCoefficients {
        beta0,
        beta1,
        beta3,
        beta4,
    } = *betas;
    let (v_mp, i_mp) = v_mp_i_mp;
    let nNsVth = 1.0 / beta3;
    let Rs = beta4 / beta3;
    let Gp = beta1 / (1.0 - Rs * beta1);
    let Rsh = 1.0 / Gp;
    let IL = (1.0 + Gp * Rs) * beta0;

    let I0_vmp = calc_i0(IL, i_mp, v_mp, Gp, Rs, nNsVth);
    let I0_voc = calc_i0(IL, 0.0, v_oc, Gp, Rs, nNsVth);
    let I0 = reconcile_saturation_current(I0_vmp, I0_voc)?;
    debug!(
        "I0 at max power {:e}, at open circuit {:e}, chosen {:?}",
        I0_vmp, I0_voc, I0
    );
    Ok(SDEParameters {
        photocurrent: IL,
        saturation_current: I0.value(),
        resistance_shunt: Rsh,
        resistance_series: Rs,
        nNsVth,
    })
}
