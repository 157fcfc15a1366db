//! # De Soto single diode model from datasheet values
//!
//! ## Aim
//! Calculates the five single diode parameters at reference conditions from the values found
//! on a module datasheet (W. De Soto et al., "Improvement and validation of a model for
//! photovoltaic array performance", Solar Energy 80, 2006). The result, together with the
//! bandgap constants, describes the module at any irradiance and cell temperature.
//!
//! ## Equations
//! Unknowns `[IL, I0, a, Rsh, Rs]`, five residuals that vanish simultaneously:
//! 1. short circuit: `Isc - IL + I0 (exp(Isc Rs/a) - 1) + Isc Rs/Rsh`
//! 2. open circuit at Tref: `-IL + I0 (exp(Voc/a) - 1) + Voc/Rsh`
//! 3. max power point: `Imp - IL + I0 exp((Vmp + Imp Rs)/a) + (Vmp + Imp Rs)/Rsh`
//! 4. dP/dV = 0 at the max power point, in the form of eq. 23.2.6 of Duffie & Beckman
//!    (eq. 6 of De Soto et al. is not used):
//!    `Imp - Vmp ((I0/a) exp((Vmp + Imp Rs)/a) + 1/Rsh) / (1 + (I0 Rs/a) exp((Vmp + Imp Rs)/a) + Rs/Rsh)`
//! 5. open circuit at `T2 = Tref + 2 K`, with IL, I0, a and Voc projected to T2
//!
//! ## Usage
//! ```rust
//! use PVfit::IVtools::iv_types::DatasheetSpecs;
//! use PVfit::IVtools::sdm_desoto::fit_sdm_desoto;
//! let specs = DatasheetSpecs {
//!     v_mp: 31.0, i_mp: 7.61, v_oc: 37.9, i_sc: 8.09,
//!     alpha_sc: 0.004, beta_voc: -0.127, cells_in_series: 60,
//! };
//! let sdm = fit_sdm_desoto("monoSi", &specs, 25.0, 1000.0).unwrap();
//! assert!((sdm.I_L_ref / 8.09 - 1.0).abs() < 0.01);
//! ```
use super::iv_types::{DatasheetSpecs, SDMParameters};
use super::ivtools_errors::ExtractionError;
use super::temperature_model::{
    AbsoluteCoefficients, Bandgap, InitialGuess, bandgap_for, celsius_to_kelvin,
    project_to_temperature,
};
use crate::Numerics::{NalgebraBackend, NumericBackend};
use log::info;
use nalgebra::DVector;

/// temperature step of the fifth equation [K]
pub const DELTA_T: f64 = 2.0;

/// The five-equation system for one module at one reference temperature
#[derive(Debug, Clone, Copy)]
pub struct DeSotoSystem {
    pub specs: DatasheetSpecs,
    /// temperature coefficients in A/K and V/K
    pub coefs: AbsoluteCoefficients,
    pub bandgap: Bandgap,
    /// reference temperature [K]
    pub t_ref: f64,
}

impl DeSotoSystem {
    /// `temp_ref` in Celsius
    pub fn new(specs: DatasheetSpecs, bandgap: Bandgap, temp_ref: f64) -> Self {
        Self {
            specs,
            coefs: AbsoluteCoefficients::from_specs(&specs),
            bandgap,
            t_ref: celsius_to_kelvin(temp_ref),
        }
    }

    pub fn initial_guess(&self) -> InitialGuess {
        InitialGuess::from_specs(&self.specs, self.t_ref)
    }

    /// Residual vector at `params = [IL, I0, a, Rsh, Rs]`
    #[allow(non_snake_case)]
    pub fn residuals(&self, params: &DVector<f64>) -> DVector<f64> {
        let (IL, Io, a, Rsh, Rs) = (params[0], params[1], params[2], params[3], params[4]);
        let DatasheetSpecs {
            v_mp: Vmp,
            i_mp: Imp,
            v_oc: Voc,
            i_sc: Isc,
            ..
        } = self.specs;

        let mut y = DVector::zeros(5);
        y[0] = Isc - IL + Io * (Isc * Rs / a).exp_m1() + Isc * Rs / Rsh;
        y[1] = -IL + Io * (Voc / a).exp_m1() + Voc / Rsh;
        let e_mp = ((Vmp + Imp * Rs) / a).exp();
        y[2] = Imp - IL + Io * e_mp + (Vmp + Imp * Rs) / Rsh;
        y[3] = Imp
            - Vmp * ((Io / a) * e_mp + 1.0 / Rsh) / (1.0 + (Io * Rs / a) * e_mp + Rs / Rsh);
        let T2 = self.t_ref + DELTA_T;
        let s2 = project_to_temperature(
            IL,
            Io,
            a,
            Voc,
            &self.coefs,
            &self.bandgap,
            self.t_ref,
            T2,
        );
        y[4] = -s2.IL + s2.I0 * (s2.Voc / s2.a).exp_m1() + s2.Voc / Rsh;
        y
    }
}

/// De Soto parameters with the default numeric backend.
///
/// `celltype` is case insensitive; silicon types ("monoSi", "polySi", "multiSi",
/// "mono-c-Si", "multi-c-Si") are supported. `temp_ref` in C, `irrad_ref` in W/m2.
pub fn fit_sdm_desoto(
    celltype: &str,
    specs: &DatasheetSpecs,
    temp_ref: f64,
    irrad_ref: f64,
) -> Result<SDMParameters, ExtractionError> {
    fit_sdm_desoto_with(&NalgebraBackend::new(), celltype, specs, temp_ref, irrad_ref)
}

pub fn fit_sdm_desoto_with<B: NumericBackend>(
    backend: &B,
    celltype: &str,
    specs: &DatasheetSpecs,
    temp_ref: f64,
    irrad_ref: f64,
) -> Result<SDMParameters, ExtractionError> {
    let bandgap = bandgap_for(celltype)?;
    specs.validate()?;
    let system = DeSotoSystem::new(*specs, bandgap, temp_ref);
    let x0 = DVector::from_vec(system.initial_guess().to_vec());
    let result = backend.root(&|p: &DVector<f64>| system.residuals(p), &x0);
    if !result.success {
        return Err(ExtractionError::SolverDidNotConverge {
            status: result.status,
            n_fev: result.n_fev,
            residual_norm: result.residual_norm,
        });
    }
    let x = result.x;
    let sdm = SDMParameters {
        I_L_ref: x[0],
        I_o_ref: x[1],
        a_ref: x[2],
        R_sh_ref: x[3],
        R_s: x[4],
        alpha_sc: system.coefs.alpha_sc,
        EgRef: bandgap.EgRef,
        dEgdT: bandgap.dEgdT,
        irrad_ref,
        temp_ref,
    };
    info!(
        "De Soto parameters for {} after {} evaluations: {:?}",
        celltype, result.n_fev, sdm
    );
    Ok(sdm)
}
