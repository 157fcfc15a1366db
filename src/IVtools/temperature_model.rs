//! # Temperature model of the De Soto single diode model
//!
//! Bandgap constants per cell technology, conversion of datasheet temperature coefficients
//! from %/K to absolute units, projection of the reference parameters to another cell
//! temperature, and the initial guess of the five unknowns (Duffie & Beckman, Solar
//! Engineering of Thermal Processes, 2013, p. 753).
use super::iv_types::DatasheetSpecs;
use super::ivtools_errors::ExtractionError;
use log::debug;
use std::fmt;
use std::str::FromStr;

/// Boltzmann constant [J/K]
pub const BOLTZMANN: f64 = 1.380649e-23;
/// elementary charge [C]
pub const ELEMENTARY_CHARGE: f64 = 1.602176634e-19;
pub const ZERO_CELSIUS: f64 = 273.15;

/// Cell technologies named on PV module datasheets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellTechnology {
    MonoSi,
    PolySi,
    MultiSi,
    CIS,
    CIGS,
    CdTe,
    Amorphous,
    ThinFilm,
}

impl FromStr for CellTechnology {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monosi" | "mono-c-si" => Ok(CellTechnology::MonoSi),
            "polysi" => Ok(CellTechnology::PolySi),
            "multisi" | "multi-c-si" => Ok(CellTechnology::MultiSi),
            "cis" => Ok(CellTechnology::CIS),
            "cigs" => Ok(CellTechnology::CIGS),
            "cdte" => Ok(CellTechnology::CdTe),
            "amorphous" => Ok(CellTechnology::Amorphous),
            "thin film" | "thin-film" => Ok(CellTechnology::ThinFilm),
            _ => Err(ExtractionError::UnknownTechnology(s.to_string())),
        }
    }
}

impl fmt::Display for CellTechnology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CellTechnology::MonoSi => "monoSi",
            CellTechnology::PolySi => "polySi",
            CellTechnology::MultiSi => "multiSi",
            CellTechnology::CIS => "cis",
            CellTechnology::CIGS => "cigs",
            CellTechnology::CdTe => "cdte",
            CellTechnology::Amorphous => "amorphous",
            CellTechnology::ThinFilm => "thin film",
        };
        write!(f, "{}", name)
    }
}

/// Bandgap energy at reference temperature and its relative temperature derivative
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(non_snake_case)]
pub struct Bandgap {
    /// [J]
    pub EgRef: f64,
    /// [1/K], `Eg(T) = EgRef (1 + dEgdT (T - Tref))`
    pub dEgdT: f64,
}

impl CellTechnology {
    pub fn is_silicon(&self) -> bool {
        matches!(
            self,
            CellTechnology::MonoSi | CellTechnology::PolySi | CellTechnology::MultiSi
        )
    }

    pub fn bandgap(&self) -> Result<Bandgap, ExtractionError> {
        if self.is_silicon() {
            Ok(Bandgap {
                EgRef: 1.796e-19,
                dEgdT: -0.0002677,
            })
        } else {
            Err(ExtractionError::UnsupportedTechnology(self.to_string()))
        }
    }
}

/// Bandgap constants for a case-insensitive technology name
pub fn bandgap_for(celltype: &str) -> Result<Bandgap, ExtractionError> {
    celltype.parse::<CellTechnology>()?.bandgap()
}

/// %/K to absolute units per K of `reference`
pub fn percent_to_absolute(coefficient_percent: f64, reference: f64) -> f64 {
    coefficient_percent * reference / 100.0
}

pub fn celsius_to_kelvin(t: f64) -> f64 {
    t + ZERO_CELSIUS
}

/// Datasheet temperature coefficients in absolute units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsoluteCoefficients {
    /// [A/K]
    pub alpha_sc: f64,
    /// [V/K]
    pub beta_voc: f64,
}

impl AbsoluteCoefficients {
    pub fn from_specs(specs: &DatasheetSpecs) -> Self {
        Self {
            alpha_sc: percent_to_absolute(specs.alpha_sc, specs.i_sc),
            beta_voc: percent_to_absolute(specs.beta_voc, specs.v_oc),
        }
    }
}

/// Reference parameters and open circuit voltage carried to cell temperature `t2`
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(non_snake_case)]
pub struct ProjectedState {
    pub IL: f64,
    pub I0: f64,
    pub a: f64,
    pub Voc: f64,
}

/// Projection of the reference state (temperature `t_ref` in K) to temperature `t2` in K
/// with the De Soto relations for a, IL, Eg, I0 and a linear Voc coefficient.
#[allow(non_snake_case)]
pub fn project_to_temperature(
    il: f64,
    i0: f64,
    a: f64,
    v_oc: f64,
    coefs: &AbsoluteCoefficients,
    bandgap: &Bandgap,
    t_ref: f64,
    t2: f64,
) -> ProjectedState {
    let dT = t2 - t_ref;
    let Eg2 = bandgap.EgRef * (1.0 + bandgap.dEgdT * dT);
    ProjectedState {
        IL: il + coefs.alpha_sc * dT,
        I0: i0
            * (t2 / t_ref).powi(3)
            * (1.0 / BOLTZMANN * (bandgap.EgRef / t_ref - Eg2 / t2)).exp(),
        a: a * t2 / t_ref,
        Voc: v_oc + dT * coefs.beta_voc,
    }
}

/// Starting point `[IL, I0, a, Rsh, Rs]` of the nonlinear solve
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(non_snake_case)]
pub struct InitialGuess {
    pub IL: f64,
    pub I0: f64,
    pub a: f64,
    pub Rsh: f64,
    pub Rs: f64,
}

impl InitialGuess {
    /// `t_ref` in K
    #[allow(non_snake_case)]
    pub fn from_specs(specs: &DatasheetSpecs, t_ref: f64) -> Self {
        let Rsh = 100.0;
        let a = 1.5 * BOLTZMANN * t_ref * specs.cells_in_series as f64 / ELEMENTARY_CHARGE;
        let IL = specs.i_sc;
        let I0 = specs.i_sc * (-specs.v_oc / a).exp();
        let Rs = (a * ((IL - specs.i_mp) / I0).ln_1p() - specs.v_mp) / specs.i_mp;
        let guess = Self { IL, I0, a, Rsh, Rs };
        debug!("initial guess {:?}", guess);
        guess
    }

    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.IL, self.I0, self.a, self.Rsh, self.Rs]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn specs() -> DatasheetSpecs {
        DatasheetSpecs {
            v_mp: 31.0,
            i_mp: 7.61,
            v_oc: 37.9,
            i_sc: 8.09,
            alpha_sc: 0.004,
            beta_voc: -0.127,
            cells_in_series: 60,
        }
    }

    #[test]
    fn test_cell_technology_lookup() {
        for name in ["monoSi", "POLYSI", " multisi ", "mono-c-si", "Multi-c-Si"] {
            let bg = bandgap_for(name).unwrap();
            assert_eq!(bg.EgRef, 1.796e-19);
            assert_eq!(bg.dEgdT, -0.0002677);
        }
        for name in ["cis", "CIGS", "cdte", "amorphous", "thin film", "thin-film"] {
            assert!(matches!(
                bandgap_for(name),
                Err(ExtractionError::UnsupportedTechnology(_))
            ));
        }
        assert!(matches!(
            bandgap_for("foobar"),
            Err(ExtractionError::UnknownTechnology(_))
        ));
        assert!(matches!(
            bandgap_for("gaas"),
            Err(ExtractionError::UnknownTechnology(_))
        ));
    }

    #[test]
    fn test_percent_conversion() {
        let c = AbsoluteCoefficients::from_specs(&specs());
        assert_relative_eq!(c.alpha_sc, 0.004 * 8.09 / 100.0, epsilon = 1e-15);
        assert_relative_eq!(c.beta_voc, -0.127 * 37.9 / 100.0, epsilon = 1e-15);
        assert_relative_eq!(celsius_to_kelvin(25.0), 298.15);
    }

    #[test]
    fn test_initial_guess() {
        let t_ref = celsius_to_kelvin(25.0);
        let g = InitialGuess::from_specs(&specs(), t_ref);
        // 1.5 * 60 * kT/q at 298.15 K
        assert_relative_eq!(g.a, 2.3124, max_relative = 1e-3);
        assert_eq!(g.IL, 8.09);
        assert_eq!(g.Rsh, 100.0);
        assert_relative_eq!(g.I0, 8.09 * (-37.9 / g.a).exp(), max_relative = 1e-12);
        // Rs reproduces Imp through the ideal diode at Vmp
        let lhs = g.a * ((g.IL - 7.61) / g.I0).ln_1p();
        assert_relative_eq!(lhs, 31.0 + 7.61 * g.Rs, max_relative = 1e-12);
        assert_eq!(g.to_vec().len(), 5);
    }

    #[test]
    fn test_projection_zero_delta_is_identity() {
        let coefs = AbsoluteCoefficients::from_specs(&specs());
        let bg = bandgap_for("monosi").unwrap();
        let s = project_to_temperature(8.1, 1e-10, 1.6, 37.9, &coefs, &bg, 298.15, 298.15);
        assert_relative_eq!(s.IL, 8.1);
        assert_relative_eq!(s.I0, 1e-10, max_relative = 1e-12);
        assert_relative_eq!(s.a, 1.6);
        assert_relative_eq!(s.Voc, 37.9);
    }

    #[test]
    fn test_projection_two_kelvin() {
        let coefs = AbsoluteCoefficients::from_specs(&specs());
        let bg = bandgap_for("monosi").unwrap();
        let s = project_to_temperature(8.1, 1e-10, 1.6, 37.9, &coefs, &bg, 298.15, 300.15);
        assert_relative_eq!(s.Voc, 37.9 + 2.0 * coefs.beta_voc, epsilon = 1e-12);
        assert_relative_eq!(s.IL, 8.1 + 2.0 * coefs.alpha_sc, epsilon = 1e-12);
        assert_relative_eq!(s.a, 1.6 * 300.15 / 298.15, epsilon = 1e-12);
        // saturation current grows quickly with temperature
        assert!(s.I0 > 1.2e-10);
    }
}
