//! Value types shared by the extraction procedures.
use super::ivtools_errors::ExtractionError;
use prettytable::{Table, row};
use serde::{Deserialize, Serialize};

/// Sampled current-voltage characteristic at constant irradiance and cell temperature.
///
/// Voltage is expected to increase from 0 to `v_oc` and current to decrease from `i_sc` to 0;
/// monotonicity is the caller's responsibility and is not checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IVCurve {
    pub voltage: Vec<f64>,
    pub current: Vec<f64>,
}

impl IVCurve {
    pub fn new(voltage: Vec<f64>, current: Vec<f64>) -> Result<Self, ExtractionError> {
        let curve = Self { voltage, current };
        curve.validate()?;
        Ok(curve)
    }

    /// checks equal lengths and at least two samples
    pub fn validate(&self) -> Result<(), ExtractionError> {
        validate_arrays(&self.voltage, &self.current)
    }

    pub fn len(&self) -> usize {
        self.voltage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voltage.is_empty()
    }

    /// last voltage sample
    pub fn v_oc(&self) -> Option<f64> {
        self.voltage.last().copied()
    }

    /// first current sample
    pub fn i_sc(&self) -> Option<f64> {
        self.current.first().copied()
    }

    pub fn power(&self) -> Vec<f64> {
        self.voltage
            .iter()
            .zip(self.current.iter())
            .map(|(v, i)| v * i)
            .collect()
    }
}

pub(crate) fn validate_arrays(voltage: &[f64], current: &[f64]) -> Result<(), ExtractionError> {
    if voltage.len() != current.len() {
        return Err(ExtractionError::InvalidInput(format!(
            "voltage and current must have the same length, got {} and {}",
            voltage.len(),
            current.len()
        )));
    }
    if voltage.len() < 2 {
        return Err(ExtractionError::InvalidInput(format!(
            "IV curve needs at least two points, got {}",
            voltage.len()
        )));
    }
    Ok(())
}

/// Regression coefficients of the linear (beta0, beta1) and exponential (beta3, beta4)
/// portions of the IV curve. The constant term beta2 of the exponential fit is not needed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionCoefficients {
    pub beta0: f64,
    pub beta1: f64,
    pub beta3: f64,
    pub beta4: f64,
}

/// The five parameters of the single diode equation
/// ```text
/// I = IL - I0 (exp((V + I Rs) / nNsVth) - 1) - (V + I Rs) / Rsh
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct SDEParameters {
    /// photocurrent [A]
    pub photocurrent: f64,
    /// dark (saturation) current [A]
    pub saturation_current: f64,
    /// shunt resistance [Ohm]
    pub resistance_shunt: f64,
    /// series resistance [Ohm]
    pub resistance_series: f64,
    /// ideality factor x cells in series x thermal voltage [V]
    pub nNsVth: f64,
}

impl SDEParameters {
    /// `(photocurrent, saturation_current, resistance_shunt, resistance_series, nNsVth)`
    pub fn to_tuple(&self) -> (f64, f64, f64, f64, f64) {
        (
            self.photocurrent,
            self.saturation_current,
            self.resistance_shunt,
            self.resistance_series,
            self.nNsVth,
        )
    }

    pub fn is_finite(&self) -> bool {
        let (a, b, c, d, e) = self.to_tuple();
        [a, b, c, d, e].iter().all(|x| x.is_finite())
    }

    pub fn pretty_print(&self) {
        let mut table = Table::new();
        table.add_row(row!["Parameter", "Value", "Unit"]);
        table.add_row(row!["photocurrent IL", format!("{:.6}", self.photocurrent), "A"]);
        table.add_row(row![
            "saturation current I0",
            format!("{:.6e}", self.saturation_current),
            "A"
        ]);
        table.add_row(row![
            "shunt resistance Rsh",
            format!("{:.4}", self.resistance_shunt),
            "Ohm"
        ]);
        table.add_row(row![
            "series resistance Rs",
            format!("{:.6}", self.resistance_series),
            "Ohm"
        ]);
        table.add_row(row!["nNsVth", format!("{:.6}", self.nNsVth), "V"]);
        table.printstd();
    }
}

/// Datasheet values of a module at one reference operating condition.
/// Temperature coefficients are given in %/K.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatasheetSpecs {
    pub v_mp: f64,
    pub i_mp: f64,
    pub v_oc: f64,
    pub i_sc: f64,
    /// temperature coefficient of short-circuit current [%/K]
    pub alpha_sc: f64,
    /// temperature coefficient of open-circuit voltage [%/K]
    pub beta_voc: f64,
    pub cells_in_series: u32,
}

impl DatasheetSpecs {
    pub fn validate(&self) -> Result<(), ExtractionError> {
        let positive = [
            ("v_mp", self.v_mp),
            ("i_mp", self.i_mp),
            ("v_oc", self.v_oc),
            ("i_sc", self.i_sc),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ExtractionError::InvalidInput(format!(
                    "{} must be a positive finite number, got {}",
                    name, value
                )));
            }
        }
        if !self.alpha_sc.is_finite() || !self.beta_voc.is_finite() {
            return Err(ExtractionError::InvalidInput(
                "temperature coefficients must be finite".to_string(),
            ));
        }
        if self.cells_in_series == 0 {
            return Err(ExtractionError::InvalidInput(
                "cells_in_series must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parameters of the De Soto single diode model at reference conditions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct SDMParameters {
    /// light-generated current [A]
    pub I_L_ref: f64,
    /// diode saturation current [A]
    pub I_o_ref: f64,
    /// modified ideality factor nNsVth [V]
    pub a_ref: f64,
    /// shunt resistance [Ohm]
    pub R_sh_ref: f64,
    /// series resistance [Ohm], assumed independent of operating conditions
    pub R_s: f64,
    /// temperature coefficient of short-circuit current [A/K]
    pub alpha_sc: f64,
    /// bandgap energy [J]
    pub EgRef: f64,
    /// bandgap temperature derivative [1/K]
    pub dEgdT: f64,
    /// reference irradiance [W/m2]
    pub irrad_ref: f64,
    /// reference temperature [C]
    pub temp_ref: f64,
}

impl SDMParameters {
    /// single diode equation parameters at the reference conditions
    pub fn to_sde(&self) -> SDEParameters {
        SDEParameters {
            photocurrent: self.I_L_ref,
            saturation_current: self.I_o_ref,
            resistance_shunt: self.R_sh_ref,
            resistance_series: self.R_s,
            nNsVth: self.a_ref,
        }
    }

    pub fn pretty_print(&self) {
        let mut table = Table::new();
        table.add_row(row!["Parameter", "Value", "Unit"]);
        table.add_row(row!["I_L_ref", format!("{:.6}", self.I_L_ref), "A"]);
        table.add_row(row!["I_o_ref", format!("{:.6e}", self.I_o_ref), "A"]);
        table.add_row(row!["a_ref", format!("{:.6}", self.a_ref), "V"]);
        table.add_row(row!["R_sh_ref", format!("{:.4}", self.R_sh_ref), "Ohm"]);
        table.add_row(row!["R_s", format!("{:.6}", self.R_s), "Ohm"]);
        table.add_row(row!["alpha_sc", format!("{:.6e}", self.alpha_sc), "A/K"]);
        table.add_row(row!["EgRef", format!("{:.4e}", self.EgRef), "J"]);
        table.add_row(row!["dEgdT", format!("{:.4e}", self.dEgdT), "1/K"]);
        table.add_row(row!["irrad_ref", format!("{}", self.irrad_ref), "W/m2"]);
        table.add_row(row!["temp_ref", format!("{}", self.temp_ref), "C"]);
        table.printstd();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_iv_curve_validation() {
        assert!(IVCurve::new(vec![0.0, 1.0], vec![1.0, 0.0]).is_ok());
        let err = IVCurve::new(vec![0.0, 1.0, 2.0], vec![1.0, 0.0]).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidInput(_)));
        let err = IVCurve::new(vec![], vec![]).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidInput(_)));
    }

    #[test]
    fn test_iv_curve_helpers() {
        let curve = IVCurve::new(vec![0.0, 1.0, 2.0], vec![3.0, 2.5, 0.0]).unwrap();
        assert_eq!(curve.len(), 3);
        assert_eq!(curve.v_oc(), Some(2.0));
        assert_eq!(curve.i_sc(), Some(3.0));
        assert_eq!(curve.power(), vec![0.0, 2.5, 0.0]);
    }

    #[test]
    fn test_specs_validation() {
        let mut specs = DatasheetSpecs {
            v_mp: 31.0,
            i_mp: 7.61,
            v_oc: 37.9,
            i_sc: 8.09,
            alpha_sc: 0.004,
            beta_voc: -0.127,
            cells_in_series: 60,
        };
        assert!(specs.validate().is_ok());
        specs.i_sc = f64::NAN;
        assert!(specs.validate().is_err());
        specs.i_sc = 8.09;
        specs.cells_in_series = 0;
        assert!(specs.validate().is_err());
    }

    #[test]
    fn test_sdm_parameters_serde_keys() {
        let p = SDMParameters {
            I_L_ref: 8.1,
            I_o_ref: 1e-10,
            a_ref: 1.6,
            R_sh_ref: 300.0,
            R_s: 0.3,
            alpha_sc: 3.2e-4,
            EgRef: 1.796e-19,
            dEgdT: -0.0002677,
            irrad_ref: 1000.0,
            temp_ref: 25.0,
        };
        let value = serde_json::to_value(p).unwrap();
        assert_eq!(value["I_L_ref"], json!(8.1));
        assert_eq!(value["R_sh_ref"], json!(300.0));
        assert_eq!(value["EgRef"], json!(1.796e-19));
        let sde = p.to_sde();
        assert_eq!(sde.to_tuple(), (8.1, 1e-10, 300.0, 0.3, 1.6));
    }
}
