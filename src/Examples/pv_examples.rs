use crate::IVtools::iv_types::{DatasheetSpecs, SDEParameters};
use crate::IVtools::ivtools_errors::ExtractionError;

fn demo_module() -> SDEParameters {
    SDEParameters {
        photocurrent: 8.0,
        saturation_current: 5e-10,
        resistance_shunt: 1000.0,
        resistance_series: 0.2,
        nNsVth: 61.5 * 0.025,
    }
}

fn demo_datasheet() -> DatasheetSpecs {
    DatasheetSpecs {
        v_mp: 31.0,
        i_mp: 8.71,
        v_oc: 38.3,
        i_sc: 9.43,
        alpha_sc: 0.06,
        beta_voc: -0.36,
        cells_in_series: 60,
    }
}

pub fn pv_examples(task: usize) -> Result<(), ExtractionError> {
    match task {
        0 => {
            // IV CURVE ROUND TRIP: synthetic curve from known parameters, then Sandia fit
            use crate::IVtools::sde_sandia::{SandiaOptions, fit_sde_sandia};
            use crate::IVtools::single_diode::{iv_curve, max_power_point};
            let truth = demo_module();
            let curve = iv_curve(&truth, 300)?;
            let (v_mp, i_mp, p_mp) = max_power_point(&truth)?;
            println!("Vmp = {:.4} V, Imp = {:.4} A, Pmp = {:.3} W", v_mp, i_mp, p_mp);
            let fitted = fit_sde_sandia(&curve.voltage, &curve.current, &SandiaOptions::default())?;
            println!("True parameters:");
            truth.pretty_print();
            println!("Fitted parameters:");
            fitted.pretty_print();
        }
        1 => {
            // DE SOTO MODEL of a 60 cell silicon module, then the IV curve at reference conditions
            use crate::IVtools::sdm_desoto::fit_sdm_desoto;
            use crate::IVtools::single_diode::{max_power_point, v_oc};
            let specs = demo_datasheet();
            let sdm = fit_sdm_desoto("monoSi", &specs, 25.0, 1000.0)?;
            sdm.pretty_print();
            let sde = sdm.to_sde();
            let voc = v_oc(&sde)?;
            let (v_mp, i_mp, _) = max_power_point(&sde)?;
            println!(
                "model: Voc = {:.3} V (datasheet {}), Vmp = {:.3} V (datasheet {}), Imp = {:.3} A (datasheet {})",
                voc, specs.v_oc, v_mp, specs.v_mp, i_mp, specs.i_mp
            );
        }
        2 => {
            // UNSUPPORTED TECHNOLOGY: thin film types have no bandgap data
            use crate::IVtools::sdm_desoto::fit_sdm_desoto;
            for celltype in ["CIGS", "cdte", "perovskite"] {
                match fit_sdm_desoto(celltype, &demo_datasheet(), 25.0, 1000.0) {
                    Ok(sdm) => {
                        return Err(ExtractionError::InvalidInput(format!(
                            "{} has no bandgap model but was fitted: {:?}",
                            celltype, sdm
                        )));
                    }
                    Err(e) => println!("{}: {}", celltype, e),
                }
            }
        }
        3 => {
            // SEGMENTATION SWEEP: sensitivity of the fit to the voltage fraction of the linear segment
            use crate::IVtools::sde_sandia::{SandiaOptions, fit_sde_sandia};
            use crate::IVtools::single_diode::iv_curve;
            use prettytable::{Table, row};
            let truth = demo_module();
            let curve = iv_curve(&truth, 300)?;
            let mut table = Table::new();
            table.add_row(row!["vlim", "IL, A", "I0, A", "Rsh, Ohm", "Rs, Ohm", "nNsVth, V"]);
            for vlim in [0.05, 0.1, 0.2, 0.3, 0.4] {
                let options = SandiaOptions {
                    vlim,
                    ..SandiaOptions::default()
                };
                match fit_sde_sandia(&curve.voltage, &curve.current, &options) {
                    Ok(p) => {
                        table.add_row(row![
                            vlim,
                            format!("{:.4}", p.photocurrent),
                            format!("{:.3e}", p.saturation_current),
                            format!("{:.1}", p.resistance_shunt),
                            format!("{:.4}", p.resistance_series),
                            format!("{:.4}", p.nNsVth)
                        ]);
                    }
                    Err(e) => {
                        table.add_row(row![vlim, e.to_string(), "", "", "", ""]);
                    }
                }
            }
            table.printstd();
        }
        _ => {
            return Err(ExtractionError::InvalidInput(format!(
                "no example with number {}",
                task
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_and_datasheet_examples_succeed() {
        for task in 0..4 {
            assert!(pv_examples(task).is_ok(), "example {} failed", task);
        }
    }

    #[test]
    fn test_unknown_example_is_an_error() {
        assert!(matches!(pv_examples(4), Err(ExtractionError::InvalidInput(_))));
    }

    #[test]
    fn test_demo_datasheet_matches_absolute_coefficients() {
        use crate::IVtools::temperature_model::AbsoluteCoefficients;
        let coefs = AbsoluteCoefficients::from_specs(&demo_datasheet());
        assert!((coefs.alpha_sc - 0.005658).abs() < 1e-12);
        assert!((coefs.beta_voc + 0.13788).abs() < 1e-12);
    }
}
