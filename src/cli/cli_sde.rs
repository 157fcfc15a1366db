use super::{prompt, prompt_f64};
use crate::IVtools::iv_types::SDEParameters;
use crate::IVtools::sde_sandia::fit_sde_sandia_with;
use crate::IVtools::single_diode::iv_curve;
use crate::Utils::load_from_file::LoadData;
use crate::settings::ExtractionSettings;

pub fn sde_menu(settings: &ExtractionSettings) {
    loop {
        println!("\n=== Single diode equation from an IV curve ===");
        println!("1. Fit a synthetic curve of known parameters");
        println!("2. Fit a curve from a JSON file");
        println!("0. Back to main menu");
        match prompt("Choose option: ").as_str() {
            "1" => {
                if let Err(e) = run_synthetic(settings) {
                    println!("Error: {}", e);
                }
            }
            "2" => {
                let path = prompt("Path to curve file: ");
                if let Err(e) = fit_curve_file(&path, settings) {
                    println!("Error: {}", e);
                }
            }
            "0" | "" => break,
            _ => println!("Invalid option"),
        }
    }
}

fn run_synthetic(settings: &ExtractionSettings) -> Result<(), String> {
    let truth = SDEParameters {
        photocurrent: prompt_f64("IL [A] (e.g. 8.0): ")?,
        saturation_current: prompt_f64("I0 [A] (e.g. 5e-10): ")?,
        resistance_shunt: prompt_f64("Rsh [Ohm] (e.g. 1000): ")?,
        resistance_series: prompt_f64("Rs [Ohm] (e.g. 0.2): ")?,
        nNsVth: prompt_f64("nNsVth [V] (e.g. 1.5375): ")?,
    };
    let curve = iv_curve(&truth, 300).map_err(|e| e.to_string())?;
    println!("Generated {} points up to Voc = {:.4} V", curve.len(), curve.voltage[curve.len() - 1]);
    let fitted = fit_sde_sandia_with(
        &settings.backend(),
        &curve.voltage,
        &curve.current,
        &settings.sandia_options(),
    )
    .map_err(|e| e.to_string())?;
    println!("\nTrue parameters:");
    truth.pretty_print();
    println!("\nFitted parameters:");
    fitted.pretty_print();
    Ok(())
}

/// Fits the curve stored in `path` and prints the parameters
pub fn fit_curve_file(path: &str, settings: &ExtractionSettings) -> Result<SDEParameters, String> {
    let task = LoadData::new(path.to_string())
        .load_curve()
        .map_err(|e| e.to_string())?;
    let curve = task.curve().map_err(|e| e.to_string())?;
    let options = task.options(settings.vlim, settings.ilim);
    let fitted = fit_sde_sandia_with(&settings.backend(), &curve.voltage, &curve.current, &options)
        .map_err(|e| e.to_string())?;
    fitted.pretty_print();
    Ok(fitted)
}
