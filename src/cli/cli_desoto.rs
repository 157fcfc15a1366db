use super::{prompt, prompt_f64};
use crate::IVtools::iv_types::{DatasheetSpecs, SDMParameters};
use crate::IVtools::sdm_desoto::fit_sdm_desoto_with;
use crate::Utils::load_from_file::LoadData;
use crate::settings::ExtractionSettings;

pub fn desoto_menu(settings: &ExtractionSettings) {
    loop {
        println!("\n=== De Soto single diode model from datasheet ===");
        println!("1. Enter datasheet values");
        println!("2. Load datasheet values from a JSON file");
        println!("0. Back to main menu");
        match prompt("Choose option: ").as_str() {
            "1" => {
                if let Err(e) = run_typed(settings) {
                    println!("Error: {}", e);
                }
            }
            "2" => {
                let path = prompt("Path to datasheet file: ");
                if let Err(e) = fit_datasheet_file(&path, settings) {
                    println!("Error: {}", e);
                }
            }
            "0" | "" => break,
            _ => println!("Invalid option"),
        }
    }
}

fn run_typed(settings: &ExtractionSettings) -> Result<(), String> {
    let celltype = prompt("Cell type (monoSi, polySi, multiSi): ");
    let specs = DatasheetSpecs {
        v_mp: prompt_f64("Vmp [V]: ")?,
        i_mp: prompt_f64("Imp [A]: ")?,
        v_oc: prompt_f64("Voc [V]: ")?,
        i_sc: prompt_f64("Isc [A]: ")?,
        alpha_sc: prompt_f64("alpha_sc [%/K]: ")?,
        beta_voc: prompt_f64("beta_voc [%/K]: ")?,
        cells_in_series: prompt("Cells in series: ")
            .parse::<u32>()
            .map_err(|e| format!("cells in series: {}", e))?,
    };
    let sdm = fit_sdm_desoto_with(
        &settings.backend(),
        &celltype,
        &specs,
        settings.temp_ref,
        settings.irrad_ref,
    )
    .map_err(|e| e.to_string())?;
    sdm.pretty_print();
    Ok(())
}

/// Fits the datasheet stored in `path` and prints the parameters
pub fn fit_datasheet_file(
    path: &str,
    settings: &ExtractionSettings,
) -> Result<SDMParameters, String> {
    let task = LoadData::new(path.to_string())
        .load_datasheet()
        .map_err(|e| e.to_string())?;
    let sdm = fit_sdm_desoto_with(
        &settings.backend(),
        &task.celltype,
        &task.specs,
        task.temp_ref.unwrap_or(settings.temp_ref),
        task.irrad_ref.unwrap_or(settings.irrad_ref),
    )
    .map_err(|e| e.to_string())?;
    sdm.pretty_print();
    Ok(sdm)
}
