use super::cli_desoto::fit_datasheet_file;
use super::cli_sde::fit_curve_file;
use crate::Examples::pv_examples::pv_examples;
use crate::settings::ExtractionSettings;
use std::error::Error;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// no task given: interactive menu
    Interactive,
    Sde(String),
    Desoto(String),
    Example(usize),
    Help,
}

/// Command and optional config file from the process arguments (program name excluded)
pub fn parse_args(args: &[String]) -> Result<(CliCommand, Option<PathBuf>), String> {
    let mut config = None;
    let mut positional = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => match iter.next() {
                Some(path) => config = Some(PathBuf::from(path)),
                None => return Err("--config needs a path".to_string()),
            },
            "--help" | "-h" => return Ok((CliCommand::Help, config)),
            _ => positional.push(arg.as_str()),
        }
    }
    let command = match positional.as_slice() {
        [] => CliCommand::Interactive,
        ["sde", path] => CliCommand::Sde(path.to_string()),
        ["desoto", path] => CliCommand::Desoto(path.to_string()),
        ["example", n] => CliCommand::Example(
            n.parse::<usize>()
                .map_err(|_| format!("example number expected, got '{}'", n))?,
        ),
        ["help"] => CliCommand::Help,
        other => return Err(format!("unrecognized arguments: {}", other.join(" "))),
    };
    Ok((command, config))
}

pub fn usage() -> &'static str {
    "Usage:
  PVfit                          interactive menu
  PVfit sde <curve.json>         fit the single diode equation to an IV curve
  PVfit desoto <specs.json>      De Soto model from datasheet values
  PVfit example <n>              run example n (0..3)
Options:
  -c, --config <path>            settings file (default pvfit_config.json if present)"
}

pub fn run_task(command: &CliCommand, settings: &ExtractionSettings) -> Result<(), Box<dyn Error>> {
    match command {
        CliCommand::Sde(path) => {
            fit_curve_file(path, settings)?;
        }
        CliCommand::Desoto(path) => {
            fit_datasheet_file(path, settings)?;
        }
        CliCommand::Example(n) => pv_examples(*n)?,
        CliCommand::Help => println!("{}", usage()),
        CliCommand::Interactive => super::cli_main::run_interactive_menu(settings),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IVtools::iv_types::SDEParameters;
    use crate::IVtools::single_diode::iv_curve;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(parse_args(&args(&[])).unwrap(), (CliCommand::Interactive, None));
        assert_eq!(
            parse_args(&args(&["sde", "curve.json"])).unwrap().0,
            CliCommand::Sde("curve.json".to_string())
        );
        let (command, config) =
            parse_args(&args(&["--config", "my.json", "desoto", "specs.json"])).unwrap();
        assert_eq!(command, CliCommand::Desoto("specs.json".to_string()));
        assert_eq!(config, Some(PathBuf::from("my.json")));
        assert_eq!(parse_args(&args(&["example", "2"])).unwrap().0, CliCommand::Example(2));
        assert_eq!(parse_args(&args(&["-h"])).unwrap().0, CliCommand::Help);
        assert!(parse_args(&args(&["example", "two"])).is_err());
        assert!(parse_args(&args(&["sde"])).is_err());
        assert!(parse_args(&args(&["desoto", "specs.json", "--config"])).is_err());
    }

    #[test]
    fn test_run_sde_task_from_file() {
        let truth = SDEParameters {
            photocurrent: 8.0,
            saturation_current: 5e-10,
            resistance_shunt: 1000.0,
            resistance_series: 0.2,
            nNsVth: 61.5 * 0.025,
        };
        let curve = iv_curve(&truth, 300).unwrap();
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            json!({ "voltage": curve.voltage, "current": curve.current })
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let fitted = fit_curve_file(&path, &ExtractionSettings::default()).unwrap();
        assert!((fitted.photocurrent - 8.0).abs() / 8.0 < 0.01);
        assert!(run_task(&CliCommand::Sde(path), &ExtractionSettings::default()).is_ok());
    }

    #[test]
    fn test_run_desoto_task_errors() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            json!({ "celltype": "cdte", "v_mp": 31.0, "i_mp": 7.61, "v_oc": 37.9, "i_sc": 8.09,
                    "alpha_sc": 0.004, "beta_voc": -0.127, "cells_in_series": 60 })
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let settings = ExtractionSettings::default();
        assert!(run_task(&CliCommand::Desoto(path), &settings).is_err());
        assert!(run_task(&CliCommand::Desoto("no_such_file.json".to_string()), &settings).is_err());
        assert!(run_task(&CliCommand::Example(9), &settings).is_err());
    }
}
