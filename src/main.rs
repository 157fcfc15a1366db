use PVfit::Utils::logger::init_logger;
use PVfit::cli::cli_task::{parse_args, run_task, usage};
use PVfit::settings::ExtractionSettings;
use std::process::ExitCode;

pub fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, config) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{}\n{}", e, usage());
            return ExitCode::FAILURE;
        }
    };
    let settings = match ExtractionSettings::load_or_default(config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Ok(level) = settings.level_filter() {
        init_logger(level);
    }
    match run_task(&command, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
