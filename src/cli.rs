/// fit of single diode model parameters from datasheet values
pub mod cli_desoto;
pub mod cli_examples;
pub mod cli_main;
/// fit of the single diode equation to IV curves
pub mod cli_sde;
/// non-interactive runs from the command line
pub mod cli_task;

use std::io::{self, Write};

pub(crate) fn get_user_input() -> String {
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return String::new();
    }
    input
}

pub(crate) fn prompt(message: &str) -> String {
    print!("\x1b[36m{}\x1b[0m", message);
    let _ = io::stdout().flush();
    get_user_input().trim().to_string()
}

pub(crate) fn prompt_f64(message: &str) -> Result<f64, String> {
    let input = prompt(message);
    input
        .parse::<f64>()
        .map_err(|_| format!("'{}' is not a number", input))
}
