use super::cli_desoto::desoto_menu;
use super::cli_examples::examples_menu;
use super::cli_sde::sde_menu;
use super::get_user_input;
use crate::settings::ExtractionSettings;
use std::io::{self, Write};

pub fn run_interactive_menu(settings: &ExtractionSettings) {
    loop {
        show_main_menu();
        let choice = get_user_input();

        match choice.trim() {
            "1" => sde_menu(settings),
            "2" => desoto_menu(settings),
            "3" => examples_menu(),
            "0" | "" => {
                println!("Goodbye!");
                break;
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
}
/* colors
Blue (\x1b[34m) - Welcome header text

Yellow (\x1b[33m) - Menu options

Cyan (\x1b[36m) - "Enter your choice:" prompt

Reset (\x1b[0m) - Returns to normal color after each colored section
*/
fn show_main_menu() {
    println!(
        "\x1b[34m\n Welcome to PVfit: single diode model parameters of photovoltaic\n
    cells and modules from IV curves and datasheets \n \x1b[0m"
    );
    println!("\x1b[33m1. Fit single diode equation to an IV curve\x1b[0m");
    println!("\x1b[33m2. De Soto model from datasheet values\x1b[0m");
    println!("\x1b[33m3. Examples\x1b[0m");
    println!("\x1b[33m0. Exit\x1b[0m");
    print!("\x1b[36mEnter your choice: \x1b[0m");
    let _ = io::stdout().flush();
}
