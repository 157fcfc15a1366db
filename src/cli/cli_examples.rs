use super::get_user_input;
use crate::Examples::pv_examples::pv_examples;
use std::io::{self, Write};

pub fn examples_menu() {
    loop {
        println!("\n=== Examples ===");
        println!("1. IV curve round trip (Sandia fit)");
        println!("2. De Soto model of a silicon module");
        println!("3. Unsupported cell technologies");
        println!("4. Sensitivity to the linear segment fraction");
        println!("0. Back to main menu");
        print!("Enter your choice: ");
        let _ = io::stdout().flush();

        let choice = get_user_input();
        let task = match choice.trim() {
            "1" => 0,
            "2" => 1,
            "3" => 2,
            "4" => 3,
            "0" | "" => break,
            _ => {
                println!("Invalid choice. Please try again.");
                continue;
            }
        };
        if let Err(e) = pv_examples(task) {
            println!("Error: {}", e);
        }
    }
}
