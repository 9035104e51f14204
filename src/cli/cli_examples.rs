use crate::Examples::cstr_examples::cstr_examples;
use crate::cli::cli_main::get_user_input;
use std::io::{self, Write};

pub fn examples_menu() {
    loop {
        println!("\n=== Examples ===");
        println!("1. Classic mixing tank (Dopri5)");
        println!("2. Classic mixing tank (BDF)");
        println!("3. Tank with first-order reaction");
        println!("4. Integrator vs closed form");
        println!("5. Task file round trip");
        println!("0. Back to main menu");
        print!("Enter your choice: ");
        let _ = io::stdout().flush();

        let choice = get_user_input();
        match choice.trim() {
            "1" => cstr_examples(0),
            "2" => cstr_examples(1),
            "3" => cstr_examples(2),
            "4" => cstr_examples(3),
            "5" => cstr_examples(4),
            "0" | "" => break,
            _ => println!("Invalid choice. Please try again."),
        }
    }
}
