use crate::ReactorsIVP::cstr_task::{CstrTask, CstrTaskConfig};
use crate::cli::cstr_help::{CSTR_ENG_HELPER, CSTR_TASK_EXAMPLE};
use crate::cli::cli_main::get_user_input;
use std::io::{self, Write};
use std::path::PathBuf;

pub const TEMPLATE_FILE: &str = "problem_cstr.txt";

pub fn cstr_menu() {
    loop {
        println!("\n=== CSTR Dynamic Problems ===");
        println!("\x1b[33m1. Run default scenario\x1b[0m");
        println!("\x1b[33m2. Solve from file\x1b[0m");
        println!("\x1b[33m3. Auto-discover problem files\x1b[0m");
        println!("\x1b[33m4. Generate template\x1b[0m");
        println!("\x1b[33m5. Read help\x1b[0m");
        println!("\x1b[33m0. Back to main menu\x1b[0m");
        print!("\x1b[36mEnter your choice: \x1b[0m");
        let _ = io::stdout().flush();

        let choice = get_user_input();
        match choice.trim() {
            "1" => run_task(CstrTask::new()),
            "2" => solve_from_file(),
            "3" => auto_solve_problems(),
            "4" => match create_template(TEMPLATE_FILE) {
                Ok(()) => println!("Template generated successfully: {}", TEMPLATE_FILE),
                Err(e) => println!("Failed to write template: {}", e),
            },
            "5" => show_help(),
            "0" | "" => break,
            _ => println!("Invalid choice. Please try again."),
        }
    }
}

/// Writes the default task with a comment line above the header
pub fn create_template(file_name: &str) -> Result<(), String> {
    let body = CstrTaskConfig::default()
        .to_task_string()
        .map_err(|e| e.to_string())?;
    let content = format!(
        "# CSTR task template: edit the values below the CSTR header\n{}",
        body
    );
    std::fs::write(file_name, content).map_err(|e| e.to_string())
}

fn solve_from_file() {
    print!("\x1b[36mEnter file path: \x1b[0m");
    let _ = io::stdout().flush();
    let file_path = get_user_input();
    let path = PathBuf::from(file_path.trim());

    if path.exists() {
        solve_from_file_dialog(path);
    } else {
        println!("File not found: {}", file_path.trim());
    }
}

fn auto_solve_problems() {
    use std::{env, fs};

    let current_dir = match env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            println!("Failed to get current directory: {}", e);
            return;
        }
    };
    println!("Searching for problem files in: {:?}", current_dir);

    let mut found_files = false;
    if let Ok(entries) = fs::read_dir(&current_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if let Some(filename) = path.file_name() {
                let filename_str = filename.to_string_lossy();
                if filename_str.starts_with("problem") && path.is_file() {
                    println!("Found problem file: {:?}", path);
                    solve_from_file_dialog(path);
                    found_files = true;
                }
            }
        }
    }

    if !found_files {
        println!("No files starting with 'problem' found in current directory.");
    }
}

pub fn solve_from_file_dialog(path: PathBuf) {
    let file_name = path.to_string_lossy().to_string();
    match CstrTask::from_file(&file_name) {
        Ok(task) => {
            println!("Document parsed successfully");
            task.pretty_print_task();

            print!("\x1b[36mStart calculation? (y/n): \x1b[0m");
            let _ = io::stdout().flush();
            let choice = get_user_input();

            if choice.trim().to_lowercase() == "y" || choice.trim().to_lowercase() == "yes" {
                run_task(task);
            } else {
                println!("Calculation cancelled. Returning to menu.");
            }
        }
        Err(e) => println!("Error parsing document: {}", e),
    }
}

fn run_task(mut task: CstrTask) {
    let outcome = task.solve();
    if let Err(e) = &outcome {
        println!("\x1b[31m{}\x1b[0m", e);
    }
    if let Some(result) = task.get_result() {
        result.pretty_print(10);
        result.plot_in_terminal();
        match task.save_result() {
            Ok(()) => println!(
                "Result saved to {}",
                task.config.output_file.as_deref().unwrap_or("data.txt")
            ),
            Err(e) => println!("Failed to save result: {}", e),
        }
    }
}

fn show_help() {
    println!("\n=== CSTR Help ===");
    println!("{}", CSTR_ENG_HELPER);
    println!("Example task file:\n{}", CSTR_TASK_EXAMPLE);
    println!("\nPress Enter to return to menu...");
    let _ = get_user_input();
}
