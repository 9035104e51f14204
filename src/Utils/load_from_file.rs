//! Loading of task documents: a plain text file in which a JSON payload follows a header line
//! (e.g. `CSTR`) and runs until the next all-uppercase header or the end of the file.
//! Anything before the header (comments, notes) is ignored.
use log::{error, info};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Finds the first of `headers` in the file and deserializes the JSON below it.
///
/// Parse errors are reported with the line number in the file and a pointer to the column.
pub fn load_section_from_file<T: DeserializeOwned>(
    file_name: &str,
    headers: &[&str],
) -> Result<T, String> {
    let path = Path::new(file_name);
    if !path.exists() {
        return Err(format!("File '{}' does not exist", file_name));
    }

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => return Err(format!("Failed to open file '{}': {}", file_name, e)),
    };

    let reader = BufReader::new(file);
    let lines: Vec<String> = reader.lines().map_while(Result::ok).collect();
    load_section_from_lines(&lines, headers, file_name)
}

/// Same as [`load_section_from_file`] for text already in memory
pub fn load_section_from_str<T: DeserializeOwned>(
    content: &str,
    headers: &[&str],
) -> Result<T, String> {
    let lines: Vec<String> = content.lines().map(|l| l.to_string()).collect();
    load_section_from_lines(&lines, headers, "<string>")
}

fn load_section_from_lines<T: DeserializeOwned>(
    lines: &[String],
    headers: &[&str],
    source: &str,
) -> Result<T, String> {
    // Find the header
    let mut start_index = None;
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim().to_uppercase();
        if headers.iter().any(|h| trimmed == h.to_uppercase()) {
            start_index = Some(i + 1); // Start from the line after the header
            break;
        }
    }

    let start_index = match start_index {
        Some(index) => index,
        None => {
            return Err(format!(
                "No {:?} header found in '{}'",
                headers, source
            ));
        }
    };

    // Find the end index (next header or end of file)
    let mut end_index = lines.len();
    for (i, line) in lines.iter().enumerate().skip(start_index) {
        let trimmed = line.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_uppercase() || c == '_') {
            end_index = i;
            break;
        }
    }

    let section = lines[start_index..end_index].join("\n");

    match serde_json::from_str::<T>(&section) {
        Ok(data) => {
            info!("Successfully parsed section {:?} from '{}'", headers, source);
            Ok(data)
        }
        Err(e) => {
            let error_line = e.line();
            let error_column = e.column();

            // line numbers are 1-based in messages, 0-based in `lines`
            let actual_line = start_index + error_line.max(1) - 1;

            let error_msg = format!(
                "Error parsing task data at line {}, column {} (line {} in file): {}",
                error_line,
                error_column,
                actual_line + 1,
                e
            );
            error!("{}", error_msg);

            if actual_line < lines.len() {
                let problem_line = &lines[actual_line];
                error!("Problematic line: {}", problem_line);

                if error_column >= 1 && error_column <= problem_line.len() {
                    let pointer = " ".repeat(error_column - 1) + "^";
                    error!("{}", pointer);
                }
            }

            Err(error_msg)
        }
    }
}
