//! GitHub Actions workflow commands, printed to stdout for the runner to pick up.

use std::fmt::Display;

pub fn warning(message: impl Display) { println!("{}", format_command("warning", message)); }

pub fn error(message: impl Display) { println!("{}", format_command("error", message)); }

pub fn format_command(command: &str, message: impl Display) -> String {
    format!("::{command}::{}", escape_data(&message.to_string()))
}

fn escape_data(value: &str) -> String {
    value.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}
