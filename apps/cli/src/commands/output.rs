//! Shared printing helpers for API responses.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

/// Print a bold title followed by the pretty-printed JSON of `value`.
pub fn print_json<T: Serialize>(title: &str, value: &T) -> Result<()> {
    println!("{}", title.bold().cyan());
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a green success line.
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}
