//! Terminal UI helpers for consistent CLI output styling.

/// ANSI color codes using true color (24-bit)
pub mod colors {
    pub const HEADER: &str = "\x1b[38;2;255;210;120m";
    pub const OK: &str = "\x1b[38;2;120;255;120m";
    pub const ERR: &str = "\x1b[38;2;255;100;100m";
    pub const WARN: &str = "\x1b[38;2;255;200;100m";
    pub const DIM: &str = "\x1b[38;2;140;140;140m";
    pub const CYAN: &str = "\x1b[38;2;100;200;255m";
    pub const RESET: &str = "\x1b[0m";
}

/// Unicode symbols
pub mod symbols {
    pub const OK: &str = "✓";
    pub const ERR: &str = "✗";
    pub const ARROW: &str = "›";
}

/// Horizontal rule
pub const HR: &str =
    "──────────────────────────────────────────────────────────────────────────────";

/// Print a styled header with version
pub fn print_header(name: &str, version: &str) {
    println!();
    println!("{}{} v{}{}", colors::HEADER, name, version, colors::RESET);
    println!("{}{}{}", colors::DIM, HR, colors::RESET);
}

/// Print an OK line with checkmark
pub fn print_ok(message: &str) {
    println!("  {}{}{} {}", colors::OK, symbols::OK, colors::RESET, message);
}

/// Print an error line with X
pub fn print_err(message: &str) {
    println!("  {}{}{} {}", colors::ERR, symbols::ERR, colors::RESET, message);
}

/// Print a key-value pair with alignment
pub fn print_kv(key: &str, value: &str, key_width: usize) {
    println!("  {:width$} {}", key, value, width = key_width);
}

/// Color for an importance label
pub fn importance_color(importance: &str) -> &'static str {
    match importance {
        "critical" => colors::ERR,
        "high" => colors::WARN,
        "medium" => colors::CYAN,
        _ => colors::DIM,
    }
}
