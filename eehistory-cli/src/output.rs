//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use rust_decimal::Decimal;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format an amount with two decimals, keeping extra precision when present
pub fn format_amount(amount: Decimal) -> String {
    if amount.scale() < 2 {
        format!("{:.2}", amount)
    } else {
        amount.to_string()
    }
}

/// Join line numbers, eliding the tail past `limit`
pub fn format_lines(lines: &[usize], limit: usize) -> String {
    let shown: Vec<String> = lines.iter().take(limit).map(|l| l.to_string()).collect();
    if lines.len() > limit {
        format!("{}, ... ({} more)", shown.join(", "), lines.len() - limit)
    } else {
        shown.join(", ")
    }
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::new(-5, 0)), "-5.00");
        assert_eq!(format_amount(Decimal::new(25050, 2)), "250.50");
        assert_eq!(format_amount(Decimal::new(12345, 4)), "1.2345");
    }

    #[test]
    fn test_format_lines() {
        assert_eq!(format_lines(&[2, 8], 10), "2, 8");
        assert_eq!(format_lines(&[1, 2, 3, 4], 2), "1, 2, ... (2 more)");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.0 KB");
    }
}
