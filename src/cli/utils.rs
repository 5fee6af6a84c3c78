//! CLI utility functions for terminal interaction and formatting.

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use console::{style, Term};
use dialoguer::{Confirm, Input, Password};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use zeroize::Zeroizing;

/// Prompt for confirmation with default behavior based on `no_prompt` flag.
/// If `no_prompt` is true, returns true without prompting.
pub fn confirm(message: &str, no_prompt: bool) -> bool {
    if no_prompt {
        return true;
    }

    Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .unwrap_or(false)
}

/// Prompt for an existing passphrase (hidden characters).
pub fn prompt_passphrase(message: &str) -> anyhow::Result<Zeroizing<String>> {
    let passphrase = Password::new()
        .with_prompt(message)
        .allow_empty_password(true)
        .interact()?;
    Ok(Zeroizing::new(passphrase))
}

/// Prompt for a new passphrase, entered twice.
pub fn prompt_new_passphrase() -> anyhow::Result<Zeroizing<String>> {
    let passphrase = Password::new()
        .with_prompt("Enter a passphrase to encrypt the wallet")
        .with_confirmation("Confirm passphrase", "Passphrases do not match")
        .allow_empty_password(true)
        .interact()?;
    if passphrase.is_empty() {
        print_warning("Empty passphrase: the wallet file is only as safe as the disk it sits on");
    }
    Ok(Zeroizing::new(passphrase))
}

/// Prompt for a recovery phrase.
///
/// The phrase is validated exactly as entered.
pub fn prompt_mnemonic() -> anyhow::Result<Zeroizing<String>> {
    let phrase: String = Input::new()
        .with_prompt("Enter your recovery phrase")
        .allow_empty(false)
        .interact_text()?;
    Ok(Zeroizing::new(phrase))
}

/// Create a spinner progress bar with message.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Print success message in green.
pub fn print_success(message: &str) {
    let term = Term::stdout();
    let _ = term.write_line(&format!("{} {}", style("✓").green().bold(), message));
}

/// Print error message in red.
pub fn print_error(message: &str) {
    let term = Term::stderr();
    let _ = term.write_line(&format!("{} {}", style("✗").red().bold(), message));
}

/// Print info message in blue.
pub fn print_info(message: &str) {
    let term = Term::stdout();
    let _ = term.write_line(&format!("{} {}", style("ℹ").blue().bold(), message));
}

/// Print warning message in yellow.
pub fn print_warning(message: &str) {
    let term = Term::stdout();
    let _ = term.write_line(&format!("{} {}", style("⚠").yellow().bold(), message));
}

/// Shorten a long value for table display.
/// Keeps the first and last 8 characters with "..." in between.
pub fn format_truncated(value: &str) -> String {
    if value.len() <= 19 {
        return value.to_string();
    }
    format!("{}...{}", &value[..8], &value[value.len() - 8..])
}

/// Create a styled table for CLI output.
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Create a table with custom headers.
pub fn create_table_with_headers(headers: &[&str]) -> Table {
    let mut table = create_table();
    table.set_header(headers.iter().map(|h| style(*h).bold().to_string()));
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_truncated() {
        let key = "ab".repeat(32);
        assert_eq!(format_truncated(&key), "abababab...abababab");
        assert_eq!(format_truncated("sm1short"), "sm1short");
    }

    #[test]
    fn test_confirm_no_prompt() {
        assert!(confirm("Overwrite?", true));
    }

    #[test]
    fn test_table_headers() {
        let mut table = create_table_with_headers(&["Index", "Address"]);
        table.add_row(vec!["0", "sm1qqq"]);
        let rendered = table.to_string();
        assert!(rendered.contains("Index"));
        assert!(rendered.contains("sm1qqq"));
    }
}
