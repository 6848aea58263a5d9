use std::io::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use colored::Colorize;

use crate::render::PLACEHOLDER;

/// OSC 52 escape that asks the terminal to put `text` on the system clipboard.
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text.as_bytes()))
}

pub fn validate_copy_target(text: &str) -> Result<&str, String> {
    let text = text.trim();
    if text.is_empty() || text == PLACEHOLDER {
        return Err("❌ No valid horse ID to copy".to_string());
    }
    Ok(text)
}

/// Copies a horse id and prints a confirmation toast. Both go to stderr so stdout stays clean.
pub fn copy_horse_id(text: &str) -> Result<(), String> {
    let id = validate_copy_target(text)?;
    let mut stderr = std::io::stderr();
    stderr
        .write_all(osc52_sequence(id).as_bytes())
        .and_then(|_| stderr.flush())
        .map_err(|e| {
            tracing::error!("clipboard write failed: {e}");
            format!("❌ Copy failed. Horse ID: {id}")
        })?;
    eprintln!("{} {}", "✅ Horse ID copied:".green(), id.bold());
    Ok(())
}
