//! Numbered menus with re-prompt on invalid input

use log::debug;

use crate::error::AuthError;

use super::Console;

/// Parse a 1-based menu selection into a zero-based index
pub fn parse_selection(input: &str, option_count: usize) -> Result<usize, AuthError> {
    match input.trim().parse::<usize>() {
        Ok(n) if (1..=option_count).contains(&n) => Ok(n - 1),
        _ => Err(AuthError::InvalidSelection(input.trim().to_string())),
    }
}

/// Show a numbered menu and read selections until a valid one arrives
///
/// Invalid input prints an error line and asks again. Closed input is
/// reported as [`AuthError::Cancelled`].
pub fn choose<C: Console + ?Sized>(
    console: &mut C,
    title: &str,
    options: &[&str],
) -> Result<usize, AuthError> {
    console.say(title);
    console.say(&"=".repeat(50));
    for (i, option) in options.iter().enumerate() {
        console.say(&format!("{}. {}", i + 1, option));
    }
    console.say("");

    let prompt = format!("Enter your choice (1-{}): ", options.len());
    loop {
        let input = match console.ask(&prompt) {
            Ok(Some(input)) => input,
            Ok(None) => return Err(AuthError::Cancelled),
            Err(e) => {
                debug!("Failed to read menu input: {}", e);
                return Err(AuthError::Cancelled);
            }
        };

        match parse_selection(&input, options.len()) {
            Ok(index) => return Ok(index),
            Err(e) => {
                debug!("Rejected menu input '{}'", input);
                console.say(&format!(
                    "❌ {} Please enter a number from 1 to {}.",
                    e,
                    options.len()
                ));
            }
        }
    }
}
