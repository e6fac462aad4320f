//! Input validation and sanitization for text taken from policy exports
//!
//! Object names and comments come from an untrusted export and end up on a
//! terminal. Everything printed passes through here first so an export can't
//! smuggle escape sequences or break table layout.

/// Sanitizes export text for a single-line table cell.
///
/// Drops ANSI escape sequences and every control character, turns tabs and
/// line breaks into spaces, and trims surrounding whitespace.
///
/// # Examples
///
/// ```
/// use cpaudit::validators::sanitize_cell;
///
/// assert_eq!(sanitize_cell("  web server \n"), "web server");
/// assert_eq!(sanitize_cell("\x1b[31mred\x1b[0m"), "red");
/// assert_eq!(sanitize_cell("a\tb"), "a b");
/// ```
pub fn sanitize_cell(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            // CSI sequence: ESC [ params final-byte
            '\u{1b}' if chars.peek() == Some(&'[') => {
                chars.next();
                for next in chars.by_ref() {
                    if ('\u{40}'..='\u{7e}').contains(&next) {
                        break;
                    }
                }
            }
            '\t' | '\n' | '\r' => out.push(' '),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    out.trim().to_string()
}

/// Validates a target name or identifier given on the command line.
///
/// # Errors
///
/// Returns `Err` if the value is empty, whitespace only, or contains
/// control characters.
pub fn validate_target(input: &str) -> Result<&str, String> {
    if input.trim().is_empty() {
        return Err("Target cannot be empty".to_string());
    }
    if input.chars().any(char::is_control) {
        return Err("Target contains control characters".to_string());
    }
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_plain_text() {
        assert_eq!(sanitize_cell("Web-01 (DMZ)"), "Web-01 (DMZ)");
        assert_eq!(sanitize_cell("Zürich office"), "Zürich office");
    }

    #[test]
    fn test_sanitize_strips_escape_sequences() {
        assert_eq!(sanitize_cell("\x1b[2J\x1b[1;31mowned"), "owned");
        assert_eq!(sanitize_cell("bell\x07"), "bell");
    }

    #[test]
    fn test_validate_target() {
        assert!(validate_target("H1").is_ok());
        assert!(validate_target("  ").is_err());
        assert!(validate_target("H1\n").is_err());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_sanitize_never_emits_control_chars(input in ".*") {
                let out = sanitize_cell(&input);
                prop_assert!(!out.chars().any(char::is_control));
            }

            #[test]
            fn test_sanitize_is_idempotent(input in ".*") {
                let once = sanitize_cell(&input);
                prop_assert_eq!(sanitize_cell(&once), once.clone());
            }
        }
    }
}
