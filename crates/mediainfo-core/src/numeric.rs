//! Small text helpers shared by the per-container field builders.

/// Extracts the leading decimal number from `input`, tolerating a single
/// embedded space as a thousands separator (`"1 920 pixels"` → `"1920"`)
/// and a single decimal point (`"29.970 FPS"` → `"29.970"`). Leading
/// whitespace is skipped; anything else stops the scan. Returns an empty
/// string when `input` has no leading digit.
pub fn extract_leading_number(input: &str) -> String {
    let trimmed = input.trim_start();
    let mut chars = trimmed.chars().peekable();
    let mut result = String::new();
    let mut seen_digit = false;
    let mut seen_dot = false;

    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            result.push(c);
            seen_digit = true;
            chars.next();
        } else if c == ' ' && seen_digit {
            let mut lookahead = chars.clone();
            lookahead.next();
            if lookahead.peek().is_some_and(|next| next.is_ascii_digit()) {
                chars.next();
            } else {
                break;
            }
        } else if c == '.' && seen_digit && !seen_dot {
            let mut lookahead = chars.clone();
            lookahead.next();
            if lookahead.peek().is_some_and(|next| next.is_ascii_digit()) {
                result.push('.');
                seen_dot = true;
                chars.next();
            } else {
                break;
            }
        } else {
            break;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_number_with_space_thousands_separator() {
        assert_eq!(extract_leading_number("1 920 pixels"), "1920");
    }

    #[test]
    fn extracts_plain_number() {
        assert_eq!(extract_leading_number("640"), "640");
    }

    #[test]
    fn extracts_decimal_with_leading_whitespace() {
        assert_eq!(extract_leading_number("  29.970 FPS"), "29.970");
    }

    #[test]
    fn empty_input_yields_empty_string() {
        assert_eq!(extract_leading_number(""), "");
    }
}
