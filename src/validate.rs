//! Syntactic checks on raw text, run before a line reaches the lexer.

/// `true` if `s` (trimmed) is an integer literal: an optional sign followed
/// by at least one ASCII digit.
pub fn is_plain_number(s: &str) -> bool {
    let s = s.trim();
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// `true` if `s` (trimmed) is non-empty and made of letters only.
pub fn is_valid_variable_name(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty() && s.chars().all(char::is_alphabetic)
}

/// Pre-flight check on the shape of a line.
///
/// Lines without `=` are not assignments and always pass. Otherwise the line
/// must contain exactly one `=` and its right side must be a name or a
/// number, optionally preceded by a run of signs (`x = --5`, `x = - y`).
pub fn is_valid_assignment(line: &str) -> bool {
    let Some((_, rhs)) = line.split_once('=') else {
        return true;
    };
    if rhs.contains('=') {
        return false;
    }

    let value = rhs.trim_start().trim_start_matches(['+', '-']).trim();
    if value.starts_with(['+', '-']) {
        return false;
    }
    is_valid_variable_name(value) || is_plain_number(value)
}
