//! Raw scan to code extraction.
//!
//! [`extract`] is a pure, total function: any string (including empty input,
//! control-character-only input and input with several separators) yields
//! either a code or `None`, never a panic.
//!
//! # Rules
//!
//! Applied in this order:
//!
//! 1. NUL followed by `;` becomes `:`
//! 2. the control character 0x03 becomes `#`
//! 3. remaining NUL characters are removed
//! 4. an empty or whitespace-only result has no code
//! 5. split on `#`: exactly two parts yield the second part, otherwise the
//!    first part (the whole string when there is no `#`)
//!
//! # Examples
//!
//! ```
//! use pickverify_scan::extract;
//!
//! assert_eq!(extract("5QCPCM0QW").unwrap().as_str(), "5QCPCM0QW");
//! assert_eq!(extract("AB#CD").unwrap().as_str(), "CD");
//! assert_eq!(extract("AB#CD#EF").unwrap().as_str(), "AB");
//! assert!(extract("   ").is_none());
//! ```

use pickverify_core::ScanCode;
use pickverify_core::constants::{CODE_SEPARATOR, COLON, NUL, SEPARATOR_CONTROL, TERMINATOR};

/// Convert one raw scan buffer into a code.
///
/// Returns `None` when the cleaned buffer is empty or whitespace-only.
pub fn extract(raw: &str) -> Option<ScanCode> {
    let cleaned = clean(raw);

    if cleaned.trim().is_empty() {
        return None;
    }

    let mut parts = cleaned.split(CODE_SEPARATOR);
    let first = parts.next().unwrap_or_default();
    let code = match (parts.next(), parts.next()) {
        (Some(second), None) => second,
        _ => first,
    };

    Some(ScanCode::new(code))
}

/// Remove trailing terminators from a complete scan.
///
/// Decoded device labels are whole scans; some scanners still append the
/// carriage return they would have typed.
///
/// # Examples
///
/// ```
/// use pickverify_scan::strip_terminator;
///
/// assert_eq!(strip_terminator("123456\r"), "123456");
/// assert_eq!(strip_terminator("123456"), "123456");
/// ```
pub fn strip_terminator(raw: &str) -> &str {
    raw.trim_end_matches(TERMINATOR)
}

/// Apply the character rewriting rules (1-3).
fn clean(raw: &str) -> String {
    let mut shifted_semicolon = String::with_capacity(2);
    shifted_semicolon.push(NUL);
    shifted_semicolon.push(';');

    raw.replace(&shifted_semicolon, &COLON.to_string())
        .replace(SEPARATOR_CONTROL, &CODE_SEPARATOR.to_string())
        .replace(NUL, "")
}
