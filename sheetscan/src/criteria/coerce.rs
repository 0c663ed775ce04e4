//! Loose spreadsheet-script coercions used when comparing a cell against an operand literal.

use std::cmp::Ordering;

/// Convert text to a number the way a loosely typed comparison does.
///
/// Whitespace is trimmed, the empty string is `0`, `Infinity` forms and
/// `0x`/`0o`/`0b` integer literals are recognized, anything else that is not
/// a plain decimal literal is `NaN`.
pub fn to_number(text: &str) -> f64 {
    let s = text.trim();
    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match s.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&s[2..], radix)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }

    // `f64::from_str` also takes "inf" and "nan", which are not numeric literals here.
    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Order two strings by UTF-16 code units.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}
