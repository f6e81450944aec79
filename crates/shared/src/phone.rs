//! Algerian mobile number rules used by phone inputs.

use std::sync::LazyLock;

use regex::Regex;

pub const ALGERIAN_MOBILE_PATTERN: &str = r"^(\+213|0)(5|6|7)[0-9]{8}$";

static ALGERIAN_MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ALGERIAN_MOBILE_PATTERN).expect("static phone pattern"));

/// Keeps ASCII digits, plus a `+` only when it opens the number.
pub fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii_digit() || (ch == '+' && out.is_empty()) {
            out.push(ch);
        }
    }
    out
}

pub fn is_valid_mobile(value: &str) -> bool {
    ALGERIAN_MOBILE.is_match(value)
}

/// Outcome of checking a sanitized value: `true` when the field should carry
/// a custom validity message.
pub fn needs_validity_message(sanitized: &str) -> bool {
    !sanitized.is_empty() && !is_valid_mobile(sanitized)
}

#[cfg(test)]
#[path = "tests/phone_tests.rs"]
mod tests;
