//! Short-name filtering and control character cleanup
use std::borrow::Cow;

/// Reduce text to a valid exchange short name.
///
/// Every character outside `[A-Za-z0-9_]` becomes `_`.
pub fn filter_short_name(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Strip ASCII control characters other than tab, line feed and carriage return.
pub fn replace_ascii_ctrl_chars(value: &str) -> Cow<'_, str> {
    if value.chars().any(is_stripped_control) {
        Cow::Owned(value.chars().filter(|c| !is_stripped_control(*c)).collect())
    } else {
        Cow::Borrowed(value)
    }
}

fn is_stripped_control(c: char) -> bool {
    c.is_ascii_control() && !matches!(c, '\t' | '\n' | '\r')
}
