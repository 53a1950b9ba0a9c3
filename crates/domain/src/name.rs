//! Bus-legal device names.

/// Longest name the bus accepts.
pub const MAX_NAME_LEN: usize = 16;

/// Sanitize free text into a bus-legal name.
///
/// Lower-cases, drops every character outside `[a-z0-9]` and truncates to
/// [`MAX_NAME_LEN`]. Sanitizing an already sanitized name returns it
/// unchanged.
#[must_use]
pub fn sanitize(candidate: &str) -> String {
    candidate
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .take(MAX_NAME_LEN)
        .collect()
}
