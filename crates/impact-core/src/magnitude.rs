//! Magnitude parsing for heterogeneous release strings.
//!
//! Surprise and revision fields arrive as human-readable text whose unit
//! depends on the release category: percentage points for rates, thousands
//! of jobs for payrolls. [`parse_magnitude`] normalizes them into one signed
//! float space so they can be bucketed and ranked together.

/// Parses a human-readable magnitude string into a normalized float.
///
/// Unit handling, checked in this order against the sign-stripped remainder:
///
/// - `pp` (percentage points) and `%` map 1:1;
/// - `K`/`k` maps 1:1 (thousands is the base unit);
/// - `M`/`m` scales x1000, converting millions into the same thousands-based
///   unit space;
/// - no suffix parses as a bare float.
///
/// Blank input, the case-insensitive token `N/A`, and any non-numeric
/// remainder yield `None`; this function never fails to the caller.
///
/// # Examples
///
/// ```
/// use impact_core::parse_magnitude;
///
/// assert_eq!(parse_magnitude("+2.3pp"), Some(2.3));
/// assert_eq!(parse_magnitude("-50K"), Some(-50.0));
/// assert_eq!(parse_magnitude("2M"), Some(2000.0));
/// assert_eq!(parse_magnitude("N/A"), None);
/// ```
#[must_use]
pub fn parse_magnitude(text: &str) -> Option<f64> {
    let s = text.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("n/a") {
        return None;
    }

    let sign = if s.starts_with('-') { -1.0 } else { 1.0 };
    let s = s.trim_start_matches(['+', '-']);

    let (number, scale) = if let Some(rest) = s.strip_suffix("pp") {
        (rest, 1.0)
    } else if let Some(rest) = s.strip_suffix('%') {
        (rest, 1.0)
    } else if let Some(rest) = s.strip_suffix(['K', 'k']) {
        (rest, 1.0)
    } else if let Some(rest) = s.strip_suffix(['M', 'm']) {
        (rest, 1000.0)
    } else {
        (s, 1.0)
    };

    number
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| sign * v * scale)
}
