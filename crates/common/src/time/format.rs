//! Human-readable rendering of remaining token lifetimes

/// Format a number of remaining seconds as `1h 1m 5s`
///
/// Zero or negative values render as `expired`.
///
/// # Examples
///
/// ```
/// use chainview_common::time::format::format_remaining;
///
/// assert_eq!(format_remaining(5), "5s");
/// assert_eq!(format_remaining(65), "1m 5s");
/// assert_eq!(format_remaining(90_000), "1d 1h 0m 0s");
/// assert_eq!(format_remaining(-3), "expired");
/// ```
#[must_use]
pub fn format_remaining(seconds: i64) -> String {
    if seconds <= 0 {
        return "expired".to_string();
    }

    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;

    let components = [(days, "d"), (hours, "h"), (minutes, "m"), (secs, "s")];
    let start_index =
        components.iter().position(|(value, _)| *value > 0).unwrap_or(components.len() - 1);

    components[start_index..]
        .iter()
        .map(|(value, suffix)| format!("{value}{suffix}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hour_boundary() {
        assert_eq!(format_remaining(3_600), "1h 0m 0s");
        assert_eq!(format_remaining(3_599), "59m 59s");
    }

    #[test]
    fn test_expired() {
        assert_eq!(format_remaining(0), "expired");
    }
}
