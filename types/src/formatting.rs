//! Timeline time formatting utilities.
//!
//! All timeline timestamps are integer milliseconds from encounter start.
//! Display formatting goes through this module so the CLI and any frontend
//! render times identically.

/// Format a duration as `M:SS`.
///
/// # Examples
/// ```
/// use mitplan_types::formatting::format_duration;
/// assert_eq!(format_duration(125), "2:05");
/// assert_eq!(format_duration(59), "0:59");
/// assert_eq!(format_duration(0), "0:00");
/// ```
pub fn format_duration(secs: i64) -> String {
    let sign = if secs < 0 { "-" } else { "" };
    let secs = secs.unsigned_abs();
    format!("{}{}:{:02}", sign, secs / 60, secs % 60)
}

/// Format a timeline position as `M:SS.t` (tenths, truncated).
///
/// Negative positions (lead-ins before the pull) keep a leading `-`.
///
/// # Examples
/// ```
/// use mitplan_types::formatting::format_timeline_ms;
/// assert_eq!(format_timeline_ms(75_300), "1:15.3");
/// assert_eq!(format_timeline_ms(0), "0:00.0");
/// assert_eq!(format_timeline_ms(-5_000), "-0:05.0");
/// ```
pub fn format_timeline_ms(ms: i64) -> String {
    let sign = if ms < 0 { "-" } else { "" };
    let ms = ms.unsigned_abs();
    let tenths = (ms % 1_000) / 100;
    let secs = ms / 1_000;
    format!("{}{}:{:02}.{}", sign, secs / 60, secs % 60, tenths)
}

/// Convert fractional seconds to whole milliseconds.
///
/// # Examples
/// ```
/// use mitplan_types::formatting::secs_to_ms;
/// assert_eq!(secs_to_ms(0.5), 500);
/// assert_eq!(secs_to_ms(90.0), 90_000);
/// ```
pub fn secs_to_ms(secs: f64) -> i64 {
    (secs * 1_000.0).round() as i64
}

/// Round milliseconds to the nearest tenth of a second.
///
/// Log timestamps are snapped to 0.1s before they become schedule entries.
///
/// # Examples
/// ```
/// use mitplan_types::formatting::round_to_tenth;
/// assert_eq!(round_to_tenth(12_345), 12_300);
/// assert_eq!(round_to_tenth(12_350), 12_400);
/// ```
pub fn round_to_tenth(ms: i64) -> i64 {
    ((ms as f64 / 100.0).round() as i64) * 100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(60), "1:00");
        assert_eq!(format_duration(125), "2:05");
        assert_eq!(format_duration(-30), "-0:30");
    }

    #[test]
    fn test_format_timeline_ms() {
        assert_eq!(format_timeline_ms(0), "0:00.0");
        assert_eq!(format_timeline_ms(999), "0:00.9");
        assert_eq!(format_timeline_ms(60_000), "1:00.0");
        assert_eq!(format_timeline_ms(605_250), "10:05.2");
        assert_eq!(format_timeline_ms(-90_000), "-1:30.0");
    }

    #[test]
    fn test_secs_to_ms_rounds() {
        assert_eq!(secs_to_ms(0.0), 0);
        assert_eq!(secs_to_ms(0.0004), 0);
        assert_eq!(secs_to_ms(25.0), 25_000);
    }
}
