//! Human-readable sizes and timestamps for list rows and status lines.

use chrono::{DateTime, Local};
use std::time::SystemTime;

const SIZE_SUFFIXES: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Binary units with one decimal. The unit steps up while the value divided
/// by 1024 still rounds (half to even) to at least one. The printed digit
/// rounds half away from zero, so 1280 bytes reads `1.3KB`.
pub fn format_file_size(bytes: u64) -> String {
    let mut unit = 0;
    let mut value = bytes as f64;
    while unit < SIZE_SUFFIXES.len() - 1 && (value / 1024.0).round_ties_even() >= 1.0 {
        value /= 1024.0;
        unit += 1;
    }
    let shown = (value * 10.0).round() / 10.0;
    format!("{:.1}{}", shown, SIZE_SUFFIXES[unit])
}

/// Local time, short general form: `10/19/2026 2:41 PM`.
pub fn format_modified(time: SystemTime) -> String {
    let local: DateTime<Local> = time.into();
    local.format("%-m/%-d/%Y %-I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn sizes_escalate_by_binary_units() {
        assert_eq!(format_file_size(0), "0.0B");
        assert_eq!(format_file_size(1536), "1.5KB");
        assert_eq!(format_file_size(1_048_576), "1.0MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.0GB");
    }

    #[test]
    fn half_a_unit_rounds_to_even() {
        // 512 / 1024 = 0.5 rounds to 0: stays in bytes.
        assert_eq!(format_file_size(512), "512.0B");
        // 513 / 1024 rounds to 1: steps up.
        assert_eq!(format_file_size(513), "0.5KB");
    }

    #[test]
    fn printed_tenths_round_half_away_from_zero() {
        // 1280 / 1024 = 1.25 and 2304 / 1024 = 2.25, both exact halves.
        assert_eq!(format_file_size(1280), "1.3KB");
        assert_eq!(format_file_size(2304), "2.3KB");
        assert_eq!(format_file_size(1152), "1.1KB");
    }

    #[test]
    fn terabytes_do_not_overflow_suffixes() {
        let huge = 5000u64 * 1024 * 1024 * 1024 * 1024;
        assert_eq!(format_file_size(huge), "5000.0TB");
    }

    #[test]
    fn modified_uses_short_general_format() {
        let t = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let shown = format_modified(t);
        assert!(shown.ends_with("AM") || shown.ends_with("PM"), "{shown}");
        assert_eq!(shown.matches('/').count(), 2);
    }
}
