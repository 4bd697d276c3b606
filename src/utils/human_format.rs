//! Human-readable formatting utilities for sizes and elapsed time

/// Formats a size in bytes to a human-readable string with appropriate units
pub fn format_memory(bytes: f64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0.0 {
        return "0B".to_string();
    }

    let mut size = bytes.abs();
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    let sign = if bytes < 0.0 { "-" } else { "" };

    if unit_index == 0 {
        format!("{}{:.0}{}", sign, size, UNITS[unit_index])
    } else if size >= 10.0 {
        format!("{}{:.1}{}", sign, size, UNITS[unit_index])
    } else {
        format!("{}{:.2}{}", sign, size, UNITS[unit_index])
    }
}

/// Formats a time duration in milliseconds to a human-readable string
pub fn format_duration(millis: u64) -> String {
    if millis < 1000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        let seconds = millis as f64 / 1000.0;
        if seconds >= 10.0 {
            format!("{:.1}s", seconds)
        } else {
            format!("{:.2}s", seconds)
        }
    } else {
        let total_seconds = millis / 1000;
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;

        if seconds == 0 {
            format!("{}m", minutes)
        } else {
            format!("{}m{}s", minutes, seconds)
        }
    }
}

/// Percentage saved by compression, `(1 - compressed / original) * 100`
pub fn compression_ratio(original: u64, compressed: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (1.0 - (compressed as f64 / original as f64)) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_memory() {
        assert_eq!(format_memory(0.0), "0B");
        assert_eq!(format_memory(512.0), "512B");
        assert_eq!(format_memory(1024.0), "1.00KB");
        assert_eq!(format_memory(1536.0), "1.50KB");
        assert_eq!(format_memory(1048576.0), "1.00MB");
        assert_eq!(format_memory(10485760.0), "10.0MB");
        assert_eq!(format_memory(-1024.0), "-1.00KB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0ms");
        assert_eq!(format_duration(999), "999ms");
        assert_eq!(format_duration(1500), "1.50s");
        assert_eq!(format_duration(10000), "10.0s");
        assert_eq!(format_duration(60000), "1m");
        assert_eq!(format_duration(90000), "1m30s");
    }

    #[test]
    fn test_compression_ratio() {
        assert_eq!(compression_ratio(0, 0), 0.0);
        assert!((compression_ratio(1000, 250) - 75.0).abs() < f64::EPSILON);
    }
}
