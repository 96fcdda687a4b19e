use chrono::{DateTime, Local};
use std::time::SystemTime;

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human readable size with 1024 steps, e.g. `1.50 KB`.
pub fn format_file_size(bytes: u64, decimals: usize) -> String {
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.*} {}", decimals, size, SIZE_UNITS[unit])
}

/// Local time as `%Y-%m-%d %H:%M:%S`.
pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
