//! src/util/humanize.rs

/// Human-readable file size: `0 Bytes`, otherwise base-1024 with at most two
/// decimals and trailing zeros dropped (`1.5 KB`, `2 MB`).
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let units: [&'static str; 4] = ["Bytes", "KB", "MB", "GB"];
    let mut size_f: f64 = bytes as f64;
    let mut unit_idx: usize = 0;

    while size_f >= 1024.0 && unit_idx < units.len() - 1 {
        size_f /= 1024.0;
        unit_idx += 1;
    }

    let rounded = format!("{size_f:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, units[unit_idx])
}

/// Size in MB with exactly two decimals, as shown in upload previews.
pub fn megabytes(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / 1024.0 / 1024.0)
}

/// Lower-cased extension after the last `.`; the whole name when there is none.
pub fn file_extension(name: &str) -> String {
    name.rsplit('.').next().unwrap_or(name).to_lowercase()
}
