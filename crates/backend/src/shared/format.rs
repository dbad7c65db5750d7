/// Human-readable byte size for request logs
///
/// # Examples
/// ```
/// use backend::shared::format::format_size;
/// assert_eq!(format_size(512), "512 B");
/// assert_eq!(format_size(2048), "2.0 KB");
/// ```
pub fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < MB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / MB)
    }
}

/// Lineal feet with one decimal, as shown in logs and messages
pub fn format_feet(feet: f64) -> String {
    format!("{:.1} ft", feet)
}
