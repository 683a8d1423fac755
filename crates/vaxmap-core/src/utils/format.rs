use chrono::NaiveDateTime;

use crate::models::Position;

/// Timestamp layout used by the center API
const API_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a Korean phone number for display
/// Normalizes digits to the usual dashed grouping; Seoul numbers use a 2-digit area code
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        9 if digits.starts_with("02") => format!("{}-{}-{}", &digits[0..2], &digits[2..5], &digits[5..9]),
        10 if digits.starts_with("02") => format!("{}-{}-{}", &digits[0..2], &digits[2..6], &digits[6..10]),
        10 if digits.starts_with('0') => format!("{}-{}-{}", &digits[0..3], &digits[3..6], &digits[6..10]),
        11 if digits.starts_with('0') => format!("{}-{}-{}", &digits[0..3], &digits[3..7], &digits[7..11]),
        // Nationwide service numbers (1588-xxxx)
        8 if digits.starts_with('1') => format!("{}-{}", &digits[0..4], &digits[4..8]),
        _ => phone.to_string(), // Return original if can't format
    }
}

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a position as `37.5678°N 127.0045°E`
pub fn format_coordinates(pos: &Position) -> String {
    let ns = if pos.lat >= 0.0 { 'N' } else { 'S' };
    let ew = if pos.lng >= 0.0 { 'E' } else { 'W' };
    format!("{:.4}°{} {:.4}°{}", pos.lat.abs(), ns, pos.lng.abs(), ew)
}

/// Format an API timestamp (`2021-07-16 04:55:08`) to a more readable form
pub fn format_updated_at(value: &str) -> String {
    match NaiveDateTime::parse_from_str(value.trim(), API_TIMESTAMP_FORMAT) {
        Ok(dt) => dt.format("%b %d, %Y %H:%M").to_string(),
        Err(_) => value.to_string(),
    }
}

/// Case-insensitive substring match
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
