//! Text formatting for terminal output.

use chrono::{DateTime, Local, Utc};

/// Truncate a string to a maximum length, adding ellipsis if needed
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

/// Format an optional string, returning a default if None or empty
pub fn format_optional(value: &Option<String>, default: &str) -> String {
    match value.as_deref() {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

/// Format a price with two decimals
pub fn format_price(price: f64) -> String {
    format!("${:.2}", price)
}

/// Format a rate with thousands separators on the integer part
pub fn format_rate(rate: f64) -> String {
    let fixed = format!("{:.2}", rate);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Session expiry as local time plus the minutes left
pub fn format_expiry(expires_at: DateTime<Utc>, minutes_left: i64) -> String {
    let local = expires_at.with_timezone(&Local);
    let hours = minutes_left / 60;
    let minutes = minutes_left % 60;
    if hours > 0 {
        format!("{} ({}h {}m left)", local.format("%b %d %H:%M"), hours, minutes)
    } else {
        format!("{} ({}m left)", local.format("%b %d %H:%M"), minutes)
    }
}
