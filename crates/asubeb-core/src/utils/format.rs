/// Format a score with two decimal places, dropping them for whole numbers
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{:.0}", score)
    } else {
        format!("{:.2}", score)
    }
}

/// Format a percentage for display
pub fn format_percentage(value: f64) -> String {
    format!("{}%", format_score(value))
}

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

/// Format a cache age in minutes for display
pub fn format_age(minutes: Option<i64>) -> String {
    match minutes {
        None => "never".to_string(),
        Some(m) if m < 1 => "just now".to_string(),
        Some(m) if m < 60 => format!("{}m ago", m),
        Some(m) => format!("{}h ago", m / 60),
    }
}
