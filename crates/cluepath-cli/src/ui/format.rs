//! Formatting utilities for CLI output.

/// Truncate a string to at most `max_len` characters, ending in `...`.
///
/// ```text
/// truncate_str("hello", 10)       -> "hello"
/// truncate_str("hello world", 8)  -> "hello..."
/// ```
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

/// Format a number with thousands separators.
pub fn format_thousands(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// Format a confidence score with two decimals.
pub fn format_confidence(value: f64) -> String {
    format!("{:.2}", value)
}

/// Pluralize a noun by count: `1 path`, `3 paths`.
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
