//! String utilities for the domain layer.

/// Truncate a string to a maximum byte length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Take the first `max_chars` characters of a string, without ellipsis.
///
/// Counts `char`s rather than bytes, so multibyte text is never split.
pub fn excerpt(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        // 'é' is 2 bytes: target 4 falls inside the second 'é' and backs off
        assert_eq!(truncate("ééééé", 7), "éé...");
    }

    #[test]
    fn test_excerpt_counts_chars() {
        assert_eq!(excerpt("abcdef", 3), "abc");
        assert_eq!(excerpt("abc", 10), "abc");
        assert_eq!(excerpt("ééé", 2), "éé");
        assert_eq!(excerpt("", 5), "");
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.181_818, 2), 1.18);
        assert_eq!(round_to(0.3333, 3), 0.333);
        assert_eq!(round_to(2.0, 2), 2.0);
    }
}
