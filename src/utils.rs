// src/utils.rs
// Small string helpers for log output

/// Truncate a string to at most `max_len` characters, adding an ellipsis if
/// truncated. Counts chars, so multibyte text never splits mid-character.
///
/// # Examples
/// ```
/// use dynamic_persona::utils::truncate;
/// assert_eq!(truncate("Hello World", 5), "He...");
/// assert_eq!(truncate("Hi", 10), "Hi");
/// ```
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len < 4 {
        // Too short for ellipsis, just truncate
        return s.chars().take(max_len).collect();
    }
    let mut out: String = s.chars().take(max_len - 3).collect();
    out.push_str("...");
    out
}

/// Collapse a model completion into a single trimmed line
pub fn single_line(s: &str) -> String {
    s.trim().replace("\r\n", " ").replace(['\n', '\r'], " ")
}
