/// Escape HTML-significant characters before user text is stored or echoed.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Heuristic check for script or SQL injection attempts. Queries are always
/// bound server-side; this exists for logging suspicious traffic.
pub fn looks_like_injection(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    const MARKERS: [&str; 8] = [
        "<script",
        "javascript:",
        "onerror=",
        "document.cookie",
        "drop table",
        "; --",
        "' or 1=1",
        "union select",
    ];
    MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Truncate to at most `max_length` characters, breaking on the last word
/// boundary and appending an ellipsis when anything was cut.
pub fn truncate_at_word(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }

    let prefix: String = text.chars().take(max_length).collect();
    match prefix.rfind(' ') {
        Some(last_space) => format!("{}...", &prefix[..last_space]),
        None => format!("{prefix}..."),
    }
}

#[cfg(test)]
mod tests {
    use super::{escape_html, looks_like_injection, truncate_at_word};

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html(r#"<script>alert("hi")</script>"#),
            "&lt;script&gt;alert(&quot;hi&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn flags_injection_markers() {
        assert!(looks_like_injection("<SCRIPT>document.cookie</script>"));
        assert!(looks_like_injection("jobs'; DROP TABLE interactions; --"));
        assert!(!looks_like_injection("data analyst jobs in pune"));
    }

    #[test]
    fn truncation_breaks_on_word_boundary() {
        let text = "We are looking for a skilled frontend developer to join our team";
        let truncated = truncate_at_word(text, 30);
        assert_eq!(truncated, "We are looking for a skilled...");
        assert!(truncated.len() <= 34);
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_at_word("short", 100), "short");
    }

    #[test]
    fn unbroken_text_is_hard_cut() {
        assert_eq!(truncate_at_word("aaaaaaaaaa", 4), "aaaa...");
    }
}
