// Display-text cleanup for strings that came from the model.
// Removes invisible formatting and control characters so nothing hidden
// reaches the renderer. Wording is left untouched.

/// Strip invisible and control characters, then trim.
pub fn display_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| is_visible(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

fn is_visible(c: char) -> bool {
    if c == '\n' || c == '\t' || c == ' ' {
        return true;
    }
    if matches!(
        c,
        '\u{200B}' // Zero-width space
            | '\u{200E}' // Left-to-right mark
            | '\u{200F}' // Right-to-left mark
            | '\u{202A}'..='\u{202E}' // Bidi embeddings and overrides
            | '\u{2060}'..='\u{2064}' // Word joiner, invisible operators
            | '\u{2066}'..='\u{2069}' // Bidi isolates
            | '\u{FEFF}' // BOM
    ) {
        return false;
    }
    !c.is_control()
}

/// Cut `text` to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_invisible_and_control_chars() {
        assert_eq!(display_text("Hemo\u{200B}globin"), "Hemoglobin");
        assert_eq!(display_text("\u{FEFF}TSH\u{202E}"), "TSH");
        assert_eq!(display_text("a\u{0007}b\rc"), "abc");
    }

    #[test]
    fn keeps_emoji_and_scripts() {
        assert_eq!(display_text(" Low ⚠️ "), "Low ⚠️");
        assert_eq!(display_text("आपका हीमोग्लोबिन कम है।"), "आपका हीमोग्लोबिन कम है।");
    }

    #[test]
    fn keeps_line_breaks_inside_text() {
        assert_eq!(display_text("line one\nline two\n"), "line one\nline two");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("हीमोग्लोबिन", 3), "हीम…");
        assert_eq!(truncate_chars("short", 10), "short");
    }
}
