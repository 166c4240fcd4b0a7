//! Text normalization for messages and console output

use regex::Regex;
use std::sync::OnceLock;

fn ansi_regex() -> &'static Regex {
    static ANSI: OnceLock<Regex> = OnceLock::new();
    ANSI.get_or_init(|| {
        // CSI sequences, OSC hyperlinks and lone single-character escapes
        Regex::new(
            r"[\x1b\x9b][\[\]()#;?]*(?:(?:(?:;[-a-zA-Z\d/#&.:=?%@~_]+)*|[a-zA-Z\d]+(?:;[-a-zA-Z\d/#&.:=?%@~_]*)*)?\x07|(?:(?:\d{1,4}(?:;\d{0,4})*)?[\dA-PR-TZcf-nq-uy=><~]))",
        )
        .expect("ANSI pattern is valid")
    })
}

/// Remove terminal color and cursor escape sequences.
pub fn strip_ansi(text: &str) -> String {
    ansi_regex().replace_all(text, "").into_owned()
}

/// Rewrite every `\n` that is not already preceded by `\r` into `\r\n`.
pub fn normalize_line_endings(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 16);
    let mut previous = None;
    for ch in text.chars() {
        if ch == '\n' && previous != Some('\r') {
            out.push('\r');
        }
        out.push(ch);
        previous = Some(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi_colors() {
        let colored = "\u{1b}[31mAssertionError\u{1b}[39m: expected \u{1b}[32m1\u{1b}[39m";
        assert_eq!(strip_ansi(colored), "AssertionError: expected 1");
    }

    #[test]
    fn test_strip_ansi_plain_text_untouched() {
        assert_eq!(strip_ansi("plain [brackets] text"), "plain [brackets] text");
    }

    #[test]
    fn test_bare_newlines_become_crlf() {
        assert_eq!(normalize_line_endings("a\nb\n"), "a\r\nb\r\n");
    }

    #[test]
    fn test_existing_crlf_left_alone() {
        assert_eq!(normalize_line_endings("a\r\nb\nc"), "a\r\nb\r\nc");
        assert_eq!(normalize_line_endings("\r\n\r\n"), "\r\n\r\n");
    }

    #[test]
    fn test_leading_newline() {
        assert_eq!(normalize_line_endings("\nx"), "\r\nx");
    }
}
