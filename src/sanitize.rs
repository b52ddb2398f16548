//! Input cleaning for text that ends up in public pages and notifications.
//!
//! Inputs are trimmed and truncated first, then stripped of control
//! characters, then HTML-escaped. Escaping last means the stored value can
//! be longer than the limit when it contains escapable characters.

use crate::notify::Scheme;

pub const NICKNAME_MAX: usize = 50;
pub const MESSAGE_MAX: usize = 2000;
pub const DEVICE_NAME_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 500;
pub const DESCRIPTOR_MAX: usize = 500;

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '`' => out.push_str("&#x60;"),
            '=' => out.push_str("&#x3D;"),
            other => out.push(other),
        }
    }
    out
}

/// General free text. Tabs and line breaks survive.
pub fn sanitize_input(input: &str, max_chars: usize) -> String {
    let kept: String = truncate(input.trim(), max_chars)
        .chars()
        .filter(|c| !is_stripped_control(*c) || matches!(c, '\t' | '\n' | '\r'))
        .collect();
    escape_html(&kept)
}

/// Nicknames are single-line, so every control character goes.
pub fn sanitize_nickname(input: &str) -> String {
    let kept: String = truncate(input.trim(), NICKNAME_MAX)
        .chars()
        .filter(|c| !is_stripped_control(*c))
        .collect();
    escape_html(&kept)
}

pub fn sanitize_message(input: &str) -> String {
    sanitize_input(input, MESSAGE_MAX)
}

pub fn sanitize_device_name(input: &str) -> String {
    sanitize_input(input, DEVICE_NAME_MAX)
}

pub fn sanitize_description(input: &str) -> String {
    sanitize_input(input, DESCRIPTION_MAX)
}

/// Keeps a device endpoint descriptor only if it starts with a supported
/// `scheme://` prefix. The result is trimmed and truncated, never escaped.
pub fn sanitize_descriptor(input: &str) -> Option<String> {
    let trimmed = input.trim();
    let lowered = trimmed.to_ascii_lowercase();
    let known = Scheme::ALL
        .iter()
        .any(|scheme| lowered.starts_with(&format!("{}://", scheme.as_str())));
    known.then(|| truncate(trimmed, DESCRIPTOR_MAX).to_string())
}

fn truncate(input: &str, max_chars: usize) -> &str {
    match input.char_indices().nth(max_chars) {
        Some((index, _)) => &input[..index],
        None => input,
    }
}

fn is_stripped_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{1F}' | '\u{7F}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">'`=/&"#),
            "&lt;a href&#x3D;&quot;x&quot;&gt;&#x27;&#x60;&#x3D;&#x2F;&amp;"
        );
    }

    #[test]
    fn message_keeps_newlines_but_drops_other_controls() {
        assert_eq!(
            sanitize_message("  hello\u{0}\n\tworld\u{7F}  "),
            "hello\n\tworld"
        );
    }

    #[test]
    fn nickname_drops_newlines() {
        assert_eq!(sanitize_nickname("Sam\nSmith"), "SamSmith");
    }

    #[test]
    fn truncates_before_escaping() {
        let nickname = "&".repeat(60);
        assert_eq!(sanitize_nickname(&nickname), "&amp;".repeat(50));
        assert_eq!(sanitize_device_name(&"é".repeat(150)).chars().count(), 100);
    }

    #[test]
    fn blank_input_becomes_empty() {
        assert_eq!(sanitize_message("   "), "");
        assert_eq!(sanitize_nickname(""), "");
    }

    #[test]
    fn descriptor_requires_known_scheme() {
        assert_eq!(
            sanitize_descriptor("  NTFY://alerts  "),
            Some("NTFY://alerts".to_string())
        );
        assert_eq!(sanitize_descriptor("mailto://me"), None);
        assert_eq!(sanitize_descriptor("ntfy:/alerts"), None);
        assert_eq!(
            sanitize_descriptor(&format!("https://{}", "a".repeat(600)))
                .map(|value| value.len()),
            Some(500)
        );
    }
}
