use html2text::config;
use html2text::render::text_renderer::TrivialDecorator;
use regex::Regex;
use std::sync::OnceLock;

fn html_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"</?[a-zA-Z][^>]*>").expect("valid html tag regex"))
}

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"https?://\S+").expect("valid url regex"))
}

fn inline_space_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[ \t\u{a0}]+").expect("valid space regex"))
}

fn blank_lines_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\n{3,}").expect("valid blank line regex"))
}

/// Clean narration input: strip markup and URLs, normalize spacing.
///
/// Unlike a flat whitespace collapse, paragraph breaks survive so the
/// chunker can still split on them.
pub fn prepare_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    let plain = if html_tag_pattern().is_match(&text) {
        // Plain decorator: no markdown markers in spoken text or before headings
        let converted = config::with_decorator(TrivialDecorator::new())
            .string_from_read(text.as_bytes(), usize::MAX);
        match converted {
            Ok(plain) => plain,
            Err(err) => {
                tracing::warn!(error = %err, "HTML conversion failed, stripping tags");
                html_tag_pattern().replace_all(&text, " ").into_owned()
            }
        }
    } else {
        text
    };

    let without_urls = url_pattern().replace_all(&plain, "");

    let lines: Vec<String> = without_urls
        .lines()
        .map(|line| inline_space_pattern().replace_all(line, " ").trim().to_string())
        .collect();
    let joined = lines.join("\n");

    blank_lines_pattern()
        .replace_all(&joined, "\n\n")
        .trim()
        .to_string()
}
