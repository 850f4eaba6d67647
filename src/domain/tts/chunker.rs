//! Splits long text into provider-safe chunks.
//!
//! Boundaries are chosen from the largest semantic unit that still fits:
//! section headings, then paragraphs, then sentences, and only as a last
//! resort whitespace or a hard cut. Lengths are counted in characters so
//! multi-byte scripts are never split inside a code point.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

const PARAGRAPH_SEPARATOR: &str = "\n\n";
const SENTENCE_SEPARATOR: &str = " ";

/// Numerals accepted after a section keyword besides digits and roman numerals
const SPELLED_NUMERALS: &[&str] = &[
    "one", "two", "three", "first", "second", "third", "một", "hai", "ba", "nhất", "nhì",
];

/// One bounded slice of the input, synthesized by a single provider request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextChunk {
    pub index: usize,
    pub content: String,
}

/// Split `text` into ordered chunks of at most `max_length` characters.
///
/// Deterministic: the same input always yields the same chunks. Empty or
/// whitespace-only input yields no chunks.
///
/// # Panics
/// Panics when `max_length` is zero; chunk sizes are validated when the
/// configuration is loaded.
pub fn split(text: &str, max_length: usize) -> Vec<TextChunk> {
    assert!(max_length > 0, "max chunk length must be positive");

    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    if normalized.trim().is_empty() {
        return Vec::new();
    }

    if char_len(&normalized) <= max_length {
        return vec![TextChunk {
            index: 0,
            content: normalized.trim().to_string(),
        }];
    }

    let mut builder = ChunkBuilder::new(max_length);

    for paragraph in paragraphs(&normalized) {
        // Never let a chunk straddle the start of a labeled section
        if builder.has_pending() && is_section_start(paragraph) {
            builder.flush();
        }

        if char_len(paragraph) > max_length {
            builder.push_long_paragraph(paragraph);
        } else {
            builder.push(paragraph, PARAGRAPH_SEPARATOR);
        }
    }

    builder.finish()
}

/// True when the paragraph opens with a heading such as "Chapter 2",
/// "PART IV", "Chương một" or "Phần thứ hai".
pub fn is_section_start(paragraph: &str) -> bool {
    let Some(captures) = section_pattern().captures(paragraph) else {
        return false;
    };
    let numeral = captures[1].to_lowercase();

    if numeral.chars().all(|c| c.is_ascii_digit()) || SPELLED_NUMERALS.contains(&numeral.as_str())
    {
        return true;
    }

    // Short words like "I" or "mix" read as numerals, so a roman numeral
    // must end the heading line or be followed by heading punctuation
    let rest = &paragraph[captures.get(1).map_or(paragraph.len(), |m| m.end())..];
    roman_pattern().is_match(&numeral) && ends_heading(rest)
}

fn ends_heading(rest: &str) -> bool {
    let rest = rest.trim_start_matches([' ', '\t']);
    rest.is_empty() || rest.starts_with(['\n', ':', '.', '-', '–', '—'])
}

struct ChunkBuilder {
    max_length: usize,
    chunks: Vec<String>,
    pending: String,
    pending_len: usize,
}

impl ChunkBuilder {
    fn new(max_length: usize) -> Self {
        Self {
            max_length,
            chunks: Vec::new(),
            pending: String::new(),
            pending_len: 0,
        }
    }

    fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Append a piece that fits on its own, flushing first if it would overflow
    fn push(&mut self, piece: &str, separator: &str) {
        let piece_len = char_len(piece);

        if self.pending.is_empty() {
            self.pending.push_str(piece);
            self.pending_len = piece_len;
            return;
        }

        let separator_len = char_len(separator);
        if self.pending_len + separator_len + piece_len <= self.max_length {
            self.pending.push_str(separator);
            self.pending.push_str(piece);
            self.pending_len += separator_len + piece_len;
        } else {
            self.flush();
            self.pending.push_str(piece);
            self.pending_len = piece_len;
        }
    }

    /// A paragraph too large for one chunk is accumulated sentence by sentence
    fn push_long_paragraph(&mut self, paragraph: &str) {
        self.flush();

        for sentence in sentences(paragraph) {
            if char_len(sentence) > self.max_length {
                self.flush();
                for piece in hard_wrap(sentence, self.max_length) {
                    self.push(&piece, SENTENCE_SEPARATOR);
                }
            } else {
                self.push(sentence, SENTENCE_SEPARATOR);
            }
        }
    }

    fn flush(&mut self) {
        let chunk = self.pending.trim();
        if !chunk.is_empty() {
            self.chunks.push(chunk.to_string());
        }
        self.pending.clear();
        self.pending_len = 0;
    }

    fn finish(mut self) -> Vec<TextChunk> {
        self.flush();
        self.chunks
            .into_iter()
            .enumerate()
            .map(|(index, content)| TextChunk { index, content })
            .collect()
    }
}

/// Paragraphs are separated by one or more blank lines
fn paragraphs(text: &str) -> impl Iterator<Item = &str> {
    paragraph_pattern()
        .split(text)
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
}

/// Split on sentence terminators, keeping the terminator and any closing
/// quotes with the sentence they end
fn sentences(paragraph: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut last_end = 0;

    for mat in sentence_pattern().find_iter(paragraph) {
        let sentence = paragraph[last_end..mat.end()].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        last_end = mat.end();
    }

    let remaining = paragraph[last_end..].trim();
    if !remaining.is_empty() {
        sentences.push(remaining);
    }

    sentences
}

/// Cut an oversized sentence into pieces of at most `max_length` characters.
///
/// Each cut goes at the last whitespace within the window when that
/// whitespace sits in the final 20% of it; otherwise the cut lands exactly
/// on the limit, even mid-word, so every iteration makes progress.
fn hard_wrap(sentence: &str, max_length: usize) -> Vec<String> {
    let min_cut = max_length - max_length / 5;
    let mut pieces = Vec::new();
    let mut rest = sentence.trim();

    while char_len(rest) > max_length {
        let limit = byte_index(rest, max_length);
        let window = &rest[..byte_index(rest, max_length + 1)];

        let cut = window
            .char_indices()
            .enumerate()
            .filter(|(position, (_, c))| {
                c.is_whitespace() && *position > 0 && *position >= min_cut
            })
            .map(|(_, (byte, _))| byte)
            .last()
            .unwrap_or(limit);

        pieces.push(rest[..cut].trim_end().to_string());
        rest = rest[cut..].trim_start();
    }

    if !rest.is_empty() {
        pieces.push(rest.to_string());
    }

    pieces
}

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset of the `position`-th character, or the end of the string
pub(crate) fn byte_index(text: &str, position: usize) -> usize {
    text.char_indices()
        .nth(position)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

fn paragraph_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\n[ \t]*\n\s*").expect("paragraph pattern is valid"))
}

fn sentence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"[.!?]+["'”’»)\]]*\s+|[。！？]+["'”’»)\]」』]*\s*"#)
            .expect("sentence pattern is valid")
    })
}

fn section_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)^\s*(?:chapter|part|section|book|chương|phần|hồi|tập|quyển)\s+(?:thứ\s+)?([\p{L}\d]+)",
        )
        .expect("section pattern is valid")
    })
}

fn roman_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^m{0,3}(cm|cd|d?c{0,3})(xc|xl|l?x{0,3})(ix|iv|v?i{0,3})$")
            .expect("roman numeral pattern is valid")
    })
}
