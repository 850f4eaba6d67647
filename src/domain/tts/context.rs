use super::chunker::{byte_index, char_len, TextChunk};

/// Neighbor text passed to the provider for tone continuity; never read aloud
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthesisContext {
    pub previous_excerpt: String,
    pub next_excerpt: String,
}

impl SynthesisContext {
    pub fn is_empty(&self) -> bool {
        self.previous_excerpt.is_empty() && self.next_excerpt.is_empty()
    }
}

/// Derive the bounded look-back and look-ahead excerpts for `chunks[index]`
pub fn build(chunks: &[TextChunk], index: usize, budget: usize) -> SynthesisContext {
    let previous_excerpt = index
        .checked_sub(1)
        .and_then(|previous| chunks.get(previous))
        .map(|chunk| trailing_excerpt(&chunk.content, budget))
        .unwrap_or_default();

    let next_excerpt = chunks
        .get(index + 1)
        .map(|chunk| leading_excerpt(&chunk.content, budget))
        .unwrap_or_default();

    SynthesisContext {
        previous_excerpt,
        next_excerpt,
    }
}

/// Last `budget` characters, dropping a leading partial word
fn trailing_excerpt(text: &str, budget: usize) -> String {
    if budget == 0 {
        return String::new();
    }

    let total = char_len(text);
    if total <= budget {
        return text.trim().to_string();
    }

    let start = byte_index(text, total - budget);
    let slice = &text[start..];
    let cut_inside_word = !text[..start].ends_with(char::is_whitespace)
        && !slice.starts_with(char::is_whitespace);

    let slice = match slice.find(char::is_whitespace) {
        Some(position) if cut_inside_word && !slice[position..].trim().is_empty() => {
            &slice[position..]
        }
        _ => slice,
    };

    slice.trim().to_string()
}

/// First `budget` characters, dropping a trailing partial word
fn leading_excerpt(text: &str, budget: usize) -> String {
    if budget == 0 {
        return String::new();
    }

    if char_len(text) <= budget {
        return text.trim().to_string();
    }

    let end = byte_index(text, budget);
    let slice = &text[..end];
    let cut_inside_word =
        !text[end..].starts_with(char::is_whitespace) && !slice.ends_with(char::is_whitespace);

    let slice = match slice.rfind(char::is_whitespace) {
        Some(position) if cut_inside_word && !slice[..position].trim().is_empty() => {
            &slice[..position]
        }
        _ => slice,
    };

    slice.trim().to_string()
}
