//! Splitting of long input text into provider-sized chunks.
//!
//! Chunks are cut on sentence boundaries first and on word boundaries when a
//! single sentence is too long. Words are never cut. Pieces inside a chunk
//! are joined with a single space, so joining the chunks with a single space
//! gives back the input with whitespace normalized.

use regex::Regex;
use std::sync::OnceLock;

/// Sentence terminator followed by whitespace: `.`, `!`, `?` and the
/// Devanagari danda `।`.
fn sentence_boundary() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[.!?।]\s+").expect("sentence pattern is valid"))
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split `text` into ordered chunks of at most `max_chars` characters.
///
/// Text that already fits is returned untouched as a single chunk, which
/// also means empty input yields one empty chunk. A word longer than
/// `max_chars` is emitted alone as an oversized chunk.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    if char_len(text) <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunker = GreedyChunker::new(max_chars);

    for sentence in split_sentences(text) {
        if char_len(sentence) <= max_chars {
            chunker.push(sentence);
        } else {
            chunker.flush();
            for word in sentence.split_whitespace() {
                chunker.push(word);
            }
        }
    }

    let chunks = chunker.finish();
    if chunks.is_empty() {
        // whitespace-only input has no pieces to emit
        return vec![String::new()];
    }
    chunks
}

/// Sentences with their terminator kept and surrounding whitespace removed
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut last_end = 0;

    for mat in sentence_boundary().find_iter(text) {
        // keep the terminator, drop the whitespace after it
        let terminator_len = mat
            .as_str()
            .chars()
            .next()
            .map(char::len_utf8)
            .unwrap_or(0);
        let sentence = text[last_end..mat.start() + terminator_len].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        last_end = mat.end();
    }

    let remaining = text[last_end..].trim();
    if !remaining.is_empty() {
        sentences.push(remaining);
    }

    sentences
}

/// Accumulates pieces into a running chunk, closing it when the next piece
/// would push it past the limit.
struct GreedyChunker {
    max_chars: usize,
    chunks: Vec<String>,
    current: String,
    current_len: usize,
}

impl GreedyChunker {
    fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            chunks: Vec::new(),
            current: String::new(),
            current_len: 0,
        }
    }

    fn push(&mut self, piece: &str) {
        let piece_len = char_len(piece);
        if piece_len == 0 {
            return;
        }

        if self.current_len > 0 && self.current_len + 1 + piece_len > self.max_chars {
            self.flush();
        }

        if self.current_len > 0 {
            self.current.push(' ');
            self.current_len += 1;
        }
        self.current.push_str(piece);
        self.current_len += piece_len;
    }

    fn flush(&mut self) {
        if self.current_len > 0 {
            self.chunks.push(std::mem::take(&mut self.current));
            self.current_len = 0;
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}
