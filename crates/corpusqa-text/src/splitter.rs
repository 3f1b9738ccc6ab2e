//! Recursive, boundary-aware text splitter.
//!
//! The text is cut at the coarsest separator present (blank line, newline,
//! space) and pieces that are still too long are cut again with the next
//! finer separator, down to single characters. Adjacent pieces are then merged
//! greedily into chunks of at most `chunk_size` characters, carrying up to
//! `overlap` characters of trailing context into the next chunk.
//!
//! Separators stay attached to the start of the piece that follows them, and
//! every chunk is trimmed, so chunks are exact slices of the source text.
use std::collections::VecDeque;

use corpusqa_core::config::ChunkingSettings;
use corpusqa_core::{Error, Result};

const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

/// A chunk and the byte offset where it starts in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan {
    pub start: usize,
    pub text: String,
}

impl TextSpan {
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    overlap: usize,
    separators: &'static [&'static str],
}

#[derive(Clone, Copy)]
struct Piece<'a> {
    start: usize,
    text: &'a str,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidInput("chunk_size must be positive".into()));
        }
        if overlap >= chunk_size {
            return Err(Error::InvalidInput(format!(
                "overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap, separators: DEFAULT_SEPARATORS })
    }

    pub fn from_settings(settings: &ChunkingSettings) -> Result<Self> {
        Self::new(settings.chunk_size, settings.overlap)
    }

    /// Split `text` into ordered chunks. Blank input yields no chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_spans(text).into_iter().map(|span| span.text).collect()
    }

    /// Like [`split`](Self::split), keeping each chunk's source offset.
    pub fn split_spans(&self, text: &str) -> Vec<TextSpan> {
        let mut out = Vec::new();
        if text.trim().is_empty() {
            return out;
        }
        self.split_recursive(text, Piece { start: 0, text }, self.separators, &mut out);
        out
    }

    fn split_recursive<'a>(
        &self,
        root: &'a str,
        piece: Piece<'a>,
        separators: &[&'static str],
        out: &mut Vec<TextSpan>,
    ) {
        let (separator, finer) = choose_separator(piece.text, separators);
        let mut good: Vec<Piece<'a>> = Vec::new();
        for sub in split_keep_start(piece, separator) {
            if char_len(sub.text) < self.chunk_size {
                good.push(sub);
                continue;
            }
            if !good.is_empty() {
                self.merge(root, &good, out);
                good.clear();
            }
            if finer.is_empty() {
                push_trimmed(root, sub.start, sub.start + sub.text.len(), out);
            } else {
                self.split_recursive(root, sub, finer, out);
            }
        }
        if !good.is_empty() {
            self.merge(root, &good, out);
        }
    }

    fn merge(&self, root: &str, pieces: &[Piece<'_>], out: &mut Vec<TextSpan>) {
        let mut current: VecDeque<Piece<'_>> = VecDeque::new();
        let mut total = 0usize;
        for &piece in pieces {
            let len = char_len(piece.text);
            if total + len > self.chunk_size && !current.is_empty() {
                push_joined(root, &current, out);
                while total > self.overlap || (total + len > self.chunk_size && total > 0) {
                    match current.pop_front() {
                        Some(dropped) => total -= char_len(dropped.text),
                        None => break,
                    }
                }
            }
            current.push_back(piece);
            total += len;
        }
        push_joined(root, &current, out);
    }
}

fn choose_separator<'s>(
    text: &str,
    separators: &'s [&'static str],
) -> (&'static str, &'s [&'static str]) {
    for (i, sep) in separators.iter().enumerate() {
        if sep.is_empty() {
            return (*sep, &[]);
        }
        if text.contains(sep) {
            return (*sep, &separators[i + 1..]);
        }
    }
    (separators.last().copied().unwrap_or(""), &[])
}

fn split_keep_start<'a>(piece: Piece<'a>, separator: &str) -> Vec<Piece<'a>> {
    let text = piece.text;
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| Piece { start: piece.start + i, text: &text[i..i + c.len_utf8()] })
            .collect();
    }
    let mut bounds: Vec<usize> = Vec::with_capacity(8);
    bounds.push(0);
    bounds.extend(text.match_indices(separator).map(|(i, _)| i));
    bounds.push(text.len());
    bounds
        .windows(2)
        .filter(|w| w[1] > w[0])
        .map(|w| Piece { start: piece.start + w[0], text: &text[w[0]..w[1]] })
        .collect()
}

// Pieces in `current` are contiguous in `root`.
fn push_joined(root: &str, current: &VecDeque<Piece<'_>>, out: &mut Vec<TextSpan>) {
    if let (Some(first), Some(last)) = (current.front(), current.back()) {
        push_trimmed(root, first.start, last.start + last.text.len(), out);
    }
}

fn push_trimmed(root: &str, start: usize, end: usize, out: &mut Vec<TextSpan>) {
    let raw = &root[start..end];
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }
    let lead = raw.len() - raw.trim_start().len();
    out.push(TextSpan { start: start + lead, text: trimmed.to_string() });
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_yields_nothing() {
        let splitter = TextSplitter::new(10, 2).unwrap();
        assert!(splitter.split("").is_empty());
        assert!(splitter.split(" \n\n \t").is_empty());
    }

    #[test]
    fn short_text_is_one_trimmed_chunk() {
        let splitter = TextSplitter::new(500, 100).unwrap();
        assert_eq!(splitter.split("  Short text.\n"), vec!["Short text."]);
    }

    #[test]
    fn prefers_paragraph_boundaries() {
        let splitter = TextSplitter::new(12, 0).unwrap();
        assert_eq!(splitter.split("para one.\n\npara two."), vec!["para one.", "para two."]);
    }

    #[test]
    fn word_boundaries_with_overlap() {
        let splitter = TextSplitter::new(10, 4).unwrap();
        assert_eq!(
            splitter.split("one two three four five"),
            vec!["one two", "two three", "four five"]
        );
    }

    #[test]
    fn hard_truncation_without_boundaries() {
        let splitter = TextSplitter::new(4, 0).unwrap();
        assert_eq!(splitter.split("abcdefghij"), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let splitter = TextSplitter::new(2, 0).unwrap();
        assert_eq!(splitter.split("ééééé"), vec!["éé", "éé", "é"]);
    }

    #[test]
    fn spans_point_into_source() {
        let text = "alpha beta\n\ngamma delta epsilon";
        let splitter = TextSplitter::new(12, 3).unwrap();
        for span in splitter.split_spans(text) {
            assert_eq!(&text[span.start..span.end()], span.text);
        }
    }

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        assert!(matches!(TextSplitter::new(10, 10), Err(Error::InvalidInput(_))));
        assert!(matches!(TextSplitter::new(0, 0), Err(Error::InvalidInput(_))));
    }
}
