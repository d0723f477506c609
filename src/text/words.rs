//! Word boundary navigation over code-point indices.
//!
//! Boundaries follow Unicode word segmentation (UAX #29) via
//! `unicode-segmentation`; a "word" is any segment containing an alphanumeric
//! code point or `_`.

use unicode_segmentation::UnicodeSegmentation;

/// A word segment as a code-point range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Segment {
    start: usize,
    end: usize,
    is_word: bool,
}

fn segments(text: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut char_pos = 0;
    for piece in text.split_word_bounds() {
        let len = piece.chars().count();
        out.push(Segment {
            start: char_pos,
            end: char_pos + len,
            is_word: piece.chars().any(|c| c.is_alphanumeric() || c == '_'),
        });
        char_pos += len;
    }
    out
}

/// Offset of the end of the next word at or after `pos`.
#[must_use]
pub fn next_word_boundary(text: &str, pos: usize) -> usize {
    let segs = segments(text);
    let total = segs.last().map_or(0, |s| s.end);
    segs.iter()
        .find(|s| s.is_word && s.end > pos)
        .map_or(total, |s| s.end)
}

/// Offset of the start of the word before `pos`.
#[must_use]
pub fn prev_word_boundary(text: &str, pos: usize) -> usize {
    segments(text)
        .iter()
        .rev()
        .find(|s| s.is_word && s.start < pos)
        .map_or(0, |s| s.start)
}

/// Code-point range of the word (or non-word run) containing `pos`.
#[must_use]
pub fn word_range_at(text: &str, pos: usize) -> (usize, usize) {
    let segs = segments(text);
    if let Some(seg) = segs.iter().find(|s| pos >= s.start && pos < s.end) {
        return (seg.start, seg.end);
    }
    // At the end of the text: select the last segment.
    segs.last().map_or((pos, pos), |s| (s.start, s.end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_boundary() {
        let text = "hello, brave world";
        assert_eq!(next_word_boundary(text, 0), 5);
        assert_eq!(next_word_boundary(text, 5), 12);
        assert_eq!(next_word_boundary(text, 13), 18);
        assert_eq!(next_word_boundary(text, 18), 18);
    }

    #[test]
    fn test_prev_boundary() {
        let text = "hello, brave world";
        assert_eq!(prev_word_boundary(text, 18), 13);
        assert_eq!(prev_word_boundary(text, 13), 7);
        assert_eq!(prev_word_boundary(text, 7), 0);
        assert_eq!(prev_word_boundary(text, 0), 0);
    }

    #[test]
    fn test_word_range() {
        let text = "foo bar";
        assert_eq!(word_range_at(text, 1), (0, 3));
        assert_eq!(word_range_at(text, 3), (3, 4));
        assert_eq!(word_range_at(text, 7), (4, 7));
        assert_eq!(word_range_at("", 0), (0, 0));
    }

    #[test]
    fn test_non_ascii_words() {
        let text = "naïve café";
        assert_eq!(next_word_boundary(text, 0), 5);
        assert_eq!(prev_word_boundary(text, 10), 6);
    }
}
