//! Line breaking and alignment for `draw_text_in_rect`.
//!
//! Both backends lay out rectangle text through [`layout_in_rect`], so the
//! wrap points and line positions are identical across backends.

use crate::geometry::RectF;
use crate::style::{TextAlign, TextStyle, VerticalAlign, WrapMode};
use crate::text::FontMetrics;

/// A wrapped line as a code-point range of the source text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineSpan {
    /// First code point (inclusive).
    pub start: usize,
    /// Last code point (exclusive), trailing break whitespace excluded.
    pub end: usize,
    pub width: f64,
    /// Whether the line ends at a hard `\n` or the end of text.
    pub hard_break: bool,
}

/// A run of text placed at an absolute position.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f64,
    /// Baseline y.
    pub baseline: f64,
}

/// Break `text` into lines no wider than `max_width` (when wrapping).
#[must_use]
pub fn break_lines(text: &str, metrics: &FontMetrics, max_width: f64, wrap: WrapMode) -> Vec<LineSpan> {
    let chars: Vec<char> = text.chars().collect();
    let mut lines = Vec::new();
    let mut para_start = 0;

    loop {
        let para_end = chars[para_start..]
            .iter()
            .position(|&c| c == '\n')
            .map_or(chars.len(), |p| para_start + p);
        break_paragraph(&chars, para_start, para_end, metrics, max_width, wrap, &mut lines);
        if para_end >= chars.len() {
            break;
        }
        para_start = para_end + 1;
    }
    lines
}

fn break_paragraph(
    chars: &[char],
    start: usize,
    end: usize,
    metrics: &FontMetrics,
    max_width: f64,
    wrap: WrapMode,
    out: &mut Vec<LineSpan>,
) {
    let width_of = |a: usize, b: usize| chars[a..b].iter().map(|&c| metrics.char_advance(c)).sum::<f64>();

    if wrap == WrapMode::None || max_width <= 0.0 {
        out.push(LineSpan {
            start,
            end,
            width: width_of(start, end),
            hard_break: true,
        });
        return;
    }

    let mut line_start = start;
    while line_start < end || line_start == start {
        let mut width = 0.0;
        let mut idx = line_start;
        let mut last_space: Option<usize> = None;
        while idx < end {
            let advance = metrics.char_advance(chars[idx]);
            if width + advance > max_width && idx > line_start {
                break;
            }
            if chars[idx] == ' ' {
                last_space = Some(idx);
            }
            width += advance;
            idx += 1;
        }

        if idx >= end {
            out.push(LineSpan {
                start: line_start,
                end,
                width: width_of(line_start, end),
                hard_break: true,
            });
            return;
        }

        let (line_end, next_start) = match (wrap, last_space) {
            (WrapMode::Word, Some(space)) if space > line_start => (space, space + 1),
            _ => (idx, idx),
        };
        out.push(LineSpan {
            start: line_start,
            end: line_end,
            width: width_of(line_start, line_end),
            hard_break: false,
        });
        line_start = next_start;
        // Skip the remaining spaces that would otherwise start the next line.
        while line_start < end && chars[line_start] == ' ' && wrap == WrapMode::Word {
            line_start += 1;
        }
        if line_start >= end {
            return;
        }
    }
}

/// Lay out `text` inside `rect` honouring alignment, vertical alignment and
/// wrapping. Returns positioned runs ready for `draw_text`.
#[must_use]
pub fn layout_in_rect(text: &str, style: &TextStyle, rect: RectF) -> Vec<TextRun> {
    let metrics = FontMetrics::for_font(&style.font).with_line_spacing(style.line_spacing);
    let lines = break_lines(text, &metrics, rect.width, style.wrap);
    let chars: Vec<char> = text.chars().collect();
    let line_height = metrics.line_height();
    let block_height = line_height * lines.len() as f64;

    let top = match style.vertical_align {
        VerticalAlign::Top => rect.y,
        VerticalAlign::Middle => rect.y + (rect.height - block_height) / 2.0,
        VerticalAlign::Bottom => rect.bottom() - block_height,
    };
    // Center the glyph box inside the line box.
    let half_leading = (line_height - metrics.ascent() - metrics.descent()) / 2.0;

    let mut runs = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let baseline = top + line_height * i as f64 + half_leading + metrics.ascent();
        let line_text: String = chars[line.start..line.end].iter().collect();
        let slack = (rect.width - line.width).max(0.0);

        match style.align {
            TextAlign::Justify if !line.hard_break => {
                justify_line(&line_text, &metrics, rect.x, baseline, slack, &mut runs);
            }
            TextAlign::Left | TextAlign::Justify => runs.push(TextRun {
                text: line_text,
                x: rect.x,
                baseline,
            }),
            TextAlign::Center => runs.push(TextRun {
                text: line_text,
                x: rect.x + slack / 2.0,
                baseline,
            }),
            TextAlign::Right => runs.push(TextRun {
                text: line_text,
                x: rect.x + slack,
                baseline,
            }),
        }
    }
    runs
}

fn justify_line(line: &str, metrics: &FontMetrics, x: f64, baseline: f64, slack: f64, runs: &mut Vec<TextRun>) {
    let words: Vec<&str> = line.split(' ').filter(|w| !w.is_empty()).collect();
    if words.len() < 2 {
        runs.push(TextRun {
            text: line.to_string(),
            x,
            baseline,
        });
        return;
    }
    let gaps = (words.len() - 1) as f64;
    let words_width: f64 = words.iter().map(|w| metrics.text_width(w)).sum();
    let natural_gap = metrics.char_advance(' ');
    let total_gap = (metrics.text_width(line) - words_width).max(natural_gap * gaps) + slack;
    let gap = total_gap / gaps;

    let mut cursor = x;
    for word in words {
        runs.push(TextRun {
            text: word.to_string(),
            x: cursor,
            baseline,
        });
        cursor += metrics.text_width(word) + gap;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::style::FontStyle;

    fn metrics() -> FontMetrics {
        FontMetrics::for_font(&FontStyle::new("Mono", 10.0))
    }

    #[test]
    fn test_no_wrap_keeps_paragraphs() {
        let lines = break_lines("one\ntwo three", &metrics(), 10.0, WrapMode::None);
        assert_eq!(lines.len(), 2);
        assert_eq!((lines[1].start, lines[1].end), (4, 13));
    }

    #[test]
    fn test_word_wrap() {
        // 6px per char: "hello world" is 66px; 40px fits "hello".
        let lines = break_lines("hello world", &metrics(), 40.0, WrapMode::Word);
        assert_eq!(lines.len(), 2);
        assert_eq!((lines[0].start, lines[0].end), (0, 5));
        assert_eq!((lines[1].start, lines[1].end), (6, 11));
        assert!(!lines[0].hard_break);
        assert!(lines[1].hard_break);
    }

    #[test]
    fn test_char_wrap_long_word() {
        let lines = break_lines("abcdefghij", &metrics(), 24.0, WrapMode::Word);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].end - lines[0].start, 4);
        assert_eq!(lines[2].end, 10);
    }

    #[test]
    fn test_empty_text_has_one_line() {
        let lines = break_lines("", &metrics(), 24.0, WrapMode::Word);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].width, 0.0);
    }

    #[test]
    fn test_alignment_offsets() {
        let style = TextStyle::builder()
            .font(FontStyle::new("Mono", 10.0))
            .align(TextAlign::Right)
            .build();
        let runs = layout_in_rect("ab", &style, RectF::new(0.0, 0.0, 100.0, 20.0));
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].x, 88.0);

        let centered = TextStyle {
            align: TextAlign::Center,
            ..style
        };
        let runs = layout_in_rect("ab", &centered, RectF::new(0.0, 0.0, 100.0, 20.0));
        assert_eq!(runs[0].x, 44.0);
    }

    #[test]
    fn test_vertical_middle() {
        let style = TextStyle::builder()
            .font(FontStyle::new("Mono", 10.0))
            .vertical_align(VerticalAlign::Middle)
            .build();
        let runs = layout_in_rect("x", &style, RectF::new(0.0, 0.0, 50.0, 52.0));
        // Line box 12px centered in 52px: top 20, baseline 20 + 1 + 8.
        assert!((runs[0].baseline - 29.0).abs() < 1e-9);
    }

    #[test]
    fn test_justify_spreads_words() {
        let style = TextStyle::builder()
            .font(FontStyle::new("Mono", 10.0))
            .align(TextAlign::Justify)
            .wrap(WrapMode::Word)
            .build();
        let runs = layout_in_rect("aa bb cc dd", &style, RectF::new(0.0, 0.0, 60.0, 100.0));
        // First line "aa bb cc" is justified to 60px, last line left aligned.
        assert_eq!(runs[0].text, "aa");
        assert_eq!(runs[2].text, "cc");
        assert!((runs[2].x + 12.0 - 60.0).abs() < 1e-9);
        assert_eq!(runs.last().unwrap().text, "dd");
        assert_eq!(runs.last().unwrap().x, 0.0);
    }
}
