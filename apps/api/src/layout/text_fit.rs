//! Text Fitter: height estimation and budget truncation without a shaping pass.
//!
//! Height is estimated from a character count and one average glyph width per
//! font family. The result is an approximation: callers must not rely on it as
//! an exact measurement, only as a stable, monotone estimate of how much room a
//! block needs.

use crate::layout::font_metrics::FontFamily;

const ELLIPSIS: &str = "...";
const ELLIPSIS_LEN: usize = 3;

/// When a word-boundary cut keeps less than this share of the budget, the cut
/// is made at the exact character budget instead.
const WORD_CUT_MIN_SHARE: f32 = 0.8;

// ────────────────────────────────────────────────────────────────────────────
// Height estimation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextFitter {
    /// Average glyph width in em.
    glyph_width_em: f32,
}

impl TextFitter {
    pub fn new(font: FontFamily) -> Self {
        Self::with_glyph_width(font.average_glyph_width())
    }

    pub fn with_glyph_width(glyph_width_em: f32) -> Self {
        Self { glyph_width_em }
    }

    /// Approximate number of characters that fit on one line. Never zero.
    pub fn chars_per_line(&self, font_size: f32, max_width: f32) -> usize {
        let glyph = font_size * self.glyph_width_em;
        if glyph <= 0.0 || !glyph.is_finite() || max_width <= 0.0 {
            return 1;
        }
        ((max_width / glyph).floor() as usize).max(1)
    }

    /// Estimated number of wrapped lines. Blank text occupies zero lines.
    pub fn estimate_lines(&self, text: &str, font_size: f32, max_width: f32) -> usize {
        let len = text.trim().chars().count();
        if len == 0 {
            return 0;
        }
        len.div_ceil(self.chars_per_line(font_size, max_width))
    }

    /// Estimated rendered height of `text` wrapped at `max_width`.
    pub fn estimate_height(
        &self,
        text: &str,
        font_size: f32,
        line_height: f32,
        max_width: f32,
    ) -> f32 {
        self.estimate_lines(text, font_size, max_width) as f32 * line_box(font_size, line_height)
    }
}

/// Height of a single line at the given font size and line-height multiplier.
pub fn line_box(font_size: f32, line_height: f32) -> f32 {
    (font_size * line_height).max(0.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Truncation
// ────────────────────────────────────────────────────────────────────────────

/// Cuts `text` to at most `max_chars` characters.
///
/// With `preserve_sentences`, keeps the longest run of whole leading sentences
/// that fits. Otherwise, or when not even the first sentence fits, cuts at the
/// last word boundary and appends an ellipsis; if that boundary would keep
/// less than 80% of the budget the cut lands on the exact budget instead.
///
/// Idempotent: truncating an already truncated string returns it unchanged.
pub fn truncate(text: &str, max_chars: usize, preserve_sentences: bool) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }

    if preserve_sentences {
        if let Some(kept) = whole_sentences(text, max_chars) {
            return kept;
        }
    }

    hard_cut(text, max_chars)
}

fn whole_sentences(text: &str, max_chars: usize) -> Option<String> {
    let mut kept = String::new();
    let mut kept_len = 0usize;

    for sentence in split_sentences(text) {
        let sentence_len = sentence.chars().count();
        let joined_len = if kept.is_empty() {
            sentence_len
        } else {
            kept_len + 1 + sentence_len
        };
        if joined_len > max_chars {
            break;
        }
        if !kept.is_empty() {
            kept.push(' ');
        }
        kept.push_str(sentence);
        kept_len = joined_len;
    }

    if kept.is_empty() {
        return None;
    }
    Some(close_sentence(kept, max_chars))
}

/// Splits on `.`, `!` or `?` followed by whitespace. Terminal punctuation stays
/// with its sentence; the unterminated tail is returned as the last item.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0usize;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if matches!(ch, '.' | '!' | '?') {
            if let Some(&(_, next)) = chars.peek() {
                if next.is_whitespace() {
                    let end = idx + ch.len_utf8();
                    let sentence = text[start..end].trim();
                    if !sentence.is_empty() {
                        sentences.push(sentence);
                    }
                    start = end;
                }
            }
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

fn close_sentence(mut kept: String, max_chars: usize) -> String {
    let trimmed_len = kept
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':'))
        .len();
    kept.truncate(trimmed_len);

    let terminated = kept.ends_with(['.', '!', '?']);
    if !terminated && kept.chars().count() < max_chars {
        kept.push('.');
    }
    kept
}

fn hard_cut(text: &str, max_chars: usize) -> String {
    if max_chars <= ELLIPSIS_LEN {
        return text.chars().take(max_chars).collect::<String>().trim_end().to_string();
    }

    let budget = max_chars - ELLIPSIS_LEN;
    let prefix: String = text.chars().take(budget).collect();
    let lands_on_boundary = text
        .chars()
        .nth(budget)
        .map(char::is_whitespace)
        .unwrap_or(true);

    let word_cut = if lands_on_boundary {
        prefix.trim_end()
    } else {
        match prefix.rfind(char::is_whitespace) {
            Some(idx) => prefix[..idx].trim_end(),
            None => "",
        }
    };

    let min_kept = (budget as f32 * WORD_CUT_MIN_SHARE).ceil() as usize;
    let body = if word_cut.chars().count() >= min_kept {
        word_cut
    } else {
        prefix.trim_end()
    };
    format!("{body}{ELLIPSIS}")
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const LOREM: &str = "Led the platform team through a full migration to Kubernetes. \
        Reduced deployment time by 70% across forty services! Built internal tooling \
        for on-call rotations? Mentored six engineers who were later promoted.";

    fn fitter() -> TextFitter {
        TextFitter::with_glyph_width(0.5)
    }

    #[test]
    fn test_chars_per_line_uses_glyph_width() {
        // 100pt / (10pt * 0.5) = 20 chars
        assert_eq!(fitter().chars_per_line(10.0, 100.0), 20);
    }

    #[test]
    fn test_chars_per_line_never_zero() {
        assert_eq!(fitter().chars_per_line(10.0, 0.0), 1);
        assert_eq!(fitter().chars_per_line(0.0, 100.0), 1);
        assert_eq!(fitter().chars_per_line(500.0, 10.0), 1);
    }

    #[test]
    fn test_estimate_height_rounds_lines_up() {
        let text = "a".repeat(21);
        let height = fitter().estimate_height(&text, 10.0, 1.2, 100.0);
        assert!((height - 24.0).abs() < 1e-4, "two lines of 12pt, got {height}");
    }

    #[test]
    fn test_estimate_height_empty_text_is_zero() {
        assert_eq!(fitter().estimate_height("   ", 10.0, 1.2, 100.0), 0.0);
    }

    #[test]
    fn test_estimate_grows_with_font_size() {
        let small = fitter().estimate_height(LOREM, 9.0, 1.3, 300.0);
        let large = fitter().estimate_height(LOREM, 12.0, 1.3, 300.0);
        assert!(large > small);
    }

    #[test]
    fn test_short_text_returned_trimmed() {
        assert_eq!(truncate("  Shipped it.  ", 50, true), "Shipped it.");
    }

    #[test]
    fn test_sentence_preserving_cut_ends_on_boundary() {
        let out = truncate(LOREM, 120, true);
        assert!(out.chars().count() <= 120);
        assert_eq!(
            out,
            "Led the platform team through a full migration to Kubernetes. \
             Reduced deployment time by 70% across forty services!"
        );
    }

    #[test]
    fn test_first_sentence_too_long_falls_back_to_word_cut() {
        let out = truncate(LOREM, 40, true);
        assert!(out.ends_with("..."));
        assert!(out.chars().count() <= 40);
        assert_eq!(out, "Led the platform team through a full...");
    }

    #[test]
    fn test_word_cut_without_sentence_preservation() {
        let out = truncate("alpha beta gamma delta epsilon", 20, false);
        assert_eq!(out, "alpha beta gamma...");
    }

    #[test]
    fn test_short_word_cut_falls_back_to_exact_budget() {
        // The only boundary keeps 2 of 17 budget chars, well under 80%.
        let out = truncate("ab cdefghijklmnopqrstuvwxyz", 20, false);
        assert_eq!(out, "ab cdefghijklmnop...");
        assert_eq!(out.chars().count(), 20);
    }

    #[test]
    fn test_tiny_budgets() {
        assert_eq!(truncate("abcdef", 0, false), "");
        assert_eq!(truncate("abcdef", 2, true), "ab");
        assert_eq!(truncate("abcdef", 3, false), "abc");
    }

    #[test]
    fn test_truncate_bound_holds_for_every_budget() {
        let inputs = vec![
            LOREM.to_string(),
            "word ".repeat(80),
            "x".repeat(300),
            "é ü ß ".repeat(40),
        ];
        for text in &inputs {
            for n in 1..=260 {
                for preserve in [true, false] {
                    let out = truncate(text, n, preserve);
                    assert!(
                        out.chars().count() <= n,
                        "n={n} preserve={preserve} produced {} chars",
                        out.chars().count()
                    );
                }
            }
        }
    }

    #[test]
    fn test_truncate_is_idempotent() {
        let inputs = [LOREM.to_string(), "word ".repeat(80), "no boundaries".repeat(30)];
        for text in &inputs {
            for n in [1, 5, 17, 40, 64, 120, 199, 525] {
                for preserve in [true, false] {
                    let once = truncate(text, n, preserve);
                    let twice = truncate(&once, n, preserve);
                    assert_eq!(once, twice, "n={n} preserve={preserve}");
                }
            }
        }
    }

    #[test]
    fn test_multibyte_text_is_cut_on_char_boundaries() {
        let text = "Überarbeitete die Architektur für größere Lasten und schnellere Antworten";
        let out = truncate(text, 30, false);
        assert!(out.chars().count() <= 30);
        assert!(out.ends_with("..."));
    }
}
