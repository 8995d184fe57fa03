//! Line stapler: partitions source text into styled and unstyled spans
//!
//! The output is gapless. Concatenating every span's text reproduces the
//! input exactly, with each `\n` separator emitted as its own unstyled span.

use serde::Serialize;
use tracing::debug;

use crate::encoding::TextPositionEncoding;
use crate::error::{HighlightError, Result, StreamKind};
use crate::metrics::metrics;
use crate::tokens::{AbsoluteToken, OrderCheck};

/// Separator between lines, emitted as a span of its own
pub const LINE_BREAK: &str = "\n";

/// A slice of the source text, styled when it carries a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span<'t> {
    pub text: &'t str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<AbsoluteToken>,
}

impl<'t> Span<'t> {
    pub fn plain(text: &'t str) -> Self {
        Self { text, token: None }
    }

    pub fn styled(text: &'t str, token: AbsoluteToken) -> Self {
        Self {
            text,
            token: Some(token),
        }
    }

    pub fn is_line_break(&self) -> bool {
        self.token.is_none() && self.text == LINE_BREAK
    }
}

/// Cursor over the source lines, in `encoding` units
struct Cursor<'t, 'l> {
    lines: &'l [&'t str],
    encoding: TextPositionEncoding,
    line: usize,
    column: usize,
    spans: Vec<Span<'t>>,
}

impl<'t> Cursor<'t, '_> {
    fn slice(&self, start: usize, end: usize) -> Result<&'t str> {
        let line: &'t str = self.lines[self.line];
        self.encoding
            .slice(line, start, end)
            .map_err(|e| e.on_line(self.line))
    }

    /// Emit the rest of the current line and its separator, then move to the
    /// start of the next line.
    fn drain_line(&mut self) -> Result<()> {
        let line = self.lines[self.line];
        let rest = self.slice(self.column, self.encoding.line_length(line))?;
        if !rest.is_empty() {
            self.spans.push(Span::plain(rest));
        }
        if self.line + 1 < self.lines.len() {
            self.spans.push(Span::plain(LINE_BREAK));
        }
        self.line += 1;
        self.column = 0;
        Ok(())
    }

    fn advance_to_line(&mut self, target: usize) -> Result<()> {
        while self.line < target {
            self.drain_line()?;
        }
        Ok(())
    }
}

/// Partition `lines` into spans aligned to `tokens`
///
/// `tokens` must be ordered and non-overlapping (as produced by
/// [`merge`](crate::merge::merge)), with positions in `encoding` units.
/// `lines` is the source split on `\n`. A token reaching past its line's end
/// or onto a missing line is an error, never clamped.
pub fn staple<'t>(
    tokens: &[AbsoluteToken],
    lines: &[&'t str],
    encoding: TextPositionEncoding,
) -> Result<Vec<Span<'t>>> {
    let mut order = OrderCheck::default();
    let mut cursor = Cursor {
        lines,
        encoding,
        line: 0,
        column: 0,
        spans: Vec::with_capacity(tokens.len() * 2 + lines.len() * 2),
    };

    for (position, token) in tokens.iter().enumerate() {
        order.accept(token, StreamKind::Merged, position)?;
        if token.line >= lines.len() {
            return Err(HighlightError::LineOutOfRange {
                line: token.line,
                line_count: lines.len(),
            });
        }

        cursor.advance_to_line(token.line)?;
        if token.start_char > cursor.column {
            let gap = cursor.slice(cursor.column, token.start_char)?;
            cursor.spans.push(Span::plain(gap));
        }
        let text = cursor.slice(token.start_char, token.end_char())?;
        cursor.spans.push(Span::styled(text, token.clone()));
        cursor.column = token.end_char();
    }
    cursor.advance_to_line(lines.len())?;

    let spans = cursor.spans;
    metrics().record_stapled_spans(spans.len() as u64);
    debug!("Stapled {} tokens over {} lines into {} spans", tokens.len(), lines.len(), spans.len());
    Ok(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding;
    use quickcheck::{QuickCheck, TestResult};
    use test_utils::tokens::generator::GeneratedHighlight;

    fn texts<'a>(spans: &'a [Span<'_>]) -> Vec<(&'a str, bool)> {
        spans.iter().map(|s| (s.text, s.token.is_some())).collect()
    }

    #[test]
    fn test_token_at_end_of_second_line() {
        let lines = ["ab", "cdef"];
        let tokens = [AbsoluteToken::new(1, 2, 2, "keyword")];

        let spans = staple(&tokens, &lines, TextPositionEncoding::Utf16).unwrap();
        assert_eq!(
            texts(&spans),
            vec![("ab", false), ("\n", false), ("cd", false), ("ef", true)]
        );
        assert_eq!(spans[3].token.as_ref(), Some(&tokens[0]));
        assert!(spans[1].is_line_break());
    }

    #[test]
    fn test_no_tokens_reproduces_lines() {
        let lines = ["fn main() {", "", "}"];
        let spans = staple(&[], &lines, TextPositionEncoding::Utf16).unwrap();
        assert_eq!(
            texts(&spans),
            vec![("fn main() {", false), ("\n", false), ("\n", false), ("}", false)]
        );
    }

    #[test]
    fn test_trailing_empty_line_keeps_separator() {
        let lines = ["x", ""];
        let spans = staple(&[AbsoluteToken::new(0, 0, 1, "variable")], &lines, TextPositionEncoding::Utf16).unwrap();
        assert_eq!(texts(&spans), vec![("x", true), ("\n", false)]);
    }

    #[test]
    fn test_zero_width_token_yields_empty_styled_span() {
        let lines = ["ab"];
        let spans = staple(&[AbsoluteToken::new(0, 1, 0, "marker")], &lines, TextPositionEncoding::Utf16).unwrap();
        assert_eq!(texts(&spans), vec![("a", false), ("", true), ("b", false)]);
    }

    #[test]
    fn test_surrogate_pairs_sliced_by_utf16_units() {
        // "😀" occupies two UTF-16 units
        let lines = ["😀 = \"é\""];
        let tokens = [
            AbsoluteToken::new(0, 0, 2, "variable"),
            AbsoluteToken::new(0, 5, 3, "string"),
        ];

        let spans = staple(&tokens, &lines, TextPositionEncoding::Utf16).unwrap();
        assert_eq!(
            texts(&spans),
            vec![("😀", true), (" = ", false), ("\"é\"", true)]
        );
    }

    #[test]
    fn test_byte_encoding_slices_by_bytes() {
        let lines = ["é = 1"];
        let tokens = [AbsoluteToken::new(0, 0, 2, "variable")];

        let spans = staple(&tokens, &lines, TextPositionEncoding::Byte).unwrap();
        assert_eq!(texts(&spans), vec![("é", true), (" = 1", false)]);
    }

    #[test]
    fn test_token_past_line_end_is_rejected() {
        let lines = ["abc"];
        let err = staple(&[AbsoluteToken::new(0, 2, 5, "x")], &lines, TextPositionEncoding::Utf16).unwrap_err();
        assert!(matches!(
            err,
            HighlightError::EncodingBoundary { line: Some(0), index: 7, .. }
        ));
    }

    #[test]
    fn test_token_splitting_surrogate_pair_is_rejected() {
        let lines = ["😀"];
        let err = staple(&[AbsoluteToken::new(0, 0, 1, "x")], &lines, TextPositionEncoding::Utf16).unwrap_err();
        assert!(matches!(err, HighlightError::EncodingBoundary { .. }));
    }

    #[test]
    fn test_missing_line_is_rejected() {
        let lines = ["a", "b"];
        let err = staple(&[AbsoluteToken::new(2, 0, 1, "x")], &lines, TextPositionEncoding::Utf16).unwrap_err();
        assert_eq!(err, HighlightError::LineOutOfRange { line: 2, line_count: 2 });
    }

    #[test]
    fn test_overlapping_tokens_are_rejected() {
        let lines = ["abcdef"];
        let tokens = [AbsoluteToken::new(0, 0, 3, "a"), AbsoluteToken::new(0, 1, 1, "b")];
        let err = staple(&tokens, &lines, TextPositionEncoding::Utf16).unwrap_err();
        assert!(matches!(
            err,
            HighlightError::OrderingViolation {
                stream: StreamKind::Merged,
                position: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_prop_spans_reconstruct_text() {
        fn prop(generated: GeneratedHighlight) -> TestResult {
            let lines: Vec<&str> = generated.lines.iter().map(String::as_str).collect();
            let text = generated.text();

            for target in TextPositionEncoding::ALL {
                let mut tokens = Vec::with_capacity(generated.spans.len());
                for span in &generated.spans {
                    let line = lines[span.line];
                    let to_target =
                        |i| encoding::convert(line, i, TextPositionEncoding::Scalar, target);
                    let (start, end) = match (to_target(span.start), to_target(span.end)) {
                        (Ok(start), Ok(end)) => (start, end),
                        _ => return TestResult::failed(),
                    };
                    tokens.push(AbsoluteToken::new(span.line, start, end - start, "t"));
                }

                let spans = match staple(&tokens, &lines, target) {
                    Ok(spans) => spans,
                    Err(_) => return TestResult::failed(),
                };
                let rebuilt: String = spans.iter().map(|s| s.text).collect();
                let styled = spans.iter().filter(|s| s.token.is_some()).count();
                if rebuilt != text || styled != tokens.len() {
                    return TestResult::failed();
                }
            }
            TestResult::passed()
        }
        QuickCheck::new().quickcheck(prop as fn(GeneratedHighlight) -> TestResult);
    }
}
