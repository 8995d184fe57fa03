//! Random text and token layouts for property-based testing.
//!
//! The generators here produce plain data (strings, index triples) rather than
//! highlighter types, so property tests map them onto whichever token model
//! they exercise. Text deliberately mixes one- to four-byte characters,
//! including characters outside the Basic Multilingual Plane, so every
//! position encoding disagrees with the others somewhere in a typical line.
//!
//! Token layouts are generated already ordered and non-overlapping, which is
//! the shape both analyzers are trusted to produce.

use quickcheck::{Arbitrary, Gen};

const MAX_LINES: usize = 12;
const MAX_LINE_CHARS: usize = 24;
const MAX_TOKENS: usize = 40;
const MAX_TOKENS_PER_LINE: usize = 5;

/// Characters lines are built from: ASCII, markup-sensitive characters that
/// the renderer escapes, and multi-byte characters of every UTF-8 width.
const ALPHABET: &[char] = &[
    'a', 'b', 'x', 'Z', '0', '_', ' ', '\t', '\r', '<', '>', '&', '"', '\'', 'é', 'ß', '€', '中', '😀',
    '🦀',
];

fn below(g: &mut Gen, bound: usize) -> usize {
    if bound == 0 {
        0
    } else {
        usize::arbitrary(g) % bound
    }
}

fn gen_line(g: &mut Gen) -> String {
    let len = below(g, MAX_LINE_CHARS + 1);
    (0..len).map(|_| *g.choose(ALPHABET).unwrap()).collect()
}

/// A single line of text without line separators.
#[derive(Clone, Debug)]
pub struct GeneratedLine(pub String);

impl GeneratedLine {
    pub fn text(&self) -> String {
        self.0.clone()
    }
}

impl Arbitrary for GeneratedLine {
    fn arbitrary(g: &mut Gen) -> Self {
        GeneratedLine(gen_line(g))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.0.shrink().filter(|s| !s.contains('\n')).map(GeneratedLine))
    }
}

/// A document of one or more lines.
#[derive(Clone, Debug)]
pub struct GeneratedDocument {
    pub lines: Vec<String>,
}

impl GeneratedDocument {
    /// The document text with lines joined by `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl Arbitrary for GeneratedDocument {
    fn arbitrary(g: &mut Gen) -> Self {
        let count = 1 + below(g, MAX_LINES);
        GeneratedDocument {
            lines: (0..count).map(|_| gen_line(g)).collect(),
        }
    }
}

/// A token position on an abstract grid, with an arbitrary type selector and
/// modifier bitmask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedToken {
    pub line: usize,
    pub start: usize,
    pub length: usize,
    pub kind: u32,
    pub modifier_bits: u32,
}

impl GeneratedToken {
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// An ordered, non-overlapping token stream on an abstract grid. Zero-length
/// tokens occur regularly.
#[derive(Clone, Debug)]
pub struct GeneratedTokens {
    pub tokens: Vec<GeneratedToken>,
}

impl Arbitrary for GeneratedTokens {
    fn arbitrary(g: &mut Gen) -> Self {
        let count = below(g, MAX_TOKENS + 1);
        let mut tokens = Vec::with_capacity(count);
        let mut line = 0;
        let mut column = 0;

        for _ in 0..count {
            if bool::arbitrary(g) {
                line += 1 + below(g, 3);
                column = 0;
            }
            let start = column + below(g, 4);
            let length = below(g, 6);
            tokens.push(GeneratedToken {
                line,
                start,
                length,
                kind: u32::arbitrary(g),
                modifier_bits: u32::arbitrary(g),
            });
            column = start + length;
        }

        GeneratedTokens { tokens }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        // Dropping tokens keeps the stream ordered and non-overlapping.
        let tokens = self.tokens.clone();
        Box::new((0..tokens.len()).rev().map(move |skip| {
            let mut shrunk = tokens.clone();
            shrunk.remove(skip);
            GeneratedTokens { tokens: shrunk }
        }))
    }
}

/// A token range over a line measured in characters (Unicode scalars),
/// end exclusive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharSpan {
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

/// A document together with an ordered, non-overlapping set of ranges that
/// all fall inside its lines.
#[derive(Clone, Debug)]
pub struct GeneratedHighlight {
    pub lines: Vec<String>,
    pub spans: Vec<CharSpan>,
}

impl GeneratedHighlight {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl Arbitrary for GeneratedHighlight {
    fn arbitrary(g: &mut Gen) -> Self {
        let document = GeneratedDocument::arbitrary(g);
        let mut spans = Vec::new();

        for (line, text) in document.lines.iter().enumerate() {
            let char_count = text.chars().count();
            let mut column = 0;
            for _ in 0..below(g, MAX_TOKENS_PER_LINE + 1) {
                if column > char_count {
                    break;
                }
                let start = (column + below(g, 3)).min(char_count);
                let end = (start + below(g, 5)).min(char_count);
                spans.push(CharSpan { line, start, end });
                column = end;
                if end == char_count {
                    break;
                }
            }
        }

        GeneratedHighlight {
            lines: document.lines,
            spans,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::QuickCheck;

    #[test]
    fn test_generated_lines_have_no_separator() {
        fn prop(line: GeneratedLine) -> bool {
            !line.0.contains('\n')
        }
        QuickCheck::new().quickcheck(prop as fn(GeneratedLine) -> bool);
    }

    #[test]
    fn test_generated_tokens_are_ordered() {
        fn prop(generated: GeneratedTokens) -> bool {
            generated.tokens.windows(2).all(|pair| {
                pair[1].line > pair[0].line
                    || (pair[1].line == pair[0].line && pair[1].start >= pair[0].end())
            })
        }
        QuickCheck::new().quickcheck(prop as fn(GeneratedTokens) -> bool);
    }

    #[test]
    fn test_generated_spans_fit_their_lines() {
        fn prop(generated: GeneratedHighlight) -> bool {
            generated.spans.iter().all(|span| {
                span.start <= span.end && span.end <= generated.lines[span.line].chars().count()
            }) && generated.spans.windows(2).all(|pair| {
                pair[1].line > pair[0].line
                    || (pair[1].line == pair[0].line && pair[1].start >= pair[0].end)
            })
        }
        QuickCheck::new().quickcheck(prop as fn(GeneratedHighlight) -> bool);
    }
}
