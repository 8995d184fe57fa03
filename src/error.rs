//! Error types for the highlighting pipeline
//!
//! Every core stage (decoder, lexical adapter, merger, stapler) fails fast and
//! reports the first violation it sees. A corrupted position invalidates every
//! later position in the same stream, so nothing here attempts recovery.

use thiserror::Error;

use crate::encoding::TextPositionEncoding;

/// Which input stream a violation was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// Tokens decoded from the language server
    Semantic,
    /// Tokens adapted from the compiler frontend
    Lexical,
    /// Tokens handed to the stapler after merging
    Merged,
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamKind::Semantic => f.write_str("semantic"),
            StreamKind::Lexical => f.write_str("lexical"),
            StreamKind::Merged => f.write_str("merged"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HighlightError {
    /// Wire length is not a multiple of 5, or an index falls outside the legend
    #[error("malformed token stream at position {position}: {reason}")]
    MalformedStream { position: usize, reason: String },

    /// An index is not a code point boundary (or lies past the end of the line)
    #[error(
        "index {index} is not a {encoding} boundary{} (line length {line_length})",
        line_suffix(.line)
    )]
    EncodingBoundary {
        line: Option<usize>,
        index: usize,
        encoding: TextPositionEncoding,
        line_length: usize,
    },

    /// A stream that must be ordered by `(line, startChar)` is not
    #[error(
        "{stream} token #{position} at {line}:{start_char} is out of order (previous token ends at {previous_line}:{previous_end})"
    )]
    OrderingViolation {
        stream: StreamKind,
        position: usize,
        line: usize,
        start_char: usize,
        previous_line: usize,
        previous_end: usize,
    },

    /// A token refers to a line the text does not have
    #[error("line {line} is out of range (text has {line_count} lines)")]
    LineOutOfRange { line: usize, line_count: usize },

    /// A compiler token ends before it starts, or uses a zero line or column
    #[error(
        "compiler token #{position} has invalid range {start_line}:{start_column}..{end_line}:{end_column}"
    )]
    InvalidRange {
        position: usize,
        start_line: u32,
        start_column: u32,
        end_line: u32,
        end_column: u32,
    },
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" on line {}", line),
        None => String::new(),
    }
}

impl HighlightError {
    /// Attach the zero-based line number to an encoding boundary error raised
    /// by a per-line conversion.
    pub fn on_line(self, line_index: usize) -> Self {
        match self {
            HighlightError::EncodingBoundary {
                line: None,
                index,
                encoding,
                line_length,
            } => HighlightError::EncodingBoundary {
                line: Some(line_index),
                index,
                encoding,
                line_length,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, HighlightError>;
