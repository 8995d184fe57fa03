//! Adapter from compiler-frontend tokens to absolute tokens
//!
//! Compiler tokens use 1-based lines and 1-based byte columns with an
//! exclusive end, and may span several lines (block comments, multi-line
//! string literals). The merger and stapler work strictly per line, so a
//! multi-line token is split into one token per covered line:
//!
//! ```text
//! first line   start column .. end of line
//! interior     whole line
//! last line    column 0 .. end column
//! ```
//!
//! Byte columns are re-expressed in the semantic stream's encoding.

pub mod provider;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::encoding::{self, TextPositionEncoding};
use crate::error::{HighlightError, Result};
use crate::metrics::metrics;
use crate::tokens::{types, AbsoluteToken, TokenType};

pub use provider::{JsonTokenFileProvider, LexicalTokenProvider, ProviderRegistry};

/// Token categories reported by the compiler frontend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompilerTokenKind {
    Comment,
    Keyword,
    Operator,
    LiteralString,
    LiteralCharacter,
    LiteralNumeric,
    PreprocessingDirective,
    InclusionDirective,
    MacroDefinition,
    #[serde(other)]
    Unknown,
}

impl CompilerTokenKind {
    /// Token type used for this kind, or `None` when the kind is not highlighted
    pub fn token_type(self) -> Option<&'static str> {
        match self {
            CompilerTokenKind::Unknown => None,
            CompilerTokenKind::Comment => Some(types::COMMENT),
            CompilerTokenKind::Keyword => Some(types::KEYWORD),
            CompilerTokenKind::Operator => Some(types::OPERATOR),
            CompilerTokenKind::LiteralString => Some(types::STRING),
            CompilerTokenKind::LiteralCharacter => Some(types::NUMBER),
            CompilerTokenKind::LiteralNumeric => Some(types::NUMBER),
            CompilerTokenKind::PreprocessingDirective
            | CompilerTokenKind::InclusionDirective
            | CompilerTokenKind::MacroDefinition => Some(types::MACRO),
        }
    }
}

/// A 1-based line and 1-based byte column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A token as reported by the compiler frontend; `end` is exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerToken {
    pub kind: CompilerTokenKind,
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl CompilerToken {
    pub fn new(kind: CompilerTokenKind, start: SourceLocation, end: SourceLocation) -> Self {
        Self { kind, start, end }
    }
}

/// Translate compiler tokens into per-line absolute tokens in `target` units
///
/// Tokens of unmapped kinds are skipped. Lines must be the text split on `\n`.
pub fn adapt(
    tokens: &[CompilerToken],
    lines: &[&str],
    target: TextPositionEncoding,
) -> Result<Vec<AbsoluteToken>> {
    let mut result = Vec::with_capacity(tokens.len());
    let mut dropped = 0u64;

    for (position, token) in tokens.iter().enumerate() {
        let Some(type_name) = token.kind.token_type() else {
            trace!("Dropping compiler token #{} of unmapped kind {:?}", position, token.kind);
            dropped += 1;
            continue;
        };
        validate_range(token, position)?;
        let token_type = TokenType::from(type_name);

        for one_based in token.start.line..=token.end.line {
            let line_index = (one_based - 1) as usize;
            let line = lines.get(line_index).ok_or(HighlightError::LineOutOfRange {
                line: line_index,
                line_count: lines.len(),
            })?;

            let start_byte = if one_based == token.start.line {
                (token.start.column - 1) as usize
            } else {
                0
            };
            let end_byte = if one_based == token.end.line {
                (token.end.column - 1) as usize
            } else {
                line.len()
            };

            let start_char = encoding::convert(line, start_byte, TextPositionEncoding::Byte, target)
                .map_err(|e| e.on_line(line_index))?;
            let end_char = encoding::convert(line, end_byte, TextPositionEncoding::Byte, target)
                .map_err(|e| e.on_line(line_index))?;
            if end_char < start_char {
                return Err(invalid_range(token, position));
            }

            result.push(AbsoluteToken::new(
                line_index,
                start_char,
                end_char - start_char,
                token_type.clone(),
            ));
        }
    }

    metrics().record_lexical_tokens(result.len() as u64);
    metrics().record_dropped_compiler_tokens(dropped);
    debug!(
        "Adapted {} compiler tokens into {} lexical tokens ({} dropped)",
        tokens.len(),
        result.len(),
        dropped
    );
    Ok(result)
}

fn validate_range(token: &CompilerToken, position: usize) -> Result<()> {
    let one_based = token.start.line >= 1
        && token.start.column >= 1
        && token.end.line >= 1
        && token.end.column >= 1;
    if !one_based || token.end < token.start {
        return Err(invalid_range(token, position));
    }
    Ok(())
}

fn invalid_range(token: &CompilerToken, position: usize) -> HighlightError {
    HighlightError::InvalidRange {
        position,
        start_line: token.start.line,
        start_column: token.start.column,
        end_line: token.end.line,
        end_column: token.end.column,
    }
}
