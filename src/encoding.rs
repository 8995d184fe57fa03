//! Text position encodings and per-line index conversion
//!
//! Semantic tokens carry character offsets in whatever encoding the language
//! server negotiated, while compiler tokens always count bytes. Everything that
//! indexes into a line goes through this module so that multi-byte and
//! surrogate-pair characters are counted the same way everywhere.
//!
//! Lines are `&str`, so the text is already known to be valid UTF-8; an index
//! that lands inside a character (or past the end of the line) is reported as
//! [`HighlightError::EncodingBoundary`].

use std::fmt;

use lsp_types::PositionEncodingKind;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{HighlightError, Result};

/// Units in which a character offset within a line is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextPositionEncoding {
    /// UTF-8 code units
    Byte,
    /// UTF-16 code units (the LSP default)
    #[default]
    Utf16,
    /// Unicode scalar values (UTF-32 code units)
    Scalar,
}

/// Width of one character in a given encoding
type WidthFn = fn(char) -> usize;

fn utf8_width(ch: char) -> usize {
    ch.len_utf8()
}

fn utf16_width(ch: char) -> usize {
    ch.len_utf16()
}

fn scalar_width(_: char) -> usize {
    1
}

impl TextPositionEncoding {
    pub const ALL: [TextPositionEncoding; 3] = [
        TextPositionEncoding::Byte,
        TextPositionEncoding::Utf16,
        TextPositionEncoding::Scalar,
    ];

    /// The identifier LSP uses for this encoding (`utf-8`, `utf-16`, `utf-32`)
    pub fn as_lsp_str(self) -> &'static str {
        match self {
            TextPositionEncoding::Byte => "utf-8",
            TextPositionEncoding::Utf16 => "utf-16",
            TextPositionEncoding::Scalar => "utf-32",
        }
    }

    /// Parse an encoding name
    ///
    /// Accepts the LSP identifiers plus a few common spellings
    /// (`utf8`, `byte`, `utf16`, `utf32`, `scalar`), case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" | "byte" | "bytes" => Some(TextPositionEncoding::Byte),
            "utf-16" | "utf16" => Some(TextPositionEncoding::Utf16),
            "utf-32" | "utf32" | "scalar" | "scalars" => Some(TextPositionEncoding::Scalar),
            _ => None,
        }
    }

    fn width_fn(self) -> WidthFn {
        match self {
            TextPositionEncoding::Byte => utf8_width,
            TextPositionEncoding::Utf16 => utf16_width,
            TextPositionEncoding::Scalar => scalar_width,
        }
    }

    /// Length of `line` measured in this encoding's units
    pub fn line_length(self, line: &str) -> usize {
        match self {
            TextPositionEncoding::Byte => line.len(),
            TextPositionEncoding::Utf16 => line.chars().map(char::len_utf16).sum(),
            TextPositionEncoding::Scalar => line.chars().count(),
        }
    }

    /// Byte offset of the boundary `index` (in this encoding) within `line`
    pub fn byte_offset(self, line: &str, index: usize) -> Result<usize> {
        if self == TextPositionEncoding::Byte {
            return if index <= line.len() && line.is_char_boundary(index) {
                Ok(index)
            } else {
                Err(boundary_error(line, index, self))
            };
        }
        convert(line, index, self, TextPositionEncoding::Byte)
    }

    /// Substring of `line` between two boundaries expressed in this encoding
    pub fn slice(self, line: &str, start: usize, end: usize) -> Result<&str> {
        let start_byte = self.byte_offset(line, start)?;
        let end_byte = self.byte_offset(line, end)?;
        if end_byte < start_byte {
            return Err(boundary_error(line, end, self));
        }
        Ok(&line[start_byte..end_byte])
    }
}

impl fmt::Display for TextPositionEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_lsp_str())
    }
}

impl TryFrom<&PositionEncodingKind> for TextPositionEncoding {
    type Error = String;

    fn try_from(kind: &PositionEncodingKind) -> std::result::Result<Self, Self::Error> {
        TextPositionEncoding::parse(kind.as_str())
            .ok_or_else(|| format!("unsupported position encoding '{}'", kind.as_str()))
    }
}

impl From<TextPositionEncoding> for PositionEncodingKind {
    fn from(encoding: TextPositionEncoding) -> Self {
        match encoding {
            TextPositionEncoding::Byte => PositionEncodingKind::UTF8,
            TextPositionEncoding::Utf16 => PositionEncodingKind::UTF16,
            TextPositionEncoding::Scalar => PositionEncodingKind::UTF32,
        }
    }
}

impl Serialize for TextPositionEncoding {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_lsp_str())
    }
}

impl<'de> Deserialize<'de> for TextPositionEncoding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        TextPositionEncoding::parse(&name).ok_or_else(|| {
            serde::de::Error::custom(format!("unsupported position encoding '{}'", name))
        })
    }
}

fn boundary_error(line: &str, index: usize, encoding: TextPositionEncoding) -> HighlightError {
    HighlightError::EncodingBoundary {
        line: None,
        index,
        encoding,
        line_length: encoding.line_length(line),
    }
}

/// Convert a boundary within `line` from one encoding to another.
///
/// `index` must fall on a character boundary under `from`, between 0 and the
/// line's length inclusive. The result is the same boundary counted in `to`'s
/// units, so the end of the line maps to the end of the line.
pub fn convert(
    line: &str,
    index: usize,
    from: TextPositionEncoding,
    to: TextPositionEncoding,
) -> Result<usize> {
    let from_width = from.width_fn();
    let to_width = to.width_fn();

    let mut consumed_from = 0;
    let mut consumed_to = 0;
    for ch in line.chars() {
        if consumed_from >= index {
            break;
        }
        consumed_from += from_width(ch);
        consumed_to += to_width(ch);
    }

    if consumed_from != index {
        return Err(boundary_error(line, index, from));
    }
    Ok(consumed_to)
}
