//! Token data model shared by every pipeline stage

pub mod identifiers;
pub mod legend;

use serde::{Deserialize, Serialize};

pub use identifiers::{modifiers, types, ModifierSet, TokenModifier, TokenType};
pub use legend::TokenLegend;

/// A token at an absolute position in the text
///
/// `start_char` and `length` are in the units of whatever
/// [`TextPositionEncoding`](crate::encoding::TextPositionEncoding) the owning
/// stream uses. A zero length marks a position without covering any text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsoluteToken {
    /// zero-based
    pub line: usize,
    /// zero-based
    pub start_char: usize,
    pub length: usize,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    #[serde(default, skip_serializing_if = "ModifierSet::is_empty")]
    pub modifiers: ModifierSet,
}

impl AbsoluteToken {
    pub fn new(line: usize, start_char: usize, length: usize, token_type: impl Into<TokenType>) -> Self {
        Self {
            line,
            start_char,
            length,
            token_type: token_type.into(),
            modifiers: ModifierSet::new(),
        }
    }

    pub fn with_modifiers<M: Into<TokenModifier>>(mut self, modifiers: impl IntoIterator<Item = M>) -> Self {
        self.modifiers = modifiers.into_iter().collect();
        self
    }

    /// One past the last covered unit on `line`
    pub fn end_char(&self) -> usize {
        self.start_char + self.length
    }

    pub fn position(&self) -> (usize, usize) {
        (self.line, self.start_char)
    }
}

/// Checks that tokens arrive ordered and non-overlapping: each token starts on
/// a later line than the previous one, or at or after its end on the same line.
#[derive(Debug, Default)]
pub(crate) struct OrderCheck {
    previous: Option<(usize, usize)>,
}

impl OrderCheck {
    pub(crate) fn accept(
        &mut self,
        token: &AbsoluteToken,
        stream: crate::error::StreamKind,
        position: usize,
    ) -> crate::error::Result<()> {
        if let Some((previous_line, previous_end)) = self.previous {
            let in_order = token.line > previous_line
                || (token.line == previous_line && token.start_char >= previous_end);
            if !in_order {
                return Err(crate::error::HighlightError::OrderingViolation {
                    stream,
                    position,
                    line: token.line,
                    start_char: token.start_char,
                    previous_line,
                    previous_end,
                });
            }
        }
        self.previous = Some((token.line, token.end_char()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HighlightError, StreamKind};

    #[test]
    fn test_token_serializes_camel_case() {
        let token = AbsoluteToken::new(1, 2, 3, types::KEYWORD).with_modifiers([modifiers::STATIC]);
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(
            json,
            r#"{"line":1,"startChar":2,"length":3,"type":"keyword","modifiers":["static"]}"#
        );

        let plain = AbsoluteToken::new(0, 0, 1, types::STRING);
        assert_eq!(
            serde_json::to_string(&plain).unwrap(),
            r#"{"line":0,"startChar":0,"length":1,"type":"string"}"#
        );
    }

    #[test]
    fn test_order_check_accepts_adjacent_and_zero_width() {
        let mut check = OrderCheck::default();
        let tokens = [
            AbsoluteToken::new(0, 0, 3, "a"),
            AbsoluteToken::new(0, 3, 0, "marker"),
            AbsoluteToken::new(0, 3, 2, "b"),
            AbsoluteToken::new(2, 0, 1, "c"),
        ];
        for (i, token) in tokens.iter().enumerate() {
            assert!(check.accept(token, StreamKind::Semantic, i).is_ok());
        }
    }

    #[test]
    fn test_order_check_rejects_overlap() {
        let mut check = OrderCheck::default();
        check
            .accept(&AbsoluteToken::new(0, 0, 3, "a"), StreamKind::Semantic, 0)
            .unwrap();
        let err = check
            .accept(&AbsoluteToken::new(0, 2, 1, "b"), StreamKind::Semantic, 1)
            .unwrap_err();
        assert_eq!(
            err,
            HighlightError::OrderingViolation {
                stream: StreamKind::Semantic,
                position: 1,
                line: 0,
                start_char: 2,
                previous_line: 0,
                previous_end: 3,
            }
        );
    }

    #[test]
    fn test_order_check_rejects_earlier_line() {
        let mut check = OrderCheck::default();
        check
            .accept(&AbsoluteToken::new(3, 0, 1, "a"), StreamKind::Merged, 0)
            .unwrap();
        assert!(check
            .accept(&AbsoluteToken::new(1, 5, 1, "b"), StreamKind::Merged, 1)
            .is_err());
    }
}
