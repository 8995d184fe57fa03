//! Decoding of the LSP relative token encoding
//!
//! Each token on the wire is five integers:
//! `(deltaLine, deltaStartChar, length, tokenType, tokenModifiers)`.
//! `deltaStartChar` is relative to the previous token's start only when both
//! are on the same line; otherwise it is the absolute start column.
//!
//! The decoder resolves type indices and modifier bits against the legend but
//! does not re-sort or check monotonicity. Out-of-order input is reported by
//! the merger and stapler, which need the ordering.

use tracing::debug;

use crate::error::{HighlightError, Result, StreamKind};
use crate::metrics::metrics;
use crate::tokens::{AbsoluteToken, ModifierSet, TokenLegend};

/// Integers per token in the relative encoding
pub const TOKEN_STRIDE: usize = 5;

/// Decode a relative token stream into absolute tokens
pub fn decode(stream: &[u32], legend: &TokenLegend) -> Result<Vec<AbsoluteToken>> {
    if stream.len() % TOKEN_STRIDE != 0 {
        return Err(HighlightError::MalformedStream {
            position: stream.len() - stream.len() % TOKEN_STRIDE,
            reason: format!(
                "stream length {} is not a multiple of {}",
                stream.len(),
                TOKEN_STRIDE
            ),
        });
    }

    let mut result = Vec::with_capacity(stream.len() / TOKEN_STRIDE);
    let mut line = 0usize;
    let mut start_char = 0usize;

    for (ordinal, group) in stream.chunks_exact(TOKEN_STRIDE).enumerate() {
        let position = ordinal * TOKEN_STRIDE;
        let [delta_line, delta_start, length, type_index, modifier_bits] =
            [group[0], group[1], group[2], group[3], group[4]];

        line += delta_line as usize;
        start_char = if delta_line == 0 {
            start_char + delta_start as usize
        } else {
            delta_start as usize
        };

        let token_type = legend.token_type(type_index).cloned().ok_or_else(|| {
            HighlightError::MalformedStream {
                position: position + 3,
                reason: format!(
                    "token #{} has type index {} but the legend defines {} types",
                    ordinal,
                    type_index,
                    legend.types().len()
                ),
            }
        })?;

        let mut modifiers = ModifierSet::new();
        for bit in 0..u32::BITS {
            if modifier_bits & (1 << bit) == 0 {
                continue;
            }
            let modifier = legend.modifier(bit).ok_or_else(|| HighlightError::MalformedStream {
                position: position + 4,
                reason: format!(
                    "token #{} sets modifier bit {} but the legend defines {} modifiers",
                    ordinal,
                    bit,
                    legend.modifiers().len()
                ),
            })?;
            modifiers.insert(modifier.clone());
        }

        result.push(AbsoluteToken {
            line,
            start_char,
            length: length as usize,
            token_type,
            modifiers,
        });
    }

    metrics().record_decoded_tokens(result.len() as u64);
    debug!("Decoded {} semantic tokens", result.len());
    Ok(result)
}

/// Encode absolute tokens into the relative wire format
///
/// Tokens must be ordered by `(line, start_char)` so every delta is
/// non-negative. Types and modifiers are resolved through the legend.
pub fn encode(tokens: &[AbsoluteToken], legend: &TokenLegend) -> Result<Vec<u32>> {
    let mut result = Vec::with_capacity(tokens.len() * TOKEN_STRIDE);
    let mut prev_line = 0usize;
    let mut prev_start = 0usize;

    for (ordinal, token) in tokens.iter().enumerate() {
        let position = ordinal * TOKEN_STRIDE;
        if token.line < prev_line || (token.line == prev_line && token.start_char < prev_start) {
            return Err(HighlightError::OrderingViolation {
                stream: StreamKind::Semantic,
                position: ordinal,
                line: token.line,
                start_char: token.start_char,
                previous_line: prev_line,
                previous_end: prev_start,
            });
        }

        let delta_line = token.line - prev_line;
        let delta_start = if delta_line == 0 {
            token.start_char - prev_start
        } else {
            token.start_char
        };

        let type_index = legend.type_index(&token.token_type).ok_or_else(|| {
            HighlightError::MalformedStream {
                position: position + 3,
                reason: format!("token type '{}' is not in the legend", token.token_type),
            }
        })?;

        let mut modifier_bits = 0u32;
        for modifier in &token.modifiers {
            let bit = legend
                .modifier_bit(modifier)
                .filter(|bit| *bit < u32::BITS)
                .ok_or_else(|| HighlightError::MalformedStream {
                    position: position + 4,
                    reason: format!("token modifier '{}' is not encodable with this legend", modifier),
                })?;
            modifier_bits |= 1 << bit;
        }

        result.extend_from_slice(&[
            to_wire(delta_line, position)?,
            to_wire(delta_start, position + 1)?,
            to_wire(token.length, position + 2)?,
            type_index,
            modifier_bits,
        ]);

        prev_line = token.line;
        prev_start = token.start_char;
    }

    Ok(result)
}

fn to_wire(value: usize, position: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| HighlightError::MalformedStream {
        position,
        reason: format!("value {} does not fit in 32 bits", value),
    })
}
