//! Merging of semantic and lexical token streams
//!
//! Both inputs are ordered and non-overlapping on their own. The merger walks
//! them with two index cursors and emits one combined stream that keeps the
//! same guarantee. Semantic (primary) tokens are authoritative: whenever two
//! ranges collide, the lexical (secondary) token is the one dropped.

use tracing::{debug, trace};

use crate::error::{Result, StreamKind};
use crate::metrics::metrics;
use crate::tokens::{AbsoluteToken, OrderCheck};

/// Outcome of comparing the two stream heads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    EmitPrimary,
    EmitSecondary,
    /// The secondary head collides with the primary head
    OccludeSecondary,
}

fn arbitrate(primary: &AbsoluteToken, secondary: &AbsoluteToken) -> Choice {
    use std::cmp::Ordering;

    if primary.line != secondary.line {
        return if primary.line < secondary.line {
            Choice::EmitPrimary
        } else {
            Choice::EmitSecondary
        };
    }

    match primary.start_char.cmp(&secondary.start_char) {
        // Zero-width tokens never occlude; a secondary marker goes first.
        Ordering::Equal if secondary.length == 0 => Choice::EmitSecondary,
        Ordering::Equal if primary.length == 0 => Choice::EmitPrimary,
        Ordering::Equal => Choice::OccludeSecondary,
        Ordering::Less if primary.end_char() > secondary.start_char => Choice::OccludeSecondary,
        Ordering::Less => Choice::EmitPrimary,
        Ordering::Greater if secondary.end_char() > primary.start_char => Choice::OccludeSecondary,
        Ordering::Greater => Choice::EmitSecondary,
    }
}

/// Merge `primary` (semantic) and `secondary` (lexical) tokens into one
/// ordered, non-overlapping stream.
///
/// Every primary token survives. A secondary token survives only when it
/// overlaps no primary token. Either input being out of order is reported as
/// an [`OrderingViolation`](crate::error::HighlightError::OrderingViolation).
pub fn merge(primary: &[AbsoluteToken], secondary: &[AbsoluteToken]) -> Result<Vec<AbsoluteToken>> {
    let mut merged = Vec::with_capacity(primary.len() + secondary.len());
    let mut primary_order = OrderCheck::default();
    let mut secondary_order = OrderCheck::default();
    let mut i = 0;
    let mut j = 0;
    let mut occluded = 0u64;

    while let (Some(p), Some(s)) = (primary.get(i), secondary.get(j)) {
        match arbitrate(p, s) {
            Choice::EmitPrimary => {
                primary_order.accept(p, StreamKind::Semantic, i)?;
                merged.push(p.clone());
                i += 1;
            }
            Choice::EmitSecondary => {
                secondary_order.accept(s, StreamKind::Lexical, j)?;
                merged.push(s.clone());
                j += 1;
            }
            Choice::OccludeSecondary => {
                secondary_order.accept(s, StreamKind::Lexical, j)?;
                trace!(
                    "Lexical token {}:{}+{} ({}) occluded by semantic token {}:{}+{} ({})",
                    s.line,
                    s.start_char,
                    s.length,
                    s.token_type,
                    p.line,
                    p.start_char,
                    p.length,
                    p.token_type
                );
                occluded += 1;
                j += 1;
            }
        }
    }

    for (offset, p) in primary[i..].iter().enumerate() {
        primary_order.accept(p, StreamKind::Semantic, i + offset)?;
        merged.push(p.clone());
    }
    for (offset, s) in secondary[j..].iter().enumerate() {
        secondary_order.accept(s, StreamKind::Lexical, j + offset)?;
        merged.push(s.clone());
    }

    metrics().record_occluded_tokens(occluded);
    debug!(
        "Merged {} semantic and {} lexical tokens into {} ({} occluded)",
        primary.len(),
        secondary.len(),
        merged.len(),
        occluded
    );
    Ok(merged)
}
