//! JSON input formats handed over by the language-server collaborator
//!
//! The semantic payload is a superset of an LSP `SemanticTokens` response:
//! a raw `textDocument/semanticTokens/full` result (`resultId`, `data`) loads
//! as-is, and the negotiated legend and position encoding may ride along.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use anyhow::Context;
use lsp_types::{SemanticTokens, SemanticTokensLegend};
use serde::{Deserialize, Serialize};

use crate::decoder::TOKEN_STRIDE;
use crate::encoding::TextPositionEncoding;
use crate::tokens::TokenLegend;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticTokensPayload {
    /// Legend the server advertised; the default legend applies when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend: Option<SemanticTokensLegend>,
    /// Negotiated position encoding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_encoding: Option<TextPositionEncoding>,
    /// Relative token stream, five integers per token
    pub data: Vec<u32>,
}

impl SemanticTokensPayload {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Failed to parse semantic tokens payload")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read semantic tokens from {}", path.display()))?;
        Self::from_json(&contents).with_context(|| format!("Invalid payload in {}", path.display()))
    }

    /// Build a payload from an LSP response and the negotiated parameters
    pub fn from_lsp(
        tokens: &SemanticTokens,
        legend: Option<SemanticTokensLegend>,
        position_encoding: Option<TextPositionEncoding>,
    ) -> Self {
        let mut data = Vec::with_capacity(tokens.data.len() * TOKEN_STRIDE);
        for token in &tokens.data {
            data.extend_from_slice(&[
                token.delta_line,
                token.delta_start,
                token.length,
                token.token_type,
                token.token_modifiers_bitset,
            ]);
        }
        Self {
            legend,
            position_encoding,
            data,
        }
    }

    /// The legend to decode with
    pub fn token_legend(&self) -> Cow<'static, TokenLegend> {
        match &self.legend {
            Some(legend) => Cow::Owned(TokenLegend::from(legend)),
            None => Cow::Borrowed(TokenLegend::default_legend()),
        }
    }
}
