//! Token legend: the names behind the integer type indices and modifier bits
//!
//! The legend is negotiated once per request/response cycle and then shared
//! read-only. Each name is interned once here, so every decoded token that
//! refers to the same legend entry shares a single allocation, and a reverse
//! index maps names back to their wire integers for encoding.

use lsp_types::{SemanticTokenModifier, SemanticTokenType, SemanticTokensLegend};
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use super::identifiers::{modifiers, types, TokenModifier, TokenType};

static SOURCEKIT_LEGEND: Lazy<TokenLegend> =
    Lazy::new(|| TokenLegend::new(types::SOURCEKIT.iter().copied(), modifiers::SOURCEKIT.iter().copied()));

/// Ordered type and modifier names
#[derive(Debug, Clone)]
pub struct TokenLegend {
    types: Vec<TokenType>,
    modifiers: Vec<TokenModifier>,
    type_index: FxHashMap<TokenType, u32>,
    modifier_index: FxHashMap<TokenModifier, u32>,
}

impl TokenLegend {
    /// Build a legend from ordered type and modifier names.
    ///
    /// When a name appears more than once, its first position is the one
    /// used for encoding.
    pub fn new<T, M>(types: impl IntoIterator<Item = T>, modifiers: impl IntoIterator<Item = M>) -> Self
    where
        T: Into<TokenType>,
        M: Into<TokenModifier>,
    {
        let types: Vec<TokenType> = types.into_iter().map(Into::into).collect();
        let modifiers: Vec<TokenModifier> = modifiers.into_iter().map(Into::into).collect();

        let mut type_index = FxHashMap::default();
        for (i, token_type) in types.iter().enumerate() {
            type_index.entry(token_type.clone()).or_insert(i as u32);
        }
        let mut modifier_index = FxHashMap::default();
        for (i, modifier) in modifiers.iter().enumerate() {
            modifier_index.entry(modifier.clone()).or_insert(i as u32);
        }

        Self {
            types,
            modifiers,
            type_index,
            modifier_index,
        }
    }

    /// The legend substituted when the server does not advertise one:
    /// the well-known names in the order SourceKit-LSP uses.
    pub fn default_legend() -> &'static TokenLegend {
        &SOURCEKIT_LEGEND
    }

    pub fn types(&self) -> &[TokenType] {
        &self.types
    }

    pub fn modifiers(&self) -> &[TokenModifier] {
        &self.modifiers
    }

    /// Type named by wire index `index`
    pub fn token_type(&self, index: u32) -> Option<&TokenType> {
        self.types.get(index as usize)
    }

    /// Modifier named by bit position `bit`
    pub fn modifier(&self, bit: u32) -> Option<&TokenModifier> {
        self.modifiers.get(bit as usize)
    }

    /// Wire index of a type name
    pub fn type_index(&self, token_type: &TokenType) -> Option<u32> {
        self.type_index.get(token_type).copied()
    }

    /// Bit position of a modifier name
    pub fn modifier_bit(&self, modifier: &TokenModifier) -> Option<u32> {
        self.modifier_index.get(modifier).copied()
    }
}

impl PartialEq for TokenLegend {
    fn eq(&self, other: &Self) -> bool {
        self.types == other.types && self.modifiers == other.modifiers
    }
}

impl Eq for TokenLegend {}

impl From<&SemanticTokensLegend> for TokenLegend {
    fn from(legend: &SemanticTokensLegend) -> Self {
        TokenLegend::new(
            legend.token_types.iter().map(|t| t.as_str()),
            legend.token_modifiers.iter().map(|m| m.as_str()),
        )
    }
}

impl From<&TokenLegend> for SemanticTokensLegend {
    fn from(legend: &TokenLegend) -> Self {
        SemanticTokensLegend {
            token_types: legend
                .types
                .iter()
                .map(|t| SemanticTokenType::from(t.as_str().to_string()))
                .collect(),
            token_modifiers: legend
                .modifiers
                .iter()
                .map(|m| SemanticTokenModifier::from(m.as_str().to_string()))
                .collect(),
        }
    }
}
