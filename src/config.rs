//! Highlighter configuration
//!
//! Values come from the environment and can be overridden per invocation
//! (the CLI applies its flags on top). Unparseable values are logged and
//! ignored rather than treated as fatal.

use tracing::warn;

use crate::encoding::TextPositionEncoding;
use crate::render::{ClassPrefixes, DEFAULT_CLASS_PREFIX};

pub const POSITION_ENCODING_VAR: &str = "LSP_HIGHLIGHT_POSITION_ENCODING";
pub const CLASS_PREFIX_VAR: &str = "LSP_HIGHLIGHT_CLASS_PREFIX";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightConfig {
    /// Forces the semantic stream's encoding regardless of what the payload declares
    pub position_encoding_override: Option<TextPositionEncoding>,
    /// Stem for rendered class names
    pub class_prefix: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            position_encoding_override: None,
            class_prefix: DEFAULT_CLASS_PREFIX.to_string(),
        }
    }
}

impl HighlightConfig {
    /// Read configuration from the process environment
    ///
    /// Checks:
    /// 1. LSP_HIGHLIGHT_POSITION_ENCODING (`utf-8`, `utf-16`, `utf-32`, `byte`, `scalar`)
    /// 2. LSP_HIGHLIGHT_CLASS_PREFIX
    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup(POSITION_ENCODING_VAR) {
            config.position_encoding_override = parse_encoding(&value);
        }

        if let Some(value) = lookup(CLASS_PREFIX_VAR) {
            match parse_class_prefix(&value) {
                Some(prefix) => config.class_prefix = prefix,
                None => warn!(
                    "Invalid {} '{}', using default '{}'",
                    CLASS_PREFIX_VAR, value, DEFAULT_CLASS_PREFIX
                ),
            }
        }

        config
    }

    pub fn class_prefixes(&self) -> ClassPrefixes {
        ClassPrefixes::from_stem(&self.class_prefix)
    }

    /// Encoding of the semantic stream: explicit override, then what the
    /// payload declares, then UTF-16
    pub fn resolve_encoding(&self, declared: Option<TextPositionEncoding>) -> TextPositionEncoding {
        self.position_encoding_override
            .or(declared)
            .unwrap_or_default()
    }
}

fn parse_encoding(value: &str) -> Option<TextPositionEncoding> {
    let parsed = TextPositionEncoding::parse(value.trim());
    if parsed.is_none() {
        warn!(
            "Unknown {} '{}', falling back to the negotiated encoding",
            POSITION_ENCODING_VAR, value
        );
    }
    parsed
}

/// Class prefixes must be usable as the start of an HTML class name
pub fn parse_class_prefix(value: &str) -> Option<String> {
    let value = value.trim();
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then(|| value.to_string())
}
