//! HTML rendering of stapled spans

use tracing::debug;

use crate::staple::Span;

pub const DEFAULT_CLASS_PREFIX: &str = "lsp";

/// Class name prefixes for token types and modifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassPrefixes {
    pub type_prefix: String,
    pub modifier_prefix: String,
}

impl ClassPrefixes {
    /// Prefixes derived from a stem: `lsp` gives `lsp-type-` and `lsp-modifier-`
    pub fn from_stem(stem: &str) -> Self {
        Self {
            type_prefix: format!("{}-type-", stem),
            modifier_prefix: format!("{}-modifier-", stem),
        }
    }
}

impl Default for ClassPrefixes {
    fn default() -> Self {
        Self::from_stem(DEFAULT_CLASS_PREFIX)
    }
}

/// Append `text` to `out` with `< > & " '` replaced by named entities
pub fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(&mut out, text);
    out
}

/// Render spans as an HTML fragment
///
/// Styled spans become `<span class="...">` elements with one class for the
/// type followed by one per modifier. Unstyled spans, line breaks included,
/// are emitted as escaped text.
pub fn render(spans: &[Span<'_>], prefixes: &ClassPrefixes) -> String {
    let mut out = String::with_capacity(spans.iter().map(|s| s.text.len()).sum::<usize>() * 2);

    for span in spans {
        let Some(token) = &span.token else {
            escape_into(&mut out, span.text);
            continue;
        };

        out.push_str("<span class=\"");
        out.push_str(&prefixes.type_prefix);
        escape_into(&mut out, token.token_type.as_str());
        for modifier in &token.modifiers {
            out.push(' ');
            out.push_str(&prefixes.modifier_prefix);
            escape_into(&mut out, modifier.as_str());
        }
        out.push_str("\">");
        escape_into(&mut out, span.text);
        out.push_str("</span>");
    }

    debug!("Rendered {} spans into {} bytes", spans.len(), out.len());
    out
}
