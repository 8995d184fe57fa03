//! End-to-end highlighting: decode, adapt, merge, staple, render
//!
//! All inputs are fully materialized before the pipeline runs and each stage
//! completes synchronously. Any stage failure aborts the whole file; there is
//! no partially highlighted output.

use tracing::{debug, info_span, warn};

use crate::config::HighlightConfig;
use crate::decoder::decode;
use crate::encoding::TextPositionEncoding;
use crate::error::Result;
use crate::language::Language;
use crate::lexical::{self, CompilerToken};
use crate::merge::merge;
use crate::metrics::{metrics, TimingGuard};
use crate::render::{render, ClassPrefixes};
use crate::staple::{staple, Span};
use crate::tokens::{AbsoluteToken, TokenLegend};

/// Everything needed to highlight one file
#[derive(Debug, Clone)]
pub struct HighlightRequest<'a> {
    /// Full file text
    pub text: &'a str,
    /// Relative semantic token stream
    pub semantic_tokens: &'a [u32],
    pub legend: &'a TokenLegend,
    /// Encoding the server negotiated, if it said
    pub position_encoding: Option<TextPositionEncoding>,
    /// Raw compiler-frontend tokens; empty when no frontend ran
    pub compiler_tokens: &'a [CompilerToken],
    /// When known, compiler tokens are only used for languages with a lexical frontend
    pub language: Option<Language>,
}

impl<'a> HighlightRequest<'a> {
    pub fn new(text: &'a str, semantic_tokens: &'a [u32], legend: &'a TokenLegend) -> Self {
        Self {
            text,
            semantic_tokens,
            legend,
            position_encoding: None,
            compiler_tokens: &[],
            language: None,
        }
    }

    pub fn with_position_encoding(mut self, encoding: Option<TextPositionEncoding>) -> Self {
        self.position_encoding = encoding;
        self
    }

    pub fn with_compiler_tokens(mut self, tokens: &'a [CompilerToken]) -> Self {
        self.compiler_tokens = tokens;
        self
    }

    pub fn with_language(mut self, language: Option<Language>) -> Self {
        self.language = language;
        self
    }

    /// The text split into lines on `\n`
    pub fn lines(&self) -> Vec<&'a str> {
        self.text.split('\n').collect()
    }
}

/// Runs the highlighting pipeline under a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    config: HighlightConfig,
    prefixes: ClassPrefixes,
}

impl Highlighter {
    pub fn new(config: HighlightConfig) -> Self {
        let prefixes = config.class_prefixes();
        Self { config, prefixes }
    }

    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    /// Encoding the request's semantic positions are measured in
    pub fn encoding_for(&self, request: &HighlightRequest<'_>) -> TextPositionEncoding {
        self.config.resolve_encoding(request.position_encoding)
    }

    /// Decode and merge both streams into one ordered token sequence
    pub fn tokens(&self, request: &HighlightRequest<'_>) -> Result<Vec<AbsoluteToken>> {
        let lines = request.lines();
        self.merged_tokens(request, &lines, self.encoding_for(request))
    }

    fn merged_tokens(
        &self,
        request: &HighlightRequest<'_>,
        lines: &[&str],
        encoding: TextPositionEncoding,
    ) -> Result<Vec<AbsoluteToken>> {
        let semantic = {
            let _timing = TimingGuard::new("decode");
            decode(request.semantic_tokens, request.legend)?
        };

        let lexical_enabled = request
            .language
            .as_ref()
            .map_or(true, Language::has_lexical_frontend);
        if !lexical_enabled && !request.compiler_tokens.is_empty() {
            if let Some(language) = &request.language {
                warn!(
                    "Ignoring {} compiler tokens: {} has no lexical frontend",
                    request.compiler_tokens.len(),
                    language
                );
            }
        }

        let lexical = if lexical_enabled && !request.compiler_tokens.is_empty() {
            let _timing = TimingGuard::new("adapt");
            lexical::adapt(request.compiler_tokens, lines, encoding)?
        } else {
            Vec::new()
        };

        // An empty lexical stream still checks the semantic stream's order
        let _timing = TimingGuard::new("merge");
        merge(&semantic, &lexical)
    }

    /// Partition the request's text into styled and unstyled spans
    pub fn spans<'t>(&self, request: &HighlightRequest<'t>) -> Result<Vec<Span<'t>>> {
        let encoding = self.encoding_for(request);
        let span = info_span!("highlight", bytes = request.text.len(), encoding = %encoding);
        let _enter = span.enter();

        let lines = request.lines();
        let merged = self.merged_tokens(request, &lines, encoding)?;

        let _timing = TimingGuard::new("staple");
        staple(&merged, &lines, encoding)
    }

    /// Highlight the request's text as an HTML fragment
    pub fn highlight(&self, request: &HighlightRequest<'_>) -> Result<String> {
        let spans = match self.spans(request) {
            Ok(spans) => spans,
            Err(e) => {
                metrics().record_highlight_failure();
                return Err(e);
            }
        };

        let html = {
            let _timing = TimingGuard::new("render");
            render(&spans, &self.prefixes)
        };
        metrics().record_file_rendered();
        debug!("Highlighted {} bytes into {} bytes of HTML", request.text.len(), html.len());
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HighlightError, StreamKind};
    use crate::lexical::{CompilerTokenKind, SourceLocation};

    fn compiler_token(kind: CompilerTokenKind, start: (u32, u32), end: (u32, u32)) -> CompilerToken {
        CompilerToken::new(
            kind,
            SourceLocation::new(start.0, start.1),
            SourceLocation::new(end.0, end.1),
        )
    }

    #[test]
    fn test_semantic_only_scenario() {
        let legend = TokenLegend::new(["keyword", "string"], ["declaration"]);
        let stream = [0, 0, 3, 0, 0, 0, 4, 5, 1, 1];
        let request = HighlightRequest::new("let \"hi ok\"", &stream, &legend);

        let html = Highlighter::default().highlight(&request).unwrap();
        assert_eq!(
            html,
            "<span class=\"lsp-type-keyword\">let</span> \
             <span class=\"lsp-type-string lsp-modifier-declaration\">&quot;hi o</span>k&quot;"
        );
    }

    #[test]
    fn test_lexical_tokens_fill_gaps() {
        let legend = TokenLegend::new(["variable"], Vec::<&str>::new());
        // "x" on line 0 is semantic; "=" and "1" come from the compiler
        let stream = [0, 4, 1, 0, 0];
        let compiler = [
            compiler_token(CompilerTokenKind::Keyword, (1, 1), (1, 4)),
            compiler_token(CompilerTokenKind::Operator, (1, 7), (1, 8)),
            compiler_token(CompilerTokenKind::LiteralNumeric, (1, 9), (1, 10)),
        ];
        let request = HighlightRequest::new("int x = 1;", &stream, &legend)
            .with_compiler_tokens(&compiler)
            .with_language(Some(Language::C));

        let tokens = Highlighter::default().tokens(&request).unwrap();
        let kinds: Vec<(usize, &str)> = tokens.iter().map(|t| (t.start_char, t.token_type.as_str())).collect();
        assert_eq!(
            kinds,
            vec![(0, "keyword"), (4, "variable"), (6, "operator"), (8, "number")]
        );
    }

    #[test]
    fn test_compiler_tokens_ignored_without_lexical_frontend() {
        let legend = TokenLegend::new(["keyword"], Vec::<&str>::new());
        let compiler = [compiler_token(CompilerTokenKind::Comment, (1, 1), (1, 3))];
        let request = HighlightRequest::new("// x", &[], &legend)
            .with_compiler_tokens(&compiler)
            .with_language(Some(Language::Swift));

        assert!(Highlighter::default().tokens(&request).unwrap().is_empty());
    }

    #[test]
    fn test_configured_encoding_overrides_declared() {
        let legend = TokenLegend::new(["string"], Vec::<&str>::new());
        // "😀" is two UTF-16 units but one scalar
        let stream = [0, 0, 1, 0, 0];
        let request = HighlightRequest::new("😀x", &stream, &legend)
            .with_position_encoding(Some(TextPositionEncoding::Utf16));

        let err = Highlighter::default().spans(&request).unwrap_err();
        assert!(matches!(err, HighlightError::EncodingBoundary { .. }));

        let config = HighlightConfig {
            position_encoding_override: Some(TextPositionEncoding::Scalar),
            ..HighlightConfig::default()
        };
        let spans = Highlighter::new(config).spans(&request).unwrap();
        assert_eq!(spans[0].text, "😀");
        assert_eq!(spans[1].text, "x");
    }

    #[test]
    fn test_failure_aborts_whole_file() {
        let legend = TokenLegend::new(["keyword"], Vec::<&str>::new());
        let stream = [0, 0, 1, 0, 0, 0, 0, 1, 0, 0];
        let request = HighlightRequest::new("ab", &stream, &legend);

        assert!(matches!(
            Highlighter::default().highlight(&request),
            Err(HighlightError::OrderingViolation { .. })
        ));
    }

    #[test]
    fn test_unordered_semantic_stream_reported_as_semantic() {
        let legend = TokenLegend::new(["keyword"], Vec::<&str>::new());
        // Second token starts inside the first
        let stream = [0, 0, 3, 0, 0, 0, 1, 1, 0, 0];

        let request = HighlightRequest::new("abcd", &stream, &legend);
        assert!(matches!(
            Highlighter::default().spans(&request),
            Err(HighlightError::OrderingViolation { stream: StreamKind::Semantic, position: 1, .. })
        ));

        // Same outcome when the compiler tokens are ignored for the language
        let compiler = [compiler_token(CompilerTokenKind::Comment, (1, 4), (1, 5))];
        let request = HighlightRequest::new("abcd", &stream, &legend)
            .with_compiler_tokens(&compiler)
            .with_language(Some(Language::Swift));
        assert!(matches!(
            Highlighter::default().spans(&request),
            Err(HighlightError::OrderingViolation { stream: StreamKind::Semantic, .. })
        ));
    }
}
