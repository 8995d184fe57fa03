//! Lexical token provider abstraction
//!
//! Compiler frontends are external collaborators. A provider hands over the
//! raw compiler tokens for one file; how it obtains them (invoking a
//! compiler, reading a cache, loading a file) is its own business.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};

use super::CompilerToken;
use crate::language::Language;

/// Common interface for compiler-frontend token sources
pub trait LexicalTokenProvider: Send + Sync {
    /// Compiler tokens for `source`, ordered as the frontend reports them
    fn tokens(&self, source: &str) -> anyhow::Result<Vec<CompilerToken>>;

    /// Get a human-readable name for this provider (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Provider that reads pre-computed compiler tokens from a JSON file
///
/// The file holds an array of `{"kind", "start": {"line", "column"}, "end"}`
/// objects. The source text is ignored.
#[derive(Debug, Clone)]
pub struct JsonTokenFileProvider {
    path: PathBuf,
}

impl JsonTokenFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LexicalTokenProvider for JsonTokenFileProvider {
    fn tokens(&self, _source: &str) -> anyhow::Result<Vec<CompilerToken>> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read compiler tokens from {}", self.path.display()))?;
        let tokens: Vec<CompilerToken> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse compiler tokens in {}", self.path.display()))?;
        debug!("Loaded {} compiler tokens from {}", tokens.len(), self.path.display());
        Ok(tokens)
    }

    fn provider_name(&self) -> &'static str {
        "json-file"
    }
}

/// Providers keyed by the language they tokenize
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<Language, Box<dyn LexicalTokenProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` for `language`, replacing any earlier one
    pub fn register(&mut self, language: Language, provider: Box<dyn LexicalTokenProvider>) {
        info!("Registering {} lexical provider for {}", provider.provider_name(), language);
        self.providers.insert(language, provider);
    }

    pub fn provider_for(&self, language: &Language) -> Option<&dyn LexicalTokenProvider> {
        self.providers.get(language).map(|p| p.as_ref())
    }

    /// Compiler tokens for `source`, or none when no provider is registered
    /// for `language`
    pub fn tokens_for(&self, language: &Language, source: &str) -> anyhow::Result<Vec<CompilerToken>> {
        match self.provider_for(language) {
            Some(provider) => provider
                .tokens(source)
                .with_context(|| format!("{} provider failed for {}", provider.provider_name(), language)),
            None => {
                debug!("No lexical provider registered for {}", language);
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::{CompilerTokenKind, SourceLocation};
    use std::io::Write;
    use tempfile::NamedTempFile;

    struct FixedProvider(Vec<CompilerToken>);

    impl LexicalTokenProvider for FixedProvider {
        fn tokens(&self, _source: &str) -> anyhow::Result<Vec<CompilerToken>> {
            Ok(self.0.clone())
        }

        fn provider_name(&self) -> &'static str {
            "fixed"
        }
    }

    fn keyword() -> CompilerToken {
        CompilerToken::new(
            CompilerTokenKind::Keyword,
            SourceLocation::new(1, 1),
            SourceLocation::new(1, 4),
        )
    }

    #[test]
    fn test_registry_dispatches_by_language() {
        let mut registry = ProviderRegistry::new();
        registry.register(Language::C, Box::new(FixedProvider(vec![keyword()])));

        assert_eq!(registry.tokens_for(&Language::C, "int x;").unwrap(), vec![keyword()]);
        assert!(registry.tokens_for(&Language::Swift, "let x = 1").unwrap().is_empty());
        assert_eq!(
            registry.provider_for(&Language::C).map(|p| p.provider_name()),
            Some("fixed")
        );
    }

    #[test]
    fn test_json_file_provider_reads_tokens() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"kind": "keyword", "start": {{"line": 1, "column": 1}}, "end": {{"line": 1, "column": 4}}}}]"#
        )
        .unwrap();

        let provider = JsonTokenFileProvider::new(file.path());
        assert_eq!(provider.tokens("").unwrap(), vec![keyword()]);
    }

    #[test]
    fn test_json_file_provider_reports_missing_file() {
        let provider = JsonTokenFileProvider::new("/nonexistent/tokens.json");
        let err = provider.tokens("").unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read compiler tokens"));
    }
}
