//! Language identification for source files
//!
//! The language decides whether compiler-frontend tokens are merged at all:
//! only the C family has a lexical frontend.

use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Language {
    Swift,
    C,
    Cpp,
    ObjectiveC,
    ObjectiveCpp,
    Html,
    Css,
    Json,
    Markdown,
    Yaml,
    Xml,
    /// Any other LSP language identifier
    Other(String),
}

impl Language {
    /// Identify a language from the file extension, case-insensitively
    pub fn from_path(path: &Path) -> Option<Language> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        let language = match extension.as_str() {
            "swift" => Language::Swift,
            "c" | "h" => Language::C,
            "cpp" | "cc" | "cxx" | "hpp" => Language::Cpp,
            "m" => Language::ObjectiveC,
            "mm" => Language::ObjectiveCpp,
            "html" | "htm" => Language::Html,
            "css" => Language::Css,
            "json" => Language::Json,
            "md" | "markdown" => Language::Markdown,
            "yml" | "yaml" => Language::Yaml,
            "xml" => Language::Xml,
            _ => return None,
        };
        Some(language)
    }

    /// Parse an LSP language identifier such as `objective-c`
    pub fn from_id(id: &str) -> Language {
        match id {
            "swift" => Language::Swift,
            "c" => Language::C,
            "cpp" => Language::Cpp,
            "objective-c" => Language::ObjectiveC,
            "objective-cpp" => Language::ObjectiveCpp,
            "html" => Language::Html,
            "css" => Language::Css,
            "json" => Language::Json,
            "markdown" => Language::Markdown,
            "yaml" => Language::Yaml,
            "xml" => Language::Xml,
            other => Language::Other(other.to_string()),
        }
    }

    /// The LSP language identifier
    pub fn id(&self) -> &str {
        match self {
            Language::Swift => "swift",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::ObjectiveC => "objective-c",
            Language::ObjectiveCpp => "objective-cpp",
            Language::Html => "html",
            Language::Css => "css",
            Language::Json => "json",
            Language::Markdown => "markdown",
            Language::Yaml => "yaml",
            Language::Xml => "xml",
            Language::Other(id) => id,
        }
    }

    pub fn has_lexical_frontend(&self) -> bool {
        matches!(
            self,
            Language::C | Language::Cpp | Language::ObjectiveC | Language::ObjectiveCpp
        )
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
