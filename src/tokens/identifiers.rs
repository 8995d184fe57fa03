//! Open, string-keyed token type and modifier identifiers
//!
//! Any string a legend defines is a valid identifier, so these are not closed
//! enumerations. The well-known names (LSP 3.17 plus the clangd and SourceKit
//! extensions) are provided as string constants in [`types`] and
//! [`modifiers`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(
            #[serde(
                serialize_with = "crate::serde_helpers::serialize_arc_str",
                deserialize_with = "crate::serde_helpers::deserialize_arc_str"
            )]
            Arc<str>,
        );

        impl $name {
            pub fn new(name: impl Into<Arc<str>>) -> Self {
                Self(name.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), &*self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self(Arc::from(name))
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(Arc::from(name))
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                &*self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                &*self.0 == *other
            }
        }
    };
}

identifier!(
    /// The role of a token (`keyword`, `string`, `function`, ...)
    TokenType
);

identifier!(
    /// An extra attribute of a token (`declaration`, `static`, ...)
    TokenModifier
);

/// Well-known token type names
pub mod types {
    // LSP 3.17
    pub const NAMESPACE: &str = "namespace";
    pub const TYPE: &str = "type";
    pub const CLASS: &str = "class";
    pub const ENUM: &str = "enum";
    pub const INTERFACE: &str = "interface";
    pub const STRUCT: &str = "struct";
    pub const TYPE_PARAMETER: &str = "typeParameter";
    pub const PARAMETER: &str = "parameter";
    pub const VARIABLE: &str = "variable";
    pub const PROPERTY: &str = "property";
    pub const ENUM_MEMBER: &str = "enumMember";
    pub const EVENT: &str = "event";
    pub const FUNCTION: &str = "function";
    pub const METHOD: &str = "method";
    pub const MACRO: &str = "macro";
    pub const KEYWORD: &str = "keyword";
    pub const MODIFIER: &str = "modifier";
    pub const COMMENT: &str = "comment";
    pub const STRING: &str = "string";
    pub const NUMBER: &str = "number";
    pub const REGEXP: &str = "regexp";
    pub const OPERATOR: &str = "operator";
    pub const DECORATOR: &str = "decorator";

    // clangd
    pub const UNKNOWN: &str = "unknown";
    pub const CONCEPT: &str = "concept";

    // SourceKit
    pub const IDENTIFIER: &str = "identifier";

    /// Types in the order SourceKit-LSP reports them. `class` appears twice
    /// because SourceKit maps actors onto it.
    pub const SOURCEKIT: &[&str] = &[
        NAMESPACE,
        TYPE,
        CLASS,
        CLASS,
        ENUM,
        INTERFACE,
        STRUCT,
        TYPE_PARAMETER,
        PARAMETER,
        VARIABLE,
        PROPERTY,
        ENUM_MEMBER,
        EVENT,
        FUNCTION,
        METHOD,
        MACRO,
        KEYWORD,
        MODIFIER,
        COMMENT,
        STRING,
        NUMBER,
        REGEXP,
        OPERATOR,
        DECORATOR,
        IDENTIFIER,
    ];
}

/// Well-known token modifier names
pub mod modifiers {
    // LSP 3.17
    pub const DECLARATION: &str = "declaration";
    pub const DEFINITION: &str = "definition";
    pub const READONLY: &str = "readonly";
    pub const STATIC: &str = "static";
    pub const DEPRECATED: &str = "deprecated";
    pub const ABSTRACT: &str = "abstract";
    pub const ASYNC: &str = "async";
    pub const MODIFICATION: &str = "modification";
    pub const DOCUMENTATION: &str = "documentation";
    pub const DEFAULT_LIBRARY: &str = "defaultLibrary";

    // clangd
    pub const DEDUCED: &str = "deduced";
    pub const VIRTUAL: &str = "virtual";
    pub const DEPENDENT_NAME: &str = "dependentName";
    pub const USED_AS_MUTABLE_REFERENCE: &str = "usedAsMutableReference";
    pub const USED_AS_MUTABLE_POINTER: &str = "usedAsMutablePointer";
    pub const CONSTRUCTOR_OR_DESTRUCTOR: &str = "constructorOrDestructor";
    pub const USER_DEFINED: &str = "userDefined";
    pub const FUNCTION_SCOPE: &str = "functionScope";
    pub const CLASS_SCOPE: &str = "classScope";
    pub const FILE_SCOPE: &str = "fileScope";
    pub const GLOBAL_SCOPE: &str = "globalScope";

    pub const SOURCEKIT: &[&str] = &[
        DECLARATION,
        DEFINITION,
        READONLY,
        STATIC,
        DEPRECATED,
        ABSTRACT,
        ASYNC,
        MODIFICATION,
        DOCUMENTATION,
        DEFAULT_LIBRARY,
    ];
}

/// Set of modifiers attached to a token
///
/// Iteration follows insertion order, which for decoded tokens is legend bit
/// order; rendering relies on that for stable class lists. Equality ignores
/// order.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifierSet(Vec<TokenModifier>);

impl ModifierSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert a modifier, returning false if it was already present
    pub fn insert(&mut self, modifier: TokenModifier) -> bool {
        if self.contains(&modifier) {
            return false;
        }
        self.0.push(modifier);
        true
    }

    pub fn contains(&self, modifier: &TokenModifier) -> bool {
        self.0.iter().any(|m| m == modifier)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TokenModifier> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for ModifierSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|m| other.contains(m))
    }
}

impl Eq for ModifierSet {}

impl fmt::Debug for ModifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.iter().map(|m| m.as_str())).finish()
    }
}

impl<M: Into<TokenModifier>> FromIterator<M> for ModifierSet {
    fn from_iter<I: IntoIterator<Item = M>>(iter: I) -> Self {
        let mut set = ModifierSet::new();
        for modifier in iter {
            set.insert(modifier.into());
        }
        set
    }
}

impl<'a> IntoIterator for &'a ModifierSet {
    type Item = &'a TokenModifier;
    type IntoIter = std::slice::Iter<'a, TokenModifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
