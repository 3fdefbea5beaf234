//! Heuristic symbol extractors
//!
//! Extraction is line- and token-based rather than grammar-based. Each
//! language family has its own extractor:
//!
//! - `brace`: Java, C#, JavaScript, TypeScript (brace-scoped declarations)
//! - `python`: Python (indentation-scoped declarations)
//! - `generic`: Go, Rust, C, C++ (per-line declaration patterns)
//!
//! All of them run over lines sanitized by `lexer`, so text inside comments
//! and string literals never produces symbols. Extractors never fail: odd
//! or malformed input simply yields fewer symbols.

pub mod brace;
pub mod generic;
pub mod lexer;
pub mod python;

use crate::models::{Language, Symbol, SymbolKind};
use std::path::Path;

/// A declaration found in source text, not yet attributed to a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSymbol {
    pub name: String,
    pub kind: SymbolKind,
    /// 1-indexed
    pub line: usize,
    /// 0-indexed byte column of the name
    pub column: Option<usize>,
}

impl ExtractedSymbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, line: usize, column: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            line,
            column: Some(column),
        }
    }

    /// Attach the owning file
    pub fn into_symbol(self, file: &Path) -> Symbol {
        Symbol::new(self.name, self.kind, file, self.line, self.column)
    }
}

/// Turns file content into declarations
///
/// Implementations must be pure functions of the content: the same text
/// always yields the same symbols in the same order.
pub trait SymbolExtractor: Send + Sync {
    fn extract(&self, content: &str) -> Vec<ExtractedSymbol>;
}

/// Built-in extractor for a language (None for `Language::Unknown`)
pub fn extractor_for(language: Language) -> Option<&'static dyn SymbolExtractor> {
    match language {
        Language::Java => Some(&brace::JAVA),
        Language::CSharp => Some(&brace::CSHARP),
        Language::JavaScript => Some(&brace::JAVASCRIPT),
        Language::TypeScript => Some(&brace::TYPESCRIPT),
        Language::Python => Some(&python::PythonExtractor),
        Language::Go => Some(&*generic::GO),
        Language::Rust => Some(&*generic::RUST),
        Language::C => Some(&*generic::C),
        Language::Cpp => Some(&*generic::CPP),
        Language::Unknown => {
            log::debug!("No extractor for unknown language");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_supported_language_has_extractor() {
        for language in [
            Language::Java,
            Language::CSharp,
            Language::JavaScript,
            Language::TypeScript,
            Language::Python,
            Language::Go,
            Language::Rust,
            Language::C,
            Language::Cpp,
        ] {
            assert!(extractor_for(language).is_some(), "{:?}", language);
        }
        assert!(extractor_for(Language::Unknown).is_none());
    }

    #[test]
    fn test_into_symbol_attaches_file() {
        let extracted = ExtractedSymbol::new("Foo", SymbolKind::Class, 3, 6);
        let symbol = extracted.into_symbol(Path::new("src/Foo.java"));
        assert_eq!(symbol.file, Path::new("src/Foo.java"));
        assert_eq!(symbol.line, 3);
        assert_eq!(symbol.column, Some(6));
    }

    #[test]
    fn test_garbage_input_yields_nothing() {
        let garbage = "}}}{{{ ((( ;;; ==> \u{0} \u{FFFD}";
        for language in [Language::Java, Language::Python, Language::Rust, Language::Go] {
            let extractor = extractor_for(language).unwrap();
            assert!(extractor.extract(garbage).is_empty(), "{:?}", language);
        }
    }
}
