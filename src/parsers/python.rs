//! Extractor for Python
//!
//! Extracts:
//! - Classes (CLASS)
//! - `def` / `async def` directly inside a class body (METHOD)
//! - All other `def` / `async def` (FUNCTION)
//! - Module-level assignments and annotations (VARIABLE)
//! - Class-level assignments and annotations (FIELD)
//!
//! Scopes follow indentation. Decorators, docstrings and continuation lines
//! inside open brackets are skipped.

use super::lexer::{self, LineLexer, Token};
use super::{ExtractedSymbol, SymbolExtractor};
use crate::models::SymbolKind;

pub struct PythonExtractor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Class,
    Def,
    Other,
}

const STATEMENT_KEYWORDS: &[&str] = &[
    "if", "elif", "else", "for", "while", "with", "try", "except", "finally", "return", "import",
    "from", "global", "nonlocal", "del", "pass", "raise", "assert", "yield", "lambda", "match",
    "case", "print", "await",
];

impl SymbolExtractor for PythonExtractor {
    fn extract(&self, content: &str) -> Vec<ExtractedSymbol> {
        let mut lexer = LineLexer::new(&lexer::PYTHON);
        let mut symbols = Vec::new();
        // (indent, kind) for each open block
        let mut blocks: Vec<(usize, Block)> = Vec::new();
        let mut bracket_depth = 0usize;
        let mut continued = false;

        for (idx, line) in content.lines().enumerate() {
            let clean = lexer.sanitize(line);
            let tokens = lexer::tokenize(&clean);
            if tokens.is_empty() {
                continue;
            }

            let starts_statement = bracket_depth == 0 && !continued;
            for token in &tokens {
                match token.text {
                    "(" | "[" | "{" => bracket_depth += 1,
                    ")" | "]" | "}" => bracket_depth = bracket_depth.saturating_sub(1),
                    _ => {}
                }
            }
            continued = clean.trim_end().ends_with('\\');
            if !starts_statement {
                continue;
            }

            let indent = clean.len() - clean.trim_start().len();
            while blocks.last().is_some_and(|(open, _)| *open >= indent) {
                blocks.pop();
            }
            let enclosing = blocks.last().map(|(_, kind)| *kind);
            let line_no = idx + 1;

            let (block, symbol) = classify(&tokens, enclosing);
            if let Some((name, kind)) = symbol {
                symbols.push(ExtractedSymbol::new(name.text, kind, line_no, name.col));
            }
            if let Some(block) = block {
                blocks.push((indent, block));
            }
        }

        symbols
    }
}

/// Decide what a logical line opens and declares
fn classify<'a>(
    tokens: &[Token<'a>],
    enclosing: Option<Block>,
) -> (Option<Block>, Option<(Token<'a>, SymbolKind)>) {
    let opens_block = tokens.last().is_some_and(|t| t.is(":"))
        || (tokens.iter().any(|t| t.is(":")) && starts_compound(tokens));

    let mut rest = tokens;
    if rest.first().is_some_and(|t| t.is("async")) {
        rest = &rest[1..];
    }

    match rest {
        [keyword, name, ..] if keyword.is("class") && name.is_ident() => {
            (Some(Block::Class), Some((name.clone(), SymbolKind::Class)))
        }
        [keyword, name, ..] if keyword.is("def") && name.is_ident() => {
            let kind = if enclosing == Some(Block::Class) {
                SymbolKind::Method
            } else {
                SymbolKind::Function
            };
            (Some(Block::Def), Some((name.clone(), kind)))
        }
        _ => {
            let block = opens_block.then_some(Block::Other);
            (block, assignment_target(tokens, enclosing))
        }
    }
}

fn starts_compound(tokens: &[Token<'_>]) -> bool {
    tokens
        .first()
        .is_some_and(|t| STATEMENT_KEYWORDS.contains(&t.text) || t.is("class") || t.is("def"))
}

/// `name = ...`, `name: T = ...` or `name: T` at module or class level
fn assignment_target<'a>(
    tokens: &[Token<'a>],
    enclosing: Option<Block>,
) -> Option<(Token<'a>, SymbolKind)> {
    let kind = match enclosing {
        None => SymbolKind::Variable,
        Some(Block::Class) => SymbolKind::Field,
        Some(_) => return None,
    };
    match tokens {
        [name, op, ..]
            if name.is_ident()
                && !STATEMENT_KEYWORDS.contains(&name.text)
                && (op.is("=") || op.is(":")) =>
        {
            Some((name.clone(), kind))
        }
        _ => None,
    }
}
