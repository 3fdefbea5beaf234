//! Extractor for brace-scoped languages: Java, C#, JavaScript, TypeScript
//!
//! Extracts:
//! - Classes, interfaces, enums, records, structs and TypeScript type aliases (CLASS)
//! - Methods and constructors inside type bodies (METHOD)
//! - Fields and properties inside type bodies (FIELD)
//! - `function` declarations and function-valued declarators (FUNCTION)
//! - Top-level `const` / `let` / `var` declarators (VARIABLE)
//!
//! The scanner walks sanitized tokens while tracking a stack of brace scopes.
//! Each statement head is accumulated until a `(`, `=`, `;`, `,` or `{`
//! decides what it declares. Parenthesized lists and initializers are skipped
//! without inspecting their contents, so locals and call arguments never leak
//! out. A `,` after a declarator continues the list (`int a = 1, b;`), and
//! every further name gets the first one's kind.

use regex::Regex;
use std::sync::LazyLock;

use super::lexer::{self, LexerSpec, LineLexer, Token, TokenKind};
use super::{ExtractedSymbol, SymbolExtractor};
use crate::models::SymbolKind;

/// How declarations are written in a language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// `Type name` declarations (Java, C#)
    Typed,
    /// Keyword declarations, optional semicolons (JavaScript, TypeScript)
    Script,
}

#[derive(Debug)]
pub struct BraceSyntax {
    pub lexer: &'static LexerSpec,
    pub style: Style,
    /// Keywords that introduce a type declaration
    pub type_keywords: &'static [&'static str],
    /// Leading words stripped before a declaration is examined
    pub modifiers: &'static [&'static str],
    /// Words that can never be a declared name
    pub reserved: &'static [&'static str],
    /// Keywords of `keyword Name = ...` type aliases
    pub alias_keywords: &'static [&'static str],
}

pub struct BraceExtractor {
    syntax: BraceSyntax,
}

pub static JAVA: BraceExtractor = BraceExtractor {
    syntax: BraceSyntax {
        lexer: &lexer::JAVA,
        style: Style::Typed,
        type_keywords: &["class", "interface", "enum", "record"],
        modifiers: &[
            "public", "private", "protected", "static", "final", "abstract", "synchronized",
            "native", "transient", "volatile", "strictfp", "default", "sealed",
        ],
        reserved: &[
            "if", "else", "for", "while", "do", "switch", "case", "catch", "try", "finally",
            "return", "new", "throw", "throws", "assert", "this", "super", "yield",
            "instanceof", "import", "package", "extends", "implements", "permits",
        ],
        alias_keywords: &[],
    },
};

pub static CSHARP: BraceExtractor = BraceExtractor {
    syntax: BraceSyntax {
        lexer: &lexer::C_LIKE,
        style: Style::Typed,
        type_keywords: &["class", "interface", "enum", "struct", "record"],
        modifiers: &[
            "public", "private", "protected", "internal", "static", "readonly", "sealed",
            "abstract", "virtual", "override", "async", "partial", "extern", "unsafe", "new",
            "const", "volatile", "required",
        ],
        reserved: &[
            "if", "else", "for", "foreach", "while", "do", "switch", "case", "catch", "try",
            "finally", "return", "throw", "using", "lock", "await", "nameof", "typeof",
            "sizeof", "default", "this", "base", "get", "set", "init", "add", "remove", "when",
            "where", "namespace",
        ],
        alias_keywords: &[],
    },
};

const SCRIPT_RESERVED: &[&str] = &[
    "if", "else", "for", "while", "do", "switch", "case", "catch", "try", "finally", "return",
    "throw", "new", "typeof", "delete", "void", "await", "yield", "import", "in", "of",
    "instanceof", "with", "super", "this", "function", "extends", "implements",
];

pub static JAVASCRIPT: BraceExtractor = BraceExtractor {
    syntax: BraceSyntax {
        lexer: &lexer::SCRIPT,
        style: Style::Script,
        type_keywords: &["class"],
        modifiers: &["export", "default", "static", "async", "get", "set", "*", "#"],
        reserved: SCRIPT_RESERVED,
        alias_keywords: &[],
    },
};

pub static TYPESCRIPT: BraceExtractor = BraceExtractor {
    syntax: BraceSyntax {
        lexer: &lexer::SCRIPT,
        style: Style::Script,
        type_keywords: &["class", "interface", "enum"],
        modifiers: &[
            "export", "default", "static", "async", "get", "set", "*", "#", "public", "private",
            "protected", "readonly", "abstract", "declare", "override", "accessor",
        ],
        reserved: SCRIPT_RESERVED,
        alias_keywords: &["type"],
    },
};

/// Matches the text after `=` when the declarator holds a function
static FUNCTION_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:async\s+)?(?:function\b|(?:\([^)]*\)|[A-Za-z_$][\w$]*)\s*(?::[^=]*)?=>)",
    )
    .expect("Failed to compile function-value regex")
});

/// Tokens after which a statement clearly continues on the next line
const CONTINUATION: &[&str] = &[
    "=", "=>", ",", "+", "-", "*", "/", "%", "(", "[", "{", ".", "?", ":", "&&", "||", "??",
    "?.", "|", "&", "<", ">",
];

impl SymbolExtractor for BraceExtractor {
    fn extract(&self, content: &str) -> Vec<ExtractedSymbol> {
        let mut lexer = LineLexer::new(self.syntax.lexer);
        let mut scanner = Scanner::new(&self.syntax);
        for (idx, line) in content.lines().enumerate() {
            let clean = lexer.sanitize(line);
            scanner.feed_line(idx + 1, &clean);
        }
        scanner.symbols
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Scope {
    Type(String),
    Callable,
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Accumulating a statement head
    Head,
    /// Inside a bracketed list; the count is the open bracket depth
    Nested(usize),
    /// Inside an initializer; the count is the bracket depth relative to the `=`
    Initializer(usize),
    /// After a `,` in a declarator list, expecting the next name
    ListName,
    /// Right after a listed name
    ListTail,
    /// Inside a listed name's `: Type` annotation; the count is the bracket depth
    ListAnnotation(usize),
}

#[derive(Debug, Clone)]
struct Tok {
    kind: TokenKind,
    text: String,
    line: usize,
    col: usize,
}

impl Tok {
    fn new(token: &Token<'_>, line: usize) -> Self {
        Self {
            kind: token.kind,
            text: token.text.to_string(),
            line,
            col: token.col,
        }
    }

    fn is(&self, text: &str) -> bool {
        self.text == text
    }

    fn is_ident(&self) -> bool {
        self.kind == TokenKind::Ident
    }
}

struct Scanner<'s> {
    syntax: &'s BraceSyntax,
    scopes: Vec<Scope>,
    /// Scope opened by the next `{`
    pending: Option<Scope>,
    stmt: Vec<Tok>,
    /// The current statement has already been classified
    decided: bool,
    /// Kind given to further names of the current declarator list
    declared: Option<SymbolKind>,
    next_name: Option<Tok>,
    mode: Mode,
    symbols: Vec<ExtractedSymbol>,
}

impl<'s> Scanner<'s> {
    fn new(syntax: &'s BraceSyntax) -> Self {
        Self {
            syntax,
            scopes: Vec::new(),
            pending: None,
            stmt: Vec::new(),
            decided: false,
            declared: None,
            next_name: None,
            mode: Mode::Head,
            symbols: Vec::new(),
        }
    }

    fn feed_line(&mut self, line_no: usize, text: &str) {
        let tokens = lexer::tokenize(text);
        for token in &tokens {
            let rest = &text[token.col + token.text.len()..];
            self.feed(token, line_no, rest);
        }
        if self.syntax.style == Style::Script {
            if let Some(last) = tokens.last() {
                self.end_of_line(last);
            }
        }
    }

    fn feed(&mut self, token: &Token<'_>, line_no: usize, rest: &str) {
        match self.mode {
            Mode::Head => {}
            Mode::Nested(depth) => {
                match token.text {
                    "(" | "[" | "{" => self.mode = Mode::Nested(depth + 1),
                    ")" | "]" | "}" if depth <= 1 => self.mode = Mode::Head,
                    ")" | "]" | "}" => self.mode = Mode::Nested(depth - 1),
                    _ => {}
                }
                return;
            }
            Mode::Initializer(depth) => match token.text {
                "(" | "[" | "{" => {
                    self.mode = Mode::Initializer(depth + 1);
                    return;
                }
                ")" | "]" | "}" if depth > 0 => {
                    self.mode = Mode::Initializer(depth - 1);
                    return;
                }
                // Closes the enclosing scope; handled below as a head token
                "}" => self.reset(),
                ";" if depth == 0 => {
                    self.reset();
                    return;
                }
                "," if depth == 0 && self.declared.is_some() => {
                    self.mode = Mode::ListName;
                    return;
                }
                _ => return,
            },
            Mode::ListName | Mode::ListTail | Mode::ListAnnotation(_) => {
                if self.feed_list(token, line_no, rest) {
                    return;
                }
            }
        }

        match token.text {
            "{" => self.open_brace(),
            "}" => {
                self.scopes.pop();
                self.reset();
            }
            ";" => self.finish_declaration(),
            "(" => self.open_paren(),
            "=" => self.assignment(rest),
            "=>" if self.syntax.style == Style::Typed => self.assignment(rest),
            "," if !self.decided && self.start_declarator_list() => {}
            _ => {
                let tok = Tok::new(token, line_no);
                if tok.is_ident() && !self.decided {
                    self.check_type_declaration(&tok);
                }
                self.stmt.push(tok);
            }
        }
    }

    /// Statement boundaries implied by line ends (automatic semicolons)
    fn end_of_line(&mut self, last: &Token<'_>) {
        let continues = CONTINUATION.contains(&last.text);
        match self.mode {
            Mode::Initializer(0) if !continues => self.reset(),
            Mode::ListTail | Mode::ListAnnotation(0) if !continues || last.is(">") => {
                self.flush_listed(None);
                self.reset();
            }
            Mode::Head if !continues && (self.decided || !self.stmt.is_empty()) => {
                if !self.decided {
                    if matches!(last.kind, TokenKind::Ident | TokenKind::Number)
                        || last.is(")")
                        || last.is("]")
                    {
                        self.finish_declaration();
                    }
                } else {
                    let awaiting_body = match &self.pending {
                        Some(Scope::Type(_)) => true,
                        Some(Scope::Callable) => last.is(")"),
                        _ => false,
                    };
                    if !awaiting_body {
                        self.reset();
                    }
                }
            }
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.stmt.clear();
        self.decided = false;
        self.declared = None;
        self.next_name = None;
        self.pending = None;
        self.mode = Mode::Head;
    }

    /// Tokens of a declarator list after its first name.
    /// Returns false when the token must still be handled as a head token.
    fn feed_list(&mut self, token: &Token<'_>, line_no: usize, rest: &str) -> bool {
        let depth = match self.mode {
            Mode::ListAnnotation(depth) => depth,
            _ => 0,
        };
        match (self.mode, token.text) {
            (Mode::ListAnnotation(_), "(" | "[" | "{" | "<") => {
                self.mode = Mode::ListAnnotation(depth + 1);
            }
            (Mode::ListAnnotation(_), ")" | "]" | "}" | ">") if depth > 0 => {
                self.mode = Mode::ListAnnotation(depth - 1);
            }
            (_, "}") => {
                self.flush_listed(None);
                self.reset();
                return false;
            }
            (Mode::ListTail | Mode::ListAnnotation(_), "=") if depth == 0 => {
                self.flush_listed(Some(rest));
                self.mode = Mode::Initializer(0);
            }
            (Mode::ListTail | Mode::ListAnnotation(_), ",") if depth == 0 => {
                self.flush_listed(None);
                self.mode = Mode::ListName;
            }
            (Mode::ListTail | Mode::ListAnnotation(_), ";") if depth == 0 => {
                self.flush_listed(None);
                self.reset();
            }
            (Mode::ListTail, ":") if self.syntax.style == Style::Script => {
                self.mode = Mode::ListAnnotation(0);
            }
            (Mode::ListTail, "!") if self.syntax.style == Style::Script => {}
            (Mode::ListAnnotation(_), _) => {}
            (Mode::ListName, _) if token.is_ident() && !self.is_reserved(token.text) => {
                self.next_name = Some(Tok::new(token, line_no));
                self.mode = Mode::ListTail;
            }
            _ => {
                // Not a declarator list after all (`new Map<K, V>()`)
                self.next_name = None;
                self.declared = None;
                self.mode = Mode::Initializer(0);
                self.feed(token, line_no, rest);
            }
        }
        true
    }

    /// `int a, b` in a type body or `let a, b` at top level: emits the first name
    fn start_declarator_list(&mut self) -> bool {
        if self.open_brackets() {
            return false;
        }
        let (name, kind) = match self.syntax.style {
            Style::Typed if self.in_type_body() => (self.typed_member(), SymbolKind::Field),
            Style::Script if self.at_top_level() => (self.declarator(), SymbolKind::Variable),
            _ => return false,
        };
        let Some(name) = name else {
            return false;
        };
        self.emit(&name, kind);
        self.declared = Some(kind);
        self.decided = true;
        self.mode = Mode::ListName;
        true
    }

    /// Emit the pending listed name; `value` is the text after its `=`
    fn flush_listed(&mut self, value: Option<&str>) {
        let (Some(name), Some(kind)) = (self.next_name.take(), self.declared) else {
            return;
        };
        let kind = match kind {
            SymbolKind::Variable if value.is_some_and(|v| FUNCTION_VALUE.is_match(v)) => {
                SymbolKind::Function
            }
            kind => kind,
        };
        self.emit(&name, kind);
    }

    /// The head has an unclosed `<` or `[`
    fn open_brackets(&self) -> bool {
        let count = |open: &str, close: &str| {
            self.stmt.iter().filter(|t| t.is(open)).count() as isize
                - self.stmt.iter().filter(|t| t.is(close)).count() as isize
        };
        count("<", ">") > 0 || count("[", "]") > 0
    }

    fn emit(&mut self, tok: &Tok, kind: SymbolKind) {
        self.symbols
            .push(ExtractedSymbol::new(tok.text.clone(), kind, tok.line, tok.col));
    }

    fn in_type_body(&self) -> bool {
        matches!(self.scopes.last(), Some(Scope::Type(_)))
    }

    /// Outside every function body and block (type bodies do not count)
    fn at_top_level(&self) -> bool {
        self.scopes.iter().all(|s| matches!(s, Scope::Type(_)))
    }

    fn enclosing_type(&self) -> Option<&str> {
        match self.scopes.last() {
            Some(Scope::Type(name)) => Some(name),
            _ => None,
        }
    }

    fn is_reserved(&self, text: &str) -> bool {
        self.syntax.reserved.contains(&text) || self.syntax.type_keywords.contains(&text)
    }

    /// `class Name`, `interface Name`, ... (but not `Foo.class`)
    fn check_type_declaration(&mut self, tok: &Tok) {
        let n = self.stmt.len();
        let Some(prev) = self.stmt.last() else {
            return;
        };
        if !self.syntax.type_keywords.contains(&prev.text.as_str()) {
            return;
        }
        if n >= 2 && self.stmt[n - 2].is(".") {
            return;
        }
        if self.is_reserved(&tok.text) {
            return;
        }
        self.emit(tok, SymbolKind::Class);
        self.decided = true;
        self.pending = Some(Scope::Type(tok.text.clone()));
    }

    fn open_brace(&mut self) {
        // C# property: `public int Count { get; set; }`
        if !self.decided && self.syntax.style == Style::Typed && self.in_type_body() {
            if let Some(name) = self.typed_member() {
                self.emit(&name, SymbolKind::Field);
            }
        }
        let scope = self.pending.take().unwrap_or(Scope::Block);
        self.scopes.push(scope);
        self.reset();
    }

    fn open_paren(&mut self) {
        self.mode = Mode::Nested(1);
        if self.decided || self.ends_with_annotation() {
            return;
        }

        match self.syntax.style {
            Style::Script => {
                if let Some(name) = self.function_keyword_name() {
                    if let Some(name) = name {
                        self.emit(&name, SymbolKind::Function);
                    }
                    self.pending = Some(Scope::Callable);
                } else if self.in_type_body() {
                    if let Some(name) = self.script_method() {
                        self.emit(&name, SymbolKind::Method);
                        self.pending = Some(Scope::Callable);
                    }
                } else if self.declarator().is_some() {
                    // Parenthesized type annotation; the declarator is still open
                    return;
                }
            }
            Style::Typed => {
                if self.in_type_body() {
                    if let Some(name) = self.typed_method() {
                        self.emit(&name, SymbolKind::Method);
                        self.pending = Some(Scope::Callable);
                    }
                }
            }
        }
        self.decided = true;
    }

    fn assignment(&mut self, rest: &str) {
        if !self.decided {
            match self.syntax.style {
                Style::Typed => {
                    if self.in_type_body() {
                        if let Some(name) = self.typed_member() {
                            self.emit(&name, SymbolKind::Field);
                            self.declared = Some(SymbolKind::Field);
                        }
                    }
                }
                Style::Script => {
                    let function_valued = FUNCTION_VALUE.is_match(rest);
                    if let Some(name) = self.type_alias() {
                        if self.at_top_level() {
                            self.emit(&name, SymbolKind::Class);
                        }
                    } else if let Some(name) = self.declarator() {
                        if self.at_top_level() {
                            let kind = if function_valued {
                                SymbolKind::Function
                            } else {
                                SymbolKind::Variable
                            };
                            self.emit(&name, kind);
                            self.declared = Some(SymbolKind::Variable);
                        }
                    } else if self.in_type_body() {
                        if let Some(name) = self.script_field() {
                            let kind = if function_valued {
                                SymbolKind::Method
                            } else {
                                SymbolKind::Field
                            };
                            self.emit(&name, kind);
                        }
                    }
                }
            }
        }
        self.decided = true;
        self.mode = Mode::Initializer(0);
    }

    /// A statement ended without an initializer
    fn finish_declaration(&mut self) {
        if !self.decided {
            match self.syntax.style {
                Style::Typed => {
                    if self.in_type_body() {
                        if let Some(name) = self.typed_member() {
                            self.emit(&name, SymbolKind::Field);
                        }
                    }
                }
                Style::Script => {
                    if let Some(name) = self.declarator() {
                        if self.at_top_level() {
                            self.emit(&name, SymbolKind::Variable);
                        }
                    } else if self.in_type_body() {
                        if let Some(name) = self.script_field() {
                            self.emit(&name, SymbolKind::Field);
                        }
                    }
                }
            }
        }
        self.reset();
    }

    /// `@Name(` or `@a.b.Name(`: the parens hold annotation arguments
    fn ends_with_annotation(&self) -> bool {
        let Some(at) = self.stmt.iter().rposition(|t| t.is("@")) else {
            return false;
        };
        let tail = &self.stmt[at + 1..];
        tail.len() % 2 == 1
            && tail.iter().enumerate().all(|(i, t)| {
                if i % 2 == 0 {
                    t.is_ident()
                } else {
                    t.is(".")
                }
            })
    }

    /// Statement head without annotations, attribute lists and leading modifiers
    fn stripped(&self) -> Vec<&Tok> {
        let toks = &self.stmt;
        let mut out: Vec<&Tok> = Vec::new();
        let mut i = 0;
        while i < toks.len() {
            let tok = &toks[i];
            if tok.is("@") {
                i += 1;
                if i < toks.len() && toks[i].is_ident() {
                    i += 1;
                    while i + 1 < toks.len() && toks[i].is(".") && toks[i + 1].is_ident() {
                        i += 2;
                    }
                }
                continue;
            }
            if tok.is("[") && out.is_empty() {
                let mut depth = 0usize;
                while i < toks.len() {
                    if toks[i].is("[") {
                        depth += 1;
                    } else if toks[i].is("]") {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            i += 1;
                            break;
                        }
                    }
                    i += 1;
                }
                continue;
            }
            out.push(tok);
            i += 1;
        }

        // Keep at least one token so `get()` or `static()` can still be names
        let modifiers = out
            .iter()
            .take_while(|t| self.syntax.modifiers.contains(&t.text.as_str()))
            .count()
            .min(out.len().saturating_sub(1));
        out.drain(..modifiers);
        out
    }

    /// `Type name` where the token before the name can end a type
    fn typed_member(&self) -> Option<Tok> {
        self.typed_name(&self.stripped())
    }

    fn typed_method(&self) -> Option<Tok> {
        let mut head = self.stripped();
        drop_type_params(&mut head);
        if let [name] = head.as_slice() {
            // Constructor
            return (Some(name.text.as_str()) == self.enclosing_type()).then(|| (*name).clone());
        }
        self.typed_name(&head)
    }

    fn typed_name(&self, head: &[&Tok]) -> Option<Tok> {
        let [.., prev, name] = head else {
            return None;
        };
        let type_end =
            prev.is_ident() || prev.is(">") || prev.is("]") || prev.is("?") || prev.is("*");
        (name.is_ident() && type_end && !self.is_reserved(&name.text) && !self.is_reserved(&prev.text))
            .then(|| (*name).clone())
    }

    /// For `function name(`: Some(Some(name)); for an anonymous `function (`: Some(None)
    fn function_keyword_name(&self) -> Option<Option<Tok>> {
        let at = self.stmt.iter().rposition(|t| t.is("function"))?;
        let name = self.stmt[at + 1..]
            .iter()
            .find(|t| !t.is("*"))
            .filter(|t| t.is_ident())
            .cloned();
        Some(name)
    }

    /// `const name`, `let name`, `var name` (after export / declare)
    fn declarator(&self) -> Option<Tok> {
        let head = self.stripped();
        match head.as_slice() {
            [keyword, name, ..]
                if matches!(keyword.text.as_str(), "const" | "let" | "var") && name.is_ident() =>
            {
                Some((*name).clone())
            }
            _ => None,
        }
    }

    /// `type Name = ...` or `type Name<T> = ...`
    fn type_alias(&self) -> Option<Tok> {
        let head = self.stripped();
        match head.as_slice() {
            [keyword, name, rest @ ..]
                if self.syntax.alias_keywords.contains(&keyword.text.as_str())
                    && name.is_ident()
                    && !self.is_reserved(&name.text)
                    && rest.first().is_none_or(|t| t.is("<")) =>
            {
                Some((*name).clone())
            }
            _ => None,
        }
    }

    fn script_method(&self) -> Option<Tok> {
        let mut head = self.stripped();
        if head.last().is_some_and(|t| t.is("?") || t.is("!")) {
            head.pop();
        }
        drop_type_params(&mut head);
        match head.as_slice() {
            [name] if name.is_ident() && !self.is_reserved(&name.text) => Some((*name).clone()),
            _ => None,
        }
    }

    /// `name`, `name: Type`, `name?: Type` in a class or interface body
    fn script_field(&self) -> Option<Tok> {
        let head = self.stripped();
        let name = head.first()?;
        if !name.is_ident() || self.is_reserved(&name.text) {
            return None;
        }
        let plain = head.len() == 1
            || head
                .get(1)
                .is_some_and(|t| t.is(":") || t.is("?") || t.is("!"));
        plain.then(|| (*name).clone())
    }
}

/// Drop a trailing `<...>` group
fn drop_type_params(head: &mut Vec<&Tok>) {
    if !head.last().is_some_and(|t| t.is(">")) {
        return;
    }
    let mut depth = 0usize;
    for i in (0..head.len()).rev() {
        if head[i].is(">") {
            depth += 1;
        } else if head[i].is("<") {
            depth -= 1;
            if depth == 0 {
                head.truncate(i);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extractor: &BraceExtractor, source: &str) -> Vec<(String, SymbolKind)> {
        extractor
            .extract(source)
            .into_iter()
            .map(|s| (s.name, s.kind))
            .collect()
    }

    fn sym(name: &str, kind: SymbolKind) -> (String, SymbolKind) {
        (name.to_string(), kind)
    }

    #[test]
    fn test_single_line_class_with_method() {
        let symbols = JAVA.extract("class Foo { method bar() {} }");
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[0].name, "Foo");
        assert_eq!(symbols[0].kind, SymbolKind::Class);
        assert_eq!(symbols[0].line, 1);
        assert_eq!(symbols[0].column, Some(6));
        assert_eq!(symbols[1].name, "bar");
        assert_eq!(symbols[1].kind, SymbolKind::Method);
        assert_eq!(symbols[1].column, Some(19));
    }

    #[test]
    fn test_java_class_members() {
        let source = r#"
public class TestClass {
    private String field;
    private int count = 0;

    public TestClass() {}

    public void method() {
        int local = 1;
        helper(local);
    }

    public static void staticMethod() {}
}
"#;
        assert_eq!(
            parse(&JAVA, source),
            vec![
                sym("TestClass", SymbolKind::Class),
                sym("field", SymbolKind::Field),
                sym("count", SymbolKind::Field),
                sym("TestClass", SymbolKind::Method),
                sym("method", SymbolKind::Method),
                sym("staticMethod", SymbolKind::Method),
            ]
        );
    }

    #[test]
    fn test_java_line_numbers() {
        let source = "package demo;\n\npublic class A {\n    void run() {}\n}\n";
        let symbols = JAVA.extract(source);
        assert_eq!(symbols[0].line, 3);
        assert_eq!(symbols[1].line, 4);
    }

    #[test]
    fn test_java_annotations_and_generics() {
        let source = r#"
@Entity
public class User {
    @Id
    @GeneratedValue(strategy = GenerationType.AUTO)
    private Long id;

    private Map<String, List<Integer>> scores = new HashMap<>();

    @Override
    public String toString() { return "User"; }

    public <T> List<T> wrap(T value) { return List.of(value); }
}
"#;
        assert_eq!(
            parse(&JAVA, source),
            vec![
                sym("User", SymbolKind::Class),
                sym("id", SymbolKind::Field),
                sym("scores", SymbolKind::Field),
                sym("toString", SymbolKind::Method),
                sym("wrap", SymbolKind::Method),
            ]
        );
    }

    #[test]
    fn test_java_comments_and_strings_ignored() {
        let source = r#"
// class Ghost {}
/* void phantom() {}
   class Spirit {} */
class Real {
    String s = "class Fake { void nope() {} }";
}
"#;
        assert_eq!(
            parse(&JAVA, source),
            vec![sym("Real", SymbolKind::Class), sym("s", SymbolKind::Field)]
        );
    }

    #[test]
    fn test_java_nested_and_enum() {
        let source = r#"
enum Color { RED, GREEN }
interface Shape {
    double area();
}
class Outer {
    static class Inner {
        int depth;
    }
    Class<?> type = Outer.class;
}
"#;
        assert_eq!(
            parse(&JAVA, source),
            vec![
                sym("Color", SymbolKind::Class),
                sym("Shape", SymbolKind::Class),
                sym("area", SymbolKind::Method),
                sym("Outer", SymbolKind::Class),
                sym("Inner", SymbolKind::Class),
                sym("depth", SymbolKind::Field),
                sym("type", SymbolKind::Field),
            ]
        );
    }

    #[test]
    fn test_csharp_properties_and_constructors() {
        let source = r#"
namespace App.Models
{
    [Serializable]
    public class Account
    {
        public int Balance { get; set; }
        private readonly string _owner;

        public Account(string owner) { _owner = owner; }

        public void Deposit(int amount) => Balance += amount;
    }
}
"#;
        assert_eq!(
            parse(&CSHARP, source),
            vec![
                sym("Account", SymbolKind::Class),
                sym("Balance", SymbolKind::Field),
                sym("_owner", SymbolKind::Field),
                sym("Account", SymbolKind::Method),
                sym("Deposit", SymbolKind::Method),
            ]
        );
    }

    #[test]
    fn test_javascript_declarations() {
        let source = r#"
class MyClass {
    constructor() {
        this.value = 1;
    }

    getValue() {
        return this.value;
    }
}

function myFunction() {
    const inner = 2;
    return inner;
}

const arrowFunc = () => {
    return 1;
};

let variable = 'test';
const constant = 42;
"#;
        assert_eq!(
            parse(&JAVASCRIPT, source),
            vec![
                sym("MyClass", SymbolKind::Class),
                sym("constructor", SymbolKind::Method),
                sym("getValue", SymbolKind::Method),
                sym("myFunction", SymbolKind::Function),
                sym("arrowFunc", SymbolKind::Function),
                sym("variable", SymbolKind::Variable),
                sym("constant", SymbolKind::Variable),
            ]
        );
    }

    #[test]
    fn test_javascript_without_semicolons() {
        let source = r#"
const limit = 5
export function run() {
  doWork()
  const local = 1
}
let done = false
const handler = async function (event) {
  return event
}
"#;
        assert_eq!(
            parse(&JAVASCRIPT, source),
            vec![
                sym("limit", SymbolKind::Variable),
                sym("run", SymbolKind::Function),
                sym("done", SymbolKind::Variable),
                sym("handler", SymbolKind::Function),
            ]
        );
    }

    #[test]
    fn test_javascript_class_fields() {
        let source = r#"
export default class Counter extends Component {
  count = 0;
  #secret = 1;
  handleClick = (e) => {
    this.count++;
  };
  static get instance() { return null; }
}
"#;
        assert_eq!(
            parse(&JAVASCRIPT, source),
            vec![
                sym("Counter", SymbolKind::Class),
                sym("count", SymbolKind::Field),
                sym("secret", SymbolKind::Field),
                sym("handleClick", SymbolKind::Method),
                sym("instance", SymbolKind::Method),
            ]
        );
    }

    #[test]
    fn test_template_literal_contents_ignored() {
        let source = "const html = `\n<div>\nfunction fake() {}\n</div>`;\nfunction real() {}\n";
        assert_eq!(
            parse(&JAVASCRIPT, source),
            vec![
                sym("html", SymbolKind::Variable),
                sym("real", SymbolKind::Function),
            ]
        );
    }

    #[test]
    fn test_typescript_declarations() {
        let source = r#"
export interface Props {
    name: string;
    onClick(): void;
}

export class Widget<T> implements Base {
    private readonly items: T[] = [];

    static create<T>(): Widget<T> {
        return new Widget<T>();
    }

    handle = (e: Event) => {
        console.log(e);
    };
}

export const DEFAULT_SIZE: number = 10
export default function render() {}
"#;
        assert_eq!(
            parse(&TYPESCRIPT, source),
            vec![
                sym("Props", SymbolKind::Class),
                sym("name", SymbolKind::Field),
                sym("onClick", SymbolKind::Method),
                sym("Widget", SymbolKind::Class),
                sym("items", SymbolKind::Field),
                sym("create", SymbolKind::Method),
                sym("handle", SymbolKind::Method),
                sym("DEFAULT_SIZE", SymbolKind::Variable),
                sym("render", SymbolKind::Function),
            ]
        );
    }

    #[test]
    fn test_typescript_type_aliases() {
        let source = r#"
export type Props = {
  a: string
}
type Pair<T> = [T, T]
function f() {
  type Local = number
}
let type = 1
"#;
        assert_eq!(
            parse(&TYPESCRIPT, source),
            vec![
                sym("Props", SymbolKind::Class),
                sym("Pair", SymbolKind::Class),
                sym("f", SymbolKind::Function),
                sym("type", SymbolKind::Variable),
            ]
        );
    }

    #[test]
    fn test_java_declarator_lists() {
        let source = r#"
class A {
    int x = 1, y = 2;
    int p, q;
    private Map<String, Integer> m = new HashMap<String, Integer>();
    void run() {
        int local1, local2;
    }
}
"#;
        assert_eq!(
            parse(&JAVA, source),
            vec![
                sym("A", SymbolKind::Class),
                sym("x", SymbolKind::Field),
                sym("y", SymbolKind::Field),
                sym("p", SymbolKind::Field),
                sym("q", SymbolKind::Field),
                sym("m", SymbolKind::Field),
                sym("run", SymbolKind::Method),
            ]
        );
    }

    #[test]
    fn test_javascript_declarator_lists() {
        let source = r#"
export const x = 1, y = 2
let a, b;
const first = 1,
  second = (v) => v
"#;
        assert_eq!(
            parse(&JAVASCRIPT, source),
            vec![
                sym("x", SymbolKind::Variable),
                sym("y", SymbolKind::Variable),
                sym("a", SymbolKind::Variable),
                sym("b", SymbolKind::Variable),
                sym("first", SymbolKind::Variable),
                sym("second", SymbolKind::Function),
            ]
        );
        let columns: Vec<_> = JAVASCRIPT
            .extract("let a, b;\n")
            .into_iter()
            .map(|s| s.column)
            .collect();
        assert_eq!(columns, vec![Some(4), Some(7)]);
    }

    #[test]
    fn test_typescript_annotated_declarator_list() {
        let source = r#"
let a: number, b: Map<string, number> = new Map<string, number>()
function after() {}
"#;
        assert_eq!(
            parse(&TYPESCRIPT, source),
            vec![
                sym("a", SymbolKind::Variable),
                sym("b", SymbolKind::Variable),
                sym("after", SymbolKind::Function),
            ]
        );
    }

    #[test]
    fn test_declarators_in_top_level_blocks_are_locals() {
        let source = r#"
if (ready) {
  const inside = 1
}
for (const item of items) {
  let count = 0, total = 1
}
{
  var scoped = 2
}
export const outside = 2
"#;
        assert_eq!(
            parse(&JAVASCRIPT, source),
            vec![sym("outside", SymbolKind::Variable)]
        );
    }

    #[test]
    fn test_unbalanced_braces_do_not_panic() {
        let source = "}}} class A {{{ void f( \n ))) ;; = = class B";
        let symbols = parse(&JAVA, source);
        assert_eq!(symbols[0], sym("A", SymbolKind::Class));
    }
}
