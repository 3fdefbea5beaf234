//! Line-oriented lexing shared by the extractors
//!
//! `LineLexer::sanitize` blanks out comments and string literals so pattern
//! rules never fire on text that is not code. Blanked bytes become spaces, so
//! byte columns in the sanitized line match the original line. Block comments
//! and multi-line strings (template literals, triple quotes, raw strings)
//! carry their state into the next line.
//!
//! `tokenize` then splits a sanitized line into identifiers, numbers and
//! punctuation with their byte columns.

/// Comment and string syntax of one language
#[derive(Debug)]
pub struct LexerSpec {
    /// Line comment openers, e.g. `//` or `#`
    pub line_comments: &'static [&'static str],
    /// Block comment delimiters, e.g. `/*` and `*/`
    pub block_comment: Option<(&'static str, &'static str)>,
    /// String delimiters that may span lines, longest first
    pub multiline_quotes: &'static [&'static str],
    /// String delimiters that end at the end of the line
    pub quotes: &'static [&'static str],
    /// Whether `\` escapes the next character inside strings
    pub escapes: bool,
}

pub static C_LIKE: LexerSpec = LexerSpec {
    line_comments: &["//"],
    block_comment: Some(("/*", "*/")),
    multiline_quotes: &[],
    quotes: &["\"", "'"],
    escapes: true,
};

// Text blocks (`"""`) may span lines
pub static JAVA: LexerSpec = LexerSpec {
    line_comments: &["//"],
    block_comment: Some(("/*", "*/")),
    multiline_quotes: &["\"\"\""],
    quotes: &["\"", "'"],
    escapes: true,
};

pub static SCRIPT: LexerSpec = LexerSpec {
    line_comments: &["//"],
    block_comment: Some(("/*", "*/")),
    multiline_quotes: &["`"],
    quotes: &["\"", "'"],
    escapes: true,
};

pub static PYTHON: LexerSpec = LexerSpec {
    line_comments: &["#"],
    block_comment: None,
    multiline_quotes: &["\"\"\"", "'''"],
    quotes: &["\"", "'"],
    escapes: true,
};

pub static GO: LexerSpec = LexerSpec {
    line_comments: &["//"],
    block_comment: Some(("/*", "*/")),
    multiline_quotes: &["`"],
    quotes: &["\"", "'"],
    escapes: true,
};

// Single quotes are lifetimes as often as char literals, so only `"` opens a string
pub static RUST: LexerSpec = LexerSpec {
    line_comments: &["//"],
    block_comment: Some(("/*", "*/")),
    multiline_quotes: &["\""],
    quotes: &[],
    escapes: true,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    BlockComment(&'static str),
    String(&'static str),
}

/// Stateful per-file lexer; feed it lines in order
pub struct LineLexer {
    spec: &'static LexerSpec,
    state: State,
}

impl LineLexer {
    pub fn new(spec: &'static LexerSpec) -> Self {
        Self {
            spec,
            state: State::Code,
        }
    }

    /// Return `line` with comments and string literals replaced by spaces
    pub fn sanitize(&mut self, line: &str) -> String {
        let mut out = String::with_capacity(line.len());
        let mut chars = line.char_indices().peekable();

        while let Some(&(i, c)) = chars.peek() {
            let rest = &line[i..];
            match self.state {
                State::BlockComment(end) => {
                    if rest.starts_with(end) {
                        blank(&mut out, &mut chars, end.len());
                        self.state = State::Code;
                    } else {
                        blank(&mut out, &mut chars, c.len_utf8());
                    }
                }
                State::String(delim) => {
                    if self.spec.escapes && c == '\\' {
                        blank(&mut out, &mut chars, 1);
                        if let Some(&(_, next)) = chars.peek() {
                            blank(&mut out, &mut chars, next.len_utf8());
                        }
                    } else if rest.starts_with(delim) {
                        blank(&mut out, &mut chars, delim.len());
                        self.state = State::Code;
                    } else {
                        blank(&mut out, &mut chars, c.len_utf8());
                    }
                }
                State::Code => {
                    if self.spec.line_comments.iter().any(|lc| rest.starts_with(lc)) {
                        out.extend(std::iter::repeat_n(' ', rest.len()));
                        break;
                    }
                    if let Some((start, end)) = self.spec.block_comment {
                        if rest.starts_with(start) {
                            blank(&mut out, &mut chars, start.len());
                            self.state = State::BlockComment(end);
                            continue;
                        }
                    }
                    let opener = self
                        .spec
                        .multiline_quotes
                        .iter()
                        .chain(self.spec.quotes.iter())
                        .find(|q| rest.starts_with(**q));
                    if let Some(quote) = opener {
                        blank(&mut out, &mut chars, quote.len());
                        self.state = State::String(*quote);
                        continue;
                    }
                    out.push(c);
                    chars.next();
                }
            }
        }

        // Ordinary strings never continue past the end of the line
        if let State::String(delim) = self.state {
            if !self.spec.multiline_quotes.contains(&delim) {
                self.state = State::Code;
            }
        }

        out
    }
}

/// Consume `len` bytes from the iterator, emitting one space per byte
fn blank(
    out: &mut String,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    len: usize,
) {
    let mut consumed = 0;
    while consumed < len {
        match chars.next() {
            Some((_, c)) => {
                consumed += c.len_utf8();
                out.extend(std::iter::repeat_n(' ', c.len_utf8()));
            }
            None => break,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Number,
    Punct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset in the line
    pub col: usize,
}

impl Token<'_> {
    pub fn is_ident(&self) -> bool {
        self.kind == TokenKind::Ident
    }

    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }
}

const OPERATORS: &[&str] = &[
    "===", "!==", "...", ">>=", "<<=", "**=", "??=", "&&=", "||=", "=>", "==", "!=", "<=",
    ">=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "::", "->", "&&", "||", "?.", "??",
];

pub fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

pub fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Split a sanitized line into tokens
pub fn tokenize(line: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if is_ident_start(c) || c.is_ascii_digit() {
            let kind = if c.is_ascii_digit() {
                TokenKind::Number
            } else {
                TokenKind::Ident
            };
            let mut end = start;
            while let Some(&(i, ch)) = chars.peek() {
                if !is_ident_char(ch) {
                    break;
                }
                end = i + ch.len_utf8();
                chars.next();
            }
            tokens.push(Token {
                kind,
                text: &line[start..end],
                col: start,
            });
        } else {
            let rest = &line[start..];
            let len = OPERATORS
                .iter()
                .find(|op| rest.starts_with(**op))
                .map(|op| op.len())
                .unwrap_or(c.len_utf8());
            tokens.push(Token {
                kind: TokenKind::Punct,
                text: &line[start..start + len],
                col: start,
            });
            let mut consumed = 0;
            while consumed < len {
                match chars.next() {
                    Some((_, ch)) => consumed += ch.len_utf8(),
                    None => break,
                }
            }
        }
    }

    tokens
}
