//! Pattern-rule extractor for Go, Rust, C and C++
//!
//! Each language is a table of line patterns. A pattern's first capture
//! group is the declared name. Rules are gated by where the line sits:
//!
//! - top level (or directly inside a namespace / module block)
//! - member position (directly inside a struct, class, trait or impl body)
//! - body position (inside a function or other block)
//!
//! Brace scopes are tracked on sanitized lines, so braces in comments,
//! strings and char literals never shift the scope stack. Parenthesized
//! declaration groups (Go's `var (`, `const (` and `type (`) declare one
//! or more names at the start of each line inside the group.

use regex::Regex;
use std::sync::LazyLock;

use super::lexer::{self, LexerSpec, LineLexer};
use super::{ExtractedSymbol, SymbolExtractor};
use crate::models::SymbolKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    TopLevel,
    Member,
    Body,
}

/// Where a rule may fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Anywhere,
    /// Top level or member position
    Declarative,
    MemberOnly,
}

impl Placement {
    fn allows(self, position: Position) -> bool {
        match self {
            Placement::Anywhere => true,
            Placement::Declarative => position != Position::Body,
            Placement::MemberOnly => position == Position::Member,
        }
    }
}

#[derive(Debug)]
pub struct RuleSpec {
    pub pattern: &'static str,
    /// Lines matching this are skipped by the rule
    pub exclude: Option<&'static str>,
    pub kind: SymbolKind,
    /// Kind used at member position, when it differs
    pub member_kind: Option<SymbolKind>,
    pub placement: Placement,
}

/// A top-level line that opens a parenthesized declaration group
#[derive(Debug)]
pub struct GroupSpec {
    pub opener: &'static str,
    pub kind: SymbolKind,
}

#[derive(Debug)]
pub struct GenericSyntax {
    pub lexer: &'static LexerSpec,
    pub rules: &'static [RuleSpec],
    /// A line opening a struct / class / impl body
    pub container: Option<&'static str>,
    /// A line opening a namespace-like block whose contents stay top level
    pub namespace: Option<&'static str>,
    pub groups: &'static [GroupSpec],
    /// Blank `'x'` literals before tracking braces
    pub blank_char_literals: bool,
}

struct Rule {
    pattern: Regex,
    exclude: Option<Regex>,
    kind: SymbolKind,
    member_kind: Option<SymbolKind>,
    placement: Placement,
}

pub struct GenericExtractor {
    lexer: &'static LexerSpec,
    rules: Vec<Rule>,
    container: Option<Regex>,
    namespace: Option<Regex>,
    groups: Vec<(Regex, SymbolKind)>,
    blank_char_literals: bool,
}

/// Declaration group the scanner is inside
#[derive(Debug, Clone, Copy)]
struct OpenGroup {
    kind: SymbolKind,
    paren_depth: usize,
    scope_depth: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Container,
    Namespace,
    Block,
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("Failed to compile rule '{}': {}", pattern, e))
}

impl GenericExtractor {
    pub fn new(syntax: &'static GenericSyntax) -> Self {
        let rules = syntax
            .rules
            .iter()
            .map(|spec| Rule {
                pattern: compile(spec.pattern),
                exclude: spec.exclude.map(compile),
                kind: spec.kind,
                member_kind: spec.member_kind,
                placement: spec.placement,
            })
            .collect();
        Self {
            lexer: syntax.lexer,
            rules,
            container: syntax.container.map(compile),
            namespace: syntax.namespace.map(compile),
            groups: syntax
                .groups
                .iter()
                .map(|spec| (compile(spec.opener), spec.kind))
                .collect(),
            blank_char_literals: syntax.blank_char_literals,
        }
    }

    fn match_line(&self, line: &str, line_no: usize, position: Position) -> Vec<ExtractedSymbol> {
        let mut found: Vec<ExtractedSymbol> = Vec::new();
        for rule in &self.rules {
            if !rule.placement.allows(position) {
                continue;
            }
            if rule.exclude.as_ref().is_some_and(|re| re.is_match(line)) {
                continue;
            }
            for caps in rule.pattern.captures_iter(line) {
                let Some(name) = caps.get(1) else {
                    continue;
                };
                if found.iter().any(|s| s.column == Some(name.start())) {
                    continue;
                }
                let kind = match (position, rule.member_kind) {
                    (Position::Member, Some(kind)) => kind,
                    _ => rule.kind,
                };
                found.push(ExtractedSymbol::new(name.as_str(), kind, line_no, name.start()));
            }
        }
        found.sort_by_key(|s| s.column);
        found
    }

    /// Names listed at the start of a line inside a declaration group
    fn group_names(line: &str, line_no: usize, kind: SymbolKind) -> Vec<ExtractedSymbol> {
        let Some(list) = GROUP_NAMES.captures(line).and_then(|caps| caps.get(1)) else {
            return Vec::new();
        };
        IDENT
            .find_iter(list.as_str())
            .map(|name| {
                ExtractedSymbol::new(name.as_str(), kind, line_no, list.start() + name.start())
            })
            .collect()
    }
}

static GROUP_NAMES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*((?:[A-Za-z_]\w*\s*,\s*)*[A-Za-z_]\w*)")
        .expect("Failed to compile group name regex")
});

static IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_]\w*").expect("Failed to compile identifier regex"));

static CHAR_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"'(?:\\.[^']*|[^\\'])'").expect("Failed to compile char literal regex")
});

impl SymbolExtractor for GenericExtractor {
    fn extract(&self, content: &str) -> Vec<ExtractedSymbol> {
        let mut lexer = LineLexer::new(self.lexer);
        let mut symbols = Vec::new();
        let mut scopes: Vec<Scope> = Vec::new();
        let mut pending: Option<Scope> = None;
        let mut paren_depth = 0usize;
        let mut group: Option<OpenGroup> = None;

        for (idx, line) in content.lines().enumerate() {
            let mut clean = lexer.sanitize(line);
            if self.blank_char_literals {
                clean = CHAR_LITERAL
                    .replace_all(&clean, |caps: &regex::Captures<'_>| " ".repeat(caps[0].len()))
                    .into_owned();
            }
            if clean.trim().is_empty() {
                continue;
            }

            // Lines inside an open parameter list are not declarations
            let mut opened = None;
            let base_depth = group.map_or(0, |g| g.paren_depth);
            match group {
                Some(g) if paren_depth == g.paren_depth && scopes.len() == g.scope_depth => {
                    symbols.extend(Self::group_names(&clean, idx + 1, g.kind));
                }
                _ if paren_depth == base_depth => {
                    let position = match scopes.last() {
                        None | Some(Scope::Namespace) => Position::TopLevel,
                        Some(Scope::Container) => Position::Member,
                        Some(Scope::Block) => Position::Body,
                    };
                    symbols.extend(self.match_line(&clean, idx + 1, position));
                    if position == Position::TopLevel && group.is_none() {
                        opened = self
                            .groups
                            .iter()
                            .find(|(re, _)| re.is_match(&clean))
                            .map(|(_, kind)| *kind);
                    }
                }
                _ => {}
            }

            if self.container.as_ref().is_some_and(|re| re.is_match(&clean)) {
                pending = Some(Scope::Container);
            } else if self.namespace.as_ref().is_some_and(|re| re.is_match(&clean)) {
                pending = Some(Scope::Namespace);
            }

            for c in clean.chars() {
                match c {
                    '(' => paren_depth += 1,
                    ')' => paren_depth = paren_depth.saturating_sub(1),
                    '{' => scopes.push(pending.take().unwrap_or(Scope::Block)),
                    '}' => {
                        scopes.pop();
                    }
                    _ => {}
                }
            }
            if clean.trim_end().ends_with(';') {
                pending = None;
            }

            if let Some(kind) = opened.filter(|_| paren_depth > 0) {
                group = Some(OpenGroup {
                    kind,
                    paren_depth,
                    scope_depth: scopes.len(),
                });
            } else if group.is_some_and(|g| paren_depth < g.paren_depth) {
                group = None;
            }
        }

        symbols
    }
}

static RUST_SYNTAX: GenericSyntax = GenericSyntax {
    lexer: &lexer::RUST,
    rules: &[
        RuleSpec {
            pattern: r"\b(?:struct|enum|union|trait)\s+([A-Za-z_]\w*)",
            exclude: None,
            kind: SymbolKind::Class,
            member_kind: None,
            placement: Placement::Anywhere,
        },
        RuleSpec {
            pattern: r"\bfn\s+([A-Za-z_]\w*)",
            exclude: None,
            kind: SymbolKind::Function,
            member_kind: Some(SymbolKind::Method),
            placement: Placement::Anywhere,
        },
        RuleSpec {
            pattern: r"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:const|static)\s+(?:mut\s+)?([A-Za-z_]\w*)\s*:",
            exclude: None,
            kind: SymbolKind::Variable,
            member_kind: Some(SymbolKind::Field),
            placement: Placement::Declarative,
        },
        RuleSpec {
            pattern: r"\bmacro_rules!\s*([A-Za-z_]\w*)",
            exclude: None,
            kind: SymbolKind::Function,
            member_kind: None,
            placement: Placement::Anywhere,
        },
        RuleSpec {
            pattern: r"^\s*(?:pub(?:\([^)]*\))?\s+)?([A-Za-z_]\w*)\s*:[^:]",
            exclude: None,
            kind: SymbolKind::Field,
            member_kind: None,
            placement: Placement::MemberOnly,
        },
    ],
    container: Some(r"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:unsafe\s+)?(?:impl|trait|struct|union)\b[^;]*$"),
    namespace: Some(r"^\s*(?:pub(?:\([^)]*\))?\s+)?mod\s+[A-Za-z_]\w*\s*\{"),
    groups: &[],
    blank_char_literals: true,
};

static GO_SYNTAX: GenericSyntax = GenericSyntax {
    lexer: &lexer::GO,
    rules: &[
        RuleSpec {
            pattern: r"^\s*type\s+([A-Za-z_]\w*)\b",
            exclude: None,
            kind: SymbolKind::Class,
            member_kind: None,
            placement: Placement::Anywhere,
        },
        RuleSpec {
            pattern: r"^\s*func\s+([A-Za-z_]\w*)",
            exclude: None,
            kind: SymbolKind::Function,
            member_kind: None,
            placement: Placement::Anywhere,
        },
        RuleSpec {
            pattern: r"^\s*func\s*\([^)]*\)\s*([A-Za-z_]\w*)",
            exclude: None,
            kind: SymbolKind::Method,
            member_kind: None,
            placement: Placement::Anywhere,
        },
        RuleSpec {
            pattern: r"^\s*(?:var|const)\s+([A-Za-z_]\w*)",
            exclude: None,
            kind: SymbolKind::Variable,
            member_kind: None,
            placement: Placement::Declarative,
        },
        RuleSpec {
            pattern: r"^\s*([A-Za-z_]\w*)\s+[\*\[\]A-Za-z_.]",
            exclude: None,
            kind: SymbolKind::Field,
            member_kind: None,
            placement: Placement::MemberOnly,
        },
        RuleSpec {
            pattern: r"^\s*([A-Za-z_]\w*)\s*\(",
            exclude: None,
            kind: SymbolKind::Method,
            member_kind: None,
            placement: Placement::MemberOnly,
        },
    ],
    container: Some(r"\b(?:struct|interface)\s*\{"),
    namespace: None,
    groups: &[
        GroupSpec {
            opener: r"^\s*(?:var|const)\s*\(\s*$",
            kind: SymbolKind::Variable,
        },
        GroupSpec {
            opener: r"^\s*type\s*\(\s*$",
            kind: SymbolKind::Class,
        },
    ],
    blank_char_literals: false,
};

const C_FAMILY_RULES: &[RuleSpec] = &[
    RuleSpec {
        pattern: r"^\s*(?:template\s*<[^>]*>\s*)?(?:typedef\s+)?(?:class|struct|union|enum)(?:\s+(?:class|struct))?\s+([A-Za-z_]\w*)\s*(?:final\s*)?(?:[:{;]|$)",
        exclude: None,
        kind: SymbolKind::Class,
        member_kind: None,
        placement: Placement::Anywhere,
    },
    RuleSpec {
        pattern: r"^\s*[A-Za-z_][\w<>,:\*&\s]*?[\s\*&]([A-Za-z_]\w*)\s*\([^;]*$",
        exclude: Some(r"^\s*(?:return|else|typedef|using|delete|new|case|goto)\b"),
        kind: SymbolKind::Function,
        member_kind: Some(SymbolKind::Method),
        placement: Placement::Declarative,
    },
    RuleSpec {
        pattern: r"^\s*(?:[A-Za-z_][\w<>,:\*&\s]*?[\s\*&])?(?:[A-Za-z_]\w*::)+(~?[A-Za-z_]\w*)\s*\([^;]*$",
        exclude: None,
        kind: SymbolKind::Method,
        member_kind: None,
        placement: Placement::Declarative,
    },
    RuleSpec {
        pattern: r"^\s*[A-Za-z_][\w<>,:\*&\s]*?[\s\*&]([A-Za-z_]\w*)\s*(?:\[[^\]]*\])?\s*(?:=[^;]*)?;",
        exclude: Some(r"^\s*(?:typedef|using|return|friend|namespace|goto|delete|template|case|else)\b"),
        kind: SymbolKind::Variable,
        member_kind: Some(SymbolKind::Field),
        placement: Placement::Declarative,
    },
    RuleSpec {
        pattern: r"^\s*#\s*define\s+([A-Za-z_]\w*)",
        exclude: None,
        kind: SymbolKind::Variable,
        member_kind: None,
        placement: Placement::Anywhere,
    },
];

const C_CONTAINER: &str =
    r"^\s*(?:template\s*<[^>]*>\s*)?(?:typedef\s+)?(?:class|struct|union)\b[^;()]*$";
const C_NAMESPACE: &str = r"^\s*(?:(?:inline\s+)?namespace\b[^;]*|extern\s*\{.*)$";

static C_SYNTAX: GenericSyntax = GenericSyntax {
    lexer: &lexer::C_LIKE,
    rules: C_FAMILY_RULES,
    container: Some(C_CONTAINER),
    namespace: Some(C_NAMESPACE),
    groups: &[],
    blank_char_literals: false,
};

static CPP_SYNTAX: GenericSyntax = GenericSyntax {
    lexer: &lexer::C_LIKE,
    rules: C_FAMILY_RULES,
    container: Some(C_CONTAINER),
    namespace: Some(C_NAMESPACE),
    groups: &[],
    blank_char_literals: false,
};

pub static RUST: LazyLock<GenericExtractor> = LazyLock::new(|| GenericExtractor::new(&RUST_SYNTAX));
pub static GO: LazyLock<GenericExtractor> = LazyLock::new(|| GenericExtractor::new(&GO_SYNTAX));
pub static C: LazyLock<GenericExtractor> = LazyLock::new(|| GenericExtractor::new(&C_SYNTAX));
pub static CPP: LazyLock<GenericExtractor> = LazyLock::new(|| GenericExtractor::new(&CPP_SYNTAX));
