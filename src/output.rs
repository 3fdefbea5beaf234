//! User-facing output utilities for clean, colored terminal messages
//!
//! Messages go to stderr without internal logging noise (timestamps, log
//! levels, crate names). Symbol listings go to stdout.

use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::models::{Symbol, SymbolKind};

/// Display a warning message to the user in yellow with padding
pub fn warn(message: &str) {
    eprintln!("\n{}\n", message.yellow());
}

/// Display an error message to the user in red with padding
///
/// # Example
/// ```ignore
/// output::error("project root does not exist: ./missing");
/// ```
pub fn error(message: &str) {
    eprintln!("\n{}\n", message.red());
}

/// Display an informational message to the user in default color with padding
pub fn info(message: &str) {
    eprintln!("\n{}\n", message);
}

/// Renders symbols one per line: `kind  name  path:line:column`
pub struct SymbolPrinter {
    root: PathBuf,
    use_colors: bool,
}

impl SymbolPrinter {
    /// Colors are used only on a terminal, without `--plain` and without NO_COLOR
    pub fn new(root: &Path, plain: bool) -> Self {
        let is_tty = std::io::stdout().is_terminal();
        let no_color = std::env::var("NO_COLOR").is_ok();
        Self {
            root: std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf()),
            use_colors: !plain && !no_color && is_tty,
        }
    }

    /// Path relative to the project root when it lives under it
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }

    pub fn line(&self, symbol: &Symbol) -> String {
        let kind = format!("{:<8}", symbol.kind.to_string());
        let location = match symbol.column {
            Some(column) => format!("{}:{}:{}", self.display_path(&symbol.file), symbol.line, column + 1),
            None => format!("{}:{}", self.display_path(&symbol.file), symbol.line),
        };

        if !self.use_colors {
            return format!("{}  {}  {}", kind, symbol.name, location);
        }
        let kind = match symbol.kind {
            SymbolKind::Class => kind.magenta().to_string(),
            SymbolKind::Method | SymbolKind::Function => kind.cyan().to_string(),
            SymbolKind::Field => kind.yellow().to_string(),
            SymbolKind::Variable => kind.green().to_string(),
        };
        format!("{}  {}  {}", kind, symbol.name.bold(), location.dimmed())
    }

    pub fn print_all(&self, symbols: &[Symbol]) {
        for symbol in symbols {
            println!("{}", self.line(symbol));
        }
    }
}
