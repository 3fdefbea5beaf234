//! CLI argument parsing and command handlers
//!
//! There is no on-disk index: every command scans the root in-process first
//! and then answers from the fresh tables.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::EngineConfig;
use crate::indexer::CodeIndex;
use crate::models::IndexResult;
use crate::output::{self, SymbolPrinter};
use crate::watcher::{self, WatchConfig};

/// codenav: symbol index and content cache for editor navigation
#[derive(Parser, Debug)]
#[command(
    name = "cnav",
    version,
    about = "Heuristic symbol index for go-to-definition and symbol search",
    long_about = "codenav scans a project with fast per-language heuristics, builds an \
                  in-memory symbol table, and answers definition lookups and ranked \
                  symbol searches over it."
)]
pub struct Cli {
    /// Enable verbose logging (can be repeated for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (TOML); defaults apply when omitted
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Project root to scan
    #[arg(long, value_name = "DIR", default_value = ".", global = true)]
    pub root: PathBuf,

    /// Disable colors in human-readable output
    #[arg(long, global = true)]
    pub plain: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan the project and report what was indexed
    Index {
        /// Output format as JSON
        #[arg(long)]
        json: bool,

        /// Suppress the progress bar and summary
        #[arg(short, long)]
        quiet: bool,
    },

    /// Go to definition: show where NAME is defined
    ///
    /// Definitions are ordered by kind (class, then method/function, then
    /// field, then variable), then by most recently indexed file.
    Find {
        /// Exact symbol name
        name: String,

        /// Show every definition instead of the best one
        #[arg(short, long)]
        all: bool,

        /// Output format as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search symbol names by substring
    ///
    /// Exact matches rank first, then prefix matches, then interior matches.
    Search {
        /// Substring to look for
        query: String,

        /// Maximum number of results (defaults to [search] default_limit)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the symbols of one file in source order
    Symbols {
        /// File to show
        file: PathBuf,

        /// Output format as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show index and content cache statistics
    Stats {
        /// Output format as JSON
        #[arg(long)]
        json: bool,
    },

    /// Keep the index current while files change
    ///
    /// Runs until interrupted (Ctrl+C).
    Watch {
        /// Debounce duration in milliseconds
        #[arg(short, long, default_value = "500")]
        debounce: u64,
    },
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        // Setup logging based on verbosity
        let log_level = match self.verbose {
            0 => "warn",  // Default: only warnings and errors
            1 => "info",  // -v: show info messages
            2 => "debug", // -vv: show debug messages
            _ => "trace", // -vvv: show trace messages
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
            .init();

        let config = match &self.config {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };
        let index = CodeIndex::new(config);
        let printer = SymbolPrinter::new(&self.root, self.plain);

        match self.command {
            Command::Index { json, quiet } => handle_index(&index, &self.root, json, quiet),
            Command::Find { name, all, json } => {
                scan(&index, &self.root, !json)?;
                handle_find(&index, &printer, &name, all, json)
            }
            Command::Search { query, limit, json } => {
                scan(&index, &self.root, !json)?;
                let limit = limit.unwrap_or(index.config().search.default_limit);
                let results = index.search_symbols(&query, limit);
                if json {
                    print_json(&results)
                } else {
                    if results.is_empty() {
                        output::info(&format!("No symbols matching '{}'", query));
                    }
                    printer.print_all(&results);
                    Ok(())
                }
            }
            Command::Symbols { file, json } => {
                scan(&index, &self.root, !json)?;
                let file = if file.is_relative() && !file.exists() {
                    self.root.join(file)
                } else {
                    file
                };
                let symbols = index.file_symbols(&file);
                if json {
                    print_json(&symbols)
                } else {
                    if index.file_index(&file).is_none() {
                        output::warn(&format!("{} is not indexed", file.display()));
                    }
                    printer.print_all(&symbols);
                    Ok(())
                }
            }
            Command::Stats { json } => {
                scan(&index, &self.root, !json)?;
                handle_stats(&index, json)
            }
            Command::Watch { debounce } => handle_watch(index, &self.root, &printer, debounce),
        }
    }
}

/// Run a project scan, drawing a progress bar while it runs
fn scan(index: &CodeIndex, root: &Path, show_progress: bool) -> Result<IndexResult> {
    let task = index
        .index_project(root)
        .with_context(|| format!("Failed to index {}", root.display()))?;

    let pb = if show_progress {
        let pb = ProgressBar::new(0);
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
                .context("Invalid progress bar template")?
                .progress_chars("=>-"),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    } else {
        ProgressBar::hidden()
    };

    while !task.is_finished() {
        let (done, total) = task.progress();
        pb.set_length(total);
        pb.set_position(done);
        std::thread::sleep(Duration::from_millis(50));
    }
    let (done, total) = task.progress();
    pb.set_length(total);
    pb.set_position(done);

    let result = task.wait()?;
    pb.finish_and_clear();
    Ok(result)
}

fn handle_index(index: &CodeIndex, root: &Path, json: bool, quiet: bool) -> Result<()> {
    log::info!("Starting index build");
    let result = scan(index, root, !json && !quiet)?;

    if json {
        return print_json(&result);
    }
    if !quiet {
        println!("Indexing complete!");
        println!("  Files indexed:  {}", result.files_indexed);
        println!("  Symbols found:  {}", result.symbols_found);
        if result.files_skipped > 0 {
            println!("  Files skipped:  {}", result.files_skipped);
        }
        println!("  Time:           {}ms", result.time_millis);
    }
    Ok(())
}

fn handle_find(
    index: &CodeIndex,
    printer: &SymbolPrinter,
    name: &str,
    all: bool,
    json: bool,
) -> Result<()> {
    let found = if all {
        index.definitions(name)
    } else {
        index.find_definition(name).into_iter().collect()
    };

    if json {
        return if all {
            print_json(&found)
        } else {
            print_json(&found.first())
        };
    }
    if found.is_empty() {
        anyhow::bail!("No definition found for '{}'", name);
    }
    printer.print_all(&found);
    Ok(())
}

fn handle_stats(index: &CodeIndex, json: bool) -> Result<()> {
    let stats = index.stats();
    let cache = index.cache().stats();

    if json {
        return print_json(&serde_json::json!({
            "index": stats,
            "cache": cache,
        }));
    }

    println!("codenav Index Statistics");
    println!("========================");
    println!("Files indexed:   {}", stats.indexed_files);
    println!("Unique symbols:  {}", stats.unique_symbols);
    println!("Total symbols:   {}", stats.total_symbols);
    println!("Indexing time:   {}ms", stats.total_indexing_ms);
    println!("Content cache:   {}", cache);
    Ok(())
}

fn handle_watch(index: CodeIndex, root: &Path, printer: &SymbolPrinter, debounce_ms: u64) -> Result<()> {
    log::info!("Starting watch mode for {}", root.display());
    let result = scan(&index, root, true)?;
    println!(
        "Indexed {} files ({} symbols). Watching {} for changes...",
        result.files_indexed,
        result.symbols_found,
        root.display()
    );
    println!("  Press Ctrl+C to stop.\n");

    let handle = watcher::watch_project(
        index,
        root,
        WatchConfig {
            debounce_ms,
            ..WatchConfig::default()
        },
    )?;

    while handle.is_running() {
        if let Some(batch) = handle.next_batch(Duration::from_secs(1)) {
            for path in &batch.reindexed {
                println!("  reindexed {}", printer.display_path(path));
            }
            for path in &batch.removed {
                println!("  removed   {}", printer.display_path(path));
            }
        }
    }

    output::warn("Watcher stopped.");
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
