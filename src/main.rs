//! Spacehound — disk usage inspector.
//!
//! Thin binary entry point. Scanning, aggregation and ranking all live in
//! `spacehound-core`; this only wires flags to it and prints the result.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::Parser;
use serde::Serialize;
use spacehound_core::analysis::search_tree_bounded;
use spacehound_core::model::size::{format_size, parse_size};
use spacehound_core::model::{Entry, EntryIndex, EntryTree};
use spacehound_core::scanner::{start_scan, ScanHandle, ScanReport, Scanner};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// How often a running scan logs its progress.
const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Parser)]
#[command(
    name = "spacehound",
    version,
    about = "Inspect disk usage and find entries by fuzzy name"
)]
struct Cli {
    /// Directory (or file) to scan.
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Directory names to skip, ignoring case. Repeatable or comma-separated.
    #[arg(short, long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Simultaneous directory listings (0 = default of 8).
    #[arg(short = 'j', long, default_value_t = 0)]
    concurrency: usize,

    /// Fuzzy search query matched against entry names.
    #[arg(short, long)]
    search: Option<String>,

    /// Maximum number of search results.
    #[arg(short, long, default_value_t = 50)]
    limit: usize,

    /// Number of the root's largest children to list.
    #[arg(short, long, default_value_t = 20)]
    top: usize,

    /// Hide listed children smaller than this (e.g. 100MB).
    #[arg(long, value_parser = parse_size)]
    min_size: Option<u64>,

    /// Print a JSON report instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    path: &'a Path,
    name: &'a str,
    size: u64,
    is_dir: bool,
    modified: Option<DateTime<Local>>,
    is_old: bool,
}

impl<'a> JsonEntry<'a> {
    fn new(entry: &'a Entry) -> Self {
        Self {
            path: &entry.path,
            name: &entry.name,
            size: entry.size,
            is_dir: entry.is_dir,
            modified: entry.modified.map(DateTime::<Local>::from),
            is_old: entry.is_old(),
        }
    }
}

#[derive(Serialize)]
struct JsonHit<'a> {
    score: u32,
    #[serde(flatten)]
    entry: JsonEntry<'a>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    root: JsonEntry<'a>,
    entries: usize,
    scanned: u64,
    duration_ms: u128,
    warnings: &'a [String],
    children: Vec<JsonEntry<'a>>,
    results: Vec<JsonHit<'a>>,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!("spacehound starting");

    let scanner = Arc::new(Scanner::new(cli.concurrency, &cli.exclude));
    let handle = start_scan(Arc::clone(&scanner), cli.path.clone())
        .context("failed to start scanner")?;
    let report = wait_with_progress(handle)
        .with_context(|| format!("cannot scan {}", cli.path.display()))?;

    let tree = &report.tree;
    let children = largest_children(tree, cli.top, cli.min_size.unwrap_or(0));
    let results = match cli.search.as_deref() {
        Some(query) => search_tree_bounded(tree, tree.root(), query, cli.limit),
        None => Vec::new(),
    };

    let mut out = std::io::stdout().lock();
    if cli.json {
        let json = JsonReport {
            root: JsonEntry::new(tree.get(tree.root())),
            entries: tree.len(),
            scanned: report.scanned_count,
            duration_ms: report.duration.as_millis(),
            warnings: &report.warnings,
            children: children.iter().map(|&c| JsonEntry::new(tree.get(c))).collect(),
            results: results
                .iter()
                .map(|r| JsonHit {
                    score: r.score,
                    entry: JsonEntry::new(tree.get(r.index)),
                })
                .collect(),
        };
        serde_json::to_writer_pretty(&mut out, &json).context("failed to write JSON report")?;
        writeln!(out)?;
        return Ok(());
    }

    print_summary(&mut out, &report, &children)?;
    if let Some(query) = cli.search.as_deref() {
        print_results(&mut out, tree, query, &results)?;
    }
    Ok(())
}

/// Poll the background scan, logging the running entry count.
fn wait_with_progress(mut handle: ScanHandle) -> Result<ScanReport> {
    let mut last_log = Instant::now();
    loop {
        if let Some(outcome) = handle.try_finish() {
            return Ok(outcome?);
        }
        if last_log.elapsed() >= PROGRESS_INTERVAL {
            tracing::info!("scanned {} entries…", handle.scanned_count());
            last_log = Instant::now();
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

fn largest_children(tree: &EntryTree, top: usize, min_size: u64) -> Vec<EntryIndex> {
    tree.children(tree.root())
        .iter()
        .copied()
        .filter(|&c| tree.get(c).size >= min_size)
        .take(top)
        .collect()
}

fn print_summary(
    out: &mut impl Write,
    report: &ScanReport,
    children: &[EntryIndex],
) -> std::io::Result<()> {
    let tree = &report.tree;
    let root = tree.get(tree.root());

    writeln!(out, "  Disk usage: {}", root.path.display())?;
    writeln!(out, "  Total size: {}", format_size(root.size))?;
    writeln!(out, "  {}", "-".repeat(58))?;
    for &c in children {
        let entry = tree.get(c);
        writeln!(
            out,
            "  {:>10}  {:>5.1}%  {}{}{}",
            format_size(entry.size),
            tree.percent_of_parent(c),
            entry.name,
            if entry.is_dir { "/" } else { "" },
            if entry.is_old() { "  (old)" } else { "" },
        )?;
    }
    let hidden = tree.children(tree.root()).len() - children.len();
    if hidden > 0 {
        writeln!(out, "  ... and {hidden} more entries")?;
    }
    writeln!(out, "  {}", "-".repeat(58))?;
    writeln!(
        out,
        "  {} entries in {:.2?}, {} warnings",
        tree.len(),
        report.duration,
        report.warnings.len()
    )?;
    Ok(())
}

fn print_results(
    out: &mut impl Write,
    tree: &EntryTree,
    query: &str,
    results: &[spacehound_core::SearchResult],
) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  Search {query:?}: {} results", results.len())?;
    for r in results {
        let entry = tree.get(r.index);
        writeln!(
            out,
            "  {:>4}  {:>10}  {}",
            r.score,
            format_size(entry.size),
            entry.path.display()
        )?;
    }
    Ok(())
}
