//! CLI definition and command dispatch for cluepath.
//!
//! This module defines the command-line interface using `clap` and provides
//! the `run()` function that dispatches commands to the engine.
//!
//! ## Configuration Precedence
//!
//! Configuration is resolved with the following precedence (highest to lowest):
//! 1. CLI flags (e.g., `--config`, `--max-paths`, `--stage`)
//! 2. Environment variables (`CLUEPATH_CONFIG`, `CLUEPATH_VERBOSE`, `CLUEPATH_COLOR`)
//! 3. Config file (`~/.cluepath/config.yaml` or path from `--config`/`CLUEPATH_CONFIG`)
//! 4. Built-in defaults

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::ui::{color, format, table, ColorMode, MessageType, Style};

use cluepath_core::{
    parse_stages, Clue, ClueDocument, ClueEngine, CluePathError, Diagnostic, DisplayMode,
    PathStats, PathTermination, ReconstructionConfig, Stage, StageSummary,
};

// ============================================================================
// CLI Definition
// ============================================================================

/// Version string including git commit hash
const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

/// Reconstruct and filter reasoning paths from staged retrieval clues
#[derive(Parser, Debug)]
#[command(name = "cluepath")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, env = "CLUEPATH_VERBOSE")]
    pub verbose: bool,

    /// Suppress diagnostics and informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file (default: ~/.cluepath/config.yaml)
    #[arg(long, global = true, env = "CLUEPATH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Color output mode
    #[arg(long, global = true, env = "CLUEPATH_COLOR", value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the clues a graph view would render
    #[command(after_help = r#"EXAMPLES:
    # Simplified view of the expand stage, stopping at the recall boundary
    cluepath filter clues.json --stage expand

    # Full reconstruction back to the query
    cluepath filter clues.json --stage recall --stage expand

    # Every non-final clue
    cluepath filter clues.json --mode full

    # Read clues from stdin and emit JSON
    cat clues.json | cluepath filter - --stage rerank --json
"#)]
    Filter {
        /// Clue document (JSON array or `{"clues": [...]}`); `-` reads stdin
        file: PathBuf,

        /// Selected stage; repeat for several (default: from config)
        #[arg(short, long = "stage", value_name = "STAGE")]
        stages: Vec<String>,

        /// Display mode: full or simplified (default: from config)
        #[arg(short, long)]
        mode: Option<String>,

        /// Maximum number of reconstructed paths
        #[arg(long, value_name = "N")]
        max_paths: Option<usize>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List reconstructed paths root-first with how each one ends
    #[command(after_help = r#"EXAMPLES:
    # Paths for the rerank stage
    cluepath paths clues.json --stage rerank

    # Shared clues and per-path membership as JSON
    cluepath paths clues.json --stage recall --stage expand --json
"#)]
    Paths {
        /// Clue document (JSON array or `{"clues": [...]}`); `-` reads stdin
        file: PathBuf,

        /// Selected stage; repeat for several (default: from config)
        #[arg(short, long = "stage", value_name = "STAGE")]
        stages: Vec<String>,

        /// Maximum number of reconstructed paths
        #[arg(long, value_name = "N")]
        max_paths: Option<usize>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Count clues per stage and display level
    #[command(after_help = r#"EXAMPLES:
    # Which stages carry final markers?
    cluepath stages clues.json
"#)]
    Stages {
        /// Clue document (JSON array or `{"clues": [...]}`); `-` reads stdin
        file: PathBuf,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

// ============================================================================
// Entry point
// ============================================================================

/// Parse arguments, build the engine and dispatch the command.
///
/// Returns `ExitCode::SUCCESS` on success, or `ExitCode::FAILURE` on error.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // Warnings always; debug only with --verbose.
    let log_level = if cli.verbose { "debug" } else { "warn" };
    let filter = format!("cluepath_core={},cluepath_cli={}", log_level, log_level);

    tracing_subscriber::fmt()
        .with_env_filter(&filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let style = Style::new(cli.color);

    // Priority: --config flag > CLUEPATH_CONFIG env > ~/.cluepath/config.yaml
    let engine = match &cli.config {
        Some(config_path) => ClueEngine::with_config(config_path),
        None => ClueEngine::with_defaults(),
    };

    let mut engine = match engine {
        Ok(engine) => engine,
        Err(e) => {
            let hint = match &cli.config {
                Some(path) => format!("Check your config at {}", path.display()),
                None => "Check your global config at ~/.cluepath/config.yaml".to_string(),
            };
            eprintln!(
                "{}",
                style.error_with_context(
                    "Failed to load configuration",
                    Some(&e.to_string()),
                    Some(&hint),
                )
            );
            return ExitCode::FAILURE;
        }
    };

    let ctx = CommandContext {
        style: &style,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Command::Filter {
            file,
            stages,
            mode,
            max_paths,
            json,
        } => handle_filter(&ctx, &mut engine, &file, &stages, mode.as_deref(), max_paths, json),
        Command::Paths {
            file,
            stages,
            max_paths,
            json,
        } => handle_paths(&ctx, &mut engine, &file, &stages, max_paths, json),
        Command::Stages { file, json } => handle_stages(&engine, &file, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let cause = e.chain().nth(1).map(|c| c.to_string());
            let hint = e.downcast_ref::<CluePathError>().and_then(CluePathError::hint);
            eprintln!(
                "{}",
                style.error_with_context(&e.to_string(), cause.as_deref(), hint)
            );
            ExitCode::FAILURE
        }
    }
}

/// Output settings shared by the command handlers.
struct CommandContext<'s> {
    style: &'s Style,
    quiet: bool,
}

impl CommandContext<'_> {
    fn info(&self, text: &str) {
        if !self.quiet {
            eprintln!("{}", self.style.message(MessageType::Info, text));
        }
    }

    fn report_diagnostics(&self, diagnostics: &[Diagnostic]) {
        if self.quiet {
            return;
        }
        for diagnostic in diagnostics {
            eprintln!("{}", self.style.message(MessageType::Warn, &diagnostic.to_string()));
        }
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Read a clue document from a file, or stdin when `file` is `-`.
fn load_clues(file: &Path) -> anyhow::Result<Vec<Clue>> {
    let text = if file.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read clues from stdin")?;
        buf
    } else {
        fs::read_to_string(file)
            .with_context(|| format!("Failed to read clues from {}", file.display()))?
    };

    let clues = ClueDocument::from_json(&text)
        .with_context(|| format!("Failed to parse clues from {}", file.display()))?;
    tracing::debug!("Loaded {} clue(s) from {}", clues.len(), file.display());
    Ok(clues)
}

/// `--stage` values, or the configured defaults when none were passed.
fn resolve_stages(engine: &ClueEngine, stages: &[String]) -> Result<BTreeSet<Stage>, CluePathError> {
    if stages.is_empty() {
        Ok(engine.default_stages())
    } else {
        parse_stages(stages)
    }
}

/// Apply a `--max-paths` override, validating it like a config value.
fn apply_max_paths(
    ctx: &CommandContext<'_>,
    engine: &mut ClueEngine,
    max_paths: Option<usize>,
) -> Result<(), CluePathError> {
    let Some(max) = max_paths else {
        return Ok(());
    };
    let reconstruction = ReconstructionConfig::new().with_max_paths(max);
    for warning in reconstruction.validate()? {
        if !ctx.quiet {
            eprintln!("{}", ctx.style.message(MessageType::Warn, &warning));
        }
    }
    engine.config_mut().reconstruction = reconstruction;
    Ok(())
}

fn stage_list(stages: &BTreeSet<Stage>) -> String {
    if stages.is_empty() {
        return "(none)".to_string();
    }
    stages.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", text);
    Ok(())
}

// ============================================================================
// Command handlers
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FilterOutput<'a> {
    mode: DisplayMode,
    stages: &'a BTreeSet<Stage>,
    clues: &'a [&'a Clue],
    stats: Option<&'a PathStats>,
    diagnostics: &'a [Diagnostic],
}

fn handle_filter(
    ctx: &CommandContext<'_>,
    engine: &mut ClueEngine,
    file: &Path,
    stages: &[String],
    mode: Option<&str>,
    max_paths: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let selected = resolve_stages(engine, stages)?;
    let mode = match mode {
        Some(m) => m.parse::<DisplayMode>()?,
        None => engine.default_mode(),
    };
    apply_max_paths(ctx, engine, max_paths)?;

    let clues = load_clues(file)?;
    let outcome = engine.filter(&clues, &selected, mode);
    ctx.report_diagnostics(&outcome.diagnostics);

    if json {
        return print_json(&FilterOutput {
            mode,
            stages: &selected,
            clues: &outcome.clues,
            stats: outcome.stats.as_ref(),
            diagnostics: &outcome.diagnostics,
        });
    }

    ctx.info(&format!(
        "{} of {} ({} mode, stages: {})",
        format::plural(outcome.clues.len(), "clue"),
        clues.len(),
        mode,
        stage_list(&selected)
    ));

    if outcome.clues.is_empty() {
        return Ok(());
    }

    println!("{}", table::render_clue_table(&outcome.clues, color::terminal_width()));

    if let Some(stats) = &outcome.stats {
        println!();
        println!(
            "{}",
            ctx.style.key_value(
                "Paths",
                &format!(
                    "{} from {} ({} shared)",
                    stats.path_count,
                    format::plural(stats.final_clues, "final clue"),
                    format::plural(stats.shared_clue_count, "clue")
                )
            )
        );
    }

    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PathEntry<'a> {
    index: usize,
    termination: PathTermination,
    root: Option<&'a str>,
    clues: Vec<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PathsOutput<'a> {
    stages: &'a BTreeSet<Stage>,
    highest_stage: Option<Stage>,
    stop_stage: Option<Stage>,
    paths: Vec<PathEntry<'a>>,
    shared_clues: Vec<&'a str>,
    stats: &'a PathStats,
    diagnostics: &'a [Diagnostic],
}

fn handle_paths(
    ctx: &CommandContext<'_>,
    engine: &mut ClueEngine,
    file: &Path,
    stages: &[String],
    max_paths: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let selected = resolve_stages(engine, stages)?;
    apply_max_paths(ctx, engine, max_paths)?;

    let clues = load_clues(file)?;
    let reconstruction = engine.reconstruct(&clues, &selected);
    ctx.report_diagnostics(&reconstruction.diagnostics);

    let aggregated = &reconstruction.paths;
    let plan = reconstruction.plan.as_ref();

    if json {
        let paths = aggregated
            .paths
            .iter()
            .enumerate()
            .map(|(index, path)| PathEntry {
                index,
                termination: path.termination,
                root: path.root().map(|n| n.id.as_str()),
                clues: path.clue_ids(),
            })
            .collect();
        return print_json(&PathsOutput {
            stages: &selected,
            highest_stage: plan.map(|p| p.highest),
            stop_stage: plan.and_then(|p| p.stop_stage),
            paths,
            shared_clues: aggregated.shared_clues(),
            stats: &aggregated.stats,
            diagnostics: &reconstruction.diagnostics,
        });
    }

    let style = ctx.style;
    match plan {
        Some(plan) => {
            println!("{}", style.key_value("Highest stage", &style.stage(plan.highest)));
            let stop = plan
                .stop_stage
                .map(|s| style.stage(s))
                .unwrap_or_else(|| "none".to_string());
            println!("{}", style.key_value("Stop stage", &stop));
        }
        None => {
            ctx.info("No stages selected; nothing to reconstruct");
            return Ok(());
        }
    }

    if aggregated.paths.is_empty() {
        ctx.info("No paths found");
        return Ok(());
    }

    println!();
    println!("{}", style.section("PATHS"));
    for (index, path) in aggregated.paths.iter().enumerate() {
        let root = path.root().map(|n| n.id.as_str()).unwrap_or("?");
        let confidence = path
            .terminal()
            .map(|c| style.score(c.confidence))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  #{:<3} {:<9} {} {}  conf {}",
            index,
            style.termination(path.termination),
            root,
            path.clues
                .iter()
                .map(|c| format!("-[{}]-> {}", c.id, c.to.id))
                .collect::<Vec<_>>()
                .join(" "),
            confidence
        );
    }

    let shared = aggregated.shared_clues();
    if !shared.is_empty() {
        println!();
        println!("{}", style.section("SHARED CLUES"));
        for id in shared {
            let owners = aggregated
                .paths_using(id)
                .map(|set| {
                    set.iter()
                        .map(|i| format!("#{}", i))
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();
            println!("{}", style.list_item("-", &format!("{}  ({})", id, owners)));
        }
    }

    let stats = &aggregated.stats;
    println!();
    println!("{}", style.section("SUMMARY"));
    println!("{}", style.message_detail("Final clues", &stats.final_clues.to_string()));
    println!("{}", style.message_detail("Paths", &stats.path_count.to_string()));
    println!("{}", style.message_detail("Distinct clues", &stats.clue_count.to_string()));
    println!("{}", style.message_detail("Shared clues", &stats.shared_clue_count.to_string()));
    println!("{}", style.message_detail("Longest path", &stats.longest_path.to_string()));
    println!("{}", style.message_detail("Dangling paths", &stats.dangling_paths.to_string()));
    if stats.cap_reached {
        println!(
            "{}",
            style.message_detail("Cap reached", &format!("yes (max {})", engine.max_paths()))
        );
    }

    Ok(())
}

fn handle_stages(engine: &ClueEngine, file: &Path, json: bool) -> anyhow::Result<()> {
    let clues = load_clues(file)?;
    let summaries: Vec<StageSummary> = engine.summarize(&clues);

    if json {
        return print_json(&summaries);
    }

    println!("{}", table::render_stage_table(&summaries));
    Ok(())
}
