use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use claude_tree_graph::{compute_path_weights, AgentDocIndex, EdgeMerger, MergeOptions};
use claude_tree_indexer::{inventory, load_token_counter};
use claude_tree_protocol::{MergedGraph, TreeArtifact};
use config::ToolConfig;
use flags::{DocTypeFlag, SchemaKind};
use report::{fmt_tokens, render_report, ReportInput};
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

mod config;
mod flags;
mod report;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "claude-tree")]
#[command(about = "Inventory and weigh agent instruction files (CLAUDE.md / AGENTS.md)", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (merge: list per-file validation errors)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors and skip summaries
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Config file (default: .claude-tree.toml in the project root or current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk a project and emit the agent doc tree artifact
    Tree(TreeArgs),

    /// Validate and merge per-doc edge files into one edge list
    Merge(MergeArgs),

    /// Compute cumulative context cost for every directory
    Weights(WeightsArgs),

    /// Render a markdown report (heaviest paths, token budget, references)
    Report(ReportArgs),

    /// Print the JSON Schema of an artifact
    Schema(SchemaArgs),
}

#[derive(Args)]
struct TreeArgs {
    /// Project root to scan
    root: PathBuf,

    /// Keep every scanned file instead of pruning to agent docs
    #[arg(long)]
    full_tree: bool,

    /// Write the artifact here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// tokenizer.json used for counting (env: CLAUDE_TREE_TOKENIZER)
    #[arg(long)]
    tokenizer: Option<PathBuf>,
}

#[derive(Args)]
struct MergeArgs {
    /// Directory holding one edge record file per agent doc
    #[arg(short, long)]
    input_dir: PathBuf,

    /// Merged edges output file
    #[arg(short, long)]
    output: PathBuf,

    /// Print per-file validation errors
    #[arg(long)]
    validate: bool,
}

#[derive(Args)]
struct WeightsArgs {
    /// Tree artifact produced by `claude-tree tree`
    #[arg(long)]
    tree: PathBuf,

    /// Write the artifact here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Document families included in the totals
    #[arg(long, value_enum, default_value = "all")]
    doc_type: DocTypeFlag,
}

#[derive(Args)]
struct ReportArgs {
    /// Tree artifact produced by `claude-tree tree`
    #[arg(long)]
    tree: PathBuf,

    /// Merged edges produced by `claude-tree merge`
    #[arg(long)]
    edges: Option<PathBuf>,

    /// Directory whose context chain is broken down
    #[arg(long)]
    path: Option<String>,

    /// Green ceiling (tokens below it are healthy)
    #[arg(long)]
    green: Option<usize>,

    /// Yellow ceiling (tokens at or above it are critical)
    #[arg(long)]
    yellow: Option<usize>,

    /// Document families included in the totals
    #[arg(long, value_enum, default_value = "all")]
    doc_type: DocTypeFlag,

    /// Number of heaviest paths listed
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct SchemaArgs {
    #[arg(value_enum)]
    kind: SchemaKind,
}

pub fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let summary = Summary { quiet: cli.quiet };
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Tree(args) => run_tree(args, config_path, summary)?,
        Commands::Merge(args) => run_merge(args, cli.verbose, summary)?,
        Commands::Weights(args) => run_weights(args)?,
        Commands::Report(args) => run_report(args, config_path)?,
        Commands::Schema(args) => {
            print_stdout(&serde_json::to_string_pretty(&args.kind.schema())?)?
        }
    }

    Ok(())
}

/// Human-readable progress on stderr; stdout stays reserved for artifacts.
#[derive(Clone, Copy)]
struct Summary {
    quiet: bool,
}

impl Summary {
    fn line(self, text: impl AsRef<str>) {
        if !self.quiet {
            eprintln!("{}", text.as_ref());
        }
    }
}

fn run_tree(args: TreeArgs, config_path: Option<&Path>, summary: Summary) -> Result<()> {
    let root = args.root.canonicalize().unwrap_or_else(|_| args.root.clone());
    let config = ToolConfig::load(config_path, &root)?;

    let tokenizer = config.tokenizer_path(args.tokenizer.as_deref());
    let counter = load_token_counter(tokenizer.as_deref()).context("Failed to load tokenizer")?;
    let artifact = inventory(&root, counter.as_ref(), config.scan_options(), args.full_tree)
        .context("Failed to scan project")?;

    let json = serde_json::to_string_pretty(&artifact)?;
    write_output(args.output.as_deref(), &json)?;

    summary.line("Agent docs found:");
    if artifact.agent_docs.is_empty() {
        summary.line("  (none)");
    }
    for doc in &artifact.agent_docs {
        summary.line(format!("  {} ({} tokens)", doc.path, fmt_tokens(doc.tokens)));
    }
    summary.line(format!(
        "Total: {} agent docs, {} tokens",
        artifact.total_agent_docs,
        fmt_tokens(artifact.total_tokens)
    ));

    let over_budget: Vec<_> = artifact
        .agent_docs
        .iter()
        .filter(|doc| doc.tokens > config.doc_budget)
        .collect();
    if !over_budget.is_empty() {
        summary.line(format!(
            "Warning: {} agent docs exceed the {}-token budget:",
            over_budget.len(),
            fmt_tokens(config.doc_budget)
        ));
        for doc in over_budget {
            summary.line(format!("  {} ({} tokens)", doc.path, fmt_tokens(doc.tokens)));
        }
    }
    if let Some(path) = &args.output {
        summary.line(format!("Tree written to: {}", path.display()));
    }
    Ok(())
}

fn run_merge(args: MergeArgs, verbose: bool, summary: Summary) -> Result<()> {
    let merger = EdgeMerger::new(MergeOptions {
        detailed: args.validate || verbose,
    })?;
    let (merged, result) = merger
        .merge_dir(&args.input_dir)
        .context("Failed to merge edge files")?;

    write_output(Some(&args.output), &serde_json::to_string_pretty(&merged)?)?;

    summary.line(format!("Files processed: {}", result.files_processed));
    summary.line(format!("Valid files: {}", result.files_valid));
    summary.line(format!("Invalid files: {}", result.files_invalid));
    summary.line(format!("Total edges: {}", result.total_edges));
    summary.line(format!("Output written to: {}", args.output.display()));

    if !result.validation_errors.is_empty() {
        summary.line("");
        summary.line("Validation errors:");
        for (file, errors) in &result.validation_errors {
            summary.line(format!("  {file}:"));
            for error in errors {
                summary.line(format!("    - {error}"));
            }
        }
    }

    if result.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}

fn run_weights(args: WeightsArgs) -> Result<()> {
    let tree: TreeArtifact = load_json(&args.tree)?;
    let index = AgentDocIndex::from_artifact(&tree);
    let weights = compute_path_weights(&index, args.doc_type.as_domain());
    write_output(args.output.as_deref(), &serde_json::to_string_pretty(&weights)?)
}

fn run_report(args: ReportArgs, config_path: Option<&Path>) -> Result<()> {
    let config = ToolConfig::load(config_path, Path::new("."))?;
    let tree: TreeArtifact = load_json(&args.tree)?;
    let edges: Option<MergedGraph> = args
        .edges
        .as_deref()
        .map(load_json::<MergedGraph>)
        .transpose()?;

    let markdown = render_report(&ReportInput {
        tree: &tree,
        edges: edges.as_ref(),
        focus_path: args.path.as_deref(),
        filter: args.doc_type.as_domain(),
        thresholds: config.thresholds(args.green, args.yellow),
        doc_budget: config.doc_budget,
        top: args.top,
    });
    write_output(args.output.as_deref(), markdown.trim_end())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid artifact {}", path.display()))
}

/// Write `text` to `output` (parents created) or to stdout.
fn write_output(output: Option<&Path>, text: &str) -> Result<()> {
    let Some(path) = output else {
        return print_stdout(text);
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, format!("{text}\n"))
        .with_context(|| format!("Failed to write {}", path.display()))
}
