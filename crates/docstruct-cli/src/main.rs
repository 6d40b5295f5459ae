//! docstruct CLI
//!
//! Split plain-text documents into provenance-carrying chunks.
//!
//! ```bash
//! # Recursive splitting with defaults, JSON to stdout
//! docstruct split notes/
//!
//! # Fixed windows from a config file, JSON Lines to a file
//! docstruct split -c docstruct.toml --strategy fixed -o chunks.jsonl --format jsonl notes.txt
//!
//! # Print the default configuration
//! docstruct config
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use docstruct::{
    ChunkPipeline, ChunkingConfig, DocstructConfig, SplitterConfig, TokenizerConfig, Unit,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod loader;

#[derive(Parser)]
#[command(name = "docstruct")]
#[command(about = "Split plain-text documents into chunks for retrieval pipelines")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split files or directories into chunks
    Split(SplitArgs),

    /// Print the effective configuration as TOML
    Config,
}

#[derive(clap::Args)]
struct SplitArgs {
    /// Files or directories to split
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Splitting strategy (overrides the config file)
    #[arg(short, long)]
    strategy: Option<Strategy>,

    /// Maximum chunk size (characters, or tokens for the token strategy)
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Overlap between consecutive chunks
    #[arg(long)]
    chunk_overlap: Option<usize>,

    /// Separator for the recursive strategy, in priority order (repeatable)
    #[arg(long = "separator")]
    separators: Vec<String>,

    /// Model whose tokenizer is preferred (token strategy)
    #[arg(long)]
    model: Option<String>,

    /// Fallback encoding name (token strategy)
    #[arg(long)]
    encoding: Option<String>,

    /// Directory holding tokenizer files (token strategy)
    #[arg(long)]
    tokenizer_dir: Option<PathBuf>,

    /// Split units on all cores
    #[arg(long)]
    parallel: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Strategy {
    Fixed,
    Recursive,
    Token,
}

impl Strategy {
    fn name(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Recursive => "recursive",
            Self::Token => "token",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum OutputFormat {
    /// Pretty-printed JSON array
    #[default]
    Json,
    /// One JSON object per line
    Jsonl,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "docstruct=debug,docstruct_cli=debug"
    } else {
        "docstruct=info,docstruct_cli=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = match &cli.config {
        Some(path) => DocstructConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => DocstructConfig::default(),
    };

    match cli.command {
        Commands::Split(args) => run_split(config, args),
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn run_split(mut config: DocstructConfig, args: SplitArgs) -> Result<()> {
    config.splitter = apply_overrides(config.splitter, &args);
    config.orchestrator.parallel |= args.parallel;

    let pipeline = ChunkPipeline::from_config(&config).context("Invalid splitter configuration")?;
    let files = loader::collect_files(&args.paths)?;
    if files.is_empty() {
        anyhow::bail!("No supported files found (expected .txt, .text, .md or .markdown)");
    }

    let units = load_units(&files)?;
    let chunks = pipeline.run(&units)?;

    write_chunks(&chunks, args.output.as_ref(), args.format)?;

    eprintln!(
        "{} Split {} documents into {} chunks ({})",
        style("✓").green().bold(),
        units.len(),
        chunks.len(),
        style(pipeline.splitter().name()).cyan()
    );
    Ok(())
}

/// Layer command-line flags over the configured splitter
fn apply_overrides(splitter: SplitterConfig, args: &SplitArgs) -> SplitterConfig {
    let mut splitter = match args.strategy {
        None => splitter,
        Some(strategy) if strategy.name() == splitter.strategy() => splitter,
        Some(Strategy::Fixed) => SplitterConfig::Fixed {
            chunk_size: ChunkingConfig::characters().chunk_size,
            chunk_overlap: ChunkingConfig::characters().chunk_overlap,
        },
        Some(Strategy::Recursive) => SplitterConfig::default(),
        Some(Strategy::Token) => SplitterConfig::Token {
            chunk_size: ChunkingConfig::tokens().chunk_size,
            chunk_overlap: ChunkingConfig::tokens().chunk_overlap,
            tokenizer: TokenizerConfig::default(),
        },
    };

    let mut chunking = splitter.chunking();
    if let Some(size) = args.chunk_size {
        chunking.chunk_size = size;
    }
    if let Some(overlap) = args.chunk_overlap {
        chunking.chunk_overlap = overlap;
    }
    splitter = splitter.with_chunking(chunking);

    match &mut splitter {
        SplitterConfig::Recursive { separators, .. } if !args.separators.is_empty() => {
            *separators = args.separators.iter().map(|s| unescape(s)).collect();
        }
        SplitterConfig::Token { tokenizer, .. } => {
            if let Some(model) = &args.model {
                tokenizer.model_name = model.clone();
            }
            if let Some(encoding) = &args.encoding {
                tokenizer.encoding_name = encoding.clone();
            }
            if let Some(dir) = &args.tokenizer_dir {
                tokenizer.tokenizer_dir = Some(dir.clone());
            }
        }
        _ => {}
    }

    splitter
}

/// Interpret `\n`, `\t` and `\\` in separators given on the command line
fn unescape(separator: &str) -> String {
    let mut out = String::with_capacity(separator.len());
    let mut chars = separator.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn load_units(files: &[PathBuf]) -> Result<Vec<Unit>> {
    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let mut units = Vec::with_capacity(files.len());
    for path in files {
        progress.set_message(path.display().to_string());
        units.push(loader::load_file(path)?);
        progress.inc(1);
    }
    progress.finish_and_clear();

    tracing::info!("Loaded {} documents", units.len());
    Ok(units)
}

fn write_chunks(chunks: &[Unit], output: Option<&PathBuf>, format: OutputFormat) -> Result<()> {
    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = BufWriter::new(writer);

    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, chunks)?;
            writeln!(writer)?;
        }
        OutputFormat::Jsonl => {
            for chunk in chunks {
                serde_json::to_writer(&mut writer, chunk)?;
                writeln!(writer)?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}
