//! letterstat CLI - letter frequencies across a repository's JavaScript/TypeScript files
//!
//! Crawls a GitHub repository through the contents API, fetches every `.js`/`.ts` file and prints
//! how often each letter occurs.

use clap::{Parser, Subcommand, ValueEnum};
use letterstat_core::{
    init_logging, log_operation_start, log_operation_success, ErrorContext, LetterStatConfig,
    LetterStatError, LetterStatResult, LoggingConfig, ProgressSink,
};
use letterstat_stats::{render, render_json, render_text, LetterStatistics};
use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "letterstat")]
#[command(about = "Letter frequency statistics for a repository's JavaScript/TypeScript files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Count letters across the repository's .js/.ts files
    Analyze(AnalyzeArgs),

    /// Manage configuration
    Config {
        /// Show the effective configuration (token redacted)
        #[arg(long)]
        show: bool,

        /// Write a default configuration file
        #[arg(long)]
        init: bool,
    },
}

#[derive(clap::Args, Debug, Default)]
struct AnalyzeArgs {
    /// Repository owner
    #[arg(long)]
    owner: Option<String>,

    /// Repository name
    #[arg(long)]
    repo: Option<String>,

    /// Branch, tag or commit to read
    #[arg(long)]
    branch: Option<String>,

    /// Directory to start from (repository root when omitted)
    #[arg(long)]
    root: Option<String>,

    /// Access token for the GitHub API
    #[arg(short, long)]
    token: Option<String>,

    /// Search all subdirectories
    #[arg(short, long, conflicts_with = "mode")]
    recursive: bool,

    /// Which files to search; prompts when omitted on a terminal
    #[arg(long, value_enum)]
    mode: Option<SearchMode>,

    /// Maximum number of concurrent requests
    #[arg(long)]
    concurrency: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SearchMode {
    /// Files in the root directory only
    Root,
    /// Files in every directory
    Recursive,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Prints each file as it is read, matching the report on stdout
struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn notify(&self, message: &str) {
        eprintln!("Reading file: {}", message);
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let logging_config = if cli.verbose {
        LoggingConfig::verbose()
    } else {
        LoggingConfig::default()
    };

    if let Err(e) = init_logging(&logging_config) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    info!("Starting letterstat v{}", env!("CARGO_PKG_VERSION"));

    if let Err(error) = run(cli).await {
        error.log();
        eprintln!("Error: {}", error);
        if let Some(context) = error.context() {
            for suggestion in &context.recovery_suggestions {
                eprintln!("  hint: {}", suggestion);
            }
        }
        if error.is_retryable() {
            eprintln!("This may be a temporary failure; run the command again to retry.");
        }
        std::process::exit(error.exit_code());
    }
}

async fn run(cli: Cli) -> LetterStatResult<()> {
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Analyze(args) => handle_analyze(args, config).await,
        Commands::Config { show, init } => handle_config(show, init, &config),
    }
}

fn load_config(config_path: Option<&PathBuf>) -> LetterStatResult<LetterStatConfig> {
    let mut config = if let Some(path) = config_path {
        info!("Loading configuration from {:?}", path);
        LetterStatConfig::from_file(path)?
    } else {
        let found = default_config_paths().into_iter().find(|path| path.exists());
        match found {
            Some(path) => {
                info!("Loading configuration from {:?}", path);
                LetterStatConfig::from_file(&path)?
            }
            None => {
                info!("No configuration file found, using defaults");
                LetterStatConfig::default()
            }
        }
    };

    config.apply_env_overrides();
    Ok(config)
}

fn default_config_paths() -> Vec<PathBuf> {
    [
        dirs::config_dir().map(|d| d.join("letterstat").join("config.toml")),
        dirs::home_dir().map(|d| d.join(".letterstat").join("config.toml")),
        Some(PathBuf::from("letterstat.toml")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Fold command-line overrides into the loaded configuration
fn apply_overrides(config: &mut LetterStatConfig, args: &AnalyzeArgs) {
    if let Some(owner) = &args.owner {
        config.repository.owner = owner.clone();
    }
    if let Some(repo) = &args.repo {
        config.repository.name = repo.clone();
    }
    if let Some(branch) = &args.branch {
        config.repository.branch = Some(branch.clone());
    }
    if let Some(root) = &args.root {
        config.repository.root = root.trim_matches('/').to_string();
    }
    if let Some(token) = &args.token {
        config.api.access_token = Some(token.clone());
    }
    if let Some(concurrency) = args.concurrency {
        config.analysis.max_concurrent_fetches = concurrency;
    }
}

/// Search mode from flags, falling back to a prompt on terminals and the config otherwise
fn resolve_recursive(args: &AnalyzeArgs, config: &LetterStatConfig) -> LetterStatResult<bool> {
    if args.recursive {
        return Ok(true);
    }
    if let Some(mode) = args.mode {
        return Ok(mode == SearchMode::Recursive);
    }

    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        prompt_recursive(stdin.lock(), std::io::stderr())
    } else {
        Ok(config.analysis.recursive)
    }
}

/// Ask until the user answers '1' (root) or '2' (recursive)
fn prompt_recursive<R: BufRead, W: Write>(mut input: R, mut output: W) -> LetterStatResult<bool> {
    loop {
        writeln!(
            output,
            "Enter '1' to search files in the root directory, or '2' to search all files recursively."
        )?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(LetterStatError::Validation {
                message: "No search mode selected".to_string(),
                field: Some("mode".to_string()),
                context: ErrorContext::new("cli")
                    .with_operation("prompt")
                    .with_suggestion("Pass --mode root or --mode recursive"),
            });
        }

        match line.trim() {
            "1" => return Ok(false),
            "2" => return Ok(true),
            _ => writeln!(output, "Invalid input. Please enter '1' or '2'.")?,
        }
    }
}

async fn handle_analyze(args: AnalyzeArgs, mut config: LetterStatConfig) -> LetterStatResult<()> {
    apply_overrides(&mut config, &args);
    config.validate()?;

    let recursive = resolve_recursive(&args, &config)?;
    let repo = config.repo_info();
    let root = config.repository.root.clone();

    log_operation_start!("letter_statistics",
        repo = %repo.full_name(),
        root = %root,
        recursive = recursive
    );

    let statistics = LetterStatistics::for_github(&config, Arc::new(ConsoleProgress))?;
    let outcome = statistics.analyze(&root, recursive).await?;

    let rows = render(&outcome.histogram);
    let report = match args.format {
        OutputFormat::Text => render_text(&rows),
        OutputFormat::Json => format!("{}\n", render_json(&rows)?),
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(report.as_bytes())?;
    stdout.flush()?;

    log_operation_success!("letter_statistics",
        repo = %repo.full_name(),
        files = outcome.files_processed,
        distinct_letters = rows.len()
    );

    Ok(())
}

fn handle_config(show: bool, init: bool, config: &LetterStatConfig) -> LetterStatResult<()> {
    if init {
        let path = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|d| d.join(".config")))
            .map(|d| d.join("letterstat").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("letterstat.toml"));

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        LetterStatConfig::default().save_to_file(&path)?;
        println!("Configuration initialized at: {:?}", path);
    }

    if show || !init {
        print!("{}", redacted(config).to_toml_string()?);
    }

    Ok(())
}

fn redacted(config: &LetterStatConfig) -> LetterStatConfig {
    let mut shown = config.clone();
    if shown.api.access_token.is_some() {
        shown.api.access_token = Some("***".to_string());
    }
    shown
}
