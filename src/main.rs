// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use tei_align::app_config::{self, Config};
use tei_align::errors::AppError;
use tei_align::file_utils::{FileIndex, FileManager};
use tei_align::rendering::OutputFormat;
use tei_align::viewer::{load_document, LoadOutcome, ViewerSession};

/// CLI Wrapper for OutputFormat to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Text,
    Markdown,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(cli_format: CliOutputFormat) -> Self {
        match cli_format {
            CliOutputFormat::Text => OutputFormat::Text,
            CliOutputFormat::Markdown => OutputFormat::Markdown,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// Options shared by every command
#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "tei-align.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Args, Debug, Clone)]
struct ViewArgs {
    /// TEI file or folder of TEI files
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Only consider indexed files whose name contains this text
    #[arg(long)]
    filter: Option<String>,

    /// Render every matching file of a folder instead of the first one
    #[arg(short, long)]
    all: bool,

    /// Output format
    #[arg(short = 'F', long, value_enum)]
    format: Option<CliOutputFormat>,

    /// Hide the original text
    #[arg(long)]
    hide_source: bool,

    /// Hide the translation
    #[arg(long)]
    hide_translation: bool,

    /// Segments rendered per batch
    #[arg(long)]
    batch_size: Option<usize>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show aligned segments of a TEI file or folder (default command)
    View(ViewArgs),

    /// List the TEI files of a folder
    List {
        /// Folder to index
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Only list files whose name contains this text
        #[arg(long)]
        filter: Option<String>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Report segment and translation counts per file
    Stats {
        /// TEI file or folder of TEI files
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Generate shell completions for tei-align
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// tei-align - side-by-side reading of annotated TEI texts
#[derive(Parser, Debug)]
#[command(name = "tei-align")]
#[command(version)]
#[command(about = "Show TEI passages next to their translation notes")]
#[command(long_about = "tei-align extracts paragraphs, verse lines and headings from TEI XML and pairs each
with the English translation note that directly follows it.

EXAMPLES:
    tei-align text.xml                          # Show a single document
    tei-align view -F markdown text.xml         # Render as Markdown
    tei-align view --filter juan corpus/        # First file of a folder matching 'juan'
    tei-align view --all corpus/                # Every file of a folder
    tei-align list corpus/                      # List indexed files
    tei-align stats corpus/                     # Translation coverage per file
    tei-align completions bash > tei-align.bash # Generate bash completions

CONFIGURATION:
    Settings are read from tei-align.json when it exists. Use --config-path to
    point at a different file. Command line flags override file values.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// TEI file or folder of TEI files
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                color, now, record.level(), record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "tei-align", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::View(args)) => run_view(args).await,
        Some(Commands::List { dir, filter, common }) => run_list(&dir, filter.as_deref(), &common),
        Some(Commands::Stats { input_path, common }) => run_stats(&input_path, &common),
        None => {
            // Default behavior - a bare input path means `view`
            let input_path = cli.input_path.ok_or_else(|| {
                anyhow!("INPUT_PATH is required when no subcommand is specified")
            })?;

            run_view(ViewArgs {
                input_path,
                filter: None,
                all: false,
                format: None,
                hide_source: false,
                hide_translation: false,
                batch_size: None,
                common: cli.common,
            })
            .await
        }
    }
}

/// Load the configuration, apply the log level and validate
fn load_config(common: &CommonArgs) -> Result<Config> {
    if let Some(level) = common.log_level {
        log::set_max_level(app_config::LogLevel::from(level).to_level_filter());
    }

    let mut config = Config::load_or_default(&common.config_path)?;

    match common.log_level {
        Some(level) => config.log_level = level.into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    Ok(config)
}

async fn run_view(args: ViewArgs) -> Result<()> {
    let mut config = load_config(&args.common)?;

    // Override config with CLI options if provided
    if let Some(format) = args.format {
        config.display.format = format.into();
    }
    if args.hide_source {
        config.display.show_source = false;
    }
    if args.hide_translation {
        config.display.show_translation = false;
    }
    if let Some(batch_size) = args.batch_size {
        config.display.batch_size = batch_size;
    }

    config.validate().map_err(|e| AppError::Config(format!("{:#}", e)))?;

    let format = config.display.format;
    let session = ViewerSession::new(config);
    let mut stdout = std::io::stdout();

    if args.input_path.is_file() {
        session.open_single(args.input_path.clone()).await?;
        return session.render_current(format, &mut stdout).await;
    }

    if !args.input_path.is_dir() {
        return Err(AppError::File(format!("Input path does not exist: {:?}", args.input_path)).into());
    }

    if session.index_folder(args.input_path.clone()).await? == 0 {
        return Ok(());
    }
    if let Some(filter) = &args.filter {
        session.set_filter(filter).await;
    }

    let visible = session.visible_files().await;
    if visible.is_empty() {
        warn!("No indexed file matches the filter");
        return Ok(());
    }

    let targets = if args.all { &visible[..] } else { &visible[..1] };
    for entry in targets {
        match session.open_indexed(&entry.key).await {
            Ok(LoadOutcome::Loaded { .. }) => session.render_current(format, &mut stdout).await?,
            Ok(LoadOutcome::Superseded) => {}
            // With --all a broken file must not hide the others
            Err(e) if args.all => error!("Error processing file {}: {:#}", entry.key, e),
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

fn run_list(dir: &Path, filter: Option<&str>, common: &CommonArgs) -> Result<()> {
    let config = load_config(common)?;
    config.validate().map_err(|e| AppError::Config(format!("{:#}", e)))?;

    if !FileManager::dir_exists(dir) {
        return Err(AppError::File(format!("Folder does not exist: {:?}", dir)).into());
    }

    let index = FileIndex::build(dir, &config.index)?;
    let shown = index.filter(filter.unwrap_or(""));

    let mut stdout = std::io::stdout();
    for entry in &shown {
        writeln!(stdout, "{}", entry.key)?;
    }
    info!("{} files", shown.len());

    Ok(())
}

fn run_stats(input_path: &Path, common: &CommonArgs) -> Result<()> {
    let config = load_config(common)?;
    config.validate().map_err(|e| AppError::Config(format!("{:#}", e)))?;

    let index = if input_path.is_file() {
        FileIndex::single(input_path)
    } else if input_path.is_dir() {
        FileIndex::build(input_path, &config.index)?
    } else {
        return Err(AppError::File(format!("Input path does not exist: {:?}", input_path)).into());
    };

    let progress_bar = ProgressBar::new(index.len() as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(style.progress_chars("=>-"));

    let mut files_ok = 0usize;
    let mut files_failed = 0usize;
    let mut total_segments = 0usize;
    let mut total_translated = 0usize;

    for entry in index.entries() {
        progress_bar.set_message(entry.key.clone());
        match load_document(&entry.path, &entry.key) {
            Ok(document) => {
                files_ok += 1;
                total_segments += document.segments.len();
                total_translated += document.translated_count();
                progress_bar.println(format!(
                    "[ok] {} segments={} translated={} coverage={:.1}%",
                    entry.key,
                    document.segments.len(),
                    document.translated_count(),
                    document.translation_coverage()
                ));
            }
            Err(e) => {
                files_failed += 1;
                progress_bar.println(format!("[skip] {} {:#}", entry.key, e));
            }
        }
        progress_bar.inc(1);
    }
    progress_bar.finish_and_clear();

    println!(
        "[summary] files={} ok={} failed={} total_segments={} translated={}",
        index.len(),
        files_ok,
        files_failed,
        total_segments,
        total_translated
    );

    Ok(())
}
