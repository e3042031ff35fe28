// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{warn, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use subtiming::app_config::{self, default_settings_path, SettingsStore, TIMING_GROUP};
use subtiming::file_utils::FileManager;
use subtiming::subtitle_processor::SubtitleDocument;
use subtiming::validation::constraints::set_timing_value;
use subtiming::validation::{validate, TimingConstraints, TimingService, Violation};

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

#[derive(Subcommand, Debug)]
enum Commands {
    /// Report timing violations in a subtitle file or every .srt in a directory
    Check {
        /// Subtitle file or directory
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Print violations as JSON
        #[arg(long)]
        json: bool,
    },

    /// Correct fixable timing violations and write the result
    Fix {
        /// Subtitle file to correct
        #[arg(value_name = "INPUT_FILE")]
        input_file: PathBuf,

        /// Output file (defaults to rewriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Force overwrite of an existing output file
        #[arg(short, long)]
        force_overwrite: bool,
    },

    /// Show or change the timing settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions for subtiming
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective timing settings
    Show,
    /// Set one timing setting
    Set {
        /// Setting key, e.g. max-characters-per-second
        key: String,
        /// New value
        value: String,
    },
    /// Remove stored timing settings so defaults apply
    Reset,
}

/// subtiming - subtitle timing checker
///
/// Validates subtitle timing against reading speed, gap, duration and
/// layout limits, and optionally corrects end times.
#[derive(Parser, Debug)]
#[command(name = "subtiming")]
#[command(version)]
#[command(about = "Subtitle timing checker and corrector")]
#[command(long_about = "subtiming checks SRT subtitles against timing constraints and can correct end times.

EXAMPLES:
    subtiming check movie.srt                          # Report violations
    subtiming check --json /subs/                      # Check a whole directory, JSON output
    subtiming fix movie.srt -o movie.fixed.srt         # Correct and write to a new file
    subtiming config set max-characters-per-second 20  # Change a limit
    subtiming config show                              # Print effective settings
    subtiming completions bash > subtiming.bash        # Generate bash completions

CONFIGURATION:
    Settings live in <config dir>/subtiming/settings.json unless --config
    is given. Missing keys use built-in defaults.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Settings file path
    #[arg(short, long, global = true)]
    config_path: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
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

    // @returns: ANSI color and tag for level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
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
            let (color, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logger accepts everything; the max level does the filtering
    CustomLogger::init(LevelFilter::Trace)?;

    let cli = CommandLineOptions::parse();

    let level: app_config::LogLevel = cli.log_level.map(Into::into).unwrap_or_default();
    log::set_max_level(level.to_level_filter());

    let config_path = cli.config_path.clone().unwrap_or_else(default_settings_path);

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subtiming", &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { input_path, json } => run_check(&config_path, &input_path, json).await,
        Commands::Fix { input_file, output, force_overwrite } => {
            run_fix(&config_path, &input_file, output.as_deref(), force_overwrite).await
        }
        Commands::Config { action } => run_config(&config_path, action),
    }
}

async fn run_check(config_path: &Path, input_path: &Path, json: bool) -> Result<ExitCode> {
    let store = SettingsStore::load(config_path)
        .context("Failed to load settings")?;
    let constraints = TimingConstraints::from_store(&store);

    let files = FileManager::collect_subtitle_files(input_path)?;
    if files.is_empty() {
        warn!("No subtitle files found in {}", input_path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let mut total_violations = 0;
    let mut json_results = serde_json::Map::new();

    for file in &files {
        let document = load_document(file).await?;
        let violations = validate(document.entries(), &constraints);
        total_violations += violations.len();

        if json {
            json_results.insert(file.display().to_string(), serde_json::to_value(&violations)?);
        } else {
            print_violations(file, &violations);
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&json_results)?);
    }

    info!("Checked {} file(s), {} violation(s)", files.len(), total_violations);

    Ok(if total_violations == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

async fn run_fix(config_path: &Path, input_file: &Path, output: Option<&Path>, force_overwrite: bool) -> Result<ExitCode> {
    let store = SettingsStore::load(config_path)
        .context("Failed to load settings")?;

    if !FileManager::file_exists(input_file) {
        return Err(anyhow!("Input file does not exist: {}", input_file.display()));
    }

    let output_path = output.unwrap_or(input_file);
    if output.is_some() && FileManager::file_exists(output_path) && !force_overwrite {
        return Err(anyhow!(
            "Output file already exists: {} (use --force-overwrite to replace it)",
            output_path.display()
        ));
    }

    let mut service = TimingService::new(&store);
    if !service.constraints().auto_check {
        warn!("Auto timing check is disabled in settings (do-auto-timing-check), nothing to fix");
        return Ok(ExitCode::FAILURE);
    }

    let mut document = load_document(input_file).await?;
    let report = service.check(&store, &mut document);

    for adjustment in &report.adjustments {
        info!(
            "#{}: end {} -> {} ({})",
            adjustment.seq_num,
            subtiming::SubtitleEntry::format_timestamp(adjustment.old_end_ms),
            subtiming::SubtitleEntry::format_timestamp(adjustment.new_end_ms),
            adjustment.reason.label()
        );
    }

    if let Some(parent) = output_path.parent() {
        FileManager::ensure_dir(parent)?;
    }
    document.write_to_srt(output_path)?;
    info!("Wrote {} entries to {}", document.len(), output_path.display());

    if !report.passed() {
        print_violations(output_path, &report.violations);
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

fn run_config(config_path: &Path, action: ConfigAction) -> Result<ExitCode> {
    let mut store = SettingsStore::load(config_path)
        .context("Failed to load settings")?;

    match action {
        ConfigAction::Show => {
            let constraints = TimingConstraints::from_store(&store);
            println!("[{}] ({})", TIMING_GROUP, config_path.display());
            println!("{}", serde_json::to_string_pretty(&constraints)?);
        }
        ConfigAction::Set { key, value } => {
            set_timing_value(&mut store, &key, &value)?;
            store.save()?;
            info!("Set {}/{} = {}", TIMING_GROUP, key, value);
        }
        ConfigAction::Reset => {
            store.reset_group(TIMING_GROUP);
            store.save()?;
            info!("Timing settings reset to defaults");
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn load_document(path: &Path) -> Result<SubtitleDocument> {
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || SubtitleDocument::from_file(owned))
        .await
        .context("Subtitle loading task failed")?
}

fn print_violations(file: &Path, violations: &[Violation]) {
    if violations.is_empty() {
        println!("{}: OK", file.display());
        return;
    }

    println!("{}: {} violation(s)", file.display(), violations.len());
    for violation in violations {
        println!("  {}", violation);
    }
}
