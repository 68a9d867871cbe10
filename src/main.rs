#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{Level as TraceLevel, info};
use tracing_subscriber::FmtSubscriber;

use toggler::buffer::TextBuffer;
use toggler::constants::env;
use toggler::{Command, ConfigStore, Notification, Toggler};

#[derive(Parser, Debug)]
#[command(name = "toggler", version, about = "Cycle words through configured toggle groups")]
struct Cli {
    /// Configuration file (default: $TOGGLER_CONFIG, then <config dir>/toggler/toggler.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Print the toggle of a single word
    Word { word: String },

    /// Toggle selections in a file
    Buffer {
        file: PathBuf,

        /// Selection as OFFSET[:LENGTH] in bytes (repeatable); without a
        /// length (or with 0) the word under OFFSET is toggled
        #[arg(long = "select", required = true, value_parser = parse_selection)]
        selections: Vec<Range<usize>>,

        /// Rewrite the file instead of printing the result
        #[arg(long)]
        write: bool,
    },

    /// Create the configuration from the bundled default if needed and print its path
    Config,

    /// Reload the configuration and report problems
    Check,
}

fn parse_selection(value: &str) -> Result<Range<usize>, String> {
    let (offset, length) = value.split_once(':').unwrap_or((value, "0"));
    let offset: usize = offset
        .parse()
        .map_err(|e| format!("invalid offset '{offset}': {e}"))?;
    let length: usize = length
        .parse()
        .map_err(|e| format!("invalid length '{length}': {e}"))?;
    let end = offset
        .checked_add(length)
        .ok_or_else(|| format!("selection end overflows ({offset} + {length})"))?;
    Ok(offset..end)
}

fn init_logging() -> Result<()> {
    let log_level = match std::env::var(env::LOG_LEVEL)
        .unwrap_or_else(|_| "warn".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "info" => TraceLevel::INFO,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Print what the plugin told the "editor" to show the user
fn report(notifications: &[Notification]) {
    for notification in notifications {
        match notification {
            Notification::Warning(message) => eprintln!("warning: {message}"),
            Notification::Error { message, detail } => {
                eprintln!("error: {message}");
                eprintln!("  {detail}");
            }
        }
    }
}

/// Activate the plugin against `buffer` and run the toggle command on it.
/// Returns whether every selection was toggled.
fn toggle_buffer(store: ConfigStore, buffer: &mut TextBuffer) -> bool {
    let mut toggler = Toggler::new(store);
    toggler.activate(buffer);
    let summary = toggler.dispatch(Command::Toggle, buffer);
    toggler.deactivate();
    report(buffer.notifications());

    info!(toggled = summary.toggled, not_found = summary.not_found.len(), "Toggle finished");
    toggler.store().snapshot().is_some() && summary.not_found.is_empty()
}

fn run_word(store: ConfigStore, word: &str, out: &mut dyn Write) -> Result<bool> {
    let mut buffer = TextBuffer::new(word);
    buffer.add_selection(0..word.len())?;

    if !toggle_buffer(store, &mut buffer) {
        return Ok(false);
    }
    writeln!(out, "{}", buffer.text())?;
    Ok(true)
}

fn run_buffer(
    store: ConfigStore,
    file: &Path,
    selections: &[Range<usize>],
    write: bool,
    out: &mut dyn Write,
) -> Result<bool> {
    let contents =
        fs::read_to_string(file).context(format!("Failed to read {}", file.display()))?;
    let mut buffer = TextBuffer::new(contents);
    for (index, selection) in selections.iter().enumerate() {
        buffer
            .add_selection(selection.clone())
            .context(format!("Invalid selection #{}", index + 1))?;
    }

    let ok = toggle_buffer(store, &mut buffer);
    let text = buffer.into_text();
    if write {
        fs::write(file, &text).context(format!("Failed to write {}", file.display()))?;
    } else {
        write!(out, "{text}")?;
    }
    Ok(ok)
}

fn run_config(store: ConfigStore, out: &mut dyn Write) -> Result<bool> {
    let mut toggler = Toggler::new(store);
    let mut buffer = TextBuffer::new("");
    toggler.dispatch(Command::Configure, &mut buffer);
    report(buffer.notifications());
    if !buffer.notifications().is_empty() {
        return Ok(false);
    }
    writeln!(out, "{}", toggler.store().path().display())?;
    Ok(true)
}

fn run_check(mut store: ConfigStore, out: &mut dyn Write) -> Result<bool> {
    let path = store.path().display().to_string();
    let configuration = store
        .load(true)
        .context(format!("Configuration at {path} is not usable"))?;

    writeln!(out, "{path}: {} group(s)", configuration.len())?;
    let duplicates = configuration.duplicates();
    if !duplicates.is_empty() {
        writeln!(
            out,
            "words in more than one group (first group wins): {}",
            duplicates.join(", ")
        )?;
    }
    Ok(true)
}

fn main() -> Result<ExitCode> {
    init_logging()?;
    let cli = Cli::parse();

    let store = ConfigStore::from_env(cli.config);
    info!(path = %store.path().display(), "Using configuration file");
    let mut out = io::stdout().lock();

    let ok = match cli.command {
        CliCommand::Word { word } => run_word(store, &word, &mut out)?,
        CliCommand::Buffer {
            file,
            selections,
            write,
        } => run_buffer(store, &file, &selections, write, &mut out)?,
        CliCommand::Config => run_config(store, &mut out)?,
        CliCommand::Check => run_check(store, &mut out)?,
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
