// LogPeek - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Configuration loading and CLI overrides
// 3. Logging initialisation (debug mode support)
// 4. Dispatch to the HTTP server or a one-shot command

use logpeek::app::api::{PollResponse, ViewLogs};
use logpeek::app::{server, viewer::Viewer};
use logpeek::core::discovery::encode_reference;
use logpeek::core::model::ParseOutcome;
use logpeek::platform::config::{self, AppConfig, PlatformPaths};
use logpeek::platform::fs::absolutize;
use logpeek::util::constants::{APP_VERSION, TOO_LARGE_MESSAGE};
use logpeek::util::error::{ConfigError, LogPeekError, Result};
use logpeek::util::logging;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

/// LogPeek - browse, tail and prune application log files.
///
/// Serves a small JSON API over a directory of CodeIgniter-style log files,
/// or runs a single catalog operation from the command line.
#[derive(Parser, Debug)]
#[command(name = "logpeek", version, about)]
struct Cli {
    /// Config file (defaults to the platform config directory).
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// Log directory, overriding the config file.
    #[arg(long = "dir", global = true)]
    dir: Option<PathBuf>,

    /// File name glob, overriding the config file.
    #[arg(long = "pattern", global = true)]
    pattern: Option<String>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server.
    Serve {
        /// Socket address to listen on.
        #[arg(short = 'b', long = "bind")]
        bind: Option<String>,
    },
    /// List catalog files, newest first.
    List,
    /// Print the records of FILE (or the catalog top) as JSON.
    View {
        /// File name inside the log directory.
        file: Option<String>,
    },
    /// Print a polling response as JSON.
    Poll {
        /// File name inside the log directory.
        #[arg(short = 'f', long = "file")]
        file: Option<String>,
        /// Last modification time the caller saw, in Unix seconds.
        #[arg(short = 't', long = "since", default_value_t = 0)]
        since: i64,
    },
    /// Delete one file or the whole catalog.
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct DeleteArgs {
    /// File name inside the log directory.
    file: Option<String>,
    /// Delete every file matching the pattern.
    #[arg(long = "all")]
    all: bool,
}

fn main() {
    let cli = Cli::parse();

    let (config, warnings) = match load_config(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init(cli.debug, config.log_level.as_deref());

    for warning in &warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    tracing::info!(
        version = APP_VERSION,
        debug = cli.debug,
        dir = %config.catalog.log_dir.display(),
        pattern = %config.catalog.file_pattern,
        "LogPeek starting"
    );

    if let Err(e) = run(cli.command, config) {
        tracing::error!(error = %e, "Command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Config file (explicit or platform default) with CLI overrides applied.
fn load_config(cli: &Cli) -> Result<(AppConfig, Vec<String>)> {
    let path = match cli.config {
        Some(ref explicit) => {
            if !explicit.is_file() {
                return Err(ConfigError::Io {
                    path: explicit.clone(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "config file does not exist",
                    ),
                }
                .into());
            }
            explicit.clone()
        }
        None => PlatformPaths::resolve().config_file(),
    };

    let (mut config, warnings) = config::load_config(&path);

    if let Some(ref dir) = cli.dir {
        config.catalog.log_dir = dir.clone();
    }
    if let Some(ref pattern) = cli.pattern {
        config.catalog.file_pattern = pattern.clone();
    }
    config.catalog.log_dir = absolutize(&config.catalog.log_dir);

    Ok((config, warnings))
}

fn run(command: Command, config: AppConfig) -> Result<()> {
    let viewer = Viewer::from_config(&config);

    match command {
        Command::Serve { bind } => {
            let addr = bind.unwrap_or(config.bind);
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|source| LogPeekError::Server {
                    addr: addr.clone(),
                    source,
                })?;
            runtime.block_on(server::serve(viewer, &addr))
        }
        Command::List => {
            for file in viewer.catalog().list_files()? {
                let modified = file
                    .modified
                    .map(|m| m.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{}\t{}\t{}", file.display_name, file.size_bytes, modified);
            }
            Ok(())
        }
        Command::View { file } => {
            let reference = file.as_deref().map(encode_reference);
            let (_, outcome) = viewer.view(reference.as_deref())?;
            let logs = match outcome {
                ParseOutcome::Records(records) => ViewLogs::Records(records),
                ParseOutcome::TooLarge => ViewLogs::Message(TOO_LARGE_MESSAGE.to_string()),
                ParseOutcome::NoFile => ViewLogs::Records(Vec::new()),
            };
            print_json(&logs)
        }
        Command::Poll { file, since } => {
            let reference = file.as_deref().map(encode_reference);
            let result = viewer.poll(reference.as_deref(), since)?;
            print_json(&PollResponse::from(result))
        }
        Command::Delete(args) => {
            if args.all {
                let removed = viewer.catalog().delete_all()?;
                println!("Deleted {removed} file(s)");
            } else if let Some(name) = args.file {
                let file = viewer.catalog().delete(&encode_reference(&name))?;
                println!("Deleted {}", file.display_name);
            }
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = std::io::stdout();
    serde_json::to_writer_pretty(stdout.lock(), value)
        .map_err(|e| LogPeekError::Io {
            path: PathBuf::from("<stdout>"),
            operation: "write output",
            source: e.into(),
        })?;
    println!();
    Ok(())
}
