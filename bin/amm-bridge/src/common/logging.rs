//! Tracing subscriber setup for the amm-bridge CLI.
//!
//! Bridge logs are off unless `-v` flags or `RUST_LOG` turn them on. They go to stderr, or to
//! the file named by `--log.file`.

use std::path::PathBuf;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use super::{CliError, Result};

/// Flags controlling log output, shared by every subcommand.
#[derive(Debug, Clone, Default, Parser)]
pub struct LogArgs {
    /// Log verbosity: -v errors, -vv warnings, -vvv info, -vvvv debug, -vvvvv trace
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Write logs to this file instead of stderr
    #[arg(long = "log.file", visible_aliases = ["log-file"], global = true)]
    pub log_file: Option<PathBuf>,

    /// Print stderr logs without ANSI colors
    #[arg(long = "log.no-color", visible_aliases = ["log-no-color"], global = true)]
    pub log_no_color: bool,
}

impl LogArgs {
    /// Installs the global subscriber. `RUST_LOG` takes precedence over the `-v` flags.
    pub fn init(&self) -> Result<()> {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if let Some(level) = self.level() {
            EnvFilter::new(format!("amm_bridge={level},amm_bridge_cli={level}"))
        } else {
            EnvFilter::new("off")
        };

        // targets are only useful once the bridge's own debug output shows up
        let show_target = self.verbose >= 4;

        let builder = fmt().with_env_filter(filter).with_target(show_target);
        let result = if let Some(ref log_file) = self.log_file {
            let file = std::fs::File::create(log_file)?;
            builder.with_writer(file).with_ansi(false).try_init()
        } else {
            builder.with_writer(std::io::stderr).with_ansi(!self.log_no_color).try_init()
        };
        result.map_err(|err| CliError::Logging(err.to_string()))
    }

    const fn level(&self) -> Option<Level> {
        Some(match self.verbose {
            0 => return None,
            1 => Level::ERROR,
            2 => Level::WARN,
            3 => Level::INFO,
            4 => Level::DEBUG,
            _ => Level::TRACE,
        })
    }
}
