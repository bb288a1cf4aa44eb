use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, bail};
use reprint_core::batch::{
    DEFAULT_BASE_DELAY, DEFAULT_CONCURRENCY, DEFAULT_LEDGER_PATH, DEFAULT_MAX_TRIES,
};
use reprint_core::fetch::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS};
use reprint_core::resolver::{DEFAULT_REDIRECTOR, DEFAULT_UNSUPPORTED_MARKERS};

use crate::app_config::{FileConfig, VerbositySetting};
use crate::cli::Args;

const DEFAULT_OUTPUT_DIR_NAME: &str = "reprint";

/// Effective settings for one run after merging CLI flags, the config file and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunSettings {
    pub(crate) output_dir: PathBuf,
    pub(crate) errors_file: PathBuf,
    pub(crate) max_tries: u32,
    pub(crate) concurrency: usize,
    pub(crate) retry_delay: Duration,
    pub(crate) connect_timeout_secs: u64,
    pub(crate) read_timeout_secs: u64,
    pub(crate) redirector: String,
    pub(crate) unsupported_markers: Vec<String>,
    pub(crate) user_agent: Option<String>,
}

/// Verbosity inputs used to pick the default log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Verbosity {
    pub(crate) verbose: u8,
    pub(crate) quiet: bool,
    pub(crate) debug: bool,
}

/// Merges CLI flags over file config over built-in defaults.
pub(crate) fn resolve_run_settings(
    args: &Args,
    file_config: Option<&FileConfig>,
    home: Option<&Path>,
) -> Result<RunSettings> {
    let file = file_config.cloned().unwrap_or_default();

    let output_dir = args
        .out
        .clone()
        .or(file.output_dir)
        .unwrap_or_else(|| default_output_dir(home));
    let errors_file = args
        .errors
        .clone()
        .or(file.errors_file)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LEDGER_PATH));
    let max_tries = args.max_tries.or(file.max_tries).unwrap_or(DEFAULT_MAX_TRIES);
    let concurrency = args
        .concurrency
        .or(file.concurrency)
        .map_or(DEFAULT_CONCURRENCY, usize::from);
    let retry_delay = args
        .retry_delay_ms
        .or(file.retry_delay_ms)
        .map_or(DEFAULT_BASE_DELAY, Duration::from_millis);
    let redirector = args
        .redirector
        .clone()
        .or(file.redirector)
        .unwrap_or_else(|| DEFAULT_REDIRECTOR.to_string());
    let unsupported_markers = file.unsupported_markers.unwrap_or_else(|| {
        DEFAULT_UNSUPPORTED_MARKERS
            .iter()
            .map(|marker| (*marker).to_string())
            .collect()
    });

    if !(1..=20).contains(&max_tries) {
        bail!("Invalid effective max_tries value: {max_tries}. Expected range: 1..=20");
    }
    if !(1..=16).contains(&concurrency) {
        bail!("Invalid effective concurrency value: {concurrency}. Expected range: 1..=16");
    }

    Ok(RunSettings {
        output_dir,
        errors_file,
        max_tries,
        concurrency,
        retry_delay,
        connect_timeout_secs: file
            .connect_timeout_secs
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        read_timeout_secs: file.read_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        redirector,
        unsupported_markers,
        user_agent: file.user_agent,
    })
}

fn default_output_dir(home: Option<&Path>) -> PathBuf {
    match home {
        Some(home) => home.join(DEFAULT_OUTPUT_DIR_NAME),
        None => PathBuf::from("."),
    }
}

/// Resolves the verbosity flags, letting config verbosity apply only when no CLI flag was given.
pub(crate) fn resolve_verbosity(args: &Args, file_config: Option<&FileConfig>) -> Verbosity {
    let cli = Verbosity {
        verbose: args.verbose,
        quiet: args.quiet,
        debug: false,
    };
    if args.verbose > 0 || args.quiet {
        return cli;
    }
    match file_config.and_then(|config| config.verbosity) {
        Some(setting) => apply_config_verbosity(setting),
        None => cli,
    }
}

fn apply_config_verbosity(verbosity: VerbositySetting) -> Verbosity {
    match verbosity {
        VerbositySetting::Default => Verbosity::default(),
        VerbositySetting::Verbose => Verbosity {
            verbose: 1,
            ..Verbosity::default()
        },
        VerbositySetting::Quiet => Verbosity {
            quiet: true,
            ..Verbosity::default()
        },
        VerbositySetting::Debug => Verbosity {
            debug: true,
            ..Verbosity::default()
        },
    }
}

/// Priority: quiet > debug > -v count > info.
pub(crate) fn resolve_default_log_level(verbosity: Verbosity) -> &'static str {
    if verbosity.quiet {
        "error"
    } else if verbosity.debug {
        "trace"
    } else {
        match verbosity.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
