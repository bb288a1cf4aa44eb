use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use reprint_core::resolver::HostGuard;
use reprint_core::user_agent::effective_user_agent;
use reprint_core::{BatchDriver, DocumentStore, HttpFetcher, Resolver, RetryPolicy};
use tracing::{debug, info, warn};

use crate::app::config_runtime::{self, RunSettings};
use crate::app::{input, terminal, validation};
use crate::app_config;
use crate::cli::Args;

/// Runs one batch from parsed CLI arguments.
///
/// Unresolved identifiers are not an error; they end up in the failure ledger.
pub(crate) async fn run(args: Args) -> Result<()> {
    let loaded = app_config::load_config(args.config.as_deref())?;
    let file_config = loaded.config.as_ref();

    let verbosity = config_runtime::resolve_verbosity(&args, file_config);
    let default_level = config_runtime::resolve_default_log_level(verbosity);
    let no_color = terminal::no_color_env_requested() || terminal::is_dumb_terminal();
    terminal::init_tracing(default_level, no_color);

    debug!(?args, "CLI arguments parsed");
    if let Some(path) = &loaded.path {
        debug!(
            path = %path.display(),
            loaded = loaded.config.is_some(),
            "Config file consulted"
        );
    }

    let home = std::env::var_os("HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);
    let settings = config_runtime::resolve_run_settings(&args, file_config, home.as_deref())?;
    validation::validate_redirector_template(&settings.redirector)?;

    let parsed = input::read_identifiers(args.pmids.as_deref(), args.pmids_file.as_deref())?;
    validation::ensure_identifiers_present(&parsed)?;

    let store = DocumentStore::new(&settings.output_dir);
    let created = store.ensure_output_dir().await.with_context(|| {
        format!(
            "Failed to prepare output directory '{}'",
            settings.output_dir.display()
        )
    })?;
    if created {
        println!(
            "Output directory of {} did not exist.  Created the directory.",
            settings.output_dir.display()
        );
    }

    let driver = build_driver(&settings, store, verbosity.quiet)?;
    info!(
        identifiers = parsed.len(),
        concurrency = driver.concurrency(),
        max_tries = settings.max_tries,
        "Reprint starting"
    );

    let report = driver.run(&parsed.items).await?;

    info!(summary = %report.stats, "Batch complete");
    let failed = report.ledger.len();
    if failed > 0 {
        warn!(
            failed,
            ledger = %settings.errors_file.display(),
            "Some identifiers could not be fetched"
        );
    }
    if !verbosity.quiet {
        println!(
            "Done downloading. All downloaded can be found in {}",
            settings.output_dir.display()
        );
    }
    Ok(())
}

fn build_driver(settings: &RunSettings, store: DocumentStore, quiet: bool) -> Result<BatchDriver> {
    let user_agent = effective_user_agent(settings.user_agent.as_deref());
    let fetcher = HttpFetcher::with_timeouts(
        &user_agent,
        settings.connect_timeout_secs,
        settings.read_timeout_secs,
    )?;

    let mut resolver = Resolver::new(Arc::new(fetcher), store)
        .with_redirector(settings.redirector.clone())?
        .with_unsupported_markers(settings.unsupported_markers.iter().cloned());
    if settings.concurrency > 1 {
        resolver = resolver.with_host_guard(Arc::new(HostGuard::new()));
    }

    let retry_policy =
        RetryPolicy::with_max_attempts(settings.max_tries).with_base_delay(settings.retry_delay);
    let mut driver = BatchDriver::new(Arc::new(resolver), &settings.errors_file)
        .with_retry_policy(retry_policy)
        .with_concurrency(settings.concurrency)?;

    if terminal::should_use_progress_bar(
        io::stderr().is_terminal(),
        quiet,
        terminal::is_dumb_terminal(),
    ) {
        driver = driver.with_progress(create_progress_bar());
    }
    Ok(driver)
}

fn create_progress_bar() -> ProgressBar {
    let progress = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress
}
