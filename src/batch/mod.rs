//! Batch processing of an identifier list.
//!
//! The [`BatchDriver`] runs every identifier through the retry controller,
//! records unresolved identifiers in a [`FailureLedger`] and writes the ledger
//! once at the end. One identifier's failure never aborts the run.
//!
//! # Concurrency Model
//!
//! - Default: strictly sequential, one identifier end-to-end before the next
//! - `concurrency > 1`: each identifier runs in its own Tokio task, bounded by
//!   a semaphore; the resolver's host guard keeps workers off the same
//!   publisher at the same time
//! - Outcomes and the ledger are reported in input order either way

mod ledger;
mod retry;

pub use ledger::{DEFAULT_LEDGER_PATH, FailureLedger, LedgerError};
pub use retry::{
    DEFAULT_BASE_DELAY, DEFAULT_MAX_TRIES, FailureType, RetryDecision, RetryPolicy, RetryReport,
    classify_error, with_retry,
};

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::future::join_all;
use indicatif::ProgressBar;
use tokio::sync::{Mutex, Semaphore};
use tracing::{Instrument, debug, info, info_span, instrument, warn};

use crate::Identifier;
use crate::resolver::{Outcome, Resolver, UnresolvedReason};

/// Minimum allowed concurrency value.
pub const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
pub const MAX_CONCURRENCY: usize = 16;

/// Default concurrency (sequential).
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Error type for batch operations.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// The failure ledger could not be written.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,
}

/// Counters from a batch run.
///
/// Atomic so concurrent workers can update them.
#[derive(Debug, Default)]
pub struct BatchStats {
    resolved: AtomicUsize,
    skipped: AtomicUsize,
    unresolved: AtomicUsize,
    retried: AtomicUsize,
}

impl BatchStats {
    /// Creates a new stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifiers whose document was downloaded.
    #[must_use]
    pub fn resolved(&self) -> usize {
        self.resolved.load(Ordering::SeqCst)
    }

    /// Identifiers already present on disk.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Identifiers that ended in the ledger.
    #[must_use]
    pub fn unresolved(&self) -> usize {
        self.unresolved.load(Ordering::SeqCst)
    }

    /// Identifiers that needed more than one attempt.
    #[must_use]
    pub fn retried(&self) -> usize {
        self.retried.load(Ordering::SeqCst)
    }

    /// Total identifiers processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.resolved() + self.skipped() + self.unresolved()
    }

    fn record(&self, report: &RetryReport) {
        let counter = match report.outcome {
            Outcome::Resolved { .. } => &self.resolved,
            Outcome::Skipped { .. } => &self.skipped,
            Outcome::Unresolved(_) => &self.unresolved,
        };
        counter.fetch_add(1, Ordering::SeqCst);
        if report.retried() {
            self.retried.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl fmt::Display for BatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} resolved, {} skipped, {} unresolved ({} retried)",
            self.resolved(),
            self.skipped(),
            self.unresolved(),
            self.retried()
        )
    }
}

/// Result of one identifier within a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    /// The identifier.
    pub identifier: Identifier,
    /// Its terminal outcome.
    pub outcome: Outcome,
    /// Attempts made.
    pub attempts: u32,
}

/// Everything a batch run produced.
#[derive(Debug)]
pub struct BatchReport {
    /// Per-identifier results, in input order.
    pub items: Vec<BatchItem>,
    /// Aggregate counters.
    pub stats: BatchStats,
    /// The failures written to the ledger.
    pub ledger: FailureLedger,
}

impl BatchReport {
    /// Identifiers that ended unresolved, in input order.
    #[must_use]
    pub fn failed(&self) -> Vec<&Identifier> {
        self.ledger.identifiers()
    }
}

/// Drives a list of identifiers through resolution.
#[derive(Debug)]
pub struct BatchDriver {
    resolver: Arc<Resolver>,
    retry_policy: RetryPolicy,
    concurrency: usize,
    ledger_path: PathBuf,
    progress: Option<ProgressBar>,
}

impl BatchDriver {
    /// Creates a sequential driver with the default retry policy.
    #[must_use]
    pub fn new(resolver: Arc<Resolver>, ledger_path: impl Into<PathBuf>) -> Self {
        Self {
            resolver,
            retry_policy: RetryPolicy::default(),
            concurrency: DEFAULT_CONCURRENCY,
            ledger_path: ledger_path.into(),
            progress: None,
        }
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Sets the number of identifiers processed at once.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::InvalidConcurrency`] outside 1-16.
    pub fn with_concurrency(mut self, concurrency: usize) -> Result<Self, BatchError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(BatchError::InvalidConcurrency { value: concurrency });
        }
        self.concurrency = concurrency;
        Ok(self)
    }

    /// Attaches a progress bar advanced once per identifier.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// The configured concurrency.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Where the ledger is written.
    #[must_use]
    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    /// Processes every identifier and writes the failure ledger.
    ///
    /// # Errors
    ///
    /// Individual identifier failures never error; they are counted and
    /// recorded in the ledger. Returns [`BatchError::Ledger`] if the ledger
    /// cannot be written and [`BatchError::SemaphoreClosed`] if the worker
    /// pool breaks down.
    pub async fn run(&self, identifiers: &[Identifier]) -> Result<BatchReport, BatchError> {
        let span = info_span!(
            "batch",
            identifiers = identifiers.len(),
            concurrency = self.concurrency
        );
        self.run_inner(identifiers).instrument(span).await
    }

    async fn run_inner(&self, identifiers: &[Identifier]) -> Result<BatchReport, BatchError> {
        info!("starting batch");
        if let Some(progress) = &self.progress {
            progress.set_length(identifiers.len() as u64);
        }

        let stats = Arc::new(BatchStats::new());
        let ledger = Arc::new(Mutex::new(FailureLedger::new()));

        let reports = if self.concurrency == 1 {
            self.run_sequential(identifiers, &stats, &ledger).await
        } else {
            self.run_concurrent(identifiers, &stats, &ledger).await?
        };

        let ledger = ledger.lock().await.clone();
        ledger.write(&self.ledger_path).await?;

        if let Some(progress) = &self.progress {
            progress.finish_and_clear();
        }

        let stats = Arc::try_unwrap(stats).unwrap_or_else(|shared| {
            let copy = BatchStats::new();
            copy.resolved.store(shared.resolved(), Ordering::SeqCst);
            copy.skipped.store(shared.skipped(), Ordering::SeqCst);
            copy.unresolved.store(shared.unresolved(), Ordering::SeqCst);
            copy.retried.store(shared.retried(), Ordering::SeqCst);
            copy
        });
        info!(
            resolved = stats.resolved(),
            skipped = stats.skipped(),
            unresolved = stats.unresolved(),
            retried = stats.retried(),
            "batch complete"
        );

        let items = identifiers
            .iter()
            .cloned()
            .zip(reports)
            .map(|(identifier, report)| BatchItem {
                identifier,
                outcome: report.outcome,
                attempts: report.attempts,
            })
            .collect();

        Ok(BatchReport {
            items,
            stats,
            ledger,
        })
    }

    async fn run_sequential(
        &self,
        identifiers: &[Identifier],
        stats: &BatchStats,
        ledger: &Mutex<FailureLedger>,
    ) -> Vec<RetryReport> {
        let mut reports = Vec::with_capacity(identifiers.len());
        for (index, identifier) in identifiers.iter().enumerate() {
            let report = process_one(
                &self.resolver,
                &self.retry_policy,
                index,
                identifier,
                stats,
                ledger,
            )
            .await;
            self.advance_progress(identifier);
            reports.push(report);
        }
        reports
    }

    async fn run_concurrent(
        &self,
        identifiers: &[Identifier],
        stats: &Arc<BatchStats>,
        ledger: &Arc<Mutex<FailureLedger>>,
    ) -> Result<Vec<RetryReport>, BatchError> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(identifiers.len());

        for (index, identifier) in identifiers.iter().enumerate() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|_| BatchError::SemaphoreClosed)?;

            let resolver = Arc::clone(&self.resolver);
            let retry_policy = self.retry_policy.clone();
            let identifier = identifier.clone();
            let stats = Arc::clone(stats);
            let ledger = Arc::clone(ledger);
            let progress = self.progress.clone();

            let handle = tokio::spawn(
                async move {
                    let report = process_one(
                        &resolver,
                        &retry_policy,
                        index,
                        &identifier,
                        &stats,
                        &ledger,
                    )
                    .await;
                    if let Some(progress) = progress {
                        progress.set_message(identifier.to_string());
                        progress.inc(1);
                    }
                    drop(permit);
                    report
                }
                .in_current_span(),
            );
            handles.push(handle);
        }

        let mut reports = Vec::with_capacity(handles.len());
        for (index, result) in join_all(handles).await.into_iter().enumerate() {
            match result {
                Ok(report) => reports.push(report),
                Err(join_error) => {
                    warn!(error = %join_error, "worker task failed");
                    let report = RetryReport {
                        outcome: Outcome::Unresolved(UnresolvedReason::FetchFailed {
                            error: join_error.to_string(),
                            attempts: 0,
                        }),
                        attempts: 0,
                    };
                    stats.record(&report);
                    if let Some(identifier) = identifiers.get(index) {
                        ledger.lock().await.record(index, identifier.clone());
                    }
                    reports.push(report);
                }
            }
        }
        Ok(reports)
    }

    fn advance_progress(&self, identifier: &Identifier) {
        if let Some(progress) = &self.progress {
            progress.set_message(identifier.to_string());
            progress.inc(1);
        }
    }
}

#[instrument(name = "identifier", skip_all, fields(index = index, id = %identifier.id()))]
async fn process_one(
    resolver: &Resolver,
    retry_policy: &RetryPolicy,
    index: usize,
    identifier: &Identifier,
    stats: &BatchStats,
    ledger: &Mutex<FailureLedger>,
) -> RetryReport {
    info!(identifier = %identifier, "resolving");
    let report = with_retry(identifier, retry_policy, move || resolver.resolve(identifier)).await;

    stats.record(&report);
    match &report.outcome {
        Outcome::Unresolved(reason) => {
            debug!(%reason, attempts = report.attempts, "identifier failed");
            ledger.lock().await.record(index, identifier.clone());
        }
        outcome => debug!(%outcome, attempts = report.attempts, "identifier done"),
    }
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::AtomicU32;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::download::DocumentStore;
    use crate::fetch::{FetchError, FetchResult, PageFetcher};

    /// Every request lands on a page with no markers.
    #[derive(Default)]
    struct EmptyPages {
        calls: AtomicU32,
    }

    #[async_trait]
    impl PageFetcher for EmptyPages {
        async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(FetchResult::new(url, 200, b"<html></html>".to_vec()))
        }
    }

    fn driver(dir: &TempDir, fetcher: Arc<EmptyPages>) -> BatchDriver {
        let resolver = Resolver::new(fetcher, DocumentStore::new(dir.path()))
            .with_redirector("http://redirector.test/{id}")
            .unwrap();
        BatchDriver::new(Arc::new(resolver), dir.path().join("failed.tsv"))
            .with_retry_policy(RetryPolicy::without_delay(3))
    }

    #[test]
    fn test_concurrency_bounds() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(EmptyPages::default());
        assert!(matches!(
            driver(&dir, Arc::clone(&fetcher)).with_concurrency(0),
            Err(BatchError::InvalidConcurrency { value: 0 })
        ));
        assert!(driver(&dir, Arc::clone(&fetcher)).with_concurrency(17).is_err());
        assert_eq!(
            driver(&dir, fetcher).with_concurrency(16).unwrap().concurrency(),
            16
        );
    }

    #[tokio::test]
    async fn test_all_unresolved_land_in_ledger_in_input_order() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(EmptyPages::default());
        let identifiers = vec![
            Identifier::new("3"),
            Identifier::with_name("1", "one"),
            Identifier::new("2"),
        ];

        let report = driver(&dir, Arc::clone(&fetcher))
            .run(&identifiers)
            .await
            .unwrap();

        assert_eq!(report.stats.unresolved(), 3);
        assert_eq!(report.stats.total(), 3);
        assert_eq!(report.items.len(), 3);
        assert_eq!(report.items[1].identifier.id(), "1");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("failed.tsv")).unwrap(),
            "3\t3\n1\tone\n2\t2\n"
        );
    }

    #[tokio::test]
    async fn test_concurrent_run_keeps_input_order() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(EmptyPages::default());
        let identifiers: Vec<Identifier> = (0..10).map(|n| Identifier::new(n.to_string())).collect();

        let report = driver(&dir, Arc::clone(&fetcher))
            .with_concurrency(4)
            .unwrap()
            .run(&identifiers)
            .await
            .unwrap();

        let expected: String = (0..10).map(|n| format!("{n}\t{n}\n")).collect();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("failed.tsv")).unwrap(),
            expected
        );
        let ids: Vec<&str> = report.items.iter().map(|item| item.identifier.id()).collect();
        assert_eq!(ids, ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"]);
    }

    #[tokio::test]
    async fn test_skipped_identifiers_are_not_in_ledger() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("7.pdf"), b"%PDF").unwrap();
        let fetcher = Arc::new(EmptyPages::default());

        let report = driver(&dir, Arc::clone(&fetcher))
            .run(&[Identifier::new("7")])
            .await
            .unwrap();

        assert_eq!(report.stats.skipped(), 1);
        assert!(report.ledger.is_empty());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("failed.tsv")).unwrap(),
            ""
        );
    }

    #[tokio::test]
    async fn test_empty_batch_writes_empty_ledger() {
        let dir = TempDir::new().unwrap();
        let report = driver(&dir, Arc::new(EmptyPages::default()))
            .run(&[])
            .await
            .unwrap();
        assert_eq!(report.stats.total(), 0);
        assert!(dir.path().join("failed.tsv").exists());
    }

    #[test]
    fn test_stats_display() {
        let stats = BatchStats::new();
        stats.record(&RetryReport {
            outcome: Outcome::Unresolved(UnresolvedReason::NoStrategyMatched),
            attempts: 2,
        });
        assert_eq!(stats.to_string(), "0 resolved, 0 skipped, 1 unresolved (1 retried)");
    }
}
