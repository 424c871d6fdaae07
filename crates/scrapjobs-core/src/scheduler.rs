use futures::future::join_all;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::config::{RetryPolicy, validate_batch_size};
use crate::error::AppError;
use crate::models::{Extraction, Failure, Record};
use crate::registry::Registry;
use crate::router::Router;
use crate::traits::Session;

/// Successful records of a run plus the URLs that failed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HarvestReport {
    pub records: Vec<Record>,
    pub failures: Vec<Failure>,
}

/// Events emitted by the scheduler for monitoring/logging.
#[derive(Debug, Clone)]
pub enum HarvestEvent<'a> {
    BatchStarted {
        index: usize,
        total: usize,
        urls: &'a [String],
    },
    Extracted {
        url: &'a str,
    },
    ExtractionFailed {
        url: &'a str,
        error: &'a str,
        will_retry: bool,
    },
    BatchFinished {
        index: usize,
        succeeded: usize,
        failed: usize,
    },
}

/// Trait for receiving scheduler events (decoupled logging).
pub trait HarvestReporter: Send + Sync {
    fn report(&self, event: HarvestEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingHarvestReporter;

impl HarvestReporter for TracingHarvestReporter {
    fn report(&self, event: HarvestEvent<'_>) {
        match event {
            HarvestEvent::BatchStarted { index, total, urls } => {
                tracing::info!(batch = index + 1, total, size = urls.len(), "Batch started");
            }
            HarvestEvent::Extracted { url } => {
                tracing::debug!(%url, "Extracted");
            }
            HarvestEvent::ExtractionFailed {
                url,
                error,
                will_retry,
            } => {
                tracing::warn!(%url, %error, %will_retry, "Extraction failed");
            }
            HarvestEvent::BatchFinished {
                index,
                succeeded,
                failed,
            } => {
                tracing::info!(batch = index + 1, succeeded, failed, "Batch finished");
            }
        }
    }
}

/// Splits `urls` into contiguous batches of at most `batch_size`, in order.
pub fn batches(urls: &[String], batch_size: usize) -> Result<std::slice::Chunks<'_, String>, AppError> {
    validate_batch_size(batch_size)?;
    Ok(urls.chunks(batch_size))
}

/// Extracts URL lists batch by batch.
///
/// All URLs of a batch are extracted concurrently on the shared session and
/// the next batch starts only once every member has settled. A failing URL
/// becomes a [`Failure`] and never affects its siblings.
pub struct Scheduler<'r, S: Session + 'static> {
    registry: &'r Registry<S>,
    router: &'r Router,
    batch_size: usize,
    retry: RetryPolicy,
}

impl<'r, S: Session + 'static> Scheduler<'r, S> {
    pub fn new(
        registry: &'r Registry<S>,
        router: &'r Router,
        batch_size: usize,
    ) -> Result<Self, AppError> {
        validate_batch_size(batch_size)?;
        Ok(Self {
            registry,
            router,
            batch_size,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Extracts every URL and returns the successes in input order.
    ///
    /// Only cancellation makes this return an error.
    pub async fn run<R: HarvestReporter>(
        &self,
        session: &S,
        urls: &[String],
        reporter: &R,
        cancel: &CancellationToken,
    ) -> Result<HarvestReport, AppError> {
        let total = urls.len().div_ceil(self.batch_size);
        let mut report = HarvestReport::default();

        for (index, batch) in batches(urls, self.batch_size)?.enumerate() {
            if cancel.is_cancelled() {
                return Err(AppError::Cancelled);
            }

            reporter.report(HarvestEvent::BatchStarted {
                index,
                total,
                urls: batch,
            });

            let results = tokio::select! {
                results = self.run_batch(session, batch, reporter) => results,
                () = cancel.cancelled() => return Err(AppError::Cancelled),
            };

            let mut succeeded = 0;
            let mut failed = 0;
            for result in results {
                match result {
                    Ok(record) => {
                        succeeded += 1;
                        report.records.push(record);
                    }
                    Err(failure) => {
                        failed += 1;
                        report.failures.push(failure);
                    }
                }
            }

            reporter.report(HarvestEvent::BatchFinished {
                index,
                succeeded,
                failed,
            });
        }

        tracing::info!(
            urls = urls.len(),
            records = report.records.len(),
            failures = report.failures.len(),
            "Extraction complete"
        );
        Ok(report)
    }

    /// Extracts one batch concurrently; results are index-aligned with `batch`.
    pub async fn run_batch<R: HarvestReporter>(
        &self,
        session: &S,
        batch: &[String],
        reporter: &R,
    ) -> Vec<Extraction> {
        join_all(batch.iter().map(|url| self.extract_one(session, url, reporter))).await
    }

    async fn extract_one<R: HarvestReporter>(
        &self,
        session: &S,
        url: &str,
        reporter: &R,
    ) -> Extraction {
        let adapter = match self
            .router
            .route(url)
            .and_then(|id| self.registry.lookup(id))
        {
            Ok(adapter) => adapter,
            Err(e) => return Err(self.fail(url, &e, false, reporter)),
        };

        let mut attempt = 0;
        loop {
            match adapter.extract(session, url).await {
                Ok(record) if record.url() == url => {
                    reporter.report(HarvestEvent::Extracted { url });
                    return Ok(record);
                }
                Ok(record) => {
                    let e = AppError::Generic(format!(
                        "adapter returned a record for {} instead",
                        record.url()
                    ));
                    return Err(self.fail(url, &e, false, reporter));
                }
                Err(e) if self.retry.should_retry(attempt, &e) => {
                    self.fail(url, &e, true, reporter);
                    attempt += 1;
                    tokio::time::sleep(self.retry.backoff).await;
                }
                Err(e) => return Err(self.fail(url, &e, false, reporter)),
            }
        }
    }

    fn fail<R: HarvestReporter>(
        &self,
        url: &str,
        error: &AppError,
        will_retry: bool,
        reporter: &R,
    ) -> Failure {
        let failure = Failure::new(url, error);
        reporter.report(HarvestEvent::ExtractionFailed {
            url,
            error: &failure.error,
            will_retry,
        });
        failure
    }
}
