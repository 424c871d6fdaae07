use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::config::{HarvestConfig, HarvestMode, SourceSelection};
use crate::discovery::{DiscoveryReport, SourceFailure, discover_all};
use crate::error::AppError;
use crate::models::{Failure, Record, SourceId};
use crate::registry::Registry;
use crate::router::Router;
use crate::scheduler::{HarvestReporter, Scheduler};
use crate::traits::{Engine, Session};

/// Result of a full pipeline run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HarvestOutcome {
    /// Extracted records, in discovery (or input) order.
    pub records: Vec<Record>,
    /// URLs that could not be extracted.
    pub failures: Vec<Failure>,
    /// Sources whose discovery failed (discovery mode only).
    pub source_failures: Vec<SourceFailure>,
}

/// Drives a whole run: acquire the session, discover or take the given URLs,
/// extract them, release the session.
///
/// The session is released exactly once on every exit path, including
/// cancellation and failed extractions.
pub struct Harvester<E>
where
    E: Engine,
    E::Session: 'static,
{
    engine: E,
    registry: Registry<E::Session>,
    router: Router,
}

impl<E> Harvester<E>
where
    E: Engine,
    E::Session: 'static,
{
    /// Create a harvester routing URLs with the built-in rules.
    pub fn new(engine: E, registry: Registry<E::Session>) -> Self {
        Self {
            engine,
            registry,
            router: Router::default(),
        }
    }

    pub fn with_router(mut self, router: Router) -> Self {
        self.router = router;
        self
    }

    /// Run the pipeline described by `config`.
    ///
    /// Configuration is validated before any session is launched. Only
    /// session start-up, invalid configuration, and cancellation are errors;
    /// everything else ends up in the outcome's failure lists.
    pub async fn harvest<R: HarvestReporter>(
        &self,
        config: &HarvestConfig,
        reporter: &R,
        cancel: &CancellationToken,
    ) -> Result<HarvestOutcome, AppError> {
        config.validate()?;
        let scheduler = Scheduler::new(&self.registry, &self.router, config.batch_size)?
            .with_retry(config.retry);

        let session = self.acquire().await?;
        let result = self.run(&session, &scheduler, config, reporter, cancel).await;
        self.release(session).await;
        result
    }

    /// Discover links without extracting them.
    pub async fn discover(
        &self,
        selection: &SourceSelection,
        cancel: &CancellationToken,
    ) -> Result<DiscoveryReport, AppError> {
        let sources = self.resolve_selection(selection);
        let session = self.acquire().await?;
        let result = tokio::select! {
            report = discover_all(&session, &self.registry, &sources) => Ok(report),
            () = cancel.cancelled() => Err(AppError::Cancelled),
        };
        self.release(session).await;
        result
    }

    async fn run<R: HarvestReporter>(
        &self,
        session: &E::Session,
        scheduler: &Scheduler<'_, E::Session>,
        config: &HarvestConfig,
        reporter: &R,
        cancel: &CancellationToken,
    ) -> Result<HarvestOutcome, AppError> {
        let (urls, source_failures) = match &config.mode {
            HarvestMode::Urls(urls) => (urls.clone(), Vec::new()),
            HarvestMode::Discover(selection) => {
                let sources = self.resolve_selection(selection);
                let discovery = tokio::select! {
                    report = discover_all(session, &self.registry, &sources) => report,
                    () = cancel.cancelled() => return Err(AppError::Cancelled),
                };
                (discovery.links.into_vec(), discovery.failures)
            }
        };

        let report = scheduler.run(session, &urls, reporter, cancel).await?;
        Ok(HarvestOutcome {
            records: report.records,
            failures: report.failures,
            source_failures,
        })
    }

    fn resolve_selection(&self, selection: &SourceSelection) -> Vec<SourceId> {
        match selection {
            SourceSelection::All => self.registry.discovery_sources(),
            SourceSelection::One(id) => vec![*id],
        }
    }

    async fn acquire(&self) -> Result<E::Session, AppError> {
        tracing::info!("Starting session");
        self.engine.launch().await
    }

    async fn release(&self, session: E::Session) {
        match session.close().await {
            Ok(()) => tracing::info!("Session released"),
            Err(e) => tracing::warn!(error = %e, "Session did not close cleanly"),
        }
    }
}
