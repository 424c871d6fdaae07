//! Best-effort link discovery across sources.
//!
//! Every requested source's `discover` runs concurrently; the orchestrator
//! waits for all of them, merges the survivors' links in request order, and
//! reports the sources that failed next to the merged links.

use futures::future::join_all;
use serde::Serialize;

use crate::error::AppError;
use crate::links::LinkSet;
use crate::models::SourceId;
use crate::registry::Registry;
use crate::traits::Session;

/// A source whose discovery failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub source: SourceId,
    pub reason: String,
}

/// Merged links plus the sources that could not contribute any.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoveryReport {
    pub links: LinkSet,
    pub failures: Vec<SourceFailure>,
}

impl DiscoveryReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs discovery for `sources` and returns the deduplicated union of the
/// links found by those that succeeded.
///
/// A source listed twice is discovered once.
pub async fn discover_all<S: Session + 'static>(
    session: &S,
    registry: &Registry<S>,
    sources: &[SourceId],
) -> DiscoveryReport {
    let mut unique = Vec::with_capacity(sources.len());
    for id in sources {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }

    let outcomes = join_all(unique.iter().map(|id| discover_one(session, registry, *id))).await;

    let mut report = DiscoveryReport::default();
    for (id, outcome) in unique.into_iter().zip(outcomes) {
        match outcome {
            Ok(links) => report.links.merge(links),
            Err(e) => {
                tracing::warn!(source = %id, error = %e, "Discovery failed");
                report.failures.push(SourceFailure {
                    source: id,
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        links = report.links.len(),
        failed_sources = report.failures.len(),
        "Discovery complete"
    );
    report
}

async fn discover_one<S: Session + 'static>(
    session: &S,
    registry: &Registry<S>,
    id: SourceId,
) -> Result<LinkSet, AppError> {
    let adapter = registry.lookup(id)?;
    adapter.discover(session).await
}
