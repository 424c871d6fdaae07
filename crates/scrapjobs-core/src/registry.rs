use std::collections::BTreeMap;

use crate::error::AppError;
use crate::models::SourceId;
use crate::traits::{Session, SourceAdapter};

/// The single place mapping a [`SourceId`] to its adapter.
///
/// Built once at configuration time and only read while a run executes.
pub struct Registry<S: Session + 'static> {
    adapters: BTreeMap<SourceId, Box<dyn SourceAdapter<S>>>,
}

impl<S: Session + 'static> Registry<S> {
    pub fn new() -> Self {
        Self {
            adapters: BTreeMap::new(),
        }
    }

    /// Registers an adapter under its own source, replacing any previous one.
    pub fn register(mut self, adapter: impl SourceAdapter<S> + 'static) -> Self {
        self.adapters.insert(adapter.source(), Box::new(adapter));
        self
    }

    pub fn lookup(&self, id: SourceId) -> Result<&dyn SourceAdapter<S>, AppError> {
        self.adapters
            .get(&id)
            .map(|adapter| adapter.as_ref())
            .ok_or_else(|| AppError::UnknownSource(id.to_string()))
    }

    pub fn sources(&self) -> impl Iterator<Item = SourceId> + '_ {
        self.adapters.keys().copied()
    }

    /// Registered sources that have a listing page to discover from.
    pub fn discovery_sources(&self) -> Vec<SourceId> {
        self.adapters
            .values()
            .filter(|adapter| adapter.discovers())
            .map(|adapter| adapter.source())
            .collect()
    }
}

impl<S: Session + 'static> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}
