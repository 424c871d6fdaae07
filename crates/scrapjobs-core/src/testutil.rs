//! Test utilities: mock implementations of all core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;

use crate::error::AppError;
use crate::links::LinkSet;
use crate::models::{Record, SourceId};
use crate::scheduler::{HarvestEvent, HarvestReporter};
use crate::traits::{Engine, Page, Session, SourceAdapter};

// ---------------------------------------------------------------------------
// MockPageSpec
// ---------------------------------------------------------------------------

/// Content served by a [`MockPage`] after navigating to a URL.
#[derive(Debug, Clone, Default)]
pub struct MockPageSpec {
    title: String,
    title_unreadable: bool,
    texts: HashMap<String, Vec<String>>,
    links: Vec<String>,
}

impl MockPageSpec {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    /// Elements matching `selector` and their text, in document order.
    pub fn with_text(mut self, selector: &str, texts: &[&str]) -> Self {
        self.texts.insert(
            selector.to_string(),
            texts.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    /// Makes `title()` fail, as when the document has no `<title>` yet.
    pub fn with_unreadable_title(mut self) -> Self {
        self.title_unreadable = true;
        self
    }

    pub fn with_links(mut self, links: &[&str]) -> Self {
        self.links = links.iter().map(|l| l.to_string()).collect();
        self
    }
}

// ---------------------------------------------------------------------------
// MockSession / MockPage
// ---------------------------------------------------------------------------

/// Mock session serving canned pages by URL and counting page lifecycles.
#[derive(Clone, Default)]
pub struct MockSession {
    pages: Arc<HashMap<String, MockPageSpec>>,
    opened: Arc<Mutex<usize>>,
    closed: Arc<Mutex<usize>>,
    released: Arc<Mutex<usize>>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, spec: MockPageSpec) -> Self {
        Arc::make_mut(&mut self.pages).insert(url.to_string(), spec);
        self
    }

    pub fn pages_opened(&self) -> usize {
        *self.opened.lock().unwrap()
    }

    pub fn pages_closed(&self) -> usize {
        *self.closed.lock().unwrap()
    }
}

impl Session for MockSession {
    type Page = MockPage;

    async fn new_page(&self) -> Result<MockPage, AppError> {
        *self.opened.lock().unwrap() += 1;
        Ok(MockPage {
            session: self.clone(),
            current: Arc::new(Mutex::new(None)),
        })
    }

    async fn close(self) -> Result<(), AppError> {
        *self.released.lock().unwrap() += 1;
        Ok(())
    }
}

/// Page of a [`MockSession`].
#[derive(Clone)]
pub struct MockPage {
    session: MockSession,
    current: Arc<Mutex<Option<MockPageSpec>>>,
}

impl MockPage {
    fn loaded(&self) -> Result<MockPageSpec, AppError> {
        self.current
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::Navigation("no page loaded".into()))
    }
}

impl Page for MockPage {
    async fn goto(&self, url: &str) -> Result<(), AppError> {
        let spec = self
            .session
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::Navigation(format!("net::ERR_NAME_NOT_RESOLVED at {url}")))?;
        *self.current.lock().unwrap() = Some(spec);
        Ok(())
    }

    async fn title(&self) -> Result<String, AppError> {
        let spec = self.loaded()?;
        if spec.title_unreadable {
            return Err(AppError::Navigation("document title unavailable".into()));
        }
        Ok(spec.title)
    }

    async fn wait_for_text(&self, selector: &str) -> Result<String, AppError> {
        self.loaded()?
            .texts
            .get(selector)
            .and_then(|texts| texts.first().cloned())
            .ok_or_else(|| AppError::ElementNotFound {
                selector: selector.to_string(),
            })
    }

    async fn texts(&self, selector: &str) -> Result<Vec<String>, AppError> {
        Ok(self.loaded()?.texts.get(selector).cloned().unwrap_or_default())
    }

    async fn links(&self) -> Result<Vec<String>, AppError> {
        Ok(self.loaded()?.links)
    }

    async fn close(&self) -> Result<(), AppError> {
        *self.session.closed.lock().unwrap() += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockEngine
// ---------------------------------------------------------------------------

/// Mock engine counting launches and session releases.
#[derive(Clone, Default)]
pub struct MockEngine {
    session: MockSession,
    launches: Arc<Mutex<usize>>,
    launch_error: Arc<Mutex<Option<AppError>>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_launch_error(error: AppError) -> Self {
        Self {
            launch_error: Arc::new(Mutex::new(Some(error))),
            ..Self::default()
        }
    }

    pub fn launches(&self) -> usize {
        *self.launches.lock().unwrap()
    }

    pub fn releases(&self) -> usize {
        *self.session.released.lock().unwrap()
    }
}

impl Engine for MockEngine {
    type Session = MockSession;

    async fn launch(&self) -> Result<MockSession, AppError> {
        *self.launches.lock().unwrap() += 1;
        if let Some(e) = self.launch_error.lock().unwrap().take() {
            return Err(e);
        }
        Ok(self.session.clone())
    }
}

// ---------------------------------------------------------------------------
// MockAdapter
// ---------------------------------------------------------------------------

/// Mock adapter with scripted discovery and per-URL extraction results.
///
/// URLs without a scripted result extract to a default record.
#[derive(Clone)]
pub struct MockAdapter {
    source: SourceId,
    discovers: bool,
    discover_results: Arc<Mutex<Vec<Result<LinkSet, AppError>>>>,
    extract_results: Arc<Mutex<HashMap<String, Vec<Result<Record, AppError>>>>>,
    delays: Arc<HashMap<String, Duration>>,
    default_delay: Duration,
    discover_delay: Duration,
    pub discover_calls: Arc<Mutex<usize>>,
    pub discover_finished: Arc<Mutex<Vec<SourceId>>>,
    pub extract_calls: Arc<Mutex<Vec<String>>>,
    pub finished: Arc<Mutex<Vec<String>>>,
    pub in_flight: Arc<Mutex<usize>>,
    pub max_in_flight: Arc<Mutex<usize>>,
}

impl MockAdapter {
    pub fn new(source: SourceId) -> Self {
        Self {
            source,
            discovers: true,
            discover_results: Arc::new(Mutex::new(Vec::new())),
            extract_results: Arc::new(Mutex::new(HashMap::new())),
            delays: Arc::new(HashMap::new()),
            default_delay: Duration::ZERO,
            discover_delay: Duration::ZERO,
            discover_calls: Arc::new(Mutex::new(0)),
            discover_finished: Arc::new(Mutex::new(Vec::new())),
            extract_calls: Arc::new(Mutex::new(Vec::new())),
            finished: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(Mutex::new(0)),
            max_in_flight: Arc::new(Mutex::new(0)),
        }
    }

    pub fn extract_only(mut self) -> Self {
        self.discovers = false;
        self
    }

    pub fn with_links(self, links: LinkSet) -> Self {
        self.discover_results.lock().unwrap().push(Ok(links));
        self
    }

    pub fn with_discover_error(self, error: AppError) -> Self {
        self.discover_results.lock().unwrap().push(Err(error));
        self
    }

    /// Queue a successful extraction for `url`.
    pub fn with_record(self, url: &str, record: Record) -> Self {
        self.push_extract(url, Ok(record));
        self
    }

    /// Queue a failed extraction for `url`; later calls fall back to the
    /// default record.
    pub fn with_extract_error(self, url: &str, error: AppError) -> Self {
        self.push_extract(url, Err(error));
        self
    }

    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        Arc::make_mut(&mut self.delays).insert(url.to_string(), delay);
        self
    }

    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn with_discover_delay(mut self, delay: Duration) -> Self {
        self.discover_delay = delay;
        self
    }

    fn push_extract(&self, url: &str, result: Result<Record, AppError>) {
        self.extract_results
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push(result);
    }

    async fn scripted_extract(&self, url: &str) -> Result<Record, AppError> {
        self.extract_calls.lock().unwrap().push(url.to_string());
        {
            let mut in_flight = self.in_flight.lock().unwrap();
            *in_flight += 1;
            let mut max = self.max_in_flight.lock().unwrap();
            *max = (*max).max(*in_flight);
        }

        let delay = self.delays.get(url).copied().unwrap_or(self.default_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let scripted = {
            let mut results = self.extract_results.lock().unwrap();
            results
                .get_mut(url)
                .filter(|queue| !queue.is_empty())
                .map(|queue| queue.remove(0))
        };

        *self.in_flight.lock().unwrap() -= 1;
        self.finished.lock().unwrap().push(url.to_string());

        scripted.unwrap_or_else(|| {
            Ok(Record::new(
                format!("Job {url}"),
                "default description",
                url,
                vec![self.source.to_string()],
            ))
        })
    }
}

impl<S: Session> SourceAdapter<S> for MockAdapter {
    fn source(&self) -> SourceId {
        self.source
    }

    fn discovers(&self) -> bool {
        self.discovers
    }

    fn discover<'a>(&'a self, _session: &'a S) -> BoxFuture<'a, Result<LinkSet, AppError>> {
        Box::pin(async move {
            *self.discover_calls.lock().unwrap() += 1;
            if !self.discover_delay.is_zero() {
                tokio::time::sleep(self.discover_delay).await;
            }

            let result = {
                let mut results = self.discover_results.lock().unwrap();
                if results.is_empty() {
                    Ok(LinkSet::new())
                } else {
                    results.remove(0)
                }
            };
            self.discover_finished.lock().unwrap().push(self.source);
            result
        })
    }

    fn extract<'a>(
        &'a self,
        _session: &'a S,
        url: &'a str,
    ) -> BoxFuture<'a, Result<Record, AppError>> {
        Box::pin(self.scripted_extract(url))
    }
}

// ---------------------------------------------------------------------------
// MockReporter
// ---------------------------------------------------------------------------

/// Mock harvest reporter that records events.
#[derive(Default)]
pub struct MockReporter {
    pub events: Arc<Mutex<Vec<String>>>,
    pub batches: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HarvestReporter for MockReporter {
    fn report(&self, event: HarvestEvent<'_>) {
        let label = match &event {
            HarvestEvent::BatchStarted { urls, .. } => {
                self.batches.lock().unwrap().push(urls.to_vec());
                "BatchStarted"
            }
            HarvestEvent::Extracted { .. } => "Extracted",
            HarvestEvent::ExtractionFailed {
                will_retry: true, ..
            } => "Retrying",
            HarvestEvent::ExtractionFailed { .. } => "ExtractionFailed",
            HarvestEvent::BatchFinished { .. } => "BatchFinished",
        };
        self.events.lock().unwrap().push(label.to_string());
    }
}
