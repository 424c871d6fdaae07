use std::future::Future;

use futures::future::BoxFuture;

use crate::error::AppError;
use crate::links::LinkSet;
use crate::models::{Record, SourceId};

/// Launches automation sessions (a browser process, an HTTP client, ...).
pub trait Engine: Send + Sync {
    type Session: Session;

    fn launch(&self) -> impl Future<Output = Result<Self::Session, AppError>> + Send;
}

/// One long-lived automation session shared by a whole run.
///
/// Only the pipeline driver calls [`Session::close`]; adapters are limited to
/// opening and closing pages.
pub trait Session: Send + Sync {
    type Page: Page;

    /// Opens a fresh page-level sub-session.
    fn new_page(&self) -> impl Future<Output = Result<Self::Page, AppError>> + Send;

    /// Tears the session down.
    fn close(self) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// A single page (tab) inside a [`Session`].
///
/// Clones refer to the same underlying page.
pub trait Page: Clone + Send + Sync {
    fn goto(&self, url: &str) -> impl Future<Output = Result<(), AppError>> + Send;

    /// The document title of the current page.
    fn title(&self) -> impl Future<Output = Result<String, AppError>> + Send;

    /// Waits for the first element matching `selector` and returns its text.
    fn wait_for_text(&self, selector: &str)
    -> impl Future<Output = Result<String, AppError>> + Send;

    /// Text of every element matching `selector`; empty if none match.
    fn texts(&self, selector: &str) -> impl Future<Output = Result<Vec<String>, AppError>> + Send;

    /// Absolute `href` of every anchor on the page.
    fn links(&self) -> impl Future<Output = Result<Vec<String>, AppError>> + Send;

    fn close(&self) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Source-specific discovery and extraction.
///
/// Object-safe so the registry can hold heterogeneous adapters for one
/// session type.
pub trait SourceAdapter<S: Session>: Send + Sync {
    fn source(&self) -> SourceId;

    /// Whether this source has a listing page to discover links from.
    fn discovers(&self) -> bool {
        true
    }

    fn discover<'a>(&'a self, session: &'a S) -> BoxFuture<'a, Result<LinkSet, AppError>>;

    fn extract<'a>(&'a self, session: &'a S, url: &'a str)
    -> BoxFuture<'a, Result<Record, AppError>>;
}

/// Runs `f` on a fresh page and closes the page afterwards, whether `f`
/// succeeded or not.
pub async fn with_page<S, T, F, Fut>(session: &S, f: F) -> Result<T, AppError>
where
    S: Session,
    F: FnOnce(S::Page) -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let page = session.new_page().await?;
    let result = f(page.clone()).await;
    if let Err(e) = page.close().await {
        tracing::debug!(error = %e, "Failed to close page");
    }
    result
}
