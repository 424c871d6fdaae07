//! Job-board adapters.
//!
//! Every built-in board follows the same two-phase pattern:
//!
//! 1. **Discovery**: open the board's listing page and keep the anchors
//!    whose `href` starts with the board's job-link prefix.
//! 2. **Extraction**: open a job page, reject bot-challenge interstitials,
//!    read the title and description through the board's selectors, and tag
//!    the record with the board's static tags.
//!
//! Boards differ only in data, captured by [`BoardProfile`]; the profiles
//! live in [`boards`].

pub mod boards;

use std::collections::BTreeMap;

use futures::future::BoxFuture;

use crate::error::AppError;
use crate::links::LinkSet;
use crate::locality::remote_locality;
use crate::models::{Record, SourceId};
use crate::registry::Registry;
use crate::traits::{Page, Session, SourceAdapter, with_page};

/// Page titles served by bot-protection interstitials.
const CHALLENGE_TITLES: &[&str] = &[
    "just a moment",
    "attention required",
    "security check",
    "hcaptcha",
    "verify you are human",
    "are you a robot",
];

/// Returns true if `title` belongs to a bot-challenge page.
pub fn is_bot_challenge(title: &str) -> bool {
    let title = title.to_lowercase();
    CHALLENGE_TITLES.iter().any(|marker| title.contains(marker))
}

/// Listing page a board's job links are discovered from.
#[derive(Debug, Clone, Copy)]
pub struct Listing {
    pub url: &'static str,
    /// Only anchors starting with this prefix are job links.
    pub link_prefix: &'static str,
}

/// How a board's description is read.
#[derive(Debug, Clone, Copy)]
pub enum DescriptionRule {
    /// Wait for the first matching element and take its text.
    First(&'static str),
    /// Join the text of every matching element with newlines.
    All(&'static str),
    /// Like [`DescriptionRule::All`], falling back to a second selector when
    /// the first yields nothing.
    AllOr(&'static str, &'static str),
}

/// Static description of one job board.
#[derive(Debug, Clone, Copy)]
pub struct BoardProfile {
    pub source: SourceId,
    pub listing: Option<Listing>,
    pub title_selector: &'static str,
    pub description: DescriptionRule,
    pub tags: &'static [&'static str],
    /// Derive `metadata.remote` from the description.
    pub remote_metadata: bool,
}

/// [`SourceAdapter`] driven by a [`BoardProfile`].
#[derive(Debug, Clone)]
pub struct BoardAdapter {
    profile: BoardProfile,
    tags: Vec<String>,
}

impl BoardAdapter {
    pub fn new(profile: BoardProfile) -> Self {
        Self::with_extra_tags(profile, &[])
    }

    /// Appends `extra` after the board's own tags on every record.
    pub fn with_extra_tags(profile: BoardProfile, extra: &[String]) -> Self {
        let mut tags: Vec<String> = profile.tags.iter().map(|t| t.to_string()).collect();
        for tag in extra {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
        Self { profile, tags }
    }

    pub fn profile(&self) -> &BoardProfile {
        &self.profile
    }

    async fn discover_links<P: Page>(&self, page: P, listing: Listing) -> Result<LinkSet, AppError> {
        page.goto(listing.url).await?;
        let links: LinkSet = page
            .links()
            .await?
            .into_iter()
            .filter(|href| href.starts_with(listing.link_prefix))
            .collect();
        tracing::info!(
            source = %self.profile.source,
            count = links.len(),
            listing = listing.url,
            "Discovered job links"
        );
        Ok(links)
    }

    async fn extract_record<P: Page>(&self, page: P, url: &str) -> Result<Record, AppError> {
        page.goto(url).await?;

        let page_title = match page.title().await {
            Ok(title) => title,
            Err(e) => {
                tracing::debug!(%url, error = %e, "Failed to read page title");
                String::new()
            }
        };
        if is_bot_challenge(&page_title) {
            return Err(AppError::BotChallenge(page_title));
        }

        let title = page
            .wait_for_text(self.profile.title_selector)
            .await?
            .trim()
            .to_string();
        if title.is_empty() {
            return Err(AppError::ElementNotFound {
                selector: self.profile.title_selector.to_string(),
            });
        }

        let description = match self.profile.description {
            DescriptionRule::First(selector) => page.wait_for_text(selector).await?.trim().to_string(),
            DescriptionRule::All(selector) => join_texts(page.texts(selector).await?),
            DescriptionRule::AllOr(primary, fallback) => {
                let text = join_texts(page.texts(primary).await?);
                if text.is_empty() {
                    join_texts(page.texts(fallback).await?)
                } else {
                    text
                }
            }
        };

        let mut metadata = BTreeMap::new();
        if self.profile.remote_metadata {
            if let Some(locality) = remote_locality(&description) {
                metadata.insert("remote".to_string(), locality);
            }
        }

        tracing::debug!(%url, %title, bytes = description.len(), "Extracted job");
        Ok(Record::new(title, description, url, self.tags.clone()).with_metadata(metadata))
    }
}

impl<S: Session> SourceAdapter<S> for BoardAdapter {
    fn source(&self) -> SourceId {
        self.profile.source
    }

    fn discovers(&self) -> bool {
        self.profile.listing.is_some()
    }

    fn discover<'a>(&'a self, session: &'a S) -> BoxFuture<'a, Result<LinkSet, AppError>> {
        Box::pin(async move {
            let Some(listing) = self.profile.listing else {
                return Err(AppError::Discovery {
                    board: self.profile.source.to_string(),
                    reason: "source has no listing page".to_string(),
                });
            };
            with_page(session, |page| self.discover_links(page, listing)).await
        })
    }

    fn extract<'a>(
        &'a self,
        session: &'a S,
        url: &'a str,
    ) -> BoxFuture<'a, Result<Record, AppError>> {
        Box::pin(with_page(session, move |page| self.extract_record(page, url)))
    }
}

fn join_texts(texts: Vec<String>) -> String {
    texts
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Registry with every built-in board, each tagging records with `extra_tags`
/// after its own tags.
pub fn builtin_registry<S: Session + 'static>(extra_tags: &[String]) -> Registry<S> {
    boards::ALL
        .iter()
        .fold(Registry::new(), |registry, profile| {
            registry.register(BoardAdapter::with_extra_tags(*profile, extra_tags))
        })
}
