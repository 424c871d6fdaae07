//! URL → [`SourceId`] classification.
//!
//! Rules are tested in order and the first match wins. Routing never touches
//! the network and never rewrites the URL it classifies.

use url::Url;

use crate::error::AppError;
use crate::models::SourceId;

/// How a rule matches a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Host equals the domain or is a subdomain of it.
    Host(String),
    /// One of the host's dot-separated labels equals the label.
    HostLabel(String),
    /// The raw URL starts with the prefix.
    Prefix(String),
    /// The raw URL contains the substring.
    Contains(String),
}

impl Pattern {
    fn matches(&self, raw: &str, host: Option<&str>) -> bool {
        match self {
            Pattern::Host(domain) => host.is_some_and(|h| {
                h == domain.as_str()
                    || h.strip_suffix(domain.as_str())
                        .is_some_and(|rest| rest.ends_with('.'))
            }),
            Pattern::HostLabel(label) => {
                host.is_some_and(|h| h.split('.').any(|part| part == label.as_str()))
            }
            Pattern::Prefix(prefix) => raw.starts_with(prefix.as_str()),
            Pattern::Contains(needle) => raw.contains(needle.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RouteRule {
    pattern: Pattern,
    source: SourceId,
}

/// Ordered rule list mapping URLs to sources.
#[derive(Debug, Clone)]
pub struct Router {
    rules: Vec<RouteRule>,
}

impl Router {
    /// A router with no rules; every URL is unroutable.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Appends a rule. Earlier rules take precedence.
    pub fn with_rule(mut self, pattern: Pattern, source: SourceId) -> Self {
        self.rules.push(RouteRule { pattern, source });
        self
    }

    pub fn route(&self, url: &str) -> Result<SourceId, AppError> {
        let parsed = Url::parse(url).ok();
        let host = parsed.as_ref().and_then(|u| u.host_str());

        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(url, host))
            .map(|rule| rule.source)
            .ok_or_else(|| AppError::UnroutableUrl(url.to_string()))
    }
}

impl Default for Router {
    /// Rules for the built-in job boards.
    fn default() -> Self {
        Self::empty()
            .with_rule(
                Pattern::Host("golangprojects.com".into()),
                SourceId::Golangprojects,
            )
            .with_rule(Pattern::Host("rustjobs.dev".into()), SourceId::Rustjobs)
            .with_rule(Pattern::HostLabel("indeed".into()), SourceId::Indeed)
            .with_rule(
                Pattern::Host("functional.works".into()),
                SourceId::Functionalworks,
            )
            .with_rule(
                Pattern::Host("functional.works-hq.com".into()),
                SourceId::Functionalworks,
            )
            .with_rule(Pattern::Host("jooble.org".into()), SourceId::Jooble)
    }
}
