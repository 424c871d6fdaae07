use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Job board a URL belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Golangprojects,
    Rustjobs,
    Indeed,
    Functionalworks,
    Jooble,
}

impl SourceId {
    /// Every known source, in registration order.
    pub const ALL: [SourceId; 5] = [
        SourceId::Golangprojects,
        SourceId::Rustjobs,
        SourceId::Indeed,
        SourceId::Functionalworks,
        SourceId::Jooble,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Golangprojects => "golangprojects",
            SourceId::Rustjobs => "rustjobs",
            SourceId::Indeed => "indeed",
            SourceId::Functionalworks => "functionalworks",
            SourceId::Jooble => "jooble",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::UnknownSource(s.to_string()))
    }
}

/// A normalized job posting.
///
/// Fields are private so a record cannot change after an adapter produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    title: String,
    #[serde(alias = "descrip")]
    description: String,
    url: String,
    tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<BTreeMap<String, String>>,
}

impl Record {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
        tags: Vec<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            url: url.into(),
            tags,
            metadata: None,
        }
    }

    /// Attaches metadata; an empty map leaves the record without metadata.
    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata = (!metadata.is_empty()).then_some(metadata);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn metadata(&self) -> Option<&BTreeMap<String, String>> {
        self.metadata.as_ref()
    }
}

/// A URL that could not be turned into a [`Record`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub url: String,
    pub error: String,
}

impl Failure {
    pub fn new(url: impl Into<String>, error: &AppError) -> Self {
        Self {
            url: url.into(),
            error: error.to_string(),
        }
    }
}

/// Outcome of a single extraction inside a batch.
pub type Extraction = Result<Record, Failure>;
