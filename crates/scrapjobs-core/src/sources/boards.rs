//! Built-in job boards.
//!
//! | Board | Discovery | Description |
//! |-------|-----------|-------------|
//! | golangprojects | remote listing | first block of the main column |
//! | rustjobs | remote listing | markdown paragraphs |
//! | indeed | none | description paragraphs, body container fallback |
//! | functionalworks | none | positional block |
//! | jooble | none | positional block |
//!
//! The positional selectors mirror each board's current DOM and break when a
//! board redesigns; a broken selector shows up as `ElementNotFound` failures
//! or empty descriptions for that board only.

use super::{BoardProfile, DescriptionRule, Listing};
use crate::models::SourceId;

pub const GOLANGPROJECTS_DESCRIPTION: &str =
    "body > div > div:nth-of-type(1) > div:nth-of-type(1)";

pub const FUNCTIONALWORKS_DESCRIPTION: &str = "body > div:nth-of-type(1) > div:nth-of-type(2) \
     > div:nth-of-type(2) > div > div:nth-of-type(1) > div:nth-of-type(2)";

pub const JOOBLE_DESCRIPTION: &str = "body > div > div > div:nth-of-type(1) > div \
     > div:nth-of-type(1) > main > div:nth-of-type(1) > div:nth-of-type(2) \
     > div:nth-of-type(1) > div:nth-of-type(2) > div > div > div > div:nth-of-type(2) > div > div";

pub const GOLANGPROJECTS: BoardProfile = BoardProfile {
    source: SourceId::Golangprojects,
    listing: Some(Listing {
        url: "https://www.golangprojects.com/golang-remote-jobs.html",
        link_prefix: "https://www.golangprojects.com/golang-go-job",
    }),
    title_selector: "h1",
    description: DescriptionRule::First(GOLANGPROJECTS_DESCRIPTION),
    tags: &["go", "golangprojects"],
    remote_metadata: true,
};

pub const RUSTJOBS: BoardProfile = BoardProfile {
    source: SourceId::Rustjobs,
    listing: Some(Listing {
        url: "https://rustjobs.dev/locations/remote/",
        link_prefix: "https://rustjobs.dev/featured-jobs/",
    }),
    title_selector: "h1",
    description: DescriptionRule::All(".markdown-component p"),
    tags: &["rust", "rustjobs"],
    remote_metadata: true,
};

pub const INDEED: BoardProfile = BoardProfile {
    source: SourceId::Indeed,
    listing: None,
    title_selector: ".jobsearch-JobInfoHeader-title",
    description: DescriptionRule::AllOr("#jobDescriptionText p", ".jobsearch-BodyContainer"),
    tags: &["indeed"],
    remote_metadata: false,
};

pub const FUNCTIONALWORKS: BoardProfile = BoardProfile {
    source: SourceId::Functionalworks,
    listing: None,
    title_selector: "h1",
    description: DescriptionRule::All(FUNCTIONALWORKS_DESCRIPTION),
    tags: &["functional", "functionalworks"],
    remote_metadata: false,
};

pub const JOOBLE: BoardProfile = BoardProfile {
    source: SourceId::Jooble,
    listing: None,
    title_selector: "h1",
    description: DescriptionRule::All(JOOBLE_DESCRIPTION),
    tags: &["jooble"],
    remote_metadata: false,
};

pub const ALL: [BoardProfile; 5] = [GOLANGPROJECTS, RUSTJOBS, INDEED, FUNCTIONALWORKS, JOOBLE];
