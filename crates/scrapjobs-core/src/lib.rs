pub mod config;
pub mod discovery;
pub mod error;
pub mod harvest;
pub mod links;
pub mod locality;
pub mod models;
pub mod output;
pub mod registry;
pub mod router;
pub mod scheduler;
pub mod sources;
pub mod traits;
pub mod util;

#[cfg(test)]
pub mod testutil;

pub use config::{
    DEFAULT_BATCH_SIZE, HarvestConfig, HarvestMode, RetryPolicy, SessionConfig, SourceSelection,
};
pub use discovery::{DiscoveryReport, SourceFailure, discover_all};
pub use error::AppError;
pub use harvest::{HarvestOutcome, Harvester};
pub use links::LinkSet;
pub use models::{Extraction, Failure, Record, SourceId};
pub use output::{RecordSink, read_record, record_files, write_json};
pub use registry::Registry;
pub use router::{Pattern, Router};
pub use scheduler::{HarvestEvent, HarvestReport, HarvestReporter, Scheduler, TracingHarvestReporter};
pub use sources::{BoardAdapter, builtin_registry};
pub use traits::{Engine, Page, Session, SourceAdapter, with_page};
