use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;
use crate::models::SourceId;

/// Default number of URLs extracted concurrently per batch.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Which sources to discover links from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSelection {
    /// Every registered source that has a listing page.
    All,
    One(SourceId),
}

/// Where the URLs of a run come from. Exactly one mode is active per run;
/// discovery and an explicit URL list cannot be combined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestMode {
    /// Discover links first, then extract them.
    Discover(SourceSelection),
    /// Extract a caller-supplied URL list; discovery is skipped.
    Urls(Vec<String>),
}

/// Retry policy for failed extractions.
///
/// Disabled by default; when enabled only retryable errors (timeouts and
/// transient navigation failures) are attempted again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// Whether another attempt should follow `attempt` (0-indexed) failing with `error`.
    pub fn should_retry(&self, attempt: u32, error: &AppError) -> bool {
        attempt < self.max_retries && error.is_retryable()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Configuration of a single pipeline run.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub mode: HarvestMode,
    pub batch_size: usize,
    pub retry: RetryPolicy,
}

impl HarvestConfig {
    pub fn new(mode: HarvestMode) -> Self {
        Self {
            mode,
            batch_size: DEFAULT_BATCH_SIZE,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn validate(&self) -> Result<(), AppError> {
        validate_batch_size(self.batch_size)
    }
}

pub fn validate_batch_size(batch_size: usize) -> Result<(), AppError> {
    if batch_size == 0 {
        return Err(AppError::InvalidConfiguration(
            "batch size must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

/// Settings shared by the automation engines.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Upper bound for a single navigation or element wait.
    pub timeout: Duration,
    /// Run the browser without a visible window.
    pub headless: bool,
    pub viewport: (u32, u32),
    /// Explicit browser binary; engines fall back to their own lookup.
    pub chrome_bin: Option<PathBuf>,
    pub user_agent: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            headless: true,
            viewport: (1080, 1024),
            chrome_bin: None,
            user_agent: concat!("scrapjobs/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_batch_size() {
        let config = HarvestConfig::new(HarvestMode::Urls(vec![]));
        assert_eq!(config.batch_size, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_batch_size_is_invalid() {
        let config = HarvestConfig::new(HarvestMode::Urls(vec![])).with_batch_size(0);
        assert!(matches!(
            config.validate(),
            Err(AppError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_retry_only_retryable_errors() {
        let policy = RetryPolicy::new(2, Duration::ZERO);
        assert!(policy.should_retry(0, &AppError::Timeout(30)));
        assert!(policy.should_retry(1, &AppError::Timeout(30)));
        assert!(!policy.should_retry(2, &AppError::Timeout(30)));
        assert!(!policy.should_retry(
            0,
            &AppError::ElementNotFound {
                selector: "h1".into()
            }
        ));
        assert!(!RetryPolicy::default().should_retry(0, &AppError::Timeout(30)));
    }
}
