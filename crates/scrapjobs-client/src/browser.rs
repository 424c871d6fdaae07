use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use scrapjobs_core::config::SessionConfig;
use scrapjobs_core::error::AppError;
use scrapjobs_core::traits::{Engine, Page, Session};
use tokio::task::JoinHandle;

/// Interval between element lookups while waiting for a selector.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Browser engine driving Chromium over the Chrome DevTools Protocol.
///
/// Pages are rendered with JavaScript before any selector runs, which the
/// boards' client-side markup needs. Each [`Engine::launch`] starts one
/// Chromium process; every page of a run is a tab in that process.
///
/// # Example
///
/// ```rust,no_run
/// use scrapjobs_client::BrowserEngine;
/// use scrapjobs_core::config::SessionConfig;
/// use scrapjobs_core::traits::{Engine, Page, Session};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = BrowserEngine::new(SessionConfig::default());
/// let session = engine.launch().await?;
/// let page = session.new_page().await?;
/// page.goto("https://example.com").await?;
/// println!("{}", page.title().await?);
/// page.close().await?;
/// session.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct BrowserEngine {
    config: SessionConfig,
}

impl BrowserEngine {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    fn browser_config(&self) -> Result<BrowserConfig, AppError> {
        let (width, height) = self.config.viewport;
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .disable_default_args()
            .window_size(width, height)
            .request_timeout(self.config.timeout);

        // Snap-packaged Chromium exposes a wrapper that rejects standard
        // Chrome CLI flags, so the real binary is located up front.
        if let Some(bin) = find_chrome_binary(self.config.chrome_bin.as_ref()) {
            tracing::info!("Using Chrome binary: {}", bin.display());
            builder = builder.chrome_executable(bin);
        }

        if self.config.headless {
            builder = builder.arg("--headless=new");
        } else {
            builder = builder.with_head();
        }

        builder
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-popup-blocking")
            .arg("--disable-translate")
            .arg("--no-first-run")
            .arg(format!("--user-agent={}", self.config.user_agent))
            .build()
            .map_err(|e| AppError::SessionStart(format!("Browser config error: {e}")))
    }
}

impl Engine for BrowserEngine {
    type Session = BrowserSession;

    async fn launch(&self) -> Result<BrowserSession, AppError> {
        let config = self.browser_config()?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AppError::SessionStart(format!("Failed to launch browser: {e}")))?;

        // The CDP handler must be polled continuously for the connection to work.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    tracing::warn!("Browser CDP handler error: {event:?}");
                    break;
                }
            }
        });

        tracing::info!(headless = self.config.headless, "Browser launched");
        Ok(BrowserSession {
            browser,
            handler,
            timeout: self.config.timeout,
        })
    }
}

/// A running Chromium process.
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    timeout: Duration,
}

impl Session for BrowserSession {
    type Page = BrowserPage;

    async fn new_page(&self) -> Result<BrowserPage, AppError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| AppError::Navigation(format!("Failed to open page: {e}")))?;
        Ok(BrowserPage {
            page,
            timeout: self.timeout,
        })
    }

    async fn close(self) -> Result<(), AppError> {
        let BrowserSession {
            mut browser,
            handler,
            ..
        } = self;
        let closed = browser
            .close()
            .await
            .map_err(|e| AppError::Generic(format!("Failed to close browser: {e}")));
        if closed.is_ok() {
            let _ = browser.wait().await;
        }
        handler.abort();
        closed.map(|_| ())
    }
}

/// One Chromium tab.
#[derive(Clone)]
pub struct BrowserPage {
    page: chromiumoxide::Page,
    timeout: Duration,
}

impl BrowserPage {
    async fn eval<T: serde::de::DeserializeOwned>(&self, script: String) -> Result<T, AppError> {
        let result = tokio::time::timeout(self.timeout, self.page.evaluate(script))
            .await
            .map_err(|_| AppError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| AppError::Navigation(format!("Script evaluation failed: {e}")))?;
        result
            .into_value()
            .map_err(|e| AppError::Generic(format!("Unexpected script result: {e}")))
    }
}

/// Script yielding the `textContent` of the first match, or `null`.
fn first_text_script(selector: &str) -> Result<String, AppError> {
    Ok(format!(
        "document.querySelector({})?.textContent ?? null",
        serde_json::to_string(selector)?
    ))
}

/// Script yielding the `textContent` of every match, in document order.
fn texts_script(selector: &str) -> Result<String, AppError> {
    Ok(format!(
        "Array.from(document.querySelectorAll({})).map(e => e.textContent ?? '')",
        serde_json::to_string(selector)?
    ))
}

impl Page for BrowserPage {
    async fn goto(&self, url: &str) -> Result<(), AppError> {
        tokio::time::timeout(self.timeout, self.page.goto(url.to_string()))
            .await
            .map_err(|_| AppError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| AppError::Navigation(format!("Failed to navigate to {url}: {e}")))?;
        Ok(())
    }

    async fn title(&self) -> Result<String, AppError> {
        let title = self
            .page
            .get_title()
            .await
            .map_err(|e| AppError::Navigation(format!("Failed to read title: {e}")))?;
        Ok(title.unwrap_or_default())
    }

    async fn wait_for_text(&self, selector: &str) -> Result<String, AppError> {
        let script = first_text_script(selector)?;
        let wait = async {
            loop {
                if let Ok(Some(text)) = self.eval::<Option<String>>(script.clone()).await {
                    return text;
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        };
        tokio::time::timeout(self.timeout, wait)
            .await
            .map_err(|_| AppError::ElementNotFound {
                selector: selector.to_string(),
            })
    }

    async fn texts(&self, selector: &str) -> Result<Vec<String>, AppError> {
        self.eval(texts_script(selector)?).await
    }

    async fn links(&self) -> Result<Vec<String>, AppError> {
        self.eval("Array.from(document.querySelectorAll('a[href]')).map(a => a.href)".to_string())
            .await
    }

    async fn close(&self) -> Result<(), AppError> {
        self.page
            .clone()
            .close()
            .await
            .map_err(|e| AppError::Generic(format!("Failed to close page: {e}")))
    }
}

/// Tries to locate the real Chrome/Chromium binary.
///
/// An explicit path wins, then `$CHROME_BIN`, then well-known install
/// locations. `None` lets `chromiumoxide` do its own lookup.
fn find_chrome_binary(explicit: Option<&PathBuf>) -> Option<PathBuf> {
    let candidates: &[&str] = &[
        // Snap (Ubuntu default)
        "/snap/chromium/current/usr/lib/chromium-browser/chrome",
        // Flatpak
        "/var/lib/flatpak/exports/bin/org.chromium.Chromium",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/google-chrome",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
    ];

    if let Some(path) = explicit.filter(|p| p.exists()) {
        return Some(path.clone());
    }

    if let Ok(p) = std::env::var("CHROME_BIN") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    candidates.iter().map(PathBuf::from).find(|p| p.exists())
}
