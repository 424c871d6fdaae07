use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::Client;
use scraper::{Html, Selector};
use scrapjobs_core::config::SessionConfig;
use scrapjobs_core::error::AppError;
use scrapjobs_core::traits::{Engine, Page, Session};
use url::Url;

/// Static-HTML engine using reqwest and `scraper`.
///
/// Much lighter than [`crate::BrowserEngine`] but sees only the markup the
/// server sends: boards that render client-side yield `ElementNotFound`.
/// Selectors are evaluated once against the downloaded document, so
/// [`Page::wait_for_text`] never waits.
#[derive(Debug, Clone, Default)]
pub struct HttpEngine {
    config: SessionConfig,
}

impl HttpEngine {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }
}

impl Engine for HttpEngine {
    type Session = HttpSession;

    async fn launch(&self) -> Result<HttpSession, AppError> {
        let client = Client::builder()
            .user_agent(&self.config.user_agent)
            .timeout(self.config.timeout)
            .build()
            .map_err(|e| AppError::SessionStart(e.to_string()))?;

        Ok(HttpSession {
            client,
            timeout: self.config.timeout,
        })
    }
}

/// A shared HTTP client; pages are independent documents.
#[derive(Clone)]
pub struct HttpSession {
    client: Client,
    timeout: Duration,
}

impl Session for HttpSession {
    type Page = HttpPage;

    async fn new_page(&self) -> Result<HttpPage, AppError> {
        Ok(HttpPage {
            client: self.client.clone(),
            timeout: self.timeout,
            document: Arc::new(Mutex::new(None)),
        })
    }

    async fn close(self) -> Result<(), AppError> {
        Ok(())
    }
}

/// The last document fetched by an [`HttpPage`].
#[derive(Debug, Clone)]
struct Loaded {
    url: Url,
    html: String,
}

#[derive(Clone)]
pub struct HttpPage {
    client: Client,
    timeout: Duration,
    document: Arc<Mutex<Option<Loaded>>>,
}

impl HttpPage {
    fn loaded(&self) -> Result<Loaded, AppError> {
        self.document
            .lock()
            .map_err(|_| AppError::Generic("page state poisoned".into()))?
            .clone()
            .ok_or_else(|| AppError::Navigation("no document loaded".into()))
    }
}

impl Page for HttpPage {
    async fn goto(&self, url: &str) -> Result<(), AppError> {
        let parsed =
            Url::parse(url).map_err(|e| AppError::Navigation(format!("Invalid URL {url}: {e}")))?;
        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(AppError::Navigation(format!(
                    "URL scheme '{scheme}' is not allowed (only http/https)"
                )));
            }
        }

        let response = self.client.get(parsed).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout.as_secs())
            } else if e.is_connect() {
                AppError::Navigation(format!("Connection failed: {e}"))
            } else {
                AppError::Navigation(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Navigation(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        let final_url = response.url().clone();
        let html = response
            .text()
            .await
            .map_err(|e| AppError::Navigation(format!("Failed to read response body: {e}")))?;

        let mut document = self
            .document
            .lock()
            .map_err(|_| AppError::Generic("page state poisoned".into()))?;
        *document = Some(Loaded {
            url: final_url,
            html,
        });
        Ok(())
    }

    async fn title(&self) -> Result<String, AppError> {
        Ok(document_title(&self.loaded()?.html))
    }

    async fn wait_for_text(&self, selector: &str) -> Result<String, AppError> {
        select_texts(&self.loaded()?.html, selector)?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::ElementNotFound {
                selector: selector.to_string(),
            })
    }

    async fn texts(&self, selector: &str) -> Result<Vec<String>, AppError> {
        select_texts(&self.loaded()?.html, selector)
    }

    async fn links(&self) -> Result<Vec<String>, AppError> {
        let loaded = self.loaded()?;
        Ok(resolve_links(&loaded.html, &loaded.url))
    }

    async fn close(&self) -> Result<(), AppError> {
        if let Ok(mut document) = self.document.lock() {
            *document = None;
        }
        Ok(())
    }
}

fn parse_selector(selector: &str) -> Result<Selector, AppError> {
    Selector::parse(selector)
        .map_err(|e| AppError::InvalidConfiguration(format!("Invalid selector {selector}: {e}")))
}

/// Text content of every element matching `selector`, in document order.
fn select_texts(html: &str, selector: &str) -> Result<Vec<String>, AppError> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);
    Ok(document
        .select(&selector)
        .map(|el| el.text().collect::<String>())
        .collect())
}

fn document_title(html: &str) -> String {
    let document = Html::parse_document(html);
    Selector::parse("title")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
        })
        .unwrap_or_default()
}

/// Absolute http(s) target of every anchor, resolved against `base`.
fn resolve_links(html: &str, base: &Url) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let document = Html::parse_document(html);
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| base.join(href).ok())
        .filter(|url| url.scheme() == "http" || url.scheme() == "https")
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrapjobs_core::sources::boards;

    const LISTING: &str = r#"
        <html><head><title>Remote Go jobs</title></head><body>
          <a href="/golang-go-job-a.html">A</a>
          <a href="https://www.golangprojects.com/golang-go-job-b.html">B</a>
          <a href="mailto:jobs@example.com">Mail</a>
          <a>No href</a>
        </body></html>"#;

    #[test]
    fn test_document_title() {
        assert_eq!(document_title(LISTING), "Remote Go jobs");
        assert_eq!(document_title("<html><body></body></html>"), "");
    }

    #[test]
    fn test_links_are_absolute() {
        let base = Url::parse("https://www.golangprojects.com/golang-remote-jobs.html").unwrap();
        assert_eq!(
            resolve_links(LISTING, &base),
            vec![
                "https://www.golangprojects.com/golang-go-job-a.html",
                "https://www.golangprojects.com/golang-go-job-b.html",
            ]
        );
    }

    #[test]
    fn test_select_texts_in_document_order() {
        let html = r#"<div class="markdown-component"><p>One</p><p>Two <b>bold</b></p></div>"#;
        assert_eq!(
            select_texts(html, ".markdown-component p").unwrap(),
            vec!["One", "Two bold"]
        );
        assert!(select_texts(html, "h1").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_selector() {
        assert!(matches!(
            select_texts("<p></p>", "p[[["),
            Err(AppError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_golangprojects_positional_selector() {
        let html = r#"<html><body><div>
            <div><div>Remote Go role, Europe.</div><div>Sidebar</div></div>
            <div><div>Footer</div></div>
        </div></body></html>"#;
        assert_eq!(
            select_texts(html, boards::GOLANGPROJECTS_DESCRIPTION).unwrap(),
            vec!["Remote Go role, Europe."]
        );
    }

    #[tokio::test]
    async fn page_without_document_reports_navigation() {
        let session = HttpEngine::default().launch().await.unwrap();
        let page = session.new_page().await.unwrap();
        assert!(matches!(page.title().await, Err(AppError::Navigation(_))));
        assert!(matches!(
            page.goto("ftp://example.com/job").await,
            Err(AppError::Navigation(_))
        ));
    }
}
