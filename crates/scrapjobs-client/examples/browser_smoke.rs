/// Smoke-test for `BrowserEngine`.
///
/// Launches a headless Chromium, opens <https://example.com>, and verifies
/// the title, the `<h1>` text, and the anchor list.
///
/// Run with:
///   cargo run --example browser_smoke --features browser
use scrapjobs_client::BrowserEngine;
use scrapjobs_core::config::SessionConfig;
use scrapjobs_core::traits::{Engine, Page, Session};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    println!("Launching headless browser…");
    let session = BrowserEngine::new(SessionConfig::default()).launch().await?;
    let page = session.new_page().await?;

    let url = "https://example.com";
    println!("Opening {url} …");
    page.goto(url).await?;

    let title = page.title().await?;
    let heading = page.wait_for_text("h1").await?;
    let links = page.links().await?;

    assert_eq!(heading.trim(), "Example Domain", "unexpected <h1>");
    assert!(!links.is_empty(), "expected at least one anchor");

    println!("OK: title {title:?}, {} link(s)", links.len());
    for link in &links {
        println!("  {link}");
    }

    page.close().await?;
    session.close().await?;
    Ok(())
}
