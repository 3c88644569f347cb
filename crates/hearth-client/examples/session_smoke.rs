/// Smoke-test for `BrowserSession`.
///
/// Launches a headless Chromium, loads <https://example.com>, and verifies
/// that basic element lookup and text reads work through the session.
///
/// Run with:
///   cargo run --example session_smoke
use std::time::Duration;

use hearth_client::{BrowserSession, SessionOptions};
use hearth_core::traits::{Locator, PageSession};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    println!("Launching headless browser…");
    let session = BrowserSession::launch(&SessionOptions::default()).await?;

    let url = "https://example.com";
    println!("Loading {url} …");
    session.load_page(url).await?;

    let heading = session
        .wait_until_present(&Locator::Tag("h1".into()), Duration::from_secs(10))
        .await?
        .expect("page should have an <h1>");
    let text = session.text(&heading).await?;

    assert_eq!(text.trim(), "Example Domain");
    println!("OK — <h1> reads {text:?}");

    session.close().await?;
    Ok(())
}
