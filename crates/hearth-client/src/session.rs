use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures::StreamExt;
use hearth_core::error::AppError;
use hearth_core::traits::{Locator, PageSession};

/// How often a bounded wait re-polls for its element.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Desktop user agent sent with every request; the catalog serves a
/// degraded layout to obvious automation.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Launch options for [`BrowserSession`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Run with a visible window (debugging selector drift is much easier
    /// when you can watch the pages).
    pub headful: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self { headful: false }
    }
}

/// Single-tab page session on a dedicated Chromium process, driven over
/// the Chrome DevTools Protocol.
///
/// One session means one tab: the target catalog keeps its search context
/// in cookies and server-side session state, so all navigation must go
/// through the same tab, strictly in sequence. The session is therefore
/// not `Clone`.
///
/// The launch flags mirror what a real desktop Chrome sends; the catalog
/// degrades or blocks sessions that advertise automation.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
}

impl BrowserSession {
    /// Launch Chromium and open the single working tab.
    ///
    /// Requires a Chromium / Chrome binary reachable via `$PATH` (or the
    /// default locations checked by `chromiumoxide`), overridable with
    /// `CHROME_BIN`.
    pub async fn launch(options: &SessionOptions) -> Result<Self, AppError> {
        let mut builder = BrowserConfig::builder();
        builder = builder.no_sandbox().disable_default_args();

        if let Some(bin) = Self::find_chrome_binary() {
            tracing::info!("Using Chrome binary: {}", bin.display());
            builder = builder.chrome_executable(bin);
        }

        if options.headful {
            builder = builder.with_head();
        } else {
            builder = builder.arg("--headless=new");
        }

        let config = builder
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-popup-blocking")
            .arg("--disable-translate")
            .arg("--no-first-run")
            .arg("--disable-blink-features=AutomationControlled")
            .arg(format!("--user-agent={USER_AGENT}"))
            .build()
            .map_err(|e| AppError::Browser(format!("Browser config error: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AppError::Browser(format!("Failed to launch browser: {e}")))?;

        // The CDP handler must be polled continuously for the connection to work.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    tracing::warn!("Browser CDP handler error: {event:?}");
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| AppError::Browser(format!("Failed to open tab: {e}")))?;

        Ok(Self { browser, page })
    }

    /// Tries to locate the real Chrome/Chromium binary.
    ///
    /// On systems where Chromium is installed via **snap**, the wrapper at
    /// `/snap/bin/chromium` strips unknown CLI flags, breaking headless
    /// mode. We look for the real binary inside the snap first, then fall
    /// back to well-known system paths. If nothing is found we return
    /// `None` and let `chromiumoxide` do its own lookup.
    fn find_chrome_binary() -> Option<PathBuf> {
        let candidates: &[&str] = &[
            // Snap (Ubuntu default)
            "/snap/chromium/current/usr/lib/chromium-browser/chrome",
            // Flatpak
            "/var/lib/flatpak/exports/bin/org.chromium.Chromium",
            // Common apt / manual installs
            "/usr/bin/google-chrome-stable",
            "/usr/bin/google-chrome",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
        ];

        // Also honour an explicit override via env var.
        if let Ok(p) = std::env::var("CHROME_BIN") {
            let path = PathBuf::from(&p);
            if path.exists() {
                return Some(path);
            }
        }

        candidates.iter().map(PathBuf::from).find(|p| p.exists())
    }

    /// Close the tab and shut the browser process down.
    ///
    /// Must run on every exit path — success, error, and interrupt — or a
    /// headless Chromium is left behind.
    pub async fn close(self) -> Result<(), AppError> {
        let BrowserSession { mut browser, page } = self;
        let _ = page.close().await;
        browser
            .close()
            .await
            .map_err(|e| AppError::Browser(format!("Failed to close browser: {e}")))?;
        let _ = browser.wait().await;
        Ok(())
    }

    fn session_err(context: &str, e: impl std::fmt::Display) -> AppError {
        AppError::Session(format!("{context}: {e}"))
    }
}

impl PageSession for BrowserSession {
    type Handle = Arc<Element>;

    async fn load_page(&self, url: &str) -> Result<(), AppError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| Self::session_err("Navigation failed", e))?;
        Ok(())
    }

    async fn find_one(&self, locator: &Locator) -> Result<Option<Arc<Element>>, AppError> {
        // CDP reports a missing node as an error; treat any lookup failure
        // as "not found" and let the caller's null-field policy apply.
        Ok(self
            .page
            .find_element(locator.to_css())
            .await
            .ok()
            .map(Arc::new))
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<Arc<Element>>, AppError> {
        Ok(self
            .page
            .find_elements(locator.to_css())
            .await
            .unwrap_or_default()
            .into_iter()
            .map(Arc::new)
            .collect())
    }

    async fn find_one_within(
        &self,
        root: &Arc<Element>,
        locator: &Locator,
    ) -> Result<Option<Arc<Element>>, AppError> {
        Ok(root.find_element(locator.to_css()).await.ok().map(Arc::new))
    }

    async fn find_all_within(
        &self,
        root: &Arc<Element>,
        locator: &Locator,
    ) -> Result<Vec<Arc<Element>>, AppError> {
        Ok(root
            .find_elements(locator.to_css())
            .await
            .unwrap_or_default()
            .into_iter()
            .map(Arc::new)
            .collect())
    }

    async fn attribute(
        &self,
        handle: &Arc<Element>,
        name: &str,
    ) -> Result<Option<String>, AppError> {
        handle
            .attribute(name)
            .await
            .map_err(|e| Self::session_err("Attribute read failed", e))
    }

    async fn text(&self, handle: &Arc<Element>) -> Result<String, AppError> {
        let text = handle
            .inner_text()
            .await
            .map_err(|e| Self::session_err("Text read failed", e))?;
        Ok(text.unwrap_or_default())
    }

    async fn click(&self, handle: &Arc<Element>) -> Result<(), AppError> {
        handle
            .click()
            .await
            .map_err(|e| Self::session_err("Click failed", e))?;
        Ok(())
    }

    async fn send_keys(&self, handle: &Arc<Element>, text: &str) -> Result<(), AppError> {
        handle
            .click()
            .await
            .map_err(|e| Self::session_err("Focus click failed", e))?;
        handle
            .type_str(text)
            .await
            .map_err(|e| Self::session_err("Typing failed", e))?;
        handle
            .press_key("Enter")
            .await
            .map_err(|e| Self::session_err("Submit failed", e))?;
        Ok(())
    }

    async fn scroll_into_view(&self, handle: &Arc<Element>) -> Result<(), AppError> {
        handle
            .scroll_into_view()
            .await
            .map_err(|e| Self::session_err("Scroll failed", e))?;
        Ok(())
    }

    async fn wait_until_present(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Option<Arc<Element>>, AppError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Ok(element) = self.page.find_element(locator.to_css()).await {
                return Ok(Some(Arc::new(element)));
            }
            if tokio::time::Instant::now() >= deadline {
                tracing::debug!(%locator, timeout_secs = timeout.as_secs(), "Wait elapsed");
                return Ok(None);
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
    }

    async fn settle(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
