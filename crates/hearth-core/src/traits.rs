use std::future::Future;
use std::time::Duration;

use crate::error::AppError;

/// Structural locator for on-page elements.
///
/// The exact matching language is the session implementation's business;
/// [`Locator::to_css`] is the rendering every current implementation uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Compound CSS-like selector, passed through verbatim.
    Css(String),
    /// Single class name.
    Class(String),
    /// Tag name.
    Tag(String),
    /// Elements whose `id` attribute contains the given token.
    IdContains(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    /// Render to a CSS selector string.
    pub fn to_css(&self) -> String {
        match self {
            Locator::Css(sel) => sel.clone(),
            Locator::Class(name) => format!(".{name}"),
            Locator::Tag(name) => name.clone(),
            Locator::IdContains(token) => format!("[id*='{token}']"),
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// A live, single-tab page session: the pipeline's only window onto the
/// target site.
///
/// The session owns all navigation state (cookies, search context, current
/// page). It is deliberately not `Clone` — that state is unsafe to share
/// across concurrent navigations, so the pipeline is strictly sequential.
///
/// `Handle` values are borrows of on-page nodes. They are only valid for
/// the page they were found on; callers must not retain them across
/// `load_page` or a pagination click.
pub trait PageSession: Send + Sync {
    type Handle: Send + Sync;

    /// Navigate the tab to a URL.
    fn load_page(&self, url: &str) -> impl Future<Output = Result<(), AppError>> + Send;

    /// First element matching the locator, or `None` if nothing matches.
    fn find_one(
        &self,
        locator: &Locator,
    ) -> impl Future<Output = Result<Option<Self::Handle>, AppError>> + Send;

    /// All elements matching the locator, in document order.
    fn find_all(
        &self,
        locator: &Locator,
    ) -> impl Future<Output = Result<Vec<Self::Handle>, AppError>> + Send;

    /// First match scoped under `root`.
    fn find_one_within(
        &self,
        root: &Self::Handle,
        locator: &Locator,
    ) -> impl Future<Output = Result<Option<Self::Handle>, AppError>> + Send;

    /// All matches scoped under `root`, in document order.
    fn find_all_within(
        &self,
        root: &Self::Handle,
        locator: &Locator,
    ) -> impl Future<Output = Result<Vec<Self::Handle>, AppError>> + Send;

    /// Read an attribute; `None` if the attribute is absent.
    fn attribute(
        &self,
        handle: &Self::Handle,
        name: &str,
    ) -> impl Future<Output = Result<Option<String>, AppError>> + Send;

    /// Visible text of the element (empty string if it has none).
    fn text(&self, handle: &Self::Handle) -> impl Future<Output = Result<String, AppError>> + Send;

    /// Click the element.
    fn click(&self, handle: &Self::Handle) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Type text into the element and submit with Enter.
    fn send_keys(
        &self,
        handle: &Self::Handle,
        text: &str,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Scroll the element into the viewport (lazy-loaded cards render on
    /// scroll).
    fn scroll_into_view(
        &self,
        handle: &Self::Handle,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Bounded wait for an element to appear. `Ok(None)` on timeout — a
    /// timed-out wait is an accepted terminal outcome for the step, not an
    /// error.
    fn wait_until_present(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> impl Future<Output = Result<Option<Self::Handle>, AppError>> + Send;

    /// Fixed settle pause for content that renders asynchronously with no
    /// completion signal. The single timing primitive of the pipeline:
    /// every blind sleep goes through here, so mocks can make it free.
    fn settle(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_to_css() {
        assert_eq!(Locator::css("ul.property___cards").to_css(), "ul.property___cards");
        assert_eq!(Locator::Class("toggle-btn-grid-view".into()).to_css(), ".toggle-btn-grid-view");
        assert_eq!(Locator::Tag("a".into()).to_css(), "a");
        assert_eq!(
            Locator::IdContains("mls-inline-".into()).to_css(),
            "[id*='mls-inline-']"
        );
    }
}
