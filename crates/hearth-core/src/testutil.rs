//! Test utilities: an in-memory [`PageSession`] and page builders.
//!
//! Handwritten mocks for dependency injection in unit tests, in place of a
//! real browser. State lives behind `Arc<Mutex<_>>` so tests can assert on
//! recorded clicks, scrolls, and typed input after the pipeline has run.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::AppError;
use crate::profile::{Selectors, SiteProfile};
use crate::traits::{Locator, PageSession};

/// One scripted on-page element.
#[derive(Debug, Clone, Default)]
pub struct MockElement {
    pub text: String,
    pub attrs: HashMap<String, String>,
    /// Scoped lookups: (css selector, element index on the same page).
    pub children: Vec<(String, usize)>,
    /// Clicking this element moves the session to the next scripted page.
    pub advances_on_click: bool,
}

/// One scripted page: a flat element table plus page-scope selector roots.
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    /// (css selector, element index) pairs resolvable at page scope.
    pub roots: Vec<(String, usize)>,
    pub elements: Vec<MockElement>,
}

struct MockState {
    pages: Vec<MockPage>,
    current: usize,
    loaded_urls: Vec<String>,
    clicks: Vec<usize>,
    scrolled: Vec<usize>,
    typed: Vec<(usize, String)>,
    settles: u32,
    /// When set, a scoped find_all returns this error after `0` skips
    /// remain (simulates an unexpected mid-page session fault).
    find_all_error: Option<(u32, AppError)>,
}

/// In-memory page session scripted from a sequence of [`MockPage`]s.
///
/// Handles are indices into the current page's element table; like real
/// handles they go stale when the session advances, and like the real
/// pipeline the tests never retain them across a transition. Settle pauses
/// are free (counted, not slept).
#[derive(Clone)]
pub struct MockSession {
    state: Arc<Mutex<MockState>>,
}

impl MockSession {
    pub fn with_pages(pages: Vec<MockPage>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                pages,
                current: 0,
                loaded_urls: Vec::new(),
                clicks: Vec::new(),
                scrolled: Vec::new(),
                typed: Vec::new(),
                settles: 0,
                find_all_error: None,
            })),
        }
    }

    pub fn with_page(page: MockPage) -> Self {
        Self::with_pages(vec![page])
    }

    /// Blank session: every lookup misses.
    pub fn empty() -> Self {
        Self::with_pages(vec![MockPage::default()])
    }

    /// Arm a one-shot error for a scoped `find_all_within` call, after
    /// letting `skip` calls through first.
    pub fn inject_find_all_error(&self, skip: u32, error: AppError) {
        self.state.lock().unwrap().find_all_error = Some((skip, error));
    }

    pub fn loaded_urls(&self) -> Vec<String> {
        self.state.lock().unwrap().loaded_urls.clone()
    }

    pub fn click_count(&self) -> usize {
        self.state.lock().unwrap().clicks.len()
    }

    pub fn scrolled_count(&self) -> usize {
        self.state.lock().unwrap().scrolled.len()
    }

    pub fn typed(&self) -> Vec<(usize, String)> {
        self.state.lock().unwrap().typed.clone()
    }

    pub fn settle_count(&self) -> u32 {
        self.state.lock().unwrap().settles
    }

    /// Index of the page the session is currently on.
    pub fn current_page(&self) -> usize {
        self.state.lock().unwrap().current
    }
}

impl MockState {
    fn page(&self) -> &MockPage {
        &self.pages[self.current]
    }

    fn resolve_roots(&self, css: &str) -> Vec<usize> {
        self.page()
            .roots
            .iter()
            .filter(|(sel, _)| sel == css)
            .map(|(_, idx)| *idx)
            .collect()
    }

    fn resolve_children(&self, root: usize, css: &str) -> Vec<usize> {
        self.page().elements[root]
            .children
            .iter()
            .filter(|(sel, _)| sel == css)
            .map(|(_, idx)| *idx)
            .collect()
    }
}

impl PageSession for MockSession {
    type Handle = usize;

    async fn load_page(&self, url: &str) -> Result<(), AppError> {
        self.state.lock().unwrap().loaded_urls.push(url.to_string());
        Ok(())
    }

    async fn find_one(&self, locator: &Locator) -> Result<Option<usize>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.resolve_roots(&locator.to_css()).first().copied())
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<usize>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.resolve_roots(&locator.to_css()))
    }

    async fn find_one_within(
        &self,
        root: &usize,
        locator: &Locator,
    ) -> Result<Option<usize>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.resolve_children(*root, &locator.to_css()).first().copied())
    }

    async fn find_all_within(
        &self,
        root: &usize,
        locator: &Locator,
    ) -> Result<Vec<usize>, AppError> {
        let mut state = self.state.lock().unwrap();
        if matches!(state.find_all_error, Some((0, _))) {
            let (_, error) = state.find_all_error.take().unwrap();
            return Err(error);
        }
        if let Some((skip, _)) = &mut state.find_all_error {
            *skip -= 1;
        }
        Ok(state.resolve_children(*root, &locator.to_css()))
    }

    async fn attribute(&self, handle: &usize, name: &str) -> Result<Option<String>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.page().elements[*handle].attrs.get(name).cloned())
    }

    async fn text(&self, handle: &usize) -> Result<String, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.page().elements[*handle].text.clone())
    }

    async fn click(&self, handle: &usize) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        state.clicks.push(*handle);
        if state.page().elements[*handle].advances_on_click
            && state.current + 1 < state.pages.len()
        {
            state.current += 1;
        }
        Ok(())
    }

    async fn send_keys(&self, handle: &usize, text: &str) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        state.typed.push((*handle, text.to_string()));
        Ok(())
    }

    async fn scroll_into_view(&self, handle: &usize) -> Result<(), AppError> {
        self.state.lock().unwrap().scrolled.push(*handle);
        Ok(())
    }

    async fn wait_until_present(
        &self,
        locator: &Locator,
        _timeout: Duration,
    ) -> Result<Option<usize>, AppError> {
        self.find_one(locator).await
    }

    async fn settle(&self, _duration: Duration) {
        self.state.lock().unwrap().settles += 1;
    }
}

// ---------------------------------------------------------------------------
// Page builders
// ---------------------------------------------------------------------------

/// Declarative description of one listing card for [`MockPageBuilder`].
#[derive(Debug, Clone, Default)]
pub struct CardSpec {
    /// Raw `id` attribute of the card item (`None` = attribute absent).
    pub id_attr: Option<String>,
    pub price: Option<String>,
    pub details: Option<String>,
    pub agent: Option<String>,
    /// Address text plus the index into the profile's fallback chain it is
    /// reachable under (0 = primary selector).
    pub address: Option<(usize, String)>,
    pub status: Option<String>,
    /// Full visible card text, used by the address line-scan fallback.
    pub body_text: Option<String>,
    /// Card item with no inner body element at all.
    pub omit_body: bool,
}

impl CardSpec {
    /// Card with the conventional `mls-inline-<id>` attribute.
    pub fn with_mls(id: &str) -> Self {
        Self {
            id_attr: Some(format!("mls-inline-{id}")),
            ..Default::default()
        }
    }

    pub fn price(mut self, text: &str) -> Self {
        self.price = Some(text.to_string());
        self
    }

    pub fn details(mut self, text: &str) -> Self {
        self.details = Some(text.to_string());
        self
    }

    pub fn agent(mut self, text: &str) -> Self {
        self.agent = Some(text.to_string());
        self
    }

    pub fn address(mut self, text: &str) -> Self {
        self.address = Some((0, text.to_string()));
        self
    }

    /// Address only reachable via the `chain_index`-th fallback locator.
    pub fn address_via(mut self, chain_index: usize, text: &str) -> Self {
        self.address = Some((chain_index, text.to_string()));
        self
    }

    pub fn status(mut self, text: &str) -> Self {
        self.status = Some(text.to_string());
        self
    }

    pub fn body_text(mut self, text: &str) -> Self {
        self.body_text = Some(text.to_string());
        self
    }
}

/// Builds [`MockPage`]s wired to the default [`SiteProfile`] selectors.
pub struct MockPageBuilder {
    selectors: Selectors,
    page: MockPage,
}

impl MockPageBuilder {
    pub fn new() -> Self {
        Self {
            selectors: SiteProfile::default().selectors,
            page: MockPage::default(),
        }
    }

    fn push(&mut self, element: MockElement) -> usize {
        self.page.elements.push(element);
        self.page.elements.len() - 1
    }

    fn text_element(&mut self, text: &str) -> usize {
        self.push(MockElement {
            text: text.to_string(),
            ..Default::default()
        })
    }

    /// Add the location search input.
    pub fn with_location_input(mut self) -> Self {
        let idx = self.push(MockElement::default());
        let css = self.selectors.location_input.to_css();
        self.page.roots.push((css, idx));
        self
    }

    /// Add the grid-view toggle button.
    pub fn with_grid_toggle(mut self) -> Self {
        let idx = self.push(MockElement::default());
        let css = self.selectors.grid_toggle.to_css();
        self.page.roots.push((css, idx));
        self
    }

    /// Add a pagination bar. Items are anchors labelled `labels`; an item
    /// labelled "Next" (any case) advances the session to the next page
    /// when clicked.
    pub fn with_pagination(mut self, labels: &[&str]) -> Self {
        let item_css = self.selectors.pagination_item.to_css();
        let link_css = self.selectors.pagination_link.to_css();

        let mut items = Vec::new();
        for label in labels {
            let anchor = self.text_element(label);
            let item = self.push(MockElement {
                advances_on_click: label.eq_ignore_ascii_case("next"),
                children: vec![(link_css.clone(), anchor)],
                ..Default::default()
            });
            items.push((item_css.clone(), item));
        }

        let bar = self.push(MockElement {
            children: items,
            ..Default::default()
        });
        let css = self.selectors.pagination.to_css();
        self.page.roots.push((css, bar));
        self
    }

    /// Add the cards container populated from `cards`.
    pub fn with_cards(mut self, cards: &[CardSpec]) -> Self {
        let mut card_entries = Vec::new();

        for spec in cards {
            let mut body_children = Vec::new();

            if let Some(price) = &spec.price {
                let idx = self.text_element(price);
                body_children.push((self.selectors.price.to_css(), idx));
            }
            if let Some(details) = &spec.details {
                let span = self.text_element(details);
                let block = self.push(MockElement {
                    children: vec![(self.selectors.inner_text_node.to_css(), span)],
                    ..Default::default()
                });
                body_children.push((self.selectors.details.to_css(), block));
            }
            if let Some(agent) = &spec.agent {
                let span = self.text_element(agent);
                let block = self.push(MockElement {
                    children: vec![(self.selectors.inner_text_node.to_css(), span)],
                    ..Default::default()
                });
                body_children.push((self.selectors.agent.to_css(), block));
            }
            if let Some((chain_index, address)) = &spec.address {
                let idx = self.text_element(address);
                let css = self.selectors.address_chain[*chain_index].to_css();
                body_children.push((css, idx));
            }
            if let Some(status) = &spec.status {
                let idx = self.text_element(status);
                body_children.push((self.selectors.status.to_css(), idx));
            }

            let mut item_children = Vec::new();
            if !spec.omit_body {
                let body = self.push(MockElement {
                    text: spec.body_text.clone().unwrap_or_default(),
                    children: body_children,
                    ..Default::default()
                });
                item_children.push((self.selectors.card_body.to_css(), body));
            }

            let mut attrs = HashMap::new();
            if let Some(id_attr) = &spec.id_attr {
                attrs.insert("id".to_string(), id_attr.clone());
            }
            let item = self.push(MockElement {
                attrs,
                children: item_children,
                ..Default::default()
            });
            card_entries.push((self.selectors.card_item.to_css(), item));
        }

        let container = self.push(MockElement {
            children: card_entries,
            ..Default::default()
        });
        let css = self.selectors.cards_container.to_css();
        self.page.roots.push((css, container));
        self
    }

    pub fn build(self) -> MockPage {
        self.page
    }
}

impl Default for MockPageBuilder {
    fn default() -> Self {
        Self::new()
    }
}
