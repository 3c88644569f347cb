//! Site profile: every selector, URL, and timing knob in one place.
//!
//! Selectors drift whenever the target site ships a redesign; keeping them
//! as data (rather than literals scattered through the pipeline) makes the
//! fix a one-file change and lets tests swap in synthetic profiles.

use std::time::Duration;

use crate::traits::Locator;

/// Locator set for one catalog layout.
#[derive(Debug, Clone)]
pub struct Selectors {
    /// Container holding all listing cards on the current page.
    pub cards_container: Locator,
    /// Card items under the container, matched by id-prefix convention.
    pub card_item: Locator,
    /// The value prefixed onto every card's `id` attribute.
    pub card_id_prefix: String,
    /// Inner card body; all per-field lookups are scoped under it.
    pub card_body: Locator,
    pub price: Locator,
    pub details: Locator,
    pub agent: Locator,
    /// Text node nested inside the details/agent blocks.
    pub inner_text_node: Locator,
    /// Ordered fallback chain for the address block; first match wins.
    pub address_chain: Vec<Locator>,
    pub status: Locator,
    /// Pagination list and its items.
    pub pagination: Locator,
    pub pagination_item: Locator,
    pub pagination_link: Locator,
    /// Search controls.
    pub location_input: Locator,
    pub grid_toggle: Locator,
}

/// Timing knobs for bounded waits and settle pauses.
#[derive(Debug, Clone)]
pub struct Timing {
    /// Upper bound for every `wait_until_present` call.
    pub wait_timeout: Duration,
    /// Settle pause after a navigation action (search submit, page click).
    pub page_settle: Duration,
    /// Settle pause after scrolling a card into view.
    pub card_settle: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            wait_timeout: Duration::from_secs(20),
            page_settle: Duration::from_secs(5),
            card_settle: Duration::from_secs(1),
        }
    }
}

/// Everything the pipeline needs to know about one target catalog.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub base_url: String,
    /// Locale token matched (case-insensitively) during the address
    /// full-text fallback scan.
    pub locale_token: String,
    /// Street-suffix tokens for the same scan.
    pub street_suffixes: Vec<String>,
    pub selectors: Selectors,
    pub timing: Timing,
}

impl SiteProfile {
    /// Override the base URL (e.g. to point at a staging mirror).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Override all timing knobs at once.
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }
}

impl Default for SiteProfile {
    /// Profile for the Utah real-estate catalog the pipeline was built
    /// against.
    fn default() -> Self {
        Self {
            base_url: "https://www.utahrealestate.com".to_string(),
            locale_token: "south jordan".to_string(),
            street_suffixes: ["dr", "st", "ave", "way", "ln", "ct"]
                .into_iter()
                .map(String::from)
                .collect(),
            selectors: Selectors {
                cards_container: Locator::css("ul.property___cards"),
                card_item: Locator::css("li[id*='mls-inline-']"),
                card_id_prefix: "mls-inline-".to_string(),
                card_body: Locator::css("div.property___card"),
                price: Locator::css("div.list___price"),
                details: Locator::css("div.listing___details.truncate"),
                agent: Locator::css("div.listing___agent.truncate"),
                inner_text_node: Locator::Tag("span".to_string()),
                address_chain: vec![
                    Locator::css("div.listing___address"),
                    Locator::css("[class*='address']"),
                    Locator::css(".property___address"),
                    Locator::css("div[class*='listing___address']"),
                ],
                status: Locator::css(".status, [class*='status']"),
                pagination: Locator::css("ul.pagination.pagination-lg"),
                pagination_item: Locator::Tag("li".to_string()),
                pagination_link: Locator::Tag("a".to_string()),
                location_input: Locator::css("input[name='geolocation']"),
                grid_toggle: Locator::Class("toggle-btn-grid-view".to_string()),
            },
            timing: Timing::default(),
        }
    }
}
