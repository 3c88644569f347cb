//! Per-page card discovery and per-card field extraction.

use crate::error::AppError;
use crate::models::{Listing, RawFields};
use crate::profile::SiteProfile;
use crate::traits::{Locator, PageSession};

/// Pulls raw listing cards off the current page and turns each one into a
/// typed [`Listing`].
///
/// Every per-field lookup failure is isolated: a missing sub-element nulls
/// that field and nothing else. A card is never dropped here — the
/// accept/reject decision belongs to the collection loop.
pub struct PageExtractor<'a, S: PageSession> {
    session: &'a S,
    profile: &'a SiteProfile,
}

impl<'a, S: PageSession> PageExtractor<'a, S> {
    pub fn new(session: &'a S, profile: &'a SiteProfile) -> Self {
        Self { session, profile }
    }

    /// The ordered card handles currently under the listing container.
    ///
    /// Waits (bounded) for the container; a timeout or an absent container
    /// is a normal, if unusual, condition and yields an empty sequence.
    pub async fn list_cards(&self) -> Result<Vec<S::Handle>, AppError> {
        let selectors = &self.profile.selectors;
        let container = self
            .session
            .wait_until_present(&selectors.cards_container, self.profile.timing.wait_timeout)
            .await?;

        let Some(container) = container else {
            tracing::warn!("Timed out waiting for the listing cards container");
            return Ok(Vec::new());
        };

        self.session
            .find_all_within(&container, &selectors.card_item)
            .await
    }

    /// Extract one card into a typed record.
    ///
    /// Infallible by design: whatever fields could be read are populated,
    /// the rest stay null.
    pub async fn extract_card(&self, card: &S::Handle) -> Listing {
        Listing::from_raw(self.raw_fields(card).await)
    }

    async fn raw_fields(&self, card: &S::Handle) -> RawFields {
        let selectors = &self.profile.selectors;
        let mut raw = RawFields::default();

        raw.id_token = self.read_id_token(card).await;

        // All remaining lookups are scoped under the card body. A card
        // without one still yields a (possibly retainable) partial record.
        let body = match self.session.find_one_within(card, &selectors.card_body).await {
            Ok(Some(body)) => body,
            Ok(None) => {
                tracing::debug!(mls_id = ?raw.id_token, "Card has no body element");
                return raw;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Card body lookup failed");
                return raw;
            }
        };

        raw.price_text = self.read_text_at(&body, &selectors.price).await;
        raw.detail_text = self.read_nested_text(&body, &selectors.details).await;
        raw.agent_text = self.read_nested_text(&body, &selectors.agent).await;
        raw.address_text = self.read_address(&body).await;
        raw.status_block = self.read_text_at(&body, &selectors.status).await;

        raw
    }

    async fn read_id_token(&self, card: &S::Handle) -> Option<String> {
        let prefix = &self.profile.selectors.card_id_prefix;
        match self.session.attribute(card, "id").await {
            Ok(Some(id)) if id.contains(prefix.as_str()) => Some(id.replace(prefix, "")),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "id attribute read failed");
                None
            }
        }
    }

    /// Text of the first element matching `locator` under `root`.
    async fn read_text_at(
        &self,
        root: &S::Handle,
        locator: &Locator,
    ) -> Option<String> {
        let found = self.session.find_one_within(root, locator).await.ok()??;
        self.read_trimmed_text(&found).await
    }

    /// Text of the span nested inside the first match of `locator`.
    async fn read_nested_text(
        &self,
        root: &S::Handle,
        locator: &Locator,
    ) -> Option<String> {
        let block = self.session.find_one_within(root, locator).await.ok()??;
        let span = self
            .session
            .find_one_within(&block, &self.profile.selectors.inner_text_node)
            .await
            .ok()??;
        self.read_trimmed_text(&span).await
    }

    async fn read_trimmed_text(&self, handle: &S::Handle) -> Option<String> {
        let text = self.session.text(handle).await.ok()?;
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// Fallback-chain address lookup.
    ///
    /// Tries each structural locator in order; first match wins. When the
    /// whole chain misses, scans the card's visible text line-by-line for
    /// a street-suffix token or the locale name.
    async fn read_address(&self, body: &S::Handle) -> Option<String> {
        for locator in &self.profile.selectors.address_chain {
            if let Some(text) = self.read_text_at(body, locator).await {
                return Some(text);
            }
        }

        let full_text = self.session.text(body).await.ok()?;
        full_text
            .lines()
            .find(|line| self.looks_like_address(line))
            .map(|line| line.trim().to_string())
    }

    fn looks_like_address(&self, line: &str) -> bool {
        let lower = line.to_lowercase();
        self.profile
            .street_suffixes
            .iter()
            .any(|suffix| lower.contains(suffix.as_str()))
            || lower.contains(&self.profile.locale_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{CardSpec, MockPageBuilder, MockSession};

    #[tokio::test]
    async fn missing_container_yields_empty_sequence() {
        let session = MockSession::empty();
        let profile = SiteProfile::default();
        let extractor = PageExtractor::new(&session, &profile);

        let cards = extractor.list_cards().await.unwrap();
        assert!(cards.is_empty());
    }

    #[tokio::test]
    async fn empty_container_yields_empty_sequence() {
        let session = MockSession::with_page(MockPageBuilder::new().with_cards(&[]).build());
        let profile = SiteProfile::default();
        let extractor = PageExtractor::new(&session, &profile);

        let cards = extractor.list_cards().await.unwrap();
        assert!(cards.is_empty());
    }

    #[tokio::test]
    async fn extracts_full_card() {
        let card = CardSpec::with_mls("2105698")
            .price("$475,000")
            .details("3 bds | 2 ba | 1,500 SqFt")
            .agent("Jane Doe | Acme Realty")
            .address("123 Maple Dr")
            .status("Active\nDOM: 15");
        let session = MockSession::with_page(MockPageBuilder::new().with_cards(&[card]).build());
        let profile = SiteProfile::default();
        let extractor = PageExtractor::new(&session, &profile);

        let cards = extractor.list_cards().await.unwrap();
        assert_eq!(cards.len(), 1);

        let listing = extractor.extract_card(&cards[0]).await;
        assert_eq!(listing.mls_id.as_deref(), Some("2105698"));
        assert_eq!(listing.price, Some(475_000));
        assert_eq!(listing.address.as_deref(), Some("123 Maple Dr"));
        assert_eq!(listing.beds, Some(3));
        assert_eq!(listing.baths, Some(2.0));
        assert_eq!(listing.sqft, Some(1500));
        assert_eq!(listing.status, "Active");
        assert_eq!(listing.days_on_market, 15);
        assert_eq!(listing.agent_name.as_deref(), Some("Jane Doe"));
        assert_eq!(listing.agent_company.as_deref(), Some("Acme Realty"));
    }

    #[tokio::test]
    async fn missing_fields_are_isolated() {
        // Price element absent, everything else present.
        let card = CardSpec::with_mls("77")
            .details("2 bds | 900 SqFt")
            .address("9 Elm Ct");
        let session = MockSession::with_page(MockPageBuilder::new().with_cards(&[card]).build());
        let profile = SiteProfile::default();
        let extractor = PageExtractor::new(&session, &profile);

        let cards = extractor.list_cards().await.unwrap();
        let listing = extractor.extract_card(&cards[0]).await;

        assert_eq!(listing.price, None);
        assert_eq!(listing.beds, Some(2));
        assert_eq!(listing.baths, None);
        assert_eq!(listing.sqft, Some(900));
        assert_eq!(listing.address.as_deref(), Some("9 Elm Ct"));
    }

    #[tokio::test]
    async fn missing_status_defaults_active_zero() {
        let card = CardSpec::with_mls("5").price("$100,000");
        let session = MockSession::with_page(MockPageBuilder::new().with_cards(&[card]).build());
        let profile = SiteProfile::default();
        let extractor = PageExtractor::new(&session, &profile);

        let cards = extractor.list_cards().await.unwrap();
        let listing = extractor.extract_card(&cards[0]).await;
        assert_eq!(listing.status, "Active");
        assert_eq!(listing.days_on_market, 0);
    }

    #[tokio::test]
    async fn address_falls_back_through_chain() {
        // Reachable only via the second locator in the chain.
        let card = CardSpec::with_mls("8").address_via(1, "456 Willow Way");
        let session = MockSession::with_page(MockPageBuilder::new().with_cards(&[card]).build());
        let profile = SiteProfile::default();
        let extractor = PageExtractor::new(&session, &profile);

        let cards = extractor.list_cards().await.unwrap();
        let listing = extractor.extract_card(&cards[0]).await;
        assert_eq!(listing.address.as_deref(), Some("456 Willow Way"));
    }

    #[tokio::test]
    async fn address_falls_back_to_text_scan() {
        let card = CardSpec::with_mls("9")
            .body_text("$475,000\n3 bds | 2 ba\n742 Aspen Ln\nJane Doe");
        let session = MockSession::with_page(MockPageBuilder::new().with_cards(&[card]).build());
        let profile = SiteProfile::default();
        let extractor = PageExtractor::new(&session, &profile);

        let cards = extractor.list_cards().await.unwrap();
        let listing = extractor.extract_card(&cards[0]).await;
        assert_eq!(listing.address.as_deref(), Some("742 Aspen Ln"));
    }

    #[tokio::test]
    async fn card_without_body_still_yields_partial_record() {
        let mut card = CardSpec::with_mls("31");
        card.omit_body = true;
        let session = MockSession::with_page(MockPageBuilder::new().with_cards(&[card]).build());
        let profile = SiteProfile::default();
        let extractor = PageExtractor::new(&session, &profile);

        let cards = extractor.list_cards().await.unwrap();
        let listing = extractor.extract_card(&cards[0]).await;
        assert_eq!(listing.mls_id.as_deref(), Some("31"));
        assert!(listing.has_identity());
        assert_eq!(listing.price, None);
    }

    #[tokio::test]
    async fn card_without_id_prefix_has_no_mls_id() {
        let card = CardSpec {
            id_attr: Some("featured-banner".into()),
            ..Default::default()
        };
        let session = MockSession::with_page(MockPageBuilder::new().with_cards(&[card]).build());
        let profile = SiteProfile::default();
        let extractor = PageExtractor::new(&session, &profile);

        let cards = extractor.list_cards().await.unwrap();
        let listing = extractor.extract_card(&cards[0]).await;
        assert_eq!(listing.mls_id, None);
    }
}
