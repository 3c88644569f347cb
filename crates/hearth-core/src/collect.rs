//! The collection loop: pagination + extraction into one record sequence.

use tokio_util::sync::CancellationToken;

use crate::extract::PageExtractor;
use crate::models::Listing;
use crate::navigate::Navigator;
use crate::profile::SiteProfile;
use crate::traits::PageSession;

/// Orchestrates [`Navigator`] + [`PageExtractor`] across all result pages.
///
/// Best effort by construction: `collect` never fails. Faults inside a
/// page are logged at the page boundary, faults inside a card at the card
/// boundary, and the loop always hands back whatever accumulated.
pub struct Collector<'a, S: PageSession> {
    session: &'a S,
    profile: &'a SiteProfile,
    navigator: Navigator<'a, S>,
    extractor: PageExtractor<'a, S>,
}

impl<'a, S: PageSession> Collector<'a, S> {
    pub fn new(session: &'a S, profile: &'a SiteProfile) -> Self {
        Self {
            session,
            profile,
            navigator: Navigator::new(session, profile),
            extractor: PageExtractor::new(session, profile),
        }
    }

    /// Walk all result pages and return the ordered record sequence.
    ///
    /// Known quirk, kept intentionally: pagination is probed *before* the
    /// first page is extracted, so a single-page result set (no "next"
    /// control at all) yields no records. Downstream behavior depends on
    /// the exact page count per location, so changing this needs a product
    /// decision, not a code one.
    pub async fn collect(&self, cancel: &CancellationToken) -> Vec<Listing> {
        let mut records = Vec::new();
        let mut pages_visited = 0usize;

        let mut next = self.check_next().await;

        while next.is_some() {
            if cancel.is_cancelled() {
                tracing::info!("Cancelled, returning partial results");
                break;
            }

            match self.process_page(&mut records, cancel).await {
                PageOutcome::Extracted(count) => {
                    pages_visited += 1;
                    tracing::info!(page = pages_visited, cards = count, "Page processed");
                }
                PageOutcome::Empty => {
                    tracing::info!("No cards on current page, ending run");
                    break;
                }
                PageOutcome::Faulted => {
                    // Fall through and re-probe pagination; the page state
                    // may not have changed, which is not otherwise guarded.
                }
            }

            next = self.check_next().await;
            if let Some(item) = &next {
                if let Err(e) = self.navigator.advance(item).await {
                    tracing::warn!(error = %e, "Failed to advance to next page");
                    break;
                }
            }
        }

        tracing::info!(
            pages = pages_visited,
            records = records.len(),
            "Collection finished"
        );
        records
    }

    async fn check_next(&self) -> Option<S::Handle> {
        match self.navigator.has_next_page().await {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!(error = %e, "Pagination check failed, treating as last page");
                None
            }
        }
    }

    /// Extract every card on the current page, appending retained records.
    async fn process_page(
        &self,
        records: &mut Vec<Listing>,
        cancel: &CancellationToken,
    ) -> PageOutcome {
        let cards = match self.extractor.list_cards().await {
            Ok(cards) => cards,
            Err(e) => {
                tracing::warn!(error = %e, "Card listing failed on this page");
                return PageOutcome::Faulted;
            }
        };

        if cards.is_empty() {
            return PageOutcome::Empty;
        }

        let total = cards.len();
        for (i, card) in cards.iter().enumerate() {
            if cancel.is_cancelled() {
                break;
            }

            // Cards below the fold render lazily; bring each one in and
            // give it a beat before reading.
            if let Err(e) = self.session.scroll_into_view(card).await {
                tracing::debug!(error = %e, "Scroll into view failed");
            }
            self.session.settle(self.profile.timing.card_settle).await;

            let listing = self.extractor.extract_card(card).await;
            if listing.has_identity() {
                tracing::debug!(
                    card = i + 1,
                    total,
                    mls_id = ?listing.mls_id,
                    price = ?listing.price,
                    "Retained listing"
                );
                records.push(listing);
            } else {
                tracing::debug!(card = i + 1, total, "Skipped card with no usable fields");
            }
        }

        PageOutcome::Extracted(total)
    }
}

enum PageOutcome {
    /// Page had cards; `usize` is how many were seen (not retained).
    Extracted(usize),
    /// Container missing/empty — terminal for the run.
    Empty,
    /// Session fault at the page boundary; caller re-probes pagination.
    Faulted,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::testutil::{CardSpec, MockPageBuilder, MockSession};

    fn cancel() -> CancellationToken {
        CancellationToken::new()
    }

    #[tokio::test]
    async fn no_next_on_first_check_returns_empty_with_zero_pages() {
        // Cards are present, but no pagination bar: the pre-check quirk
        // means nothing is scraped.
        let page = MockPageBuilder::new()
            .with_cards(&[CardSpec::with_mls("1").price("$100,000")])
            .build();
        let session = MockSession::with_page(page);
        let profile = SiteProfile::default();

        let records = Collector::new(&session, &profile).collect(&cancel()).await;
        assert!(records.is_empty());
        assert_eq!(session.scrolled_count(), 0);
    }

    #[tokio::test]
    async fn collects_across_two_pages() {
        let pages = vec![
            MockPageBuilder::new()
                .with_pagination(&["1", "2", "Next"])
                .with_cards(&[
                    CardSpec::with_mls("100").price("$400,000").address("1 Oak Dr"),
                    CardSpec::with_mls("101").price("$410,000").address("2 Oak Dr"),
                ])
                .build(),
            MockPageBuilder::new()
                .with_pagination(&["1", "2"])
                .with_cards(&[CardSpec::with_mls("200").price("$500,000").address("3 Elm St")])
                .build(),
        ];
        let session = MockSession::with_pages(pages);
        let profile = SiteProfile::default();

        let records = Collector::new(&session, &profile).collect(&cancel()).await;

        // Page 1 extracted, advanced, page 2 extracted, then no "next".
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].mls_id.as_deref(), Some("100"));
        assert_eq!(records[2].mls_id.as_deref(), Some("200"));
        assert_eq!(session.current_page(), 1);
    }

    #[tokio::test]
    async fn drops_cards_failing_retention_invariant() {
        let pages = vec![
            MockPageBuilder::new()
                .with_pagination(&["Next"])
                .with_cards(&[
                    CardSpec::with_mls("1").price("$100,000"),
                    // No id token, no price, no address: rejected.
                    CardSpec {
                        id_attr: Some("featured-banner".into()),
                        ..Default::default()
                    },
                    CardSpec::default().address("5 Birch Way"),
                ])
                .build(),
            MockPageBuilder::new().build(),
        ];
        let session = MockSession::with_pages(pages);
        let profile = SiteProfile::default();

        let records = Collector::new(&session, &profile).collect(&cancel()).await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].mls_id.as_deref(), Some("1"));
        assert_eq!(records[1].address.as_deref(), Some("5 Birch Way"));
    }

    #[tokio::test]
    async fn empty_cards_container_ends_run_with_accumulated() {
        let pages = vec![
            MockPageBuilder::new()
                .with_pagination(&["Next"])
                .with_cards(&[CardSpec::with_mls("1").price("$100,000")])
                .build(),
            // Second page advertises a next page but has no cards.
            MockPageBuilder::new()
                .with_pagination(&["Next"])
                .with_cards(&[])
                .build(),
            MockPageBuilder::new()
                .with_cards(&[CardSpec::with_mls("9")])
                .build(),
        ];
        let session = MockSession::with_pages(pages);
        let profile = SiteProfile::default();

        let records = Collector::new(&session, &profile).collect(&cancel()).await;
        assert_eq!(records.len(), 1);
        // Never advanced past the empty page.
        assert_eq!(session.current_page(), 1);
    }

    #[tokio::test]
    async fn session_fault_on_page_is_caught_and_loop_reprobes() {
        let pages = vec![
            MockPageBuilder::new()
                .with_pagination(&["Next"])
                .with_cards(&[CardSpec::with_mls("1").price("$100,000")])
                .build(),
            MockPageBuilder::new().build(),
        ];
        let session = MockSession::with_pages(pages);
        // Skip the pagination listing, fault the first card listing.
        session.inject_find_all_error(1, AppError::Session("node detached".into()));
        let profile = SiteProfile::default();

        let records = Collector::new(&session, &profile).collect(&cancel()).await;

        // The faulted page produced nothing, the loop re-probed pagination,
        // advanced, and terminated on the bare second page.
        assert!(records.is_empty());
        assert_eq!(session.current_page(), 1);
    }

    #[tokio::test]
    async fn cancellation_returns_partial_results() {
        let pages = vec![
            MockPageBuilder::new()
                .with_pagination(&["Next"])
                .with_cards(&[CardSpec::with_mls("1").price("$100,000")])
                .build(),
            MockPageBuilder::new().build(),
        ];
        let session = MockSession::with_pages(pages);
        let profile = SiteProfile::default();

        let token = cancel();
        token.cancel();
        let records = Collector::new(&session, &profile).collect(&token).await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn scrolls_and_settles_per_card() {
        let pages = vec![
            MockPageBuilder::new()
                .with_pagination(&["Next"])
                .with_cards(&[
                    CardSpec::with_mls("1").price("$100,000"),
                    CardSpec::with_mls("2").price("$200,000"),
                ])
                .build(),
            MockPageBuilder::new().build(),
        ];
        let session = MockSession::with_pages(pages);
        let profile = SiteProfile::default();

        let records = Collector::new(&session, &profile).collect(&cancel()).await;
        assert_eq!(records.len(), 2);
        assert_eq!(session.scrolled_count(), 2);
        // One settle per card plus the advance settle.
        assert!(session.settle_count() >= 3);
    }
}
