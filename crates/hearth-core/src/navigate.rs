//! Search submission and pagination control.

use crate::error::AppError;
use crate::profile::SiteProfile;
use crate::traits::PageSession;

/// Drives the initial location search and page-to-page advancement.
///
/// Holds no position state of its own — the session's current page *is*
/// the position.
pub struct Navigator<'a, S: PageSession> {
    session: &'a S,
    profile: &'a SiteProfile,
}

impl<'a, S: PageSession> Navigator<'a, S> {
    pub fn new(session: &'a S, profile: &'a SiteProfile) -> Self {
        Self { session, profile }
    }

    /// Load the base page and submit a location search.
    ///
    /// A missing location input is fatal — there is no run without a
    /// search. A missing grid-view toggle is logged and ignored; the list
    /// layout still carries the same cards.
    pub async fn submit_search(&self, location: &str) -> Result<(), AppError> {
        let selectors = &self.profile.selectors;
        let timing = &self.profile.timing;

        self.session.load_page(&self.profile.base_url).await?;
        tracing::info!(url = %self.profile.base_url, "Loaded base page");
        self.session.settle(timing.page_settle).await;

        let input = self
            .session
            .wait_until_present(&selectors.location_input, timing.wait_timeout)
            .await?
            .ok_or_else(|| {
                AppError::Navigation("Location search input not found on base page".into())
            })?;

        self.session.send_keys(&input, location).await?;
        tracing::info!(%location, "Submitted location search");
        self.session.settle(timing.page_settle).await;

        // Grid view groups one card per listing; best effort only.
        match self.session.find_one(&selectors.grid_toggle).await {
            Ok(Some(toggle)) => {
                self.session.click(&toggle).await?;
                tracing::info!("Switched to grid view");
                self.session.settle(timing.page_settle).await;
            }
            Ok(None) => tracing::warn!("Grid view toggle not found, staying on current layout"),
            Err(e) => tracing::warn!(error = %e, "Grid view toggle lookup failed"),
        }

        Ok(())
    }

    /// Handle of the "next" pagination item, if one exists.
    ///
    /// A timed-out wait for the pagination bar means no next page —
    /// graceful degradation, not an error.
    pub async fn has_next_page(&self) -> Result<Option<S::Handle>, AppError> {
        let selectors = &self.profile.selectors;

        let bar = self
            .session
            .wait_until_present(&selectors.pagination, self.profile.timing.wait_timeout)
            .await?;
        let Some(bar) = bar else {
            tracing::debug!("Timed out waiting for pagination, treating as last page");
            return Ok(None);
        };

        let items = self
            .session
            .find_all_within(&bar, &selectors.pagination_item)
            .await?;

        for item in items {
            let Some(link) = self
                .session
                .find_one_within(&item, &selectors.pagination_link)
                .await?
            else {
                continue;
            };
            let label = self.session.text(&link).await?;
            if label.trim().eq_ignore_ascii_case("next") {
                return Ok(Some(item));
            }
        }

        Ok(None)
    }

    /// Click a pagination item returned by [`Navigator::has_next_page`]
    /// and wait for the new page to settle.
    pub async fn advance(&self, item: &S::Handle) -> Result<(), AppError> {
        self.session.click(item).await?;
        self.session.settle(self.profile.timing.page_settle).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{MockPageBuilder, MockSession};

    #[tokio::test]
    async fn submit_search_happy_path() {
        let page = MockPageBuilder::new()
            .with_location_input()
            .with_grid_toggle()
            .build();
        let session = MockSession::with_page(page);
        let profile = SiteProfile::default();
        let navigator = Navigator::new(&session, &profile);

        navigator.submit_search("South Jordan, UT").await.unwrap();

        assert_eq!(session.loaded_urls(), vec![profile.base_url.clone()]);
        let typed = session.typed();
        assert_eq!(typed.len(), 1);
        assert_eq!(typed[0].1, "South Jordan, UT");
        // Grid toggle was clicked.
        assert_eq!(session.click_count(), 1);
    }

    #[tokio::test]
    async fn submit_search_without_grid_toggle_is_non_fatal() {
        let page = MockPageBuilder::new().with_location_input().build();
        let session = MockSession::with_page(page);
        let profile = SiteProfile::default();
        let navigator = Navigator::new(&session, &profile);

        navigator.submit_search("South Jordan, UT").await.unwrap();
        assert_eq!(session.click_count(), 0);
    }

    #[tokio::test]
    async fn submit_search_without_location_input_is_fatal() {
        let session = MockSession::empty();
        let profile = SiteProfile::default();
        let navigator = Navigator::new(&session, &profile);

        let err = navigator.submit_search("South Jordan, UT").await.unwrap_err();
        assert!(matches!(err, AppError::Navigation(_)));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn has_next_page_finds_next_item_case_insensitively() {
        let page = MockPageBuilder::new()
            .with_pagination(&["Prev", "1", "2", "NEXT"])
            .build();
        let session = MockSession::with_page(page);
        let profile = SiteProfile::default();
        let navigator = Navigator::new(&session, &profile);

        assert!(navigator.has_next_page().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn has_next_page_none_when_no_next_label() {
        let page = MockPageBuilder::new().with_pagination(&["Prev", "1", "2"]).build();
        let session = MockSession::with_page(page);
        let profile = SiteProfile::default();
        let navigator = Navigator::new(&session, &profile);

        assert!(navigator.has_next_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn has_next_page_none_when_pagination_absent() {
        let session = MockSession::empty();
        let profile = SiteProfile::default();
        let navigator = Navigator::new(&session, &profile);

        assert!(navigator.has_next_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn advance_clicks_the_item() {
        let pages = vec![
            MockPageBuilder::new().with_pagination(&["1", "Next"]).build(),
            MockPageBuilder::new().build(),
        ];
        let session = MockSession::with_pages(pages);
        let profile = SiteProfile::default();
        let navigator = Navigator::new(&session, &profile);

        let next = navigator.has_next_page().await.unwrap().unwrap();
        navigator.advance(&next).await.unwrap();

        assert_eq!(session.click_count(), 1);
        assert_eq!(session.current_page(), 1);
    }
}
