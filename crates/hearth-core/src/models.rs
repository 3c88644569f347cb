use chrono::{DateTime, Utc};

use crate::parse;

/// Intermediate all-string record read off one listing card.
///
/// Transient: built during a single card visit and consumed by
/// [`Listing::from_raw`] immediately afterwards. A `None` field means the
/// corresponding sub-element was missing or unreadable.
#[derive(Debug, Clone, Default)]
pub struct RawFields {
    pub id_token: Option<String>,
    pub price_text: Option<String>,
    pub detail_text: Option<String>,
    pub agent_text: Option<String>,
    pub status_block: Option<String>,
    pub address_text: Option<String>,
}

/// The pipeline's output unit: one fully typed listing record.
///
/// Field order is the interchange order — the CSV header and the JSON
/// object keys follow the declaration order below.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Listing {
    pub mls_id: Option<String>,
    pub price: Option<i64>,
    pub address: Option<String>,
    pub beds: Option<i64>,
    pub baths: Option<f64>,
    pub sqft: Option<i64>,
    pub status: String,
    pub agent_name: Option<String>,
    pub agent_company: Option<String>,
    pub days_on_market: i64,
    pub scraped_at: DateTime<Utc>,
}

impl Listing {
    /// Normalize a raw card into a typed record, stamping `scraped_at`.
    pub fn from_raw(raw: RawFields) -> Self {
        let price = raw.price_text.as_deref().and_then(parse::parse_price);
        let (beds, baths, sqft) = raw
            .detail_text
            .as_deref()
            .map(parse::parse_beds_baths_sqft)
            .unwrap_or((None, None, None));
        let (agent_name, agent_company) = raw
            .agent_text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(parse::parse_agent)
            .unwrap_or((None, None));
        let (status, days_on_market) = parse::parse_status_block(raw.status_block.as_deref());

        Self {
            mls_id: raw.id_token,
            price,
            address: raw.address_text,
            beds,
            baths,
            sqft,
            status,
            agent_name,
            agent_company,
            days_on_market,
            scraped_at: Utc::now(),
        }
    }

    /// Retention check: a record is worth keeping only if at least one of
    /// {mls_id, price, address} was extracted.
    pub fn has_identity(&self) -> bool {
        self.mls_id.is_some() || self.price.is_some() || self.address.is_some()
    }
}
