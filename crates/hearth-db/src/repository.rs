use chrono::{DateTime, Utc};
use hearth_core::error::AppError;
use hearth_core::models::Listing;
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

/// Repository for listing persistence in PostgreSQL.
///
/// Absent numeric fields insert as SQL NULL, never 0 — downstream
/// aggregates (median price, avg sqft) must not see fabricated zeros.
#[derive(Clone)]
pub struct ListingRepository {
    pool: Pool<Postgres>,
}

impl ListingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one listing. Returns the generated row id.
    pub async fn insert(&self, listing: &Listing) -> Result<Uuid, AppError> {
        let row: (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO listings
                (mls_id, price, address, beds, baths, sqft, status,
                 agent_name, agent_company, days_on_market, scraped_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(&listing.mls_id)
        .bind(listing.price)
        .bind(&listing.address)
        .bind(listing.beds)
        .bind(listing.baths)
        .bind(listing.sqft)
        .bind(&listing.status)
        .bind(&listing.agent_name)
        .bind(&listing.agent_company)
        .bind(listing.days_on_market)
        .bind(listing.scraped_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.0)
    }

    /// Insert a whole run's records. Returns the number inserted.
    pub async fn insert_many(&self, listings: &[Listing]) -> Result<usize, AppError> {
        let mut inserted = 0;
        for listing in listings {
            self.insert(listing).await?;
            inserted += 1;
        }
        tracing::info!(inserted, "Loaded listings into database");
        Ok(inserted)
    }

    /// Most recently scraped listings, newest first.
    pub async fn recent(&self, limit: usize) -> Result<Vec<Listing>, AppError> {
        let rows = sqlx::query_as::<_, ListingRow>(
            r#"
            SELECT mls_id, price, address, beds, baths, sqft, status,
                   agent_name, agent_company, days_on_market, scraped_at
            FROM listings
            ORDER BY scraped_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Total number of stored listings.
    pub async fn count(&self) -> Result<i64, AppError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM listings")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(row.0)
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct ListingRow {
    mls_id: Option<String>,
    price: Option<i64>,
    address: Option<String>,
    beds: Option<i64>,
    baths: Option<f64>,
    sqft: Option<i64>,
    status: String,
    agent_name: Option<String>,
    agent_company: Option<String>,
    days_on_market: i64,
    scraped_at: DateTime<Utc>,
}

impl From<ListingRow> for Listing {
    fn from(row: ListingRow) -> Self {
        Listing {
            mls_id: row.mls_id,
            price: row.price,
            address: row.address,
            beds: row.beds,
            baths: row.baths,
            sqft: row.sqft,
            status: row.status,
            agent_name: row.agent_name,
            agent_company: row.agent_company,
            days_on_market: row.days_on_market,
            scraped_at: row.scraped_at,
        }
    }
}
