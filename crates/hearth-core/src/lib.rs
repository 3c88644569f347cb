pub mod collect;
pub mod error;
pub mod export;
pub mod extract;
pub mod models;
pub mod navigate;
pub mod parse;
pub mod profile;
pub mod testutil;
pub mod traits;

pub use collect::Collector;
pub use error::AppError;
pub use extract::PageExtractor;
pub use models::{Listing, RawFields};
pub use navigate::Navigator;
pub use profile::{SiteProfile, Timing};
pub use traits::{Locator, PageSession};
