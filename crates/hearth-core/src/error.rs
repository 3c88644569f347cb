use thiserror::Error;

/// Application-wide error types for hearth.
#[derive(Error, Debug)]
pub enum AppError {
    /// Browser launch or CDP session failure.
    #[error("Browser error: {0}")]
    Browser(String),

    /// A page-session call (navigation, lookup, input) failed.
    #[error("Session error: {0}")]
    Session(String),

    /// A navigation step could not find a control it cannot proceed without
    /// (e.g. the location-search input). Aborts the run.
    #[error("Navigation error: {0}")]
    Navigation(String),

    /// A bounded wait for an element elapsed.
    #[error("Timed out after {0} seconds waiting for element")]
    WaitTimeout(u64),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration problem (missing/invalid environment).
    #[error("Config error: {0}")]
    Config(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Returns true if this error should abort the whole run.
    ///
    /// Field lookups and bounded waits degrade to null fields or empty
    /// results long before they reach this check; only bootstrap and
    /// initial-navigation failures are fatal.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::Browser(_) | AppError::Navigation(_) | AppError::Config(_)
        )
    }
}
