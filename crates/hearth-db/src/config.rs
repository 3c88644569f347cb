use hearth_core::AppError;

/// Pool sizing when `DATABASE_MAX_CONNECTIONS` is unset.
///
/// Inserts happen in one sequential batch at the end of a scrape run, so a
/// small pool is plenty.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Connection settings for the listings database.
///
/// The database is optional for the pipeline as a whole — only `--save`,
/// `load`, and `recent` need it — so this is read from the environment at
/// the moment one of those paths is taken, not at startup.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Read `DATABASE_URL` (required) and `DATABASE_MAX_CONNECTIONS`
    /// (optional) from the environment.
    pub fn from_env() -> Result<Self, AppError> {
        let url = std::env::var("DATABASE_URL").map_err(|_| {
            AppError::Config("DATABASE_URL not set. Required for database operations.".into())
        })?;
        let max_connections =
            parse_max_connections(std::env::var("DATABASE_MAX_CONNECTIONS").ok().as_deref())?;

        Ok(Self {
            url,
            max_connections,
        })
    }
}

fn parse_max_connections(raw: Option<&str>) -> Result<u32, AppError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_MAX_CONNECTIONS);
    };
    match raw.trim().parse::<u32>() {
        Ok(0) | Err(_) => Err(AppError::Config(format!(
            "Invalid DATABASE_MAX_CONNECTIONS '{raw}': must be a positive integer"
        ))),
        Ok(n) => Ok(n),
    }
}
