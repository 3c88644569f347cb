//! Text-to-typed-value normalization for raw listing fields.
//!
//! Pure functions over `&str`. Every parser is total: malformed input
//! yields `None` (or a documented default), never an error, so a single
//! garbled field can never sink the record it belongs to.

use std::sync::LazyLock;

use regex::Regex;

static BEDS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*bds?").unwrap());
static BATHS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*ba").unwrap());
static SQFT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)([\d,]+)\s*sqft").unwrap());

/// Parse a display price like `"$475,000"` into whole currency units.
///
/// Strips the currency symbol and thousands separators. Any non-numeric
/// remainder (e.g. `"Call for price"`) yields `None`.
pub fn parse_price(text: &str) -> Option<i64> {
    let cleaned = text.trim().trim_start_matches('$').replace(',', "");
    cleaned.parse().ok()
}

/// Generic integer coercion: trimmed parse, `None` on empty/invalid input.
pub fn parse_int(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

/// Decompose a detail string like `"3 bds | 2 ba | 1,500 SqFt"`.
///
/// The three sub-matches are independent: a missing segment nulls only
/// its own slot.
pub fn parse_beds_baths_sqft(detail: &str) -> (Option<i64>, Option<f64>, Option<i64>) {
    let beds = BEDS_RE
        .captures(detail)
        .and_then(|c| c[1].parse().ok());
    let baths = BATHS_RE
        .captures(detail)
        .and_then(|c| c[1].parse().ok());
    let sqft = SQFT_RE
        .captures(detail)
        .and_then(|c| c[1].replace(',', "").parse().ok());
    (beds, baths, sqft)
}

/// Split an agent blurb on `|` into `(name, company)`.
///
/// With no delimiter the whole text is assigned to *company* and name is
/// left `None`. The asymmetry is inherited source behavior and kept on
/// purpose; downstream consumers rely on it.
pub fn parse_agent(text: &str) -> (Option<String>, Option<String>) {
    fn non_empty(s: &str) -> Option<String> {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    }

    match text.split_once('|') {
        Some((name, company)) => (non_empty(name), non_empty(company)),
        None => (None, non_empty(text)),
    }
}

/// Parse a status block into `(status, days_on_market)`.
///
/// The first line is the status token. If a second line exists, its last
/// whitespace-delimited token is parsed as days-on-market (a non-numeric
/// token such as `"Listed"` coerces to 0). An absent or blank block
/// defaults to `("Active", 0)`.
pub fn parse_status_block(block: Option<&str>) -> (String, i64) {
    let Some(text) = block else {
        return ("Active".to_string(), 0);
    };

    let mut lines = text.lines();
    let status = match lines.next().map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.to_string(),
        None => return ("Active".to_string(), 0),
    };

    let days_on_market = lines
        .next()
        .and_then(|line| line.split_whitespace().last())
        .and_then(parse_int)
        .unwrap_or(0);

    (status, days_on_market)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("$475,000"), Some(475_000));
        assert_eq!(parse_price("  $1,250,000 "), Some(1_250_000));
        assert_eq!(parse_price("900000"), Some(900_000));
        assert_eq!(parse_price("Call for price"), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("15"), Some(15));
        assert_eq!(parse_int("  42 "), Some(42));
        assert_eq!(parse_int("Listed"), None);
        assert_eq!(parse_int(""), None);
    }

    #[test]
    fn test_parse_beds_baths_sqft_full() {
        let (beds, baths, sqft) = parse_beds_baths_sqft("3 bds | 2 ba | 1,500 SqFt");
        assert_eq!(beds, Some(3));
        assert_eq!(baths, Some(2.0));
        assert_eq!(sqft, Some(1500));
    }

    #[test]
    fn test_parse_beds_baths_sqft_missing_baths() {
        let (beds, baths, sqft) = parse_beds_baths_sqft("4 bds | 2,200 SqFt");
        assert_eq!(beds, Some(4));
        assert_eq!(baths, None);
        assert_eq!(sqft, Some(2200));
    }

    #[test]
    fn test_parse_beds_baths_sqft_decimal_baths() {
        let (_, baths, _) = parse_beds_baths_sqft("5 bds | 3.5 ba | 4,100 SqFt");
        assert_eq!(baths, Some(3.5));
    }

    #[test]
    fn test_parse_beds_baths_sqft_case_insensitive() {
        let (beds, baths, sqft) = parse_beds_baths_sqft("2 BD | 1 BA | 980 sqft");
        assert_eq!(beds, Some(2));
        assert_eq!(baths, Some(1.0));
        assert_eq!(sqft, Some(980));
    }

    #[test]
    fn test_parse_beds_baths_sqft_garbage() {
        assert_eq!(parse_beds_baths_sqft("coming soon"), (None, None, None));
    }

    #[test]
    fn test_parse_agent_with_delimiter() {
        let (name, company) = parse_agent("Jane Doe | Acme Realty");
        assert_eq!(name.as_deref(), Some("Jane Doe"));
        assert_eq!(company.as_deref(), Some("Acme Realty"));
    }

    #[test]
    fn test_parse_agent_without_delimiter_goes_to_company() {
        let (name, company) = parse_agent("Acme Realty");
        assert_eq!(name, None);
        assert_eq!(company.as_deref(), Some("Acme Realty"));
    }

    #[test]
    fn test_parse_agent_blank_segments() {
        let (name, company) = parse_agent("Jane Doe |");
        assert_eq!(name.as_deref(), Some("Jane Doe"));
        assert_eq!(company, None);
    }

    #[test]
    fn test_parse_status_block_with_days() {
        let (status, dom) = parse_status_block(Some("Active\nDOM: 15"));
        assert_eq!(status, "Active");
        assert_eq!(dom, 15);
    }

    #[test]
    fn test_parse_status_block_single_line() {
        let (status, dom) = parse_status_block(Some("Pending"));
        assert_eq!(status, "Pending");
        assert_eq!(dom, 0);
    }

    #[test]
    fn test_parse_status_block_listed_coerces_to_zero() {
        let (status, dom) = parse_status_block(Some("Active\nListed"));
        assert_eq!(status, "Active");
        assert_eq!(dom, 0);
    }

    #[test]
    fn test_parse_status_block_empty_defaults() {
        assert_eq!(parse_status_block(Some("")), ("Active".to_string(), 0));
        assert_eq!(parse_status_block(None), ("Active".to_string(), 0));
    }
}
