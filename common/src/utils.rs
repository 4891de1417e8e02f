use chrono::NaiveDate;

/// Parses an optional `YYYY-MM-DD` form field. Blank input means "no date";
/// anything else that does not parse is an error.
pub fn parse_optional_date(raw: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(Some)
}

/// Returns `next` if it is a path on this site, so login can't be used as an open redirect.
///
/// Browsers drop tabs and newlines while parsing a URL, so `/\t/host` would
/// become `//host`; any control character disqualifies the target.
pub fn safe_redirect_target(next: Option<&str>) -> Option<&str> {
    next.filter(|n| {
        n.starts_with('/')
            && !n.starts_with("//")
            && !n.contains('\\')
            && !n.chars().any(|c| c.is_control())
    })
}
