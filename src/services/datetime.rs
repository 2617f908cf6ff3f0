use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

/// Bangkok is UTC+7 all year.
const BANGKOK_OFFSET_SECS: i32 = 7 * 3600;

const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Parses the server's `YYYY-MM-DD HH:MM:SS[.ffffff]+00` stamps and RFC 3339.
pub fn parse_backend_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let trimmed = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    // Postgres prints a bare `+00`; chrono's %#z accepts it.
    if let Ok(dt) = DateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = trimmed.strip_suffix("+00").unwrap_or(trimmed);
    NaiveDateTime::parse_from_str(naive, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Formats a server timestamp as `dd/mm/yyyy HH:MM:SS` in Bangkok time.
///
/// Empty input gives an empty string; unparseable input comes back as is.
pub fn format_bangkok_date(input: &str) -> String {
    if input.trim().is_empty() {
        return String::new();
    }
    let Some(utc) = parse_backend_timestamp(input) else {
        return input.to_string();
    };
    match FixedOffset::east_opt(BANGKOK_OFFSET_SECS) {
        Some(bangkok) => utc.with_timezone(&bangkok).format(DISPLAY_FORMAT).to_string(),
        None => input.to_string(),
    }
}
