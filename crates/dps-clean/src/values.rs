//! Scalar value checks used by the table specs: GUIDs, timestamps,
//! integers and flags

use chrono::NaiveDateTime;
use uuid::Uuid;

/// Timestamp layout written to every CSV date column
pub const DATETIME_OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Accepted input layouts, tried in order
const DATETIME_INPUT_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

/// Parse `YYYY-MM-DD HH:MM:SS` with or without fractional seconds
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    DATETIME_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

/// Re-render a timestamp as `YYYY-MM-DD HH:MM:SS`, dropping fractions
pub fn normalize_datetime(text: &str) -> Option<String> {
    parse_datetime(text).map(|dt| dt.format(DATETIME_OUTPUT_FORMAT).to_string())
}

/// Whether `text` is a GUID in any textual form `uuid` accepts
pub fn is_uuid(text: &str) -> bool {
    Uuid::parse_str(text.trim()).is_ok()
}

pub fn parse_integer(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

/// Flag columns: anything non-empty other than `0` or `false` is set
pub fn is_truthy(text: &str) -> bool {
    let text = text.trim();
    !(text.is_empty() || text == "0" || text.eq_ignore_ascii_case("false"))
}
