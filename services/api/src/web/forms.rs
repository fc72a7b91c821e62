//! Small helpers for reading HTML form fields.
//!
//! Browsers send every field as a string, and unset selects or hidden inputs
//! arrive as empty strings, so handlers take `Option<String>` and parse here.

use chrono::{NaiveDate, NaiveDateTime};

use crate::web::flash::{bad_request, FlashError};

/// The trimmed value of a field, or `None` when it is missing or blank.
pub fn filled(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parses an optional id field. Blank means "no id".
pub fn optional_id(field: &Option<String>, name: &str) -> Result<Option<i64>, FlashError> {
    filled(field)
        .map(|raw| {
            raw.parse::<i64>()
                .map_err(|_| bad_request(format!("Invalid {}.", name)))
        })
        .transpose()
}

pub fn required_id(field: &Option<String>, name: &str) -> Result<i64, FlashError> {
    optional_id(field, name)?.ok_or_else(|| bad_request(format!("Missing {}.", name)))
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Accepts `datetime-local` input values, full timestamps, or plain dates (midnight).
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| parse_date(raw).and_then(|d| d.and_hms_opt(0, 0, 0)))
}
