use chrono::{NaiveDate, NaiveDateTime};

/// Format used for item dates in persisted lists, e.g. `30 Sep 2017, 23:14`.
pub const ITEM_DATE_FORMAT: &str = "%d %b %Y, %H:%M";
/// Format used for the checkpoint time in the state document. Listing dates
/// carry seconds, so the checkpoint keeps them too.
pub const CHECKPOINT_DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";
const MINUTE_CHECKPOINT_DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

const ISO_PREFIX_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const ISO_PREFIX_LEN: usize = 19;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised date '{0}'")]
pub struct DateParseError(pub String);

/// Default timestamp for items whose date is unknown.
pub fn epoch_floor() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1900, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Checkpoint of a state that has never completed a run.
pub fn default_checkpoint_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1999, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Reads a checkpoint time, also accepting the minute-only form of older
/// state documents.
pub fn parse_checkpoint_date(raw: &str) -> Result<NaiveDateTime, DateParseError> {
    NaiveDateTime::parse_from_str(raw, CHECKPOINT_DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, MINUTE_CHECKPOINT_DATE_FORMAT))
        .map_err(|_| DateParseError(raw.to_string()))
}

/// Parses the two date renderings the origin uses on listing pages:
/// `2017-09-30 23:14:00-06` (zone suffix ignored) and `30 Sept 2017, 23:14`.
pub fn parse_listing_date(raw: &str) -> Result<NaiveDateTime, DateParseError> {
    let trimmed = raw.trim();

    if let Some(prefix) = trimmed.get(..ISO_PREFIX_LEN) {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(prefix, ISO_PREFIX_FORMAT) {
            return Ok(parsed);
        }
    }

    let normalized = trimmed.replacen(" Sept ", " Sep ", 1);
    NaiveDateTime::parse_from_str(&normalized, ITEM_DATE_FORMAT)
        .map_err(|_| DateParseError(raw.to_string()))
}
