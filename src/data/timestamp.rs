//! Gateway timestamp recognition and ordering.
//!
//! The gateway embeds timestamps like `2024-03-07 14:02:05.123456` in table
//! cells. Field widths are loose (1-4 digit year, 1-2 digit month/day/time
//! fields) and no range validation is performed: `2009-77-77 77:77:77.0` is
//! recognized and the oversized fields roll forward into the next larger
//! unit when the calendar date is constructed.
//!
//! The ordering key is the local-time millisecond timestamp multiplied by
//! 1000 plus the fractional field parsed as a plain integer. The fraction is
//! deliberately not scaled to a sub-second unit; a longer fractional string
//! yields a larger key, which is the tie-break the gateway tables have
//! always used.

use std::sync::LazyLock;

use chrono::{NaiveDate, TimeDelta, TimeZone};
use regex::Regex;

use super::table::{CellKey, CellParser};

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,4})-(\d{1,2})-(\d{1,2}) (\d{1,2}):(\d{1,2}):(\d{1,2})\.(\d+)")
        .expect("timestamp regex is valid")
});

/// Cell parser for gateway timestamp strings.
///
/// Registered against the chronological columns of the SMS and routing
/// tables. Cells that do not match the pattern fall back to the presenter's
/// default comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct GatewayTimestamp;

impl CellParser for GatewayTimestamp {
    fn recognizes(&self, cell: &str) -> bool {
        recognizes(cell)
    }

    fn key(&self, cell: &str) -> Option<CellKey> {
        sort_key(cell).map(CellKey::Time)
    }
}

/// Whether the string contains a gateway timestamp.
pub fn recognizes(s: &str) -> bool {
    TIMESTAMP_RE.is_match(s)
}

/// Composite ordering key for a gateway timestamp, in local time.
///
/// Returns `None` when the string does not match the pattern or the fields
/// do not form a representable instant (for example a local time that falls
/// into a DST gap).
pub fn sort_key(s: &str) -> Option<i64> {
    sort_key_in(s, &chrono::Local)
}

/// Ordering key against an explicit timezone, so tests can pin an offset.
fn sort_key_in<Tz: TimeZone>(s: &str, tz: &Tz) -> Option<i64> {
    let caps = TIMESTAMP_RE.captures(s)?;
    let field = |i: usize| -> i64 {
        // Capture groups are all-digit and at most 4 chars except the
        // fraction, which is handled separately.
        caps[i].parse().unwrap_or(0)
    };

    let (year, month, day) = (field(1), field(2), field(3));
    let (hour, minute, second) = (field(4), field(5), field(6));
    let frac: i64 = caps[7].parse().unwrap_or(i64::MAX);

    // Month 13 rolls into the next year, day 32 into the next month, hour 25
    // into the next day, and so on. Zero months and days roll backwards.
    let month0 = month - 1;
    let year = year + month0.div_euclid(12);
    let month = month0.rem_euclid(12) + 1;

    let date = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month as u32, 1)?
        .checked_add_signed(TimeDelta::days(day - 1))?;
    let datetime = date.and_hms_opt(0, 0, 0)?
        + TimeDelta::hours(hour)
        + TimeDelta::minutes(minute)
        + TimeDelta::seconds(second);

    let millis = tz.from_local_datetime(&datetime).earliest()?.timestamp_millis();
    Some(millis.saturating_mul(1000).saturating_add(frac))
}
